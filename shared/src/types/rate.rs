//! Request rates expressed as `"<requests>/<period>"`
//!
//! The period is matched on its first letter only, so `"5/m"`, `"5/min"` and
//! `"5/minute"` are all five requests per minute.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A number of requests allowed per period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rate {
    /// Maximum number of requests in one period
    pub num_requests: u32,
    /// Length of the period
    pub period: Duration,
}

/// Errors produced when parsing a rate string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateParseError {
    #[error("rate '{0}' must have the form '<requests>/<period>'")]
    MissingSeparator(String),

    #[error("invalid request count in rate '{0}'")]
    InvalidCount(String),

    #[error("unknown period in rate '{0}', expected s, m, h or d")]
    UnknownPeriod(String),
}

impl Rate {
    /// Create a rate of `num_requests` per `period`
    pub const fn per(num_requests: u32, period: Duration) -> Self {
        Self {
            num_requests,
            period,
        }
    }

    pub const fn per_second(num_requests: u32) -> Self {
        Self::per(num_requests, Duration::from_secs(1))
    }

    pub const fn per_minute(num_requests: u32) -> Self {
        Self::per(num_requests, Duration::from_secs(60))
    }

    pub const fn per_hour(num_requests: u32) -> Self {
        Self::per(num_requests, Duration::from_secs(3600))
    }

    pub const fn per_day(num_requests: u32) -> Self {
        Self::per(num_requests, Duration::from_secs(86_400))
    }
}

impl FromStr for Rate {
    type Err = RateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, period) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| RateParseError::MissingSeparator(s.to_string()))?;

        let num_requests = count
            .trim()
            .parse::<u32>()
            .map_err(|_| RateParseError::InvalidCount(s.to_string()))?;

        let seconds = match period.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('s') => 1,
            Some('m') => 60,
            Some('h') => 3600,
            Some('d') => 86_400,
            _ => return Err(RateParseError::UnknownPeriod(s.to_string())),
        };

        Ok(Self::per(num_requests, Duration::from_secs(seconds)))
    }
}

impl TryFrom<String> for Rate {
    type Error = RateParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rate> for String {
    fn from(rate: Rate) -> Self {
        rate.to_string()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = match self.period.as_secs() {
            1 => "second".to_string(),
            60 => "minute".to_string(),
            3600 => "hour".to_string(),
            86_400 => "day".to_string(),
            other => format!("{}s", other),
        };
        write!(f, "{}/{}", self.num_requests, period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_rates() {
        assert_eq!("100/hour".parse::<Rate>().unwrap(), Rate::per_hour(100));
        assert_eq!("5/min".parse::<Rate>().unwrap(), Rate::per_minute(5));
        assert_eq!("10/s".parse::<Rate>().unwrap(), Rate::per_second(10));
        assert_eq!(" 3 / day ".parse::<Rate>().unwrap(), Rate::per_day(3));
    }

    #[test]
    fn test_parse_rejects_malformed_rates() {
        assert!(matches!(
            "100".parse::<Rate>(),
            Err(RateParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "many/hour".parse::<Rate>(),
            Err(RateParseError::InvalidCount(_))
        ));
        assert!(matches!(
            "10/week".parse::<Rate>(),
            Err(RateParseError::UnknownPeriod(_))
        ));
    }

    #[test]
    fn test_display_uses_period_names() {
        assert_eq!(Rate::per_hour(2000).to_string(), "2000/hour");
        assert_eq!(Rate::per_minute(60).to_string(), "60/minute");
    }

    #[test]
    fn test_serde_uses_string_form() {
        let json = serde_json::to_string(&Rate::per_hour(500)).unwrap();
        assert_eq!(json, "\"500/hour\"");

        let parsed: Rate = serde_json::from_str("\"20/h\"").unwrap();
        assert_eq!(parsed, Rate::per_hour(20));

        assert!(serde_json::from_str::<Rate>("\"twenty\"").is_err());
    }
}
