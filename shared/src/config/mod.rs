//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Counter store backend and Redis connection settings
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Tier, burst, endpoint and address throttling
//! - `server` - HTTP server settings
//!
//! [`AppConfig::load`] layers, from lowest to highest priority: built-in
//! defaults, `config/default.toml`, `config/{environment}.toml`, then
//! environment variables prefixed with `TF__` (`TF__RATE_LIMIT__FAIL_OPEN=false`).

pub mod cache;
pub mod environment;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{CacheBackend, CacheConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::{
    AnalyticsConfig, BurstLimits, EndpointLimit, EndpointRates, IpRateLimits, RateLimitConfig,
    TierRates,
};
pub use server::ServerConfig;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Counter store configuration
    pub cache: CacheConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::from_env())
    }
}

impl AppConfig {
    /// Create the built-in configuration for an environment
    pub fn for_environment(environment: Environment) -> Self {
        let rate_limit = match environment {
            Environment::Development => RateLimitConfig::development(),
            Environment::Staging => RateLimitConfig::default(),
            Environment::Production => RateLimitConfig::production(),
        };

        Self {
            environment,
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            rate_limit,
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&environment.config_file()).required(false))
            .add_source(
                ::config::Environment::with_prefix("TF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        config.environment = environment;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        let burst = &self.rate_limit.burst;
        if burst.enabled && (burst.burst_size == 0 || burst.refill_rate <= 0.0) {
            return Err(ConfigError::Invalid(
                "burst throttle needs a positive burst_size and refill_rate".to_string(),
            ));
        }

        let tiers = &self.rate_limit.tiers;
        let rates = [
            tiers.anonymous,
            tiers.free,
            tiers.basic,
            tiers.premium,
            tiers.enterprise,
            self.rate_limit.ip.rate,
            self.rate_limit.ip.suspicious_rate,
            self.rate_limit.endpoints.default_rate,
        ];
        let endpoint_rates = self.rate_limit.endpoints.rules.iter().map(|rule| rule.rate);
        for rate in rates.into_iter().chain(endpoint_rates) {
            if rate.period.is_zero() {
                return Err(ConfigError::Invalid(
                    "rate periods must be longer than zero".to_string(),
                ));
            }
            // A first request must always be admitted
            if rate.num_requests == 0 {
                return Err(ConfigError::Invalid(format!(
                    "rate '{}' allows no requests",
                    rate
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rate;

    #[test]
    fn test_for_environment_presets() {
        let dev = AppConfig::for_environment(Environment::Development);
        assert_eq!(dev.logging.level, "debug");
        assert_eq!(dev.rate_limit.tiers.free, Rate::per_hour(1000));

        let prod = AppConfig::for_environment(Environment::Production);
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert_eq!(prod.rate_limit.tiers.anonymous, Rate::per_hour(60));
        assert_eq!(prod.rate_limit.tiers.free, Rate::per_hour(100));
    }

    #[test]
    fn test_validate_rejects_broken_burst() {
        let mut config = AppConfig::for_environment(Environment::Staging);
        assert!(config.validate().is_ok());

        config.rate_limit.burst.enabled = true;
        config.rate_limit.burst.refill_rate = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let mut config = AppConfig::for_environment(Environment::Staging);
        config.rate_limit.tiers.basic = Rate::per(10, std::time::Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_requests() {
        let mut config = AppConfig::for_environment(Environment::Staging);
        config.rate_limit.tiers.free = "0/hour".parse().unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::for_environment(Environment::Staging);
        config.rate_limit.endpoints.rules[0].rate = Rate::per_minute(0);
        assert!(config.validate().is_err());
    }
}
