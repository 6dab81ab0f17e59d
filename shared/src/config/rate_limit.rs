//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use crate::types::Rate;

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,

    /// Admit requests when the counter store is unreachable
    pub fail_open: bool,

    /// Trust `X-Account-Id` / `X-Account-Tier` set by an upstream gateway
    pub trust_identity_headers: bool,

    /// Token required by the admin endpoints; admin routes are hidden when unset
    pub admin_token: Option<String>,

    /// Paths that are never throttled nor tracked
    pub exempt_paths: Vec<String>,

    /// Per-tier sliding window limits
    pub tiers: TierRates,

    /// Token bucket burst limits
    pub burst: BurstLimits,

    /// Per-endpoint limits
    pub endpoints: EndpointRates,

    /// Per-address limits
    pub ip: IpRateLimits,

    /// Request analytics tracking
    pub analytics: AnalyticsConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fail_open: true,
            trust_identity_headers: false,
            admin_token: None,
            exempt_paths: vec!["/health".to_string(), "/metrics".to_string()],
            tiers: TierRates::default(),
            burst: BurstLimits::default(),
            endpoints: EndpointRates::default(),
            ip: IpRateLimits::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl RateLimitConfig {
    /// Check whether a request path is exempt from throttling
    ///
    /// Entries match exactly (ignoring a trailing slash) or, with a trailing
    /// `*`, by prefix.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_paths.iter().any(|exempt| match exempt.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => path.trim_end_matches('/') == exempt.trim_end_matches('/'),
        })
    }

    /// Create a development configuration (more lenient limits)
    pub fn development() -> Self {
        Self {
            tiers: TierRates {
                anonymous: Rate::per_hour(1000),
                free: Rate::per_hour(1000),
                ..Default::default()
            },
            ip: IpRateLimits {
                rate: Rate::per_hour(1000),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Create a production configuration (stricter anonymous limits)
    pub fn production() -> Self {
        Self {
            tiers: TierRates {
                anonymous: Rate::per_hour(60),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Sliding window rates by account tier
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TierRates {
    /// Enable the tier throttle
    pub enabled: bool,

    /// Scope name used in the cache key
    pub scope: String,

    /// Rate for unauthenticated clients
    pub anonymous: Rate,

    pub free: Rate,
    pub basic: Rate,
    pub premium: Rate,
    pub enterprise: Rate,

    /// Enterprise accounts skip the tier throttle entirely
    pub enterprise_bypass: bool,
}

impl Default for TierRates {
    fn default() -> Self {
        Self {
            enabled: true,
            scope: String::from("user"),
            anonymous: Rate::per_hour(100),
            free: Rate::per_hour(100),
            basic: Rate::per_hour(500),
            premium: Rate::per_hour(2000),
            enterprise: Rate::per_hour(10000),
            enterprise_bypass: true,
        }
    }
}

/// Token bucket configuration for short bursts
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BurstLimits {
    /// Enable the burst throttle
    pub enabled: bool,

    /// Bucket capacity
    pub burst_size: u32,

    /// Tokens added per second
    pub refill_rate: f64,

    /// TTL of the stored bucket state in seconds
    pub state_ttl_seconds: u64,
}

impl Default for BurstLimits {
    fn default() -> Self {
        Self {
            enabled: false,
            burst_size: 10,
            refill_rate: 1.0,
            state_ttl_seconds: 3600,
        }
    }
}

/// Per-endpoint rate table
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointRates {
    /// Enable the endpoint throttle
    pub enabled: bool,

    /// Rate for paths that match no rule
    pub default_rate: Rate,

    /// Throttle paths that match no rule with `default_rate`
    pub throttle_unmatched: bool,

    /// Named endpoint rules, first match wins
    pub rules: Vec<EndpointLimit>,
}

impl Default for EndpointRates {
    fn default() -> Self {
        Self {
            enabled: true,
            default_rate: Rate::per_hour(100),
            throttle_unmatched: true,
            rules: vec![
                EndpointLimit::post("auth.login", "/api/auth/login*", Rate::per_hour(5)),
                EndpointLimit::post("auth.register", "/api/auth/register*", Rate::per_hour(10)),
                EndpointLimit::post(
                    "auth.forgot_password",
                    "/api/auth/forgot-password*",
                    Rate::per_hour(3),
                ),
                EndpointLimit::post("trials.create", "/api/trials/create*", Rate::per_hour(20)),
                EndpointLimit::post(
                    "analytics.track_event",
                    "/api/analytics/events*",
                    Rate::per_hour(1000),
                ),
                EndpointLimit::post(
                    "subscriptions.create",
                    "/api/subscriptions/create*",
                    Rate::per_hour(10),
                ),
            ],
        }
    }
}

/// Custom endpoint rate limit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointLimit {
    /// Endpoint name used in the cache key (e.g., "auth.login")
    pub name: String,

    /// Endpoint path pattern, exact or with a trailing `*` (e.g., "/api/trials/create*")
    pub path_pattern: String,

    /// Restrict the rule to one HTTP method
    #[serde(default)]
    pub method: Option<String>,

    /// Allowed rate
    pub rate: Rate,
}

impl EndpointLimit {
    /// Create a rule for POST requests
    pub fn post(name: impl Into<String>, path_pattern: impl Into<String>, rate: Rate) -> Self {
        Self {
            name: name.into(),
            path_pattern: path_pattern.into(),
            method: Some(String::from("POST")),
            rate,
        }
    }

    /// Check whether the rule applies to a request
    pub fn matches(&self, method: &str, path: &str) -> bool {
        if let Some(expected) = &self.method {
            if !expected.eq_ignore_ascii_case(method) {
                return false;
            }
        }

        match self.path_pattern.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => path == self.path_pattern,
        }
    }
}

/// Per-address throttle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IpRateLimits {
    /// Enable the address throttle
    pub enabled: bool,

    /// Rate for ordinary addresses
    pub rate: Rate,

    /// Rate for addresses flagged as suspicious or inside a proxy range
    pub suspicious_rate: Rate,

    /// Known VPN / proxy ranges in CIDR notation
    pub vpn_ranges: Vec<String>,

    /// How long an address stays flagged, in seconds
    pub suspicious_ttl_seconds: u64,
}

impl Default for IpRateLimits {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: Rate::per_hour(60),
            suspicious_rate: Rate::per_hour(10),
            vpn_ranges: Vec::new(),
            suspicious_ttl_seconds: 86_400,
        }
    }
}

/// Request analytics configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Enable analytics tracking
    pub enabled: bool,

    /// Number of hourly buckets kept
    pub retention_hours: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_hours: 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tier_rates() {
        let tiers = TierRates::default();
        assert_eq!(tiers.free, Rate::per_hour(100));
        assert_eq!(tiers.basic, Rate::per_hour(500));
        assert_eq!(tiers.premium, Rate::per_hour(2000));
        assert_eq!(tiers.enterprise, Rate::per_hour(10000));
        assert!(tiers.enterprise_bypass);
    }

    #[test]
    fn test_endpoint_rule_matching() {
        let rule = EndpointLimit::post("auth.login", "/api/auth/login*", Rate::per_hour(5));
        assert!(rule.matches("POST", "/api/auth/login/"));
        assert!(rule.matches("post", "/api/auth/login"));
        assert!(!rule.matches("GET", "/api/auth/login/"));
        assert!(!rule.matches("POST", "/api/auth/register/"));

        let exact = EndpointLimit {
            name: "trials.list".to_string(),
            path_pattern: "/api/trials/".to_string(),
            method: None,
            rate: Rate::per_minute(30),
        };
        assert!(exact.matches("GET", "/api/trials/"));
        assert!(!exact.matches("GET", "/api/trials/12/"));
    }

    #[test]
    fn test_exempt_paths() {
        let config = RateLimitConfig::default();
        assert!(config.is_exempt("/health"));
        assert!(config.is_exempt("/health/"));
        assert!(config.is_exempt("/metrics/"));
        assert!(!config.is_exempt("/api/trials/"));

        let config = RateLimitConfig {
            exempt_paths: vec!["/internal/*".to_string()],
            ..Default::default()
        };
        assert!(config.is_exempt("/internal/ready"));
        assert!(!config.is_exempt("/health"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RateLimitConfig = serde_json::from_value(serde_json::json!({
            "fail_open": false,
            "tiers": { "premium": "3000/hour" },
            "endpoints": {
                "rules": [
                    { "name": "search.query", "path_pattern": "/api/search*", "rate": "30/min" }
                ]
            }
        }))
        .unwrap();

        assert!(config.enabled);
        assert!(!config.fail_open);
        assert_eq!(config.tiers.premium, Rate::per_hour(3000));
        assert_eq!(config.tiers.free, Rate::per_hour(100));
        assert_eq!(config.endpoints.rules.len(), 1);
        assert_eq!(config.endpoints.rules[0].rate, Rate::per_minute(30));
        assert!(config.endpoints.rules[0].method.is_none());
    }

    #[test]
    fn test_environment_presets() {
        assert_eq!(RateLimitConfig::development().tiers.free, Rate::per_hour(1000));
        assert_eq!(RateLimitConfig::production().tiers.anonymous, Rate::per_hour(60));
    }
}
