//! Cache key layout for throttle records

use tf_shared::CacheConfig;

/// Builds every key the throttles read or write, applying the configured prefix
#[derive(Debug, Clone, Default)]
pub struct CacheKeys {
    config: CacheConfig,
}

impl CacheKeys {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Sliding window for a tier scope: `throttle:{scope}:{ident}`
    pub fn tier(&self, scope: &str, ident: &str) -> String {
        self.config.make_key(&format!("throttle:{}:{}", scope, ident))
    }

    /// Token bucket state: `burst:{ident}`
    pub fn burst(&self, ident: &str) -> String {
        self.config.make_key(&format!("burst:{}", ident))
    }

    /// Endpoint window: `endpoint:{endpoint}:{ident}`
    pub fn endpoint(&self, endpoint: &str, ident: &str) -> String {
        self.config.make_key(&format!("endpoint:{}:{}", endpoint, ident))
    }

    /// Address window: `ip_throttle:{ip}`
    pub fn ip(&self, ip: &str) -> String {
        self.config.make_key(&format!("ip_throttle:{}", ip))
    }

    /// Rejected attempts of an address: `ip_rejections:{ip}`
    pub fn ip_rejections(&self, ip: &str) -> String {
        self.config.make_key(&format!("ip_rejections:{}", ip))
    }

    pub fn suspicious_ips(&self) -> String {
        self.config.make_key("suspicious_ips")
    }

    pub fn analytics(&self) -> String {
        self.config.make_key("rate_limit_analytics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = CacheKeys::default();
        assert_eq!(keys.tier("user", "user:42"), "throttle:user:user:42");
        assert_eq!(keys.burst("ip:10.0.0.1"), "burst:ip:10.0.0.1");
        assert_eq!(keys.endpoint("auth.login", "user:42"), "endpoint:auth.login:user:42");
        assert_eq!(keys.ip("10.0.0.1"), "ip_throttle:10.0.0.1");
        assert_eq!(keys.suspicious_ips(), "suspicious_ips");
        assert_eq!(keys.analytics(), "rate_limit_analytics");
    }

    #[test]
    fn test_keys_use_prefix() {
        let keys = CacheKeys::new(CacheConfig::memory().with_prefix("tf"));
        assert_eq!(keys.ip("10.0.0.1"), "tf:ip_throttle:10.0.0.1");
        assert_eq!(keys.suspicious_ips(), "tf:suspicious_ips");
    }
}
