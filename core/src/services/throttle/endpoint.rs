//! Per-endpoint throttle

use async_trait::async_trait;
use tf_shared::config::{EndpointLimit, EndpointRates};

use crate::domain::{RequestContext, ThrottleDecision};
use crate::errors::StoreError;

use super::keys::CacheKeys;
use super::sliding_window::SlidingWindowLimiter;
use super::traits::Throttle;

/// Endpoint name used for paths that match no rule
const DEFAULT_ENDPOINT: &str = "default";

/// Separate windows for sensitive endpoints such as login or sign-up
pub struct EndpointThrottle {
    rates: EndpointRates,
    limiter: SlidingWindowLimiter,
    keys: CacheKeys,
}

impl EndpointThrottle {
    pub fn new(rates: EndpointRates, limiter: SlidingWindowLimiter, keys: CacheKeys) -> Self {
        Self {
            rates,
            limiter,
            keys,
        }
    }

    /// First rule matching the request
    pub fn rule_for(&self, method: &str, path: &str) -> Option<&EndpointLimit> {
        self.rates
            .rules
            .iter()
            .find(|rule| rule.matches(method, path))
    }

    /// Names of every endpoint window an identity may have
    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.rates
            .rules
            .iter()
            .map(|rule| rule.name.as_str())
            .chain(std::iter::once(DEFAULT_ENDPOINT))
    }

    pub fn key_for(&self, endpoint: &str, ident: &str) -> String {
        self.keys.endpoint(endpoint, ident)
    }
}

#[async_trait]
impl Throttle for EndpointThrottle {
    fn name(&self) -> &'static str {
        "endpoint"
    }

    async fn evaluate(&self, request: &RequestContext) -> Result<ThrottleDecision, StoreError> {
        let (endpoint, rate) = match self.rule_for(&request.method, &request.path) {
            Some(rule) => (rule.name.as_str(), rule.rate),
            None if self.rates.throttle_unmatched => (DEFAULT_ENDPOINT, self.rates.default_rate),
            None => return Ok(ThrottleDecision::Exempt),
        };

        let key = self.key_for(endpoint, &request.identity.cache_ident());
        self.limiter.hit(&key, rate).await
    }
}
