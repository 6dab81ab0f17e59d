//! Tier-based throttle

use async_trait::async_trait;

use crate::domain::{Identity, RequestContext, ThrottleDecision, UsageSnapshot};
use crate::errors::StoreError;

use super::keys::CacheKeys;
use super::policy::{RatePolicy, RatePolicyResolver};
use super::sliding_window::SlidingWindowLimiter;
use super::traits::Throttle;

/// Sliding window limit chosen by the caller's tier
pub struct TierThrottle {
    resolver: RatePolicyResolver,
    limiter: SlidingWindowLimiter,
    keys: CacheKeys,
    scope: String,
}

impl TierThrottle {
    pub fn new(
        resolver: RatePolicyResolver,
        limiter: SlidingWindowLimiter,
        keys: CacheKeys,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            limiter,
            keys,
            scope: scope.into(),
        }
    }

    pub fn key_for(&self, identity: &Identity) -> String {
        self.keys.tier(&self.scope, &identity.cache_ident())
    }

    /// Current usage for an identity, `None` when it is not limited
    pub async fn usage(&self, identity: &Identity) -> Result<Option<UsageSnapshot>, StoreError> {
        match self.resolver.resolve(identity) {
            RatePolicy::Unlimited => Ok(None),
            RatePolicy::Limited(rate) => {
                let snapshot = self.limiter.peek(&self.key_for(identity), rate).await?;
                Ok(Some(snapshot))
            }
        }
    }
}

#[async_trait]
impl Throttle for TierThrottle {
    fn name(&self) -> &'static str {
        "tier"
    }

    async fn evaluate(&self, request: &RequestContext) -> Result<ThrottleDecision, StoreError> {
        match self.resolver.resolve(&request.identity) {
            RatePolicy::Unlimited => Ok(ThrottleDecision::Exempt),
            RatePolicy::Limited(rate) => {
                let key = self.key_for(&request.identity);
                self.limiter.hit(&key, rate).await
            }
        }
    }
}
