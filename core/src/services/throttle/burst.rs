//! Burst throttle backed by a token bucket

use async_trait::async_trait;

use crate::domain::{RequestContext, ThrottleDecision};
use crate::errors::StoreError;

use super::keys::CacheKeys;
use super::token_bucket::TokenBucketLimiter;
use super::traits::Throttle;

pub struct BurstThrottle {
    bucket: TokenBucketLimiter,
    keys: CacheKeys,
}

impl BurstThrottle {
    pub fn new(bucket: TokenBucketLimiter, keys: CacheKeys) -> Self {
        Self { bucket, keys }
    }
}

#[async_trait]
impl Throttle for BurstThrottle {
    fn name(&self) -> &'static str {
        "burst"
    }

    async fn evaluate(&self, request: &RequestContext) -> Result<ThrottleDecision, StoreError> {
        let key = self.keys.burst(&request.identity.cache_ident());
        self.bucket.take(&key).await
    }
}
