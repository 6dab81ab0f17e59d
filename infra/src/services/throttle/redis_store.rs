//! Redis-backed throttle counter store

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use tf_core::{RateStore, StoreError};

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// [`RateStore`] backed by Redis `GET` / `SET EX` / `DEL`
///
/// Keys expire on the Redis side, so stale windows never need cleaning up.
#[derive(Clone)]
pub struct RedisRateStore {
    redis_client: Arc<RedisClient>,
}

impl RedisRateStore {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }
}

/// Redis expiries are whole seconds and must be positive
pub(crate) fn expiry_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

fn unavailable(e: InfrastructureError) -> StoreError {
    StoreError::unavailable(e.to_string())
}

#[async_trait]
impl RateStore for RedisRateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.redis_client.get(key).await.map_err(unavailable)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.redis_client
            .set_with_expiry(key, value, expiry_seconds(ttl))
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.redis_client.delete(key).await.map_err(unavailable)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self.redis_client.health_check().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(StoreError::unavailable("unexpected PING response")),
            Err(e) => Err(unavailable(e)),
        }
    }
}
