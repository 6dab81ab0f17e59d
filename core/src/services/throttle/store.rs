//! Counter store and clock seams

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use crate::errors::StoreError;

/// Shared key-value store holding throttle records
///
/// Values are opaque strings with a per-key time to live. Implementations
/// must treat expired keys as absent.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Fetch the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Remove `key`, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Load a JSON record. Unreadable records are treated as missing.
pub(crate) async fn read_record<T: DeserializeOwned>(
    store: &dyn RateStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable throttle record");
            Ok(None)
        }
    }
}

/// Store a JSON record with a time to live
pub(crate) async fn write_record<T: Serialize>(
    store: &dyn RateStore,
    key: &str,
    record: &T,
    ttl: Duration,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(record).map_err(|e| StoreError::Encoding {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &raw, ttl).await
}
