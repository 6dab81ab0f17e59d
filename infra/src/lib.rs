//! # Infrastructure Layer
//!
//! Concrete counter stores for the TrialsFinder throttle service.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client with retry logic, and an in-process store
//! - **Services**: [`tf_core::RateStore`] implementations over those caches
//!
//! ## Features
//!
//! - `redis-cache`: Enable Redis caching support (default)

use std::sync::Arc;

use tf_core::RateStore;
use tf_shared::{CacheBackend, CacheConfig};

/// Cache module - Redis client and in-process store
pub mod cache;

/// Services module - Infrastructure service implementations
pub mod services;

pub use cache::{MemoryRateStore, RedisClient};
pub use services::RedisRateStore;

/// Build the counter store selected by `config.backend`
pub async fn build_store(config: &CacheConfig) -> Result<Arc<dyn RateStore>, InfrastructureError> {
    match config.backend {
        CacheBackend::Redis => {
            let client = RedisClient::new(config).await?;
            tracing::info!("Using Redis throttle store");
            Ok(Arc::new(RedisRateStore::new(Arc::new(client))))
        }
        CacheBackend::Memory => {
            tracing::info!("Using in-process throttle store");
            Ok(Arc::new(MemoryRateStore::new()))
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
