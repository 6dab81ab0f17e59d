//! Cache module for counter storage
//!
//! Redis client with retry logic and an in-process store for single-instance
//! deployments.

pub mod memory_store;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use memory_store::MemoryRateStore;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use tf_shared::CacheConfig;
