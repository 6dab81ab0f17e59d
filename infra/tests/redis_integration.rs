//! Integration tests for the Redis throttle store
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p tf_infra --test redis_integration -- --ignored

use std::sync::Arc;
use std::time::Duration;

use tf_core::{Identity, RateStore, RequestContext, SystemClock, ThrottleService, Tier};
use tf_infra::{RedisClient, RedisRateStore};
use tf_shared::config::{RateLimitConfig, TierRates};
use tf_shared::{CacheConfig, Rate};

fn config() -> CacheConfig {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    CacheConfig::new(url).with_prefix(format!("tf_test_{}", rand::random::<u32>()))
}

async fn store(config: &CacheConfig) -> RedisRateStore {
    let client = RedisClient::new(config).await.expect("Failed to connect to Redis");
    RedisRateStore::new(Arc::new(client))
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_set_get_delete() {
    let config = config();
    let store = store(&config).await;
    let key = config.make_key("roundtrip");

    store.set(&key, "{\"timestamps\":[]}", Duration::from_secs(30)).await.unwrap();
    assert_eq!(
        store.get(&key).await.unwrap(),
        Some("{\"timestamps\":[]}".to_string())
    );

    assert!(store.delete(&key).await.unwrap());
    assert_eq!(store.get(&key).await.unwrap(), None);
    assert!(store.ping().await.is_ok());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_keys_expire() {
    let config = config();
    let store = store(&config).await;
    let key = config.make_key("expiring");

    store.set(&key, "1", Duration::from_millis(200)).await.unwrap();
    // Sub-second expiries are rounded up to one second
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_throttle_service_over_redis() {
    let cache = config();
    let store: Arc<dyn RateStore> = Arc::new(store(&cache).await);
    let rate_limit = RateLimitConfig {
        tiers: TierRates {
            free: Rate::per_minute(2),
            ..Default::default()
        },
        ..Default::default()
    };
    let service =
        ThrottleService::from_config(&rate_limit, &cache, store, Arc::new(SystemClock)).unwrap();
    let request = RequestContext::new(
        Identity::account("integration", Tier::Free),
        "192.0.2.10",
        "GET",
        "/api/trials/",
    );

    assert!(service.check(&request).await.unwrap().is_admitted());
    assert!(service.check(&request).await.unwrap().is_admitted());
    assert!(!service.check(&request).await.unwrap().is_admitted());

    service.reset("user:integration").await.unwrap();
    service.reset("ip:192.0.2.10").await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_store_recovers_after_connection_is_dropped() {
    let config = config();
    let store = store(&config).await;
    let key = config.make_key("reconnect");
    store.set(&key, "1", Duration::from_secs(30)).await.unwrap();

    // Drop every other client connection, ours included
    let admin = redis::Client::open(config.url.as_str()).unwrap();
    let mut conn = admin.get_multiplexed_async_connection().await.unwrap();
    let _: () = redis::cmd("CLIENT")
        .arg("KILL")
        .arg("TYPE")
        .arg("normal")
        .arg("SKIPME")
        .arg("yes")
        .query_async(&mut conn)
        .await
        .unwrap();

    assert_eq!(store.get(&key).await.unwrap(), Some("1".to_string()));
}
