use std::time::Duration;

use crate::cache::MemoryRateStore;
use tf_core::RateStore;

#[tokio::test]
async fn test_set_get_delete() {
    let store = MemoryRateStore::new();

    store.set("k", "v", Duration::from_secs(60)).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

    assert!(store.delete("k").await.unwrap());
    assert!(!store.delete("k").await.unwrap());
    assert_eq!(store.get("k").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entries_read_as_missing() {
    let store = MemoryRateStore::new();
    store.set("short", "1", Duration::from_secs(5)).await.unwrap();
    store.set("long", "2", Duration::from_secs(60)).await.unwrap();

    tokio::time::advance(Duration::from_secs(6)).await;

    assert_eq!(store.get("short").await.unwrap(), None);
    assert_eq!(store.get("long").await.unwrap(), Some("2".to_string()));
    assert_eq!(store.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_purge_drops_expired_entries() {
    let store = MemoryRateStore::new();
    for i in 0..10 {
        store
            .set(&format!("k{}", i), "x", Duration::from_secs(1))
            .await
            .unwrap();
    }

    tokio::time::advance(Duration::from_secs(2)).await;
    store.purge_expired();

    assert!(store.is_empty());
    assert!(!store.delete("k0").await.unwrap());
}

#[tokio::test]
async fn test_clones_share_entries() {
    let store = MemoryRateStore::new();
    let other = store.clone();

    store.set("k", "v", Duration::from_secs(60)).await.unwrap();

    assert_eq!(other.get("k").await.unwrap(), Some("v".to_string()));
    assert!(other.ping().await.is_ok());
}

#[tokio::test]
async fn test_concurrent_writers() {
    let store = MemoryRateStore::new();
    let mut handles = Vec::new();

    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let id = rand::random::<u32>();
            let key = format!("writer:{}:{}", i, id);
            store.set(&key, "1", Duration::from_secs(60)).await.unwrap();
            key
        }));
    }

    for handle in handles {
        let key = handle.await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some("1".to_string()));
    }
    assert_eq!(store.len(), 16);
}
