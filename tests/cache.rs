mod common;

use std::time::Duration;

use async_trait::async_trait;
use mongo_session_store::{
    cache::SessionCache,
    error::{SessionError, SessionResult},
    MemoryCache, SessionData, SessionStore,
};
use tokio::time::sleep;

use crate::common::{sample_session, CountingBackend};

fn build_store(backend: CountingBackend, cache_ttl: Duration) -> SessionStore {
    SessionStore::builder()
        .backend(backend)
        .cache(MemoryCache::new(cache_ttl))
        .build()
}

#[tokio::test]
async fn get_after_set_is_served_from_the_cache() {
    let backend = CountingBackend::default();
    let store = build_store(backend.clone(), Duration::from_secs(300));

    store.set("123", sample_session()).await.unwrap();
    assert_eq!(backend.find_count(), 0);

    let loaded = store.get("123").await.unwrap();
    assert!(loaded.is_some());
    assert_eq!(backend.find_count(), 0, "read should not hit the backing store");
}

#[tokio::test]
async fn destroy_invalidates_the_cache_entry() {
    let backend = CountingBackend::default();
    let store = build_store(backend.clone(), Duration::from_secs(300));

    store.set("123", sample_session()).await.unwrap();
    store.destroy("123").await.unwrap();

    // No stale data from the cache; the miss goes to the backing store
    assert_eq!(store.get("123").await.unwrap(), None);
    assert_eq!(backend.find_count(), 1);
}

#[tokio::test]
async fn clear_all_flushes_the_cache() {
    let backend = CountingBackend::default();
    let store = build_store(backend.clone(), Duration::from_secs(300));

    store.set("123", sample_session()).await.unwrap();
    store.set("456", sample_session()).await.unwrap();
    store.clear_all().await.unwrap();

    assert_eq!(store.get("123").await.unwrap(), None);
    assert_eq!(store.get("456").await.unwrap(), None);
    assert_eq!(backend.find_count(), 2, "both misses should reach the store");
}

#[tokio::test]
async fn cache_miss_falls_back_to_the_store_and_repopulates() {
    let backend = CountingBackend::default();
    let store = build_store(backend.clone(), Duration::from_millis(50));

    store.set("123", sample_session()).await.unwrap();

    // Let the cache entry expire; the durable record is still live
    sleep(Duration::from_millis(80)).await;
    assert!(store.get("123").await.unwrap().is_some());
    assert_eq!(backend.find_count(), 1);

    // The miss repopulated the cache, so the next read stays off the store
    assert!(store.get("123").await.unwrap().is_some());
    assert_eq!(backend.find_count(), 1);
}

/// A cache whose every operation fails, to verify the store treats cache
/// errors as best-effort.
struct FailingCache;

#[async_trait]
impl SessionCache for FailingCache {
    async fn get(&self, _sid: &str) -> SessionResult<Option<SessionData>> {
        Err(SessionError::Cache("cache offline".into()))
    }

    async fn set(&self, _sid: &str, _data: SessionData) -> SessionResult<()> {
        Err(SessionError::Cache("cache offline".into()))
    }

    async fn delete(&self, _sid: &str) -> SessionResult<()> {
        Err(SessionError::Cache("cache offline".into()))
    }

    async fn clear(&self) -> SessionResult<()> {
        Err(SessionError::Cache("cache offline".into()))
    }
}

#[tokio::test]
async fn cache_failures_never_fail_the_operation() {
    let backend = CountingBackend::default();
    let store = SessionStore::builder()
        .backend(backend.clone())
        .cache(FailingCache)
        .build();

    let persisted = store.set("123", sample_session()).await.unwrap();
    let loaded = store.get("123").await.unwrap();
    assert_eq!(loaded, Some(persisted));
    assert_eq!(backend.find_count(), 1, "read should fall back to the store");

    store.destroy("123").await.unwrap();
    store.clear_all().await.unwrap();
}
