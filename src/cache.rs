//! The in-process cache layer in front of the backing store

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use retainer::Cache;
use tokio::{select, spawn, sync::oneshot};

use crate::{error::SessionResult, session::SessionData};

/// Default TTL for cache entries when the cache is managed internally
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Trait representing the volatile cache in front of the backing store.
/// You can supply your own cache (e.g. backed by an external key-value
/// store) by implementing this trait.
///
/// The cache is strictly a performance layer and is never authoritative:
/// it can be dropped or flushed at any time without correctness loss. The
/// store facade treats every error from these methods as best-effort - a
/// failed read falls back to the backing store, and a failed write-through
/// is logged without failing the operation.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Look up a cached session. A miss is `Ok(None)`.
    async fn get(&self, sid: &str) -> SessionResult<Option<SessionData>>;

    /// Cache a session under its session ID.
    async fn set(&self, sid: &str, data: SessionData) -> SessionResult<()>;

    /// Invalidate the cache entry for a session ID, whether or not one exists.
    async fn delete(&self, sid: &str) -> SessionResult<()>;

    /// Flush the entire cache.
    async fn clear(&self) -> SessionResult<()>;

    /// Optional setup of cache resources, called from
    /// [`SessionStore::setup`](crate::SessionStore::setup)
    async fn setup(&self) -> SessionResult<()> {
        Ok(()) // Default no-op
    }

    /// Optional teardown of cache resources, called from
    /// [`SessionStore::shutdown`](crate::SessionStore::shutdown)
    async fn shutdown(&self) -> SessionResult<()> {
        Ok(()) // Default no-op
    }
}

/// The cache used when none is configured: every read misses and every
/// write succeeds without storing anything, so the store facade runs the
/// same code path with or without a cache.
pub struct NoopCache;

#[async_trait]
impl SessionCache for NoopCache {
    async fn get(&self, _sid: &str) -> SessionResult<Option<SessionData>> {
        Ok(None)
    }

    async fn set(&self, _sid: &str, _data: SessionData) -> SessionResult<()> {
        Ok(())
    }

    async fn delete(&self, _sid: &str) -> SessionResult<()> {
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        Ok(())
    }
}

/// In-process session cache built on the [retainer] async cache, with its
/// own TTL independent of the durable TTL (default: 1 hour). Entries expire
/// lazily on read; a background monitor task started at setup purges
/// expired entries in bulk.
pub struct MemoryCache {
    cache: Arc<Cache<String, SessionData>>,
    ttl: Duration,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl MemoryCache {
    /// Create a cache whose entries live for the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::default(),
            ttl,
            shutdown_tx: Mutex::default(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn get(&self, sid: &str) -> SessionResult<Option<SessionData>> {
        let entry = self.cache.get(&sid.to_owned()).await;
        Ok(entry.map(|data| data.to_owned()))
    }

    async fn set(&self, sid: &str, data: SessionData) -> SessionResult<()> {
        self.cache.insert(sid.to_owned(), data, self.ttl).await;
        Ok(())
    }

    async fn delete(&self, sid: &str) -> SessionResult<()> {
        self.cache.remove(&sid.to_owned()).await;
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        self.cache.clear().await;
        Ok(())
    }

    async fn setup(&self) -> SessionResult<()> {
        let cache = self.cache.clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        spawn(async move {
            select! {
                _ = cache.monitor(10, 0.25, Duration::from_secs(5 * 60)) => (),
                _ = shutdown_rx => {
                    tracing::debug!("Session cache monitor shutdown");
                }
            }
        });
        self.shutdown_tx.lock().unwrap().replace(shutdown_tx);
        Ok(())
    }

    async fn shutdown(&self) -> SessionResult<()> {
        if let Some(tx) = self.shutdown_tx.lock().unwrap().take() {
            let _ = tx.send(());
        }
        Ok(())
    }
}
