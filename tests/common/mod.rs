use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use mongo_session_store::{
    error::SessionResult,
    storage::{memory::MemoryBackend, SessionBackend, SessionRecord},
    ExpiryPolicy, SessionData,
};

/// Wraps the in-memory backend and counts the calls that reach it, so tests
/// can verify which reads were served from the cache.
#[derive(Clone, Default)]
pub struct CountingBackend {
    inner: Arc<MemoryBackend>,
    finds: Arc<AtomicU64>,
    probes: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl CountingBackend {
    pub fn find_count(&self) -> u64 {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> u64 {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBackend for CountingBackend {
    async fn find_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_one(sid).await
    }

    async fn upsert(&self, record: SessionRecord) -> SessionResult<SessionRecord> {
        self.inner.upsert(record).await
    }

    async fn delete_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>> {
        self.inner.delete_one(sid).await
    }

    async fn delete_all(&self) -> SessionResult<u64> {
        self.inner.delete_all().await
    }

    async fn probe(&self) -> SessionResult<()> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.inner.probe().await
    }

    async fn setup(&self, expiry: ExpiryPolicy, ttl: std::time::Duration) -> SessionResult<()> {
        self.inner.setup(expiry, ttl).await
    }

    async fn shutdown(&self) -> SessionResult<()> {
        self.inner.shutdown().await
    }
}

/// The session shape used by the original round-trip scenario
#[allow(dead_code)]
pub fn sample_session() -> SessionData {
    let mut session = SessionData::new();
    session.cookie.max_age = Some(2000);
    session.insert("handle", "@complexcarb");
    session
}
