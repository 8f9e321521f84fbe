//! In-memory backing store implementation

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::{select, spawn, sync::oneshot, time::interval};

use crate::{error::SessionResult, options::ExpiryPolicy};

use super::interface::{SessionBackend, SessionRecord};

/// In-memory backing store for sessions. This is designed mostly for local
/// development and testing, not for production use - records live only as
/// long as the process.
///
/// Under [`ExpiryPolicy::StorageNative`], a background sweep task stands in
/// for the storage engine's TTL eviction, deleting records older than the
/// configured TTL every `sweep_interval`. If no sweep interval is set,
/// expired records are never evicted by this backend.
#[derive(bon::Builder)]
pub struct MemoryBackend {
    /// Interval at which the expiry sweep runs under the storage-native
    /// expiry policy. If not set, no sweep task is started.
    sweep_interval: Option<Duration>,
    #[builder(skip)]
    records: Arc<Mutex<HashMap<String, SessionRecord>>>,
    #[builder(skip)]
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            sweep_interval: None,
            records: Arc::default(),
            shutdown_tx: Mutex::default(),
        }
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    async fn find_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>> {
        Ok(self.records.lock().unwrap().get(sid).cloned())
    }

    async fn upsert(&self, record: SessionRecord) -> SessionResult<SessionRecord> {
        self.records
            .lock()
            .unwrap()
            .insert(record.sid.clone(), record.clone());
        Ok(record)
    }

    async fn delete_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>> {
        Ok(self.records.lock().unwrap().remove(sid))
    }

    async fn delete_all(&self) -> SessionResult<u64> {
        let mut records = self.records.lock().unwrap();
        let count = records.len() as u64;
        records.clear();
        Ok(count)
    }

    async fn probe(&self) -> SessionResult<()> {
        let _ = self.records.lock().unwrap().get("");
        Ok(())
    }

    async fn setup(&self, expiry: ExpiryPolicy, ttl: Duration) -> SessionResult<()> {
        let Some(sweep_interval) = self.sweep_interval else {
            return Ok(());
        };
        if expiry != ExpiryPolicy::StorageNative {
            return Ok(());
        }

        let records = self.records.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        spawn(async move {
            tracing::debug!("Starting session expiry sweep");
            let mut interval = interval(sweep_interval);
            loop {
                select! {
                    _ = interval.tick() => {
                        let cutoff = time::OffsetDateTime::now_utc() - ttl;
                        records.lock().unwrap().retain(|_, record| record.created > cutoff);
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Session expiry sweep shutdown");
                        break;
                    }
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
