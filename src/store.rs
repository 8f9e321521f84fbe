use std::sync::Arc;

use bon::Builder;
use time::OffsetDateTime;

use crate::{
    cache::{NoopCache, SessionCache},
    error::SessionResult,
    options::{ExpiryPolicy, SessionStoreOptions},
    session::SessionData,
    storage::{SessionBackend, SessionRecord},
};

/**
The session store: a cache-aside facade over a durable backing store and an
optional volatile cache.

Reads consult the cache first and fall back to the backing store on a miss,
repopulating the cache with what they find. Writes go to the backing store
first (the source of truth) and then write through to the cache best-effort.
If no cache is configured, a no-op cache keeps the code path identical with
zero overhead.

# Example
```rust
use mongo_session_store::{SessionStore, SessionData, storage::memory::MemoryBackend};

# async fn demo() -> mongo_session_store::error::SessionResult<()> {
let store = SessionStore::builder()
    .backend(MemoryBackend::default())
    .build();
store.setup().await?;

let mut session = SessionData::new();
session.insert("user_id", "123");

let persisted = store.set("sid-1", session).await?;
assert!(persisted.cookie.expires.is_some());

let loaded = store.get("sid-1").await?;
assert_eq!(loaded, Some(persisted));

store.destroy("sid-1").await?;
assert_eq!(store.get("sid-1").await?, None);
# Ok(())
# }
```

# Configuration
Use [`with_options`](SessionStoreBuilder::with_options) to customize the
TTL and expiry policy, and [`cache`](SessionStoreBuilder::cache) to front
the backing store with a cache:
```rust
use std::time::Duration;
use mongo_session_store::{SessionStore, MemoryCache, storage::memory::MemoryBackend};

let store = SessionStore::builder()
    .backend(MemoryBackend::default())
    .cache(MemoryCache::new(Duration::from_secs(300)))
    .with_options(|opt| opt.ttl = Duration::from_secs(60 * 60))
    .build();
```
*/
#[derive(Builder)]
pub struct SessionStore {
    /// Set the backing store (the source of truth for session records).
    #[builder(with = |backend: impl SessionBackend + 'static| Arc::new(backend))]
    backend: Arc<dyn SessionBackend>,
    /// Set the cache in front of the backing store. The default is a no-op
    /// cache, i.e. no caching.
    #[builder(default = Arc::new(NoopCache), with = |cache: impl SessionCache + 'static| Arc::new(cache))]
    cache: Arc<dyn SessionCache>,
    /// Set the options directly. Alternatively, use `with_options` to customize the default options via a closure.
    #[builder(default)]
    options: SessionStoreOptions,
}

use session_store_builder::{IsUnset, SetOptions, State};
impl<S: State> SessionStoreBuilder<S> {
    /// Customize the [options](SessionStoreOptions) via a closure. Any options that are not set will retain their default values.
    pub fn with_options<OptionsFn>(self, options_fn: OptionsFn) -> SessionStoreBuilder<SetOptions<S>>
    where
        S::Options: IsUnset,
        OptionsFn: FnOnce(&mut SessionStoreOptions),
    {
        let mut options = SessionStoreOptions::default();
        options_fn(&mut options);
        self.options(options)
    }
}

impl SessionStore {
    /// Initialize backend and cache resources: declares the backend's
    /// indexes (unique `sid`, plus engine-side TTL eviction under the
    /// storage-native expiry policy) and starts any background tasks.
    /// Idempotent; call once before using the store.
    pub async fn setup(&self) -> SessionResult<()> {
        self.backend
            .setup(self.options.expiry, self.options.ttl)
            .await?;
        self.cache.setup().await?;
        Ok(())
    }

    /// Tear down backend and cache resources.
    pub async fn shutdown(&self) -> SessionResult<()> {
        self.backend.shutdown().await?;
        self.cache.shutdown().await?;
        Ok(())
    }

    /// Look up the session for a session ID.
    ///
    /// Returns `Ok(None)` if no record exists, or if the record has expired
    /// (in which case it is deleted before returning). A record whose stored
    /// payload cannot be parsed yields
    /// [`SessionError::Serialization`](crate::error::SessionError::Serialization),
    /// never a silent absence.
    pub async fn get(&self, sid: &str) -> SessionResult<Option<SessionData>> {
        tracing::debug!(sid, "GET");
        match self.cache.get(sid).await {
            Ok(Some(data)) => {
                tracing::debug!(sid, "GET served from cache");
                return Ok(Some(data));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(sid, "Cache read failed, falling back to store: {e}"),
        }

        let Some(record) = self.backend.find_one(sid).await? else {
            tracing::debug!(sid, "GET no session found");
            return Ok(None);
        };
        if self.is_expired(&record) {
            tracing::debug!(sid, "GET session expired, deleting");
            self.backend.delete_one(sid).await?;
            return Ok(None);
        }

        let data: SessionData = serde_json::from_str(&record.session)?;
        if let Err(e) = self.cache.set(sid, data.clone()).await {
            tracing::warn!(sid, "Failed to repopulate cache: {e}");
        }
        Ok(Some(data))
    }

    /// Persist the session under a session ID, inserting or replacing the
    /// record as one atomic upsert.
    ///
    /// The session cookie's expiry is unconditionally restamped to
    /// `now + ttl` before persisting, so every write extends the session by
    /// a full TTL (sliding-window expiration). Returns the session as it
    /// was persisted, re-deserialized from the stored record, so the caller
    /// observes exactly what is now durable.
    pub async fn set(&self, sid: &str, mut session: SessionData) -> SessionResult<SessionData> {
        tracing::debug!(sid, "SET");
        let now = OffsetDateTime::now_utc();
        let expires = now + self.options.ttl;
        session.cookie.expires = Some(expires);

        let record = SessionRecord {
            sid: sid.to_owned(),
            session: serde_json::to_string(&session)?,
            created: now,
            expires: match self.options.expiry {
                ExpiryPolicy::ApplicationLevel => Some(expires),
                ExpiryPolicy::StorageNative => None,
            },
        };
        let persisted = self.backend.upsert(record).await?;
        let data: SessionData = serde_json::from_str(&persisted.session)?;

        if let Err(e) = self.cache.set(sid, data.clone()).await {
            tracing::warn!(sid, "Cache write-through failed: {e}");
        }
        Ok(data)
    }

    /// Delete the session for a session ID and invalidate its cache entry.
    /// Deleting a session that doesn't exist is not an error.
    pub async fn destroy(&self, sid: &str) -> SessionResult<()> {
        tracing::debug!(sid, "DESTROY");
        self.backend.delete_one(sid).await?;
        if let Err(e) = self.cache.delete(sid).await {
            tracing::warn!(sid, "Cache invalidation failed: {e}");
        }
        Ok(())
    }

    /// Delete all sessions and flush the cache.
    pub async fn clear_all(&self) -> SessionResult<()> {
        tracing::debug!("CLEARALL");
        let count = self.backend.delete_all().await?;
        tracing::debug!("CLEARALL deleted {count} sessions");
        if let Err(e) = self.cache.clear().await {
            tracing::warn!("Cache flush failed: {e}");
        }
        Ok(())
    }

    /// Issue a cheap always-empty query against the backing store, purely
    /// to keep the underlying connection from idling out. The outcome is
    /// logged and never surfaced to callers.
    pub async fn keep_alive(&self) {
        tracing::debug!("KEEPALIVE querying store for empty set");
        match self.backend.probe().await {
            Ok(()) => tracing::debug!("KEEPALIVE success"),
            Err(e) => tracing::warn!("KEEPALIVE error: {e}"),
        }
    }

    fn is_expired(&self, record: &SessionRecord) -> bool {
        match self.options.expiry {
            // The storage engine owns eviction; no read-time check
            ExpiryPolicy::StorageNative => false,
            ExpiryPolicy::ApplicationLevel => record
                .expires
                .is_some_and(|expires| expires <= OffsetDateTime::now_utc()),
        }
    }
}
