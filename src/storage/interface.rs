//! Shared interface for session backing stores

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{error::SessionResult, options::ExpiryPolicy};

/// The durable session record as persisted in the backing store.
/// The store facade owns this record's lifecycle end-to-end; backends only
/// translate it to and from their native representation (a backend-internal
/// record ID, if any, stays private to the backend).
#[derive(Clone, Debug)]
pub struct SessionRecord {
    /// Session identifier, the external correlation key. At most one live
    /// record exists per `sid`; backends should enforce this with a unique
    /// index where the engine supports one.
    pub sid: String,
    /// The serialized session payload (JSON)
    pub session: String,
    /// When this record was created or last updated
    pub created: OffsetDateTime,
    /// Absolute expiry, present only under [`ExpiryPolicy::ApplicationLevel`].
    /// Persisted as epoch milliseconds by backends that store raw numbers.
    pub expires: Option<OffsetDateTime>,
}

/// Trait representing a document-database backing store for sessions. You
/// can use your own database by implementing this trait.
///
/// Every method is an independent, fallible async call. The backing store is
/// the source of truth for session data - the cache layer in front of it is
/// never authoritative.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Find the record for a session ID. Absence is `Ok(None)`, not an error.
    async fn find_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>>;

    /// Insert or replace the record for `record.sid`, returning the record
    /// as persisted. The upsert must be a single atomic conditional write at
    /// the storage layer, not a read-then-write, so that concurrent writers
    /// for the same `sid` cannot lose updates.
    async fn upsert(&self, record: SessionRecord) -> SessionResult<SessionRecord>;

    /// Delete the record for a session ID, returning the deleted record if
    /// one existed. Deleting an absent record is not an error.
    async fn delete_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>>;

    /// Delete all session records, returning how many were deleted.
    async fn delete_all(&self) -> SessionResult<u64>;

    /// A cheap always-empty query, used to keep the underlying connection
    /// from idling out. The result is discarded.
    async fn probe(&self) -> SessionResult<()>;

    /// Optional setup of backend resources, called once from
    /// [`SessionStore::setup`](crate::SessionStore::setup) before the store
    /// is used. Backends should declare their indexes here: a unique index
    /// on `sid`, and engine-side TTL eviction of `ttl` when the expiry
    /// policy is [`ExpiryPolicy::StorageNative`].
    #[allow(unused_variables, reason = "Public trait function with default no-op")]
    async fn setup(&self, expiry: ExpiryPolicy, ttl: std::time::Duration) -> SessionResult<()> {
        Ok(()) // Default no-op
    }

    /// Optional teardown of backend resources, called from
    /// [`SessionStore::shutdown`](crate::SessionStore::shutdown)
    async fn shutdown(&self) -> SessionResult<()> {
        Ok(()) // Default no-op
    }
}
