use std::time::Duration;

/// How session expiration is enforced.
///
/// The two policies are mutually exclusive - pick one per deployment and
/// keep it consistent between the store and the backing store's indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// The storage engine evicts expired records itself (e.g. a MongoDB TTL
    /// index on the `created` field, declared during [setup](crate::SessionStore::setup)).
    /// Reads do no expiry check of their own, so a record may briefly be
    /// returned past its logical expiry until the engine's sweep runs.
    StorageNative,
    /// Each record carries an absolute expiry timestamp, stamped at write
    /// time as `now + ttl`. Every read compares against it and deletes the
    /// record synchronously before reporting the session absent. Stricter
    /// than [`ExpiryPolicy::StorageNative`] at the cost of an extra delete
    /// round-trip on expired reads.
    #[default]
    ApplicationLevel,
}

/// Options for configuring the session store.
#[derive(Clone, Debug)]
pub struct SessionStoreOptions {
    /// Time-to-live for durable session records (default: 24 hours).
    /// Every successful write restamps the session's expiry to a full TTL,
    /// giving sliding-window expiration.
    pub ttl: Duration,
    /// How expiration is enforced (default: [`ExpiryPolicy::ApplicationLevel`])
    pub expiry: ExpiryPolicy,
}

impl Default for SessionStoreOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60), // 24 hours
            expiry: ExpiryPolicy::default(),
        }
    }
}
