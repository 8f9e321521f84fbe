//! Error types

/// Result type for session store operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can happen while loading or persisting sessions.
///
/// A missing session is not an error: read operations return `Ok(None)`
/// when no live record exists for the session ID.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The stored session payload could not be serialized or parsed back
    /// into session data. Distinct from an absent session - a record was
    /// found, but its payload is malformed.
    #[error("Failed to serialize/deserialize session: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A generic error from the backing store. This error type can be
    /// used when implementing a custom session backend.
    #[error("Backing store error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
    /// An error from the session cache. The store facade treats these as
    /// best-effort failures: reads fall back to the backing store, and
    /// write-through failures are logged without failing the operation.
    #[error("Session cache error: {0}")]
    Cache(Box<dyn std::error::Error + Send + Sync>),
    /// Failure setting up or tearing down store resources
    #[error("Setup/teardown error: {0}")]
    SetupTeardown(String),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB driver error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}
