#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

/*!
# Overview
Cache-aside session store for document databases.

- Sessions are durable records in a backing store (MongoDB, or any store
  implementing the [`SessionBackend`](crate::storage::SessionBackend) trait),
  optionally fronted by a fast in-process cache.
- Reads check the cache first and fall back to the backing store on a miss,
  repopulating the cache. Writes go to the backing store first, then write
  through to the cache - the cache is never authoritative and can be dropped
  at any time without losing sessions.
- TTL is enforced either by the application (an absolute expiry stamped on
  every record and checked on every read) or by the storage engine (a TTL
  index swept in the background) - see [`ExpiryPolicy`].
- Every successful write restamps the session's expiry to a full TTL,
  giving sliding-window expiration.

# Usage

## Basic setup

```rust
use mongo_session_store::{SessionStore, SessionData, storage::memory::MemoryBackend};

# async fn run() -> mongo_session_store::error::SessionResult<()> {
// Build a store over an in-memory backend (use MongoBackend in production)
let store = SessionStore::builder()
    .backend(MemoryBackend::default())
    .build();
store.setup().await?;

// Store a session under a session ID
let mut session = SessionData::new();
session.insert("handle", "@complexcarb");
store.set("session-id", session).await?;

// ...and load it back
let session = store.get("session-id").await?;
assert!(session.is_some());
# Ok(())
# }
```

## Adding a cache

Front the backing store with the built-in [`MemoryCache`], or any type
implementing [`SessionCache`](crate::cache::SessionCache). The cache has its
own TTL, independent of the durable TTL:

```rust
use std::time::Duration;
use mongo_session_store::{SessionStore, MemoryCache, storage::memory::MemoryBackend};

let store = SessionStore::builder()
    .backend(MemoryBackend::default())
    .cache(MemoryCache::new(Duration::from_secs(5 * 60)))
    .build();
```

# Backing stores

| Backend | Feature flag | Use case |
|---------|-------------|----------|
| [`storage::memory::MemoryBackend`] | Built-in | Development, testing |
| [`storage::mongo::MongoBackend`] | `mongodb` | Production |

To implement a custom backing store, implement the
[`SessionBackend`](crate::storage::SessionBackend) trait. All methods are
async and fallible; absence of a record is `Ok(None)`, never an error.

# Feature flags

| Name    | Description    |
|---------|----------------|
| `mongodb` | A MongoDB backing store using the official [mongodb](https://docs.rs/mongodb) driver, with unique and TTL indexes declared at setup. |
*/

mod options;
mod session;
mod store;

pub mod cache;
pub mod error;
pub mod storage;
pub use cache::{MemoryCache, NoopCache};
pub use options::{ExpiryPolicy, SessionStoreOptions};
pub use session::{SessionCookie, SessionData};
pub use store::{SessionStore, SessionStoreBuilder};
