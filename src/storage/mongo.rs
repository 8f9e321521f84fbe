//! MongoDB backing store using the official [mongodb](https://docs.rs/mongodb) driver

use std::time::Duration;

use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson, DateTime, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use time::OffsetDateTime;

use crate::{
    error::{SessionError, SessionResult},
    options::ExpiryPolicy,
};

use super::interface::{SessionBackend, SessionRecord};

const SID_FIELD: &str = "sid";
const SESSION_FIELD: &str = "session";
const CREATED_FIELD: &str = "created";
const EXPIRES_FIELD: &str = "expires";

/**
Session backing store using MongoDB.

Records are stored in the collection named by `model_name` (default
`"Session"`), with the serialized session payload as a string field and the
creation timestamp as a BSON date. During [setup](crate::SessionStore::setup)
a unique index on `sid` is declared, preventing duplicate records under
concurrent upserts for a new session ID. Under
[`ExpiryPolicy::StorageNative`], a TTL index on `created` is declared as
well so the engine evicts expired records itself.

# Creating the backend
Initialize the MongoDB client, then use the builder to create the backend:
```rust,no_run
use mongo_session_store::storage::mongo::MongoBackend;

async fn create_backend() -> mongodb::error::Result<MongoBackend> {
    let client = mongodb::Client::with_uri_str("mongodb://localhost:27017").await?;
    let backend = MongoBackend::builder()
        .database(client.database("myapp"))
        .model_name("Session")
        .build();
    Ok(backend)
}
```
*/
#[derive(bon::Builder)]
pub struct MongoBackend {
    /// An initialized MongoDB database handle.
    database: Database,
    /// The name of the collection to use for storing sessions.
    #[builder(into, default = String::from("Session"))]
    model_name: String,
}

impl MongoBackend {
    fn collection(&self) -> Collection<Document> {
        self.database.collection(&self.model_name)
    }

    fn document_from_record(record: &SessionRecord) -> Document {
        let mut document = doc! {
            SID_FIELD: record.sid.as_str(),
            SESSION_FIELD: record.session.as_str(),
            CREATED_FIELD: DateTime::from_millis(epoch_millis(record.created)),
        };
        if let Some(expires) = record.expires {
            document.insert(EXPIRES_FIELD, Bson::Int64(epoch_millis(expires)));
        }
        document
    }

    fn record_from_document(document: Document) -> SessionResult<SessionRecord> {
        let sid = document
            .get_str(SID_FIELD)
            .map_err(|e| SessionError::Backend(Box::new(e)))?
            .to_owned();
        let session = document
            .get_str(SESSION_FIELD)
            .map_err(|e| SessionError::Backend(Box::new(e)))?
            .to_owned();
        let created = document
            .get_datetime(CREATED_FIELD)
            .map_err(|e| SessionError::Backend(Box::new(e)))?
            .timestamp_millis();
        let expires = document.get_i64(EXPIRES_FIELD).ok();
        Ok(SessionRecord {
            sid,
            session,
            created: from_epoch_millis(created),
            expires: expires.map(from_epoch_millis),
        })
    }
}

#[async_trait]
impl SessionBackend for MongoBackend {
    async fn find_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>> {
        let document = self.collection().find_one(doc! { SID_FIELD: sid }).await?;
        document.map(Self::record_from_document).transpose()
    }

    async fn upsert(&self, record: SessionRecord) -> SessionResult<SessionRecord> {
        let replacement = Self::document_from_record(&record);
        let persisted = self
            .collection()
            .find_one_and_replace(doc! { SID_FIELD: record.sid.as_str() }, replacement)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| SessionError::Backend("upsert returned no document".into()))?;
        Self::record_from_document(persisted)
    }

    async fn delete_one(&self, sid: &str) -> SessionResult<Option<SessionRecord>> {
        let deleted = self
            .collection()
            .find_one_and_delete(doc! { SID_FIELD: sid })
            .await?;
        deleted.map(Self::record_from_document).transpose()
    }

    async fn delete_all(&self) -> SessionResult<u64> {
        let result = self.collection().delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn probe(&self) -> SessionResult<()> {
        // Always-empty query, issued only to exercise the connection
        self.collection()
            .find_one(doc! { "noexists": true })
            .await?;
        Ok(())
    }

    async fn setup(&self, expiry: ExpiryPolicy, ttl: Duration) -> SessionResult<()> {
        let unique_sid = IndexModel::builder()
            .keys(doc! { SID_FIELD: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection().create_index(unique_sid).await?;

        if expiry == ExpiryPolicy::StorageNative {
            let ttl_index = IndexModel::builder()
                .keys(doc! { CREATED_FIELD: 1 })
                .options(IndexOptions::builder().expire_after(ttl).build())
                .build();
            self.collection().create_index(ttl_index).await?;
        }

        Ok(())
    }
}

fn epoch_millis(timestamp: OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_epoch_millis(millis: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}
