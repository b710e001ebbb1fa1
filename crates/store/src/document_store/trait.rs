use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use stockroom_core::{DocumentId, DomainError};

/// A document as read from (or written to) a collection.
///
/// The payload is the raw JSON body the database stores; the id lives
/// outside it, the way the external database addresses documents. Domain
/// crates bridge to typed structs with [`Document::from_typed`] /
/// [`Document::to_typed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub payload: JsonValue,
}

impl Document {
    /// Build a document from a typed value.
    pub fn from_typed<T>(id: DocumentId, value: &T) -> StoreResult<Self>
    where
        T: Serialize,
    {
        let payload = serde_json::to_value(value)
            .map_err(|e| StoreError::InvalidDocument(format!("serialization failed: {e}")))?;
        Ok(Self { id, payload })
    }

    /// Deserialize the payload into a typed value.
    ///
    /// The document id is not part of the payload; callers that carry the id
    /// on their typed struct set it from `self.id` after deserializing.
    pub fn to_typed<T>(&self) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| StoreError::InvalidDocument(format!("{}: {e}", self.id)))
    }
}

/// A single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or replace a whole document.
    Put {
        collection: String,
        id: DocumentId,
        payload: JsonValue,
    },
    /// Merge fields into an existing document. Fails the batch with
    /// [`StoreError::MissingDocument`] if the target does not exist.
    Update {
        collection: String,
        id: DocumentId,
        fields: BTreeMap<String, JsonValue>,
    },
    /// Add `delta` to an integer field of an existing document (a missing
    /// field starts at zero). Fails the batch if the document is missing.
    Increment {
        collection: String,
        id: DocumentId,
        field: String,
        delta: i64,
    },
    /// Remove an existing document. Fails the batch if it is missing.
    Delete { collection: String, id: DocumentId },
}

/// An all-or-nothing group of writes.
///
/// Order creation hinges on this: inventory deltas and the order document
/// itself go into one batch, so a crash or rejection between them can never
/// leave the two collections inconsistent with each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, collection: impl Into<String>, id: DocumentId, payload: JsonValue) {
        self.ops.push(WriteOp::Put {
            collection: collection.into(),
            id,
            payload,
        });
    }

    pub fn update(
        &mut self,
        collection: impl Into<String>,
        id: DocumentId,
        fields: BTreeMap<String, JsonValue>,
    ) {
        self.ops.push(WriteOp::Update {
            collection: collection.into(),
            id,
            fields,
        });
    }

    pub fn increment(
        &mut self,
        collection: impl Into<String>,
        id: DocumentId,
        field: impl Into<String>,
        delta: i64,
    ) {
        self.ops.push(WriteOp::Increment {
            collection: collection.into(),
            id,
            field: field.into(),
            delta,
        });
    }

    pub fn delete(&mut self, collection: impl Into<String>, id: DocumentId) {
        self.ops.push(WriteOp::Delete {
            collection: collection.into(),
            id,
        });
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Document store operation error.
///
/// These are **infrastructure errors** (connectivity, contention, corrupt
/// payloads) as opposed to domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, or an internal fault occurred.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A write collided with a concurrent transaction.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// An op targeted a document that does not exist.
    #[error("missing document: {collection}/{id}")]
    MissingDocument { collection: String, id: DocumentId },

    /// A payload could not be (de)serialized or has the wrong field shape.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => DomainError::Unavailable(msg),
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::MissingDocument { .. } => DomainError::NotFound,
            // Corrupt payloads surface as a store-side fault.
            StoreError::InvalidDocument(msg) => DomainError::Unavailable(msg),
        }
    }
}

/// The consumed surface of the external document database.
///
/// ## Design Principles
///
/// - **No storage assumptions**: works with the in-memory implementation
///   (tests/dev) and a managed-database client (production).
/// - **Injected, never global**: callers receive a store handle by
///   construction; there is no process-wide singleton.
/// - **Atomic batches**: [`DocumentStore::apply`] commits every op or none.
///   A failed op (missing target, conflict, connectivity) must leave no
///   partial writes observable to any reader.
/// - **Atomic counters**: [`DocumentStore::fetch_increment`] performs the
///   read-increment-write as one transaction against the store. Two
///   concurrent callers must never observe the same value.
///
/// ## Query Surface
///
/// Only what the back office needs: point reads, full-collection scans
/// (dashboard rollups — a scalability limit, not a correctness one) and an
/// equality filter (inventory by category).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document, `None` if absent.
    async fn get(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>>;

    /// Full-collection scan, ordered by document id.
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Equality filter on one payload field.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<Vec<Document>>;

    /// Commit a batch atomically (all ops or none).
    async fn apply(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Atomically increment an integer field by one and return the new
    /// value, creating the document with the field at `start` first if it
    /// does not exist (so the first returned value is `start + 1`).
    async fn fetch_increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        start: i64,
    ) -> StoreResult<i64>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>> {
        (**self).get(collection, id).await
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        (**self).list(collection).await
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<Vec<Document>> {
        (**self).query_eq(collection, field, value).await
    }

    async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        (**self).apply(batch).await
    }

    async fn fetch_increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        start: i64,
    ) -> StoreResult<i64> {
        (**self).fetch_increment(collection, id, field, start).await
    }
}
