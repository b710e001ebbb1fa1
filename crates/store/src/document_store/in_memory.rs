use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Number, Value as JsonValue};

use stockroom_core::DocumentId;

use super::r#trait::{Document, DocumentStore, StoreError, StoreResult, WriteBatch, WriteOp};

/// In-memory document store.
///
/// Intended for tests/dev. Honors the same atomicity contract as the real
/// database client: batches are validated in full before any op is applied,
/// under a single writer lock.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<DocumentId, JsonValue>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_field_i64(doc: &JsonValue, field: &str) -> StoreResult<i64> {
        match doc.get(field) {
            None | Some(JsonValue::Null) => Ok(0),
            Some(v) => v.as_i64().ok_or_else(|| {
                StoreError::InvalidDocument(format!("field '{field}' is not an integer"))
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(collections.get(collection).and_then(|docs| {
            docs.get(id).map(|payload| Document {
                id: id.clone(),
                payload: payload.clone(),
            })
        }))
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, payload)| Document {
                        id: id.clone(),
                        payload: payload.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        // Deterministic order; ids are time-ordered, so this is insertion order.
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> StoreResult<Vec<Document>> {
        let mut docs = self.list(collection).await?;
        docs.retain(|doc| doc.payload.get(field) == Some(value));
        Ok(docs)
    }

    async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        // Validate every op before touching anything; a rejected batch must
        // leave no partial writes observable.
        for op in batch.ops() {
            match op {
                WriteOp::Put { .. } => {}
                WriteOp::Update { collection, id, .. }
                | WriteOp::Delete { collection, id } => {
                    let exists = collections
                        .get(collection)
                        .is_some_and(|docs| docs.contains_key(id));
                    if !exists {
                        return Err(StoreError::MissingDocument {
                            collection: collection.clone(),
                            id: id.clone(),
                        });
                    }
                }
                WriteOp::Increment {
                    collection,
                    id,
                    field,
                    ..
                } => {
                    let doc = collections
                        .get(collection)
                        .and_then(|docs| docs.get(id))
                        .ok_or_else(|| StoreError::MissingDocument {
                            collection: collection.clone(),
                            id: id.clone(),
                        })?;
                    Self::read_field_i64(doc, field)?;
                }
            }
        }

        for op in batch.into_ops() {
            match op {
                WriteOp::Put {
                    collection,
                    id,
                    payload,
                } => {
                    collections.entry(collection).or_default().insert(id, payload);
                }
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => {
                    let doc = collections
                        .get_mut(&collection)
                        .and_then(|docs| docs.get_mut(&id))
                        .expect("validated above");
                    if let JsonValue::Object(map) = doc {
                        for (k, v) in fields {
                            map.insert(k, v);
                        }
                    }
                }
                WriteOp::Increment {
                    collection,
                    id,
                    field,
                    delta,
                } => {
                    let doc = collections
                        .get_mut(&collection)
                        .and_then(|docs| docs.get_mut(&id))
                        .expect("validated above");
                    let current = Self::read_field_i64(doc, &field).expect("validated above");
                    if let JsonValue::Object(map) = doc {
                        map.insert(field, JsonValue::Number(Number::from(current + delta)));
                    }
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(docs) = collections.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }

        Ok(())
    }

    async fn fetch_increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        start: i64,
    ) -> StoreResult<i64> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let docs = collections.entry(collection.to_string()).or_default();
        let last = match docs.get(id) {
            Some(doc) => {
                let value = Self::read_field_i64(doc, field)?;
                // A zeroed field on an existing counter document still seeds
                // from `start`, never below it.
                value.max(start)
            }
            None => start,
        };

        let next = last + 1;
        docs.insert(
            id.clone(),
            serde_json::json!({ field: next }),
        );
        Ok(next)
    }
}
