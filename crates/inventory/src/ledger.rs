use std::collections::BTreeMap;

use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_store::{Document, DocumentStore, WriteBatch, WriteOp, collections};

use crate::item::{InventoryItem, NewItem};

/// Ledger service over an injected store handle.
#[derive(Debug, Clone)]
pub struct InventoryLedger<S> {
    store: S,
}

impl<S> InventoryLedger<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All items of one category, sorted by name.
    pub async fn list_by_category(&self, category: &str) -> DomainResult<Vec<InventoryItem>> {
        let docs = self
            .store
            .query_eq(collections::INVENTORY, "category", &json!(category))
            .await?;

        let mut items = docs
            .iter()
            .map(item_from_document)
            .collect::<DomainResult<Vec<_>>>()?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    /// Point read of one item.
    pub async fn get(&self, id: &DocumentId) -> DomainResult<InventoryItem> {
        let doc = self
            .store
            .get(collections::INVENTORY, id)
            .await?
            .ok_or_else(DomainError::not_found)?;
        item_from_document(&doc)
    }

    /// Inventory-screen add: create a standalone item document.
    pub async fn create_item(&self, draft: NewItem) -> DomainResult<InventoryItem> {
        draft.validate()?;

        let (id, op) = create_item_op(&draft)?;
        let mut batch = WriteBatch::new();
        batch.push(op);
        self.store.apply(batch).await?;

        tracing::info!(item = %id, name = %draft.name, "inventory item created");
        Ok(InventoryItem {
            id,
            name: draft.name,
            category: draft.category,
            stock: draft.stock,
            cost: draft.cost,
            price: draft.price,
        })
    }

    /// Inventory-screen bulk edit: one atomic batch of field updates.
    pub async fn save_edits(&self, items: &[InventoryItem]) -> DomainResult<()> {
        for item in items {
            item.validate()?;
        }

        let mut batch = WriteBatch::new();
        for item in items {
            let fields: BTreeMap<String, serde_json::Value> = [
                ("name".to_string(), json!(item.name)),
                ("stock".to_string(), json!(item.stock)),
                ("cost".to_string(), json!(item.cost)),
                ("price".to_string(), json!(item.price)),
            ]
            .into_iter()
            .collect();
            batch.update(collections::INVENTORY, item.id.clone(), fields);
        }
        self.store.apply(batch).await?;

        tracing::info!(count = items.len(), "inventory edits saved");
        Ok(())
    }

    /// Inventory-screen delete.
    pub async fn delete_item(&self, id: &DocumentId) -> DomainResult<()> {
        let mut batch = WriteBatch::new();
        batch.delete(collections::INVENTORY, id.clone());
        self.store.apply(batch).await?;

        tracing::info!(item = %id, "inventory item deleted");
        Ok(())
    }
}

/// Deserialize a stored inventory document, carrying the document id over.
pub fn item_from_document(doc: &Document) -> DomainResult<InventoryItem> {
    let mut item: InventoryItem = doc.to_typed()?;
    item.id = doc.id.clone();
    Ok(item)
}

/// Batch op for an order-driven stock delta (+qty receipt, −qty fulfillment).
///
/// Emitted as an op, not applied here, so the caller can commit it in the
/// same atomic batch as the owning order document.
pub fn stock_delta_op(item_id: &DocumentId, delta: i64) -> WriteOp {
    WriteOp::Increment {
        collection: collections::INVENTORY.to_string(),
        id: item_id.clone(),
        field: "stock".to_string(),
        delta,
    }
}

/// Batch op creating an item first seen on a purchase-order line; stock is
/// initialized to the received quantity.
pub fn create_item_op(draft: &NewItem) -> DomainResult<(DocumentId, WriteOp)> {
    draft.validate()?;

    let id = DocumentId::new();
    let doc = Document::from_typed(id.clone(), draft).map_err(DomainError::from)?;
    let op = WriteOp::Put {
        collection: collections::INVENTORY.to_string(),
        id: doc.id,
        payload: doc.payload,
    };
    Ok((id, op))
}
