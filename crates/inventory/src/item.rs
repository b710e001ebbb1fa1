use serde::{Deserialize, Serialize};

use stockroom_core::{DocumentId, DomainError, DomainResult};

/// An inventory item document.
///
/// The id is the store-level document id and is not part of the stored
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(skip)]
    pub id: DocumentId,
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub cost: f64,
    pub price: f64,
}

impl InventoryItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, self.stock, self.cost, self.price)
    }
}

/// Fields for an item that does not exist in the ledger yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub cost: f64,
    pub price: f64,
}

impl NewItem {
    pub fn validate(&self) -> DomainResult<()> {
        validate_fields(&self.name, self.stock, self.cost, self.price)
    }
}

fn validate_fields(name: &str, stock: i64, cost: f64, price: f64) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("item name is required"));
    }
    if stock < 0 {
        return Err(DomainError::validation("stock cannot be negative"));
    }
    // `>= 0.0` is false for NaN, so non-finite junk is rejected too.
    if !(cost >= 0.0) || !(price >= 0.0) {
        return Err(DomainError::validation("cost and price cannot be negative"));
    }
    Ok(())
}
