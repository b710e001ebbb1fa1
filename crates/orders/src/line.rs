use serde::{Deserialize, Serialize};

use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_inventory::InventoryItem;

use crate::cart::OrderKind;

/// Where a cart line comes from.
///
/// Resolved to a concrete [`OrderLine`] the moment it is added to a cart;
/// nothing downstream branches on the item's origin again.
#[derive(Debug, Clone, PartialEq)]
pub enum LineCandidate {
    /// An item already in the ledger, with its current snapshot (used for
    /// the sales-side stock check at add time).
    Existing { item: InventoryItem },
    /// An item first seen on this purchase order.
    New {
        name: String,
        category: String,
        cost: f64,
        price: f64,
    },
}

/// A resolved order line, as stored inside the order document.
///
/// `total` is `qty × cost` on purchase lines (cost of acquisition) and
/// `qty × price` on sales lines. Sales lines copy `cost` from the inventory
/// item at add time so profit can be derived from the document later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: Option<DocumentId>,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub price: f64,
    pub qty: i64,
    pub total: f64,
}

impl LineCandidate {
    /// Validate and resolve into a line for a cart of the given kind.
    pub(crate) fn resolve(self, kind: OrderKind, qty: i64) -> DomainResult<OrderLine> {
        if qty <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        match self {
            LineCandidate::Existing { item } => {
                if kind == OrderKind::Sales && qty > item.stock {
                    return Err(DomainError::validation(format!(
                        "insufficient stock for '{}': requested {qty}, available {}",
                        item.name, item.stock
                    )));
                }

                let mut line = OrderLine {
                    item_id: Some(item.id),
                    name: item.name,
                    category: item.category,
                    cost: item.cost,
                    price: item.price,
                    qty,
                    total: 0.0,
                };
                line.total = qty as f64 * kind.unit_value(&line);
                Ok(line)
            }
            LineCandidate::New {
                name,
                category,
                cost,
                price,
            } => {
                if kind == OrderKind::Sales {
                    return Err(DomainError::validation(
                        "sales lines must reference an existing inventory item",
                    ));
                }
                if name.trim().is_empty() {
                    return Err(DomainError::validation("item name is required"));
                }
                if !(cost > 0.0) || !(price > 0.0) {
                    return Err(DomainError::validation(
                        "cost and selling price are required for a new item",
                    ));
                }

                let mut line = OrderLine {
                    item_id: None,
                    name,
                    category,
                    cost,
                    price,
                    qty,
                    total: 0.0,
                };
                line.total = qty as f64 * kind.unit_value(&line);
                Ok(line)
            }
        }
    }
}
