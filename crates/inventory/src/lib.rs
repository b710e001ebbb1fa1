//! `stockroom-inventory` — the inventory ledger.
//!
//! The authoritative stock/cost/price record per item. Stock moves through
//! purchase-order receipt (+qty), sales-order fulfillment (−qty) or an
//! explicit inventory-screen edit; order-driven deltas are emitted as batch
//! ops so they commit atomically with the owning order document.

pub mod item;
pub mod ledger;

pub use item::{InventoryItem, NewItem};
pub use ledger::{InventoryLedger, create_item_op, item_from_document, stock_delta_op};
