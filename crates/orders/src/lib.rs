//! `stockroom-orders` — sequence counters and the order aggregator.
//!
//! Builds purchase/sales order documents from a cart of line items,
//! computing per-line totals, the order total and per-category subtotals,
//! and applies the corresponding inventory deltas in the same atomic store
//! batch as the order document itself.

pub mod cart;
pub mod line;
pub mod purchase;
pub mod sales;
pub mod sequence;

pub use cart::{Cart, CartMode, OrderKind};
pub use line::{LineCandidate, OrderLine};
pub use purchase::{PurchaseOrder, PurchaseOrderService, Vendor};
pub use sales::{SalesOrder, SalesOrderService};
pub use sequence::{Sequence, SequenceCounter};
