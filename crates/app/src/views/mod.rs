//! Per-screen view-state and action handlers.

pub mod dashboard;
pub mod inventory;
pub mod purchase;
pub mod sales;

pub use dashboard::{DashboardState, DashboardView};
pub use inventory::{InventoryState, InventoryView};
pub use purchase::{PurchaseOrderState, PurchaseOrderSummary, PurchaseOrderView};
pub use sales::{SalesOrderState, SalesOrderView};
