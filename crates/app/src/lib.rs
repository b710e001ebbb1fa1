//! `stockroom-app` — the contract between the core and the presentation
//! layer.
//!
//! Each back-office screen gets a view: an owned state struct the external
//! renderer binds to, plus the async action handlers it invokes
//! (`select_category`, `add_line`, `commit`, ...). Widgets, dialogs and
//! routing live outside this workspace; the views only produce state and
//! accept intents.

pub mod config;
pub mod services;
pub mod session;
pub mod views;


pub use config::{AppConfig, DEFAULT_CATEGORIES};
pub use services::AppServices;
pub use views::{
    DashboardState, DashboardView, InventoryState, InventoryView, PurchaseOrderState,
    PurchaseOrderSummary, PurchaseOrderView, SalesOrderState, SalesOrderView,
};
