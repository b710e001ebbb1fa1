//! Collection names of the consumed document database.

/// Inventory items, one document per stocked item.
pub const INVENTORY: &str = "inventory";

/// Committed purchase orders.
pub const PURCHASE_ORDERS: &str = "purchaseOrders";

/// Committed sales orders.
pub const SALES_ORDERS: &str = "salesOrders";

/// Sequence counter documents (`poNumber`, `soNumber`).
pub const COUNTERS: &str = "counters";
