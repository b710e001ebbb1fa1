//! `stockroom-dashboard` — the rollup engine.
//!
//! Turns flat order documents into category/time-bucketed aggregates: a
//! category profitability summary with a profit-tier classification, a
//! low-stock list, and a profit trend bucketed by month, quarter and year.
//! Everything is recomputed in full on each load; there is no incremental
//! maintenance and no caching layer.

pub mod rollup;
pub mod service;

pub use rollup::{
    CategorySummary, DashboardSnapshot, LOW_STOCK_THRESHOLD, LowStockItem, ProfitTier,
    ProfitTrendPoint, build_snapshot,
};
pub use service::DashboardService;
