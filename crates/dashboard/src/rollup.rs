use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use stockroom_inventory::InventoryItem;
use stockroom_orders::{PurchaseOrder, SalesOrder};

/// Items with stock below this value appear on the low-stock list.
pub const LOW_STOCK_THRESHOLD: i64 = 50;

const HIGH_PROFIT_FLOOR: f64 = 5000.0;
const LOW_MARGIN_FLOOR: f64 = 1000.0;

/// Profit-tier classification of a category. Thresholds are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitTier {
    High,
    LowMargin,
    Loss,
}

impl ProfitTier {
    pub fn classify(profit: f64) -> Self {
        if profit >= HIGH_PROFIT_FLOOR {
            ProfitTier::High
        } else if profit >= LOW_MARGIN_FLOOR {
            ProfitTier::LowMargin
        } else {
            ProfitTier::Loss
        }
    }

    /// Semantic color state consumed by the renderer.
    pub fn state(self) -> &'static str {
        match self {
            ProfitTier::High => "Success",
            ProfitTier::LowMargin => "Warning",
            ProfitTier::Loss => "Error",
        }
    }

    /// Human-readable label shown next to the amount.
    pub fn status(self) -> &'static str {
        match self {
            ProfitTier::High => "High Profit",
            ProfitTier::LowMargin => "Low Margin",
            ProfitTier::Loss => "Loss / Very Low",
        }
    }
}

/// Per-category purchase/sales/profit rollup row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub purchase: f64,
    pub sales: f64,
    pub profit: f64,
    pub profit_state: &'static str,
    pub profit_status: &'static str,
}

/// Low-stock alert row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockItem {
    pub name: String,
    pub category: String,
    pub quantity: i64,
}

/// One point of the profit trend.
///
/// Periods come in three granularities (`YYYY`, `YYYY-MM`, `YYYY-Qn`) that
/// share a single lexicographically sorted list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitTrendPoint {
    pub period: String,
    pub profit: f64,
}

/// Everything the dashboard screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub category_totals: Vec<CategorySummary>,
    pub low_stock_items: Vec<LowStockItem>,
    pub profit_trend: Vec<ProfitTrendPoint>,
}

#[derive(Debug, Default)]
struct CategoryAccum {
    purchase: f64,
    sales: f64,
    profit: f64,
}

struct PeriodKeys {
    month: String,
    quarter: String,
    year: String,
}

impl PeriodKeys {
    /// Order dates are stored as `DD/MM/YYYY`.
    fn parse(date: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(date, "%d/%m/%Y").ok()?;
        let year = date.year();
        let month = date.month();
        Some(Self {
            month: format!("{year:04}-{month:02}"),
            quarter: format!("{year:04}-Q{}", (month - 1) / 3 + 1),
            year: format!("{year:04}"),
        })
    }
}

/// Build the full dashboard rollup from the three collection snapshots.
///
/// Pure over its inputs: purchase totals come from each PO's
/// `categoryTotals`, sales totals from each SO's `categoryTotals`, and
/// profit is derived per SO line as `(price − cost) × qty`, accumulated into
/// the line's category and into the month/quarter/year buckets of the SO
/// date. A sales order whose date does not parse keeps its category
/// contributions but is skipped for the trend.
pub fn build_snapshot(
    inventory: &[InventoryItem],
    purchase_orders: &[PurchaseOrder],
    sales_orders: &[SalesOrder],
) -> DashboardSnapshot {
    let mut categories: BTreeMap<String, CategoryAccum> = BTreeMap::new();
    let mut profit_map: BTreeMap<String, f64> = BTreeMap::new();

    for po in purchase_orders {
        for (category, total) in &po.category_totals {
            categories.entry(category.clone()).or_default().purchase += total;
        }
    }

    for so in sales_orders {
        for (category, total) in &so.category_totals {
            categories.entry(category.clone()).or_default().sales += total;
        }

        let periods = PeriodKeys::parse(&so.so_date);
        if periods.is_none() {
            tracing::warn!(so = %so.so_number, date = %so.so_date, "unparseable order date; omitted from profit trend");
        }

        for line in &so.items {
            let profit = (line.price - line.cost) * line.qty as f64;
            categories.entry(line.category.clone()).or_default().profit += profit;

            if let Some(periods) = &periods {
                *profit_map.entry(periods.month.clone()).or_insert(0.0) += profit;
                *profit_map.entry(periods.quarter.clone()).or_insert(0.0) += profit;
                *profit_map.entry(periods.year.clone()).or_insert(0.0) += profit;
            }
        }
    }

    let category_totals = categories
        .into_iter()
        .map(|(category, accum)| {
            let tier = ProfitTier::classify(accum.profit);
            CategorySummary {
                category,
                purchase: accum.purchase,
                sales: accum.sales,
                profit: accum.profit,
                profit_state: tier.state(),
                profit_status: tier.status(),
            }
        })
        .collect();

    let low_stock_items = inventory
        .iter()
        .filter(|item| item.stock < LOW_STOCK_THRESHOLD)
        .map(|item| LowStockItem {
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.stock,
        })
        .collect();

    // BTreeMap iteration is already the lexicographic order the trend wants.
    let profit_trend = profit_map
        .into_iter()
        .map(|(period, profit)| ProfitTrendPoint { period, profit })
        .collect();

    DashboardSnapshot {
        category_totals,
        low_stock_items,
        profit_trend,
    }
}
