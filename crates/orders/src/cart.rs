use std::collections::BTreeMap;

use chrono::Utc;

use stockroom_core::{DocumentId, DomainError, DomainResult};

use crate::line::{LineCandidate, OrderLine};

/// Which side of the ledger an order moves stock on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Inbound acquisition; receipt increases stock.
    Purchase,
    /// Outbound sale; fulfillment decreases stock.
    Sales,
}

impl OrderKind {
    /// The per-unit value a line total is derived from.
    pub(crate) fn unit_value(self, line: &OrderLine) -> f64 {
        match self {
            OrderKind::Purchase => line.cost,
            OrderKind::Sales => line.price,
        }
    }
}

/// Whether a cart creates a new order or edits a committed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMode {
    Create,
    Edit { order_id: DocumentId },
}

/// An order in progress.
///
/// Lifecycle: a cart is born BUILDING (create allocates a fresh order
/// number, edit deep-copies a committed document), mutates locally through
/// [`Cart::add_line`] / [`Cart::remove_line`] / [`Cart::change_qty`], and is
/// either discarded or handed to a service `commit`. Commit never consumes
/// the cart: on a retriable store failure the caller still holds it intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    kind: OrderKind,
    mode: CartMode,
    number: String,
    date: String,
    lines: Vec<OrderLine>,
    total_amount: f64,
}

impl Cart {
    pub(crate) fn create(kind: OrderKind, number: String) -> Self {
        Self {
            kind,
            mode: CartMode::Create,
            number,
            date: today(),
            lines: Vec::new(),
            total_amount: 0.0,
        }
    }

    /// Deep copy of a committed order for editing. The committed document is
    /// untouched until the edit is committed; the order number is reused,
    /// never reallocated.
    pub(crate) fn edit(
        kind: OrderKind,
        order_id: DocumentId,
        number: String,
        date: String,
        lines: Vec<OrderLine>,
    ) -> Self {
        let mut cart = Self {
            kind,
            mode: CartMode::Edit { order_id },
            number,
            date,
            lines,
            total_amount: 0.0,
        };
        cart.recompute();
        cart
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn mode(&self) -> &CartMode {
        &self.mode
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    /// Per-category sum of line totals.
    pub fn category_totals(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for line in &self.lines {
            *totals.entry(line.category.clone()).or_insert(0.0) += line.total;
        }
        totals
    }

    /// Validate and append one line, then recompute the running totals.
    pub fn add_line(&mut self, candidate: LineCandidate, qty: i64) -> DomainResult<()> {
        let line = candidate.resolve(self.kind, qty)?;
        self.lines.push(line);
        self.recompute();
        Ok(())
    }

    /// Remove one line by position.
    pub fn remove_line(&mut self, index: usize) -> DomainResult<()> {
        if index >= self.lines.len() {
            return Err(DomainError::validation("no such line"));
        }
        self.lines.remove(index);
        self.recompute();
        Ok(())
    }

    /// Change a line's quantity and recompute its total and the cart totals.
    ///
    /// Sales callers pass the item's current stock in `available_stock`;
    /// purchase callers pass `None` (receipts have no upper bound).
    pub fn change_qty(
        &mut self,
        index: usize,
        qty: i64,
        available_stock: Option<i64>,
    ) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        let Some(line) = self.lines.get_mut(index) else {
            return Err(DomainError::validation("no such line"));
        };
        if let Some(available) = available_stock {
            if qty > available {
                return Err(DomainError::validation(format!(
                    "insufficient stock for '{}': requested {qty}, available {available}",
                    line.name
                )));
            }
        }

        line.qty = qty;
        line.total = qty as f64 * self.kind.unit_value(line);
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.total_amount = self.lines.iter().map(|l| l.total).sum();
    }
}

/// Order dates are stored as `DD/MM/YYYY` strings.
fn today() -> String {
    Utc::now().format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use stockroom_inventory::InventoryItem;

    use super::*;

    fn existing(name: &str, category: &str, stock: i64, cost: f64, price: f64) -> LineCandidate {
        LineCandidate::Existing {
            item: InventoryItem {
                id: DocumentId::from(name),
                name: name.to_string(),
                category: category.to_string(),
                stock,
                cost,
                price,
            },
        }
    }

    #[test]
    fn totals_follow_adds_and_removes() {
        let mut cart = Cart::create(OrderKind::Purchase, "PO-1001".to_string());
        cart.add_line(existing("Rice", "Groceries", 100, 40.0, 55.0), 5).unwrap();
        cart.add_line(existing("Pen", "Stationary", 100, 5.0, 8.0), 10).unwrap();
        assert_eq!(cart.total_amount(), 250.0);

        let totals = cart.category_totals();
        assert_eq!(totals["Groceries"], 200.0);
        assert_eq!(totals["Stationary"], 50.0);

        cart.remove_line(0).unwrap();
        assert_eq!(cart.total_amount(), 50.0);
        assert!(!cart.category_totals().contains_key("Groceries"));
    }

    #[test]
    fn change_qty_recomputes_line_and_cart() {
        let mut cart = Cart::create(OrderKind::Sales, "SO-1001".to_string());
        cart.add_line(existing("Rice", "Groceries", 100, 40.0, 55.0), 2).unwrap();

        cart.change_qty(0, 4, Some(100)).unwrap();
        assert_eq!(cart.lines()[0].total, 220.0);
        assert_eq!(cart.total_amount(), 220.0);
    }

    #[test]
    fn change_qty_revalidates_stock_for_sales() {
        let mut cart = Cart::create(OrderKind::Sales, "SO-1001".to_string());
        cart.add_line(existing("Rice", "Groceries", 100, 40.0, 55.0), 2).unwrap();

        let err = cart.change_qty(0, 150, Some(100)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        // The line is untouched after a rejected change.
        assert_eq!(cart.lines()[0].qty, 2);
        assert_eq!(cart.total_amount(), 110.0);
    }

    #[test]
    fn remove_line_rejects_bad_index() {
        let mut cart = Cart::create(OrderKind::Purchase, "PO-1001".to_string());
        assert!(cart.remove_line(0).is_err());
    }

    #[test]
    fn edit_cart_recomputes_totals_from_lines() {
        let lines = vec![
            OrderLine {
                item_id: Some(DocumentId::from("a")),
                name: "Rice".to_string(),
                category: "Groceries".to_string(),
                cost: 40.0,
                price: 55.0,
                qty: 3,
                total: 120.0,
            },
        ];
        let cart = Cart::edit(
            OrderKind::Purchase,
            DocumentId::from("po-1"),
            "PO-1001".to_string(),
            "29/12/2025".to_string(),
            lines,
        );
        assert_eq!(cart.total_amount(), 120.0);
        assert_eq!(cart.number(), "PO-1001");
        assert!(matches!(cart.mode(), CartMode::Edit { .. }));
    }

    proptest! {
        // totalAmount == Σ line.total and categoryTotals[c] == Σ per category,
        // for any mix of lines.
        #[test]
        fn totals_are_consistent_with_lines(
            entries in proptest::collection::vec(
                (0u8..4, 1i64..50, 1u32..2000, 1u32..2000),
                1..12,
            )
        ) {
            let categories = ["Groceries", "Stationary", "Hardware", "Dairy"];
            let mut cart = Cart::create(OrderKind::Purchase, "PO-1001".to_string());

            for (idx, (cat, qty, cost, price)) in entries.iter().enumerate() {
                let candidate = existing(
                    &format!("item-{idx}"),
                    categories[*cat as usize],
                    1_000_000,
                    f64::from(*cost) / 4.0,
                    f64::from(*price) / 4.0,
                );
                cart.add_line(candidate, *qty).unwrap();
            }

            let line_sum: f64 = cart.lines().iter().map(|l| l.total).sum();
            prop_assert!((cart.total_amount() - line_sum).abs() < 1e-9);

            let totals = cart.category_totals();
            for category in categories {
                let expected: f64 = cart
                    .lines()
                    .iter()
                    .filter(|l| l.category == category)
                    .map(|l| l.total)
                    .sum();
                let got = totals.get(category).copied().unwrap_or(0.0);
                prop_assert!((got - expected).abs() < 1e-9);
            }
        }
    }
}
