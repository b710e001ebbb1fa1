use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_inventory::{InventoryLedger, stock_delta_op};
use stockroom_store::{Document, DocumentStore, WriteBatch, collections};

use crate::cart::{Cart, CartMode, OrderKind};
use crate::line::OrderLine;
use crate::sequence::{Sequence, SequenceCounter};

/// A committed sales order document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    #[serde(skip)]
    pub id: DocumentId,
    pub so_number: String,
    pub so_date: String,
    #[serde(default)]
    pub customer: String,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    #[serde(default)]
    pub category_totals: BTreeMap<String, f64>,
}

/// Sales-order entry: cart lifecycle, atomic commit, list/delete.
///
/// Sales carts only accept lines backed by existing inventory, and the
/// quantity-vs-stock check happens at add/change time. That check is a UI
/// guard, not a hard guarantee: two concurrent sessions can still oversell
/// (documented limitation).
#[derive(Debug, Clone)]
pub struct SalesOrderService<S> {
    store: S,
    counter: SequenceCounter<S>,
    ledger: InventoryLedger<S>,
}

impl<S> SalesOrderService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            counter: SequenceCounter::new(store.clone()),
            ledger: InventoryLedger::new(store.clone()),
            store,
        }
    }

    pub async fn start_create(&self) -> DomainResult<Cart> {
        let number = self.counter.next(Sequence::SoNumber).await?;
        Ok(Cart::create(OrderKind::Sales, number))
    }

    pub async fn start_edit(&self, id: &DocumentId) -> DomainResult<(SalesOrder, Cart)> {
        let order = self.get(id).await?;
        let cart = Cart::edit(
            OrderKind::Sales,
            order.id.clone(),
            order.so_number.clone(),
            order.so_date.clone(),
            order.items.clone(),
        );
        Ok((order, cart))
    }

    pub async fn get(&self, id: &DocumentId) -> DomainResult<SalesOrder> {
        let doc = self
            .store
            .get(collections::SALES_ORDERS, id)
            .await?
            .ok_or_else(DomainError::not_found)?;
        order_from_document(&doc)
    }

    pub async fn list(&self) -> DomainResult<Vec<SalesOrder>> {
        let docs = self.store.list(collections::SALES_ORDERS).await?;
        docs.iter().map(order_from_document).collect()
    }

    /// Change a line's quantity, revalidating against the item's *current*
    /// stock (re-fetched, not the snapshot taken at add time).
    pub async fn change_qty(&self, cart: &mut Cart, index: usize, qty: i64) -> DomainResult<()> {
        let available = match cart.lines().get(index).and_then(|l| l.item_id.clone()) {
            Some(item_id) => Some(self.ledger.get(&item_id).await?.stock),
            None => None,
        };
        cart.change_qty(index, qty, available)
    }

    /// Commit the cart: one atomic batch of `−qty` stock decrements plus the
    /// order document (create), or a fields-only replacement (edit — no
    /// delta re-derivation from the line diff).
    pub async fn commit(&self, cart: &Cart, customer: &str) -> DomainResult<SalesOrder> {
        if cart.kind() != OrderKind::Sales {
            return Err(DomainError::validation("cart is not a sales cart"));
        }
        if customer.trim().is_empty() {
            return Err(DomainError::validation("customer is required"));
        }
        if cart.is_empty() {
            return Err(DomainError::validation("add at least one item"));
        }

        let order = SalesOrder {
            id: match cart.mode() {
                CartMode::Create => DocumentId::new(),
                CartMode::Edit { order_id } => order_id.clone(),
            },
            so_number: cart.number().to_string(),
            so_date: cart.date().to_string(),
            customer: customer.trim().to_string(),
            items: cart.lines().to_vec(),
            total_amount: cart.total_amount(),
            category_totals: cart.category_totals(),
        };

        let mut batch = WriteBatch::new();
        match cart.mode() {
            CartMode::Create => {
                for line in cart.lines() {
                    let item_id = line.item_id.as_ref().ok_or_else(|| {
                        DomainError::validation("sales line without inventory item")
                    })?;
                    batch.push(stock_delta_op(item_id, -line.qty));
                }

                let doc =
                    Document::from_typed(order.id.clone(), &order).map_err(DomainError::from)?;
                batch.put(collections::SALES_ORDERS, doc.id, doc.payload);
            }
            CartMode::Edit { order_id } => {
                let fields: BTreeMap<String, serde_json::Value> = [
                    ("items".to_string(), serde_json::to_value(&order.items).map_err(
                        |e| DomainError::unavailable(format!("serialization failed: {e}")),
                    )?),
                    ("totalAmount".to_string(), json!(order.total_amount)),
                    ("categoryTotals".to_string(), json!(order.category_totals)),
                    ("customer".to_string(), json!(order.customer)),
                ]
                .into_iter()
                .collect();
                batch.update(collections::SALES_ORDERS, order_id.clone(), fields);
            }
        }

        self.store.apply(batch).await?;
        tracing::info!(so = %order.so_number, total = order.total_amount, "sales order committed");
        Ok(order)
    }

    /// Remove the order document only; fulfilled stock is not restored.
    pub async fn delete(&self, id: &DocumentId) -> DomainResult<()> {
        let mut batch = WriteBatch::new();
        batch.delete(collections::SALES_ORDERS, id.clone());
        self.store.apply(batch).await?;

        tracing::info!(so = %id, "sales order deleted");
        Ok(())
    }
}

fn order_from_document(doc: &Document) -> DomainResult<SalesOrder> {
    let mut order: SalesOrder = doc.to_typed()?;
    order.id = doc.id.clone();
    Ok(order)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_inventory::{InventoryItem, NewItem};
    use stockroom_store::InMemoryDocumentStore;

    use crate::line::LineCandidate;

    use super::*;

    type Store = Arc<InMemoryDocumentStore>;

    fn setup() -> (SalesOrderService<Store>, InventoryLedger<Store>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (
            SalesOrderService::new(store.clone()),
            InventoryLedger::new(store),
        )
    }

    async fn seeded_item(ledger: &InventoryLedger<Store>, stock: i64) -> InventoryItem {
        ledger
            .create_item(NewItem {
                name: "Rice".to_string(),
                category: "Groceries".to_string(),
                stock,
                cost: 10.0,
                price: 15.0,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn commit_decrements_stock() {
        let (service, ledger) = setup();
        let item = seeded_item(&ledger, 25).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 5).unwrap();
        let order = service.commit(&cart, "Anita").await.unwrap();

        assert_eq!(order.so_number, "SO-1001");
        assert_eq!(order.total_amount, 75.0);
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 20);
    }

    #[tokio::test]
    async fn oversized_quantity_is_rejected_before_commit() {
        let (service, ledger) = setup();
        let item = seeded_item(&ledger, 20).await;

        let mut cart = service.start_create().await.unwrap();
        let err = cart
            .add_line(LineCandidate::Existing { item: item.clone() }, 999)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // Nothing was committed, nothing moved.
        assert!(cart.is_empty());
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 20);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn change_qty_revalidates_against_current_stock() {
        let (service, ledger) = setup();
        let mut item = seeded_item(&ledger, 10).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 2).unwrap();

        // Stock drops after the line was added; the change must see it.
        item.stock = 3;
        ledger.save_edits(std::slice::from_ref(&item)).await.unwrap();

        let err = service.change_qty(&mut cart, 0, 5).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        service.change_qty(&mut cart, 0, 3).await.unwrap();
        assert_eq!(cart.lines()[0].total, 45.0);
    }

    #[tokio::test]
    async fn commit_requires_customer() {
        let (service, ledger) = setup();
        let item = seeded_item(&ledger, 25).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 5).unwrap();

        let err = service.commit(&cart, "  ").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 25);
    }

    #[tokio::test]
    async fn edit_replaces_fields_without_moving_stock() {
        let (service, ledger) = setup();
        let item = seeded_item(&ledger, 25).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 5).unwrap();
        let order = service.commit(&cart, "Anita").await.unwrap();
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 20);

        let (_, mut edit_cart) = service.start_edit(&order.id).await.unwrap();
        service.change_qty(&mut edit_cart, 0, 1).await.unwrap();
        let updated = service.commit(&edit_cart, "Anita Sharma").await.unwrap();

        assert_eq!(updated.so_number, "SO-1001");
        assert_eq!(updated.total_amount, 15.0);
        let reloaded = service.get(&order.id).await.unwrap();
        assert_eq!(reloaded.customer, "Anita Sharma");
        // Fulfilled stock stays exactly as fulfilled.
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 20);
    }

    #[tokio::test]
    async fn delete_keeps_fulfilled_stock() {
        let (service, ledger) = setup();
        let item = seeded_item(&ledger, 25).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 5).unwrap();
        let order = service.commit(&cart, "Anita").await.unwrap();

        service.delete(&order.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 20);
    }
}
