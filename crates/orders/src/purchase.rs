use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_inventory::{NewItem, create_item_op, stock_delta_op};
use stockroom_store::{Document, DocumentStore, WriteBatch, collections};

use crate::cart::{Cart, CartMode, OrderKind};
use crate::line::OrderLine;
use crate::sequence::{Sequence, SequenceCounter};

/// Vendor details captured on a purchase order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,
    pub contact: String,
}

/// A committed purchase order document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(skip)]
    pub id: DocumentId,
    pub po_number: String,
    pub po_date: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_contact: String,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    #[serde(default)]
    pub category_totals: BTreeMap<String, f64>,
}

/// Purchase-order entry: cart lifecycle, atomic commit, list/delete.
#[derive(Debug, Clone)]
pub struct PurchaseOrderService<S> {
    store: S,
    counter: SequenceCounter<S>,
}

impl<S> PurchaseOrderService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            counter: SequenceCounter::new(store.clone()),
            store,
        }
    }

    /// Open a cart for a new order. Allocates the order number up front;
    /// if the commit later fails the number is left as a gap, never reused.
    pub async fn start_create(&self) -> DomainResult<Cart> {
        let number = self.counter.next(Sequence::PoNumber).await?;
        Ok(Cart::create(OrderKind::Purchase, number))
    }

    /// Open a cart editing a committed order. The stored document stays
    /// untouched until commit; the order number is reused.
    pub async fn start_edit(&self, id: &DocumentId) -> DomainResult<(PurchaseOrder, Cart)> {
        let order = self.get(id).await?;
        let cart = Cart::edit(
            OrderKind::Purchase,
            order.id.clone(),
            order.po_number.clone(),
            order.po_date.clone(),
            order.items.clone(),
        );
        Ok((order, cart))
    }

    pub async fn get(&self, id: &DocumentId) -> DomainResult<PurchaseOrder> {
        let doc = self
            .store
            .get(collections::PURCHASE_ORDERS, id)
            .await?
            .ok_or_else(DomainError::not_found)?;
        order_from_document(&doc)
    }

    /// All committed orders, newest number first.
    pub async fn list(&self) -> DomainResult<Vec<PurchaseOrder>> {
        let docs = self.store.list(collections::PURCHASE_ORDERS).await?;
        let mut orders = docs
            .iter()
            .map(order_from_document)
            .collect::<DomainResult<Vec<_>>>()?;
        orders.sort_by_key(|o| std::cmp::Reverse(number_suffix(&o.po_number)));
        Ok(orders)
    }

    /// Commit the cart.
    ///
    /// Create mode writes one atomic batch: per line, either a new inventory
    /// document (stock = received qty) or a `+qty` stock increment, plus the
    /// order document itself — so inventory and order can never diverge.
    ///
    /// Edit mode replaces the document's mutable fields only. It does not
    /// re-derive inventory deltas from the old-vs-new line diff; received
    /// stock stays as received.
    pub async fn commit(&self, cart: &Cart, vendor: &Vendor) -> DomainResult<PurchaseOrder> {
        if cart.kind() != OrderKind::Purchase {
            return Err(DomainError::validation("cart is not a purchase cart"));
        }
        if vendor.name.trim().is_empty() {
            return Err(DomainError::validation("vendor name is required"));
        }
        if cart.is_empty() {
            return Err(DomainError::validation("add at least one item"));
        }

        let order = PurchaseOrder {
            id: match cart.mode() {
                CartMode::Create => DocumentId::new(),
                CartMode::Edit { order_id } => order_id.clone(),
            },
            po_number: cart.number().to_string(),
            po_date: cart.date().to_string(),
            vendor_name: vendor.name.clone(),
            vendor_contact: vendor.contact.clone(),
            items: cart.lines().to_vec(),
            total_amount: cart.total_amount(),
            category_totals: cart.category_totals(),
        };

        let mut batch = WriteBatch::new();
        match cart.mode() {
            CartMode::Create => {
                for line in cart.lines() {
                    match &line.item_id {
                        Some(item_id) => batch.push(stock_delta_op(item_id, line.qty)),
                        None => {
                            let (_, op) = create_item_op(&NewItem {
                                name: line.name.clone(),
                                category: line.category.clone(),
                                stock: line.qty,
                                cost: line.cost,
                                price: line.price,
                            })?;
                            batch.push(op);
                        }
                    }
                }

                let doc =
                    Document::from_typed(order.id.clone(), &order).map_err(DomainError::from)?;
                batch.put(collections::PURCHASE_ORDERS, doc.id, doc.payload);
            }
            CartMode::Edit { order_id } => {
                let fields: BTreeMap<String, serde_json::Value> = [
                    ("items".to_string(), serde_json::to_value(&order.items).map_err(
                        |e| DomainError::unavailable(format!("serialization failed: {e}")),
                    )?),
                    ("totalAmount".to_string(), json!(order.total_amount)),
                    ("categoryTotals".to_string(), json!(order.category_totals)),
                    ("vendorName".to_string(), json!(order.vendor_name)),
                    ("vendorContact".to_string(), json!(order.vendor_contact)),
                ]
                .into_iter()
                .collect();
                batch.update(collections::PURCHASE_ORDERS, order_id.clone(), fields);
            }
        }

        self.store.apply(batch).await?;
        tracing::info!(po = %order.po_number, total = order.total_amount, "purchase order committed");
        Ok(order)
    }

    /// Remove the order document only. Historical stock deltas from its
    /// receipt remain applied.
    pub async fn delete(&self, id: &DocumentId) -> DomainResult<()> {
        let mut batch = WriteBatch::new();
        batch.delete(collections::PURCHASE_ORDERS, id.clone());
        self.store.apply(batch).await?;

        tracing::info!(po = %id, "purchase order deleted");
        Ok(())
    }
}

pub(crate) fn number_suffix(number: &str) -> i64 {
    number
        .rsplit_once('-')
        .and_then(|(_, n)| n.parse().ok())
        .unwrap_or(0)
}

fn order_from_document(doc: &Document) -> DomainResult<PurchaseOrder> {
    let mut order: PurchaseOrder = doc.to_typed()?;
    order.id = doc.id.clone();
    Ok(order)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_inventory::{InventoryItem, InventoryLedger};
    use stockroom_store::InMemoryDocumentStore;

    use crate::line::LineCandidate;

    use super::*;

    type Store = Arc<InMemoryDocumentStore>;

    fn setup() -> (Store, PurchaseOrderService<Store>, InventoryLedger<Store>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        (
            store.clone(),
            PurchaseOrderService::new(store.clone()),
            InventoryLedger::new(store),
        )
    }

    fn vendor() -> Vendor {
        Vendor {
            name: "Sharma Traders".to_string(),
            contact: "98100-11223".to_string(),
        }
    }

    async fn seeded_item(ledger: &InventoryLedger<Store>, stock: i64) -> InventoryItem {
        ledger
            .create_item(stockroom_inventory::NewItem {
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
    async fn commit_with_new_item_creates_inventory_with_received_stock() {
        let (_, service, ledger) = setup();

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(
            LineCandidate::New {
                name: "Jaggery".to_string(),
                category: "Groceries".to_string(),
                cost: 10.0,
                price: 15.0,
            },
            5,
        )
        .unwrap();

        let order = service.commit(&cart, &vendor()).await.unwrap();
        assert_eq!(order.po_number, "PO-1001");
        assert_eq!(order.total_amount, 50.0);
        assert_eq!(order.category_totals["Groceries"], 50.0);

        let items = ledger.list_by_category("Groceries").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Jaggery");
        assert_eq!(items[0].stock, 5);
    }

    #[tokio::test]
    async fn commit_with_existing_item_increments_stock() {
        let (_, service, ledger) = setup();
        let item = seeded_item(&ledger, 20).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 5).unwrap();
        service.commit(&cart, &vendor()).await.unwrap();

        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 25);
    }

    #[tokio::test]
    async fn commit_validates_before_any_store_access() {
        let (_, service, _) = setup();

        let cart = service.start_create().await.unwrap();
        let err = service.commit(&cart, &vendor()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(
            LineCandidate::New {
                name: "Jaggery".to_string(),
                category: "Groceries".to_string(),
                cost: 10.0,
                price: 15.0,
            },
            5,
        )
        .unwrap();
        let err = service
            .commit(&cart, &Vendor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_commit_leaves_no_partial_writes() {
        let (_, service, ledger) = setup();

        // A line referencing an item the store has never seen: the stock
        // increment cannot apply, so the whole batch must be rejected.
        let ghost = InventoryItem {
            id: DocumentId::from("ghost"),
            name: "Ghost".to_string(),
            category: "Groceries".to_string(),
            stock: 50,
            cost: 10.0,
            price: 15.0,
        };

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: ghost }, 5).unwrap();

        let err = service.commit(&cart, &vendor()).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound);

        // No order document became visible, and the cart is still BUILDING.
        assert!(service.list().await.unwrap().is_empty());
        assert_eq!(cart.lines().len(), 1);
        assert!(ledger.list_by_category("Groceries").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn edit_reuses_number_and_never_touches_stock() {
        let (_, service, ledger) = setup();
        let item = seeded_item(&ledger, 20).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 5).unwrap();
        let order = service.commit(&cart, &vendor()).await.unwrap();
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 25);

        let (loaded, mut edit_cart) = service.start_edit(&order.id).await.unwrap();
        assert_eq!(loaded.po_number, "PO-1001");
        edit_cart.change_qty(0, 10, None).unwrap();
        let updated = service.commit(&edit_cart, &vendor()).await.unwrap();

        // Same number, replaced totals, stock exactly as received originally.
        assert_eq!(updated.po_number, "PO-1001");
        assert_eq!(updated.total_amount, 100.0);
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 25);

        // The edit did not consume a sequence number.
        let next = service.start_create().await.unwrap();
        assert_eq!(next.number(), "PO-1002");
    }

    #[tokio::test]
    async fn delete_removes_document_but_not_received_stock() {
        let (_, service, ledger) = setup();
        let item = seeded_item(&ledger, 20).await;

        let mut cart = service.start_create().await.unwrap();
        cart.add_line(LineCandidate::Existing { item: item.clone() }, 5).unwrap();
        let order = service.commit(&cart, &vendor()).await.unwrap();

        service.delete(&order.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
        assert_eq!(ledger.get(&item.id).await.unwrap().stock, 25);

        let err = service.delete(&order.id).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn list_orders_newest_number_first() {
        let (_, service, ledger) = setup();
        let item = seeded_item(&ledger, 100).await;

        for _ in 0..3 {
            let mut cart = service.start_create().await.unwrap();
            cart.add_line(LineCandidate::Existing { item: item.clone() }, 1).unwrap();
            service.commit(&cart, &vendor()).await.unwrap();
        }

        let numbers: Vec<_> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.po_number)
            .collect();
        assert_eq!(numbers, ["PO-1003", "PO-1002", "PO-1001"]);
    }
}
