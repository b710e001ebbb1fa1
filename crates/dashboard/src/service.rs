use stockroom_core::DomainResult;
use stockroom_inventory::item_from_document;
use stockroom_orders::{PurchaseOrder, SalesOrder};
use stockroom_store::{DocumentStore, collections};

use crate::rollup::{DashboardSnapshot, build_snapshot};

/// Loads the three collection snapshots and computes the rollup.
///
/// Full-collection scans on every load: acceptable at this scale, flagged
/// as a scalability (not correctness) limit. The snapshots are
/// eventually-consistent reads with no locking; only fully committed
/// documents are ever visible here.
#[derive(Debug, Clone)]
pub struct DashboardService<S> {
    store: S,
}

impl<S> DashboardService<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> DomainResult<DashboardSnapshot> {
        let inventory = self
            .store
            .list(collections::INVENTORY)
            .await?
            .iter()
            .map(item_from_document)
            .collect::<DomainResult<Vec<_>>>()?;

        let purchase_orders = self
            .store
            .list(collections::PURCHASE_ORDERS)
            .await?
            .iter()
            .map(|doc| {
                let mut order: PurchaseOrder = doc.to_typed()?;
                order.id = doc.id.clone();
                Ok(order)
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let sales_orders = self
            .store
            .list(collections::SALES_ORDERS)
            .await?
            .iter()
            .map(|doc| {
                let mut order: SalesOrder = doc.to_typed()?;
                order.id = doc.id.clone();
                Ok(order)
            })
            .collect::<DomainResult<Vec<_>>>()?;

        tracing::debug!(
            items = inventory.len(),
            pos = purchase_orders.len(),
            sos = sales_orders.len(),
            "dashboard rollup"
        );
        Ok(build_snapshot(&inventory, &purchase_orders, &sales_orders))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_inventory::{InventoryLedger, NewItem};
    use stockroom_orders::{LineCandidate, PurchaseOrderService, SalesOrderService, Vendor};
    use stockroom_store::InMemoryDocumentStore;

    use super::*;

    type Store = Arc<InMemoryDocumentStore>;

    struct Fixture {
        ledger: InventoryLedger<Store>,
        purchasing: PurchaseOrderService<Store>,
        sales: SalesOrderService<Store>,
        dashboard: DashboardService<Store>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryDocumentStore::new());
        Fixture {
            ledger: InventoryLedger::new(store.clone()),
            purchasing: PurchaseOrderService::new(store.clone()),
            sales: SalesOrderService::new(store.clone()),
            dashboard: DashboardService::new(store),
        }
    }

    #[tokio::test]
    async fn rollup_reflects_committed_orders_only() {
        let f = fixture();

        let item = f
            .ledger
            .create_item(NewItem {
                name: "Rice".to_string(),
                category: "Groceries".to_string(),
                stock: 100,
                cost: 10.0,
                price: 15.0,
            })
            .await
            .unwrap();

        let mut po_cart = f.purchasing.start_create().await.unwrap();
        po_cart
            .add_line(LineCandidate::Existing { item: item.clone() }, 10)
            .unwrap();
        f.purchasing
            .commit(
                &po_cart,
                &Vendor {
                    name: "Sharma Traders".to_string(),
                    contact: String::new(),
                },
            )
            .await
            .unwrap();

        let mut so_cart = f.sales.start_create().await.unwrap();
        so_cart
            .add_line(LineCandidate::Existing { item: item.clone() }, 4)
            .unwrap();
        let so = f.sales.commit(&so_cart, "Anita").await.unwrap();

        let snapshot = f.dashboard.load().await.unwrap();
        let groceries = &snapshot.category_totals[0];
        assert_eq!(groceries.category, "Groceries");
        assert_eq!(groceries.purchase, 100.0);
        assert_eq!(groceries.sales, 60.0);
        assert_eq!(groceries.profit, 20.0);
        // An abandoned cart contributes nothing.
        let _abandoned = f.sales.start_create().await.unwrap();
        assert_eq!(f.dashboard.load().await.unwrap().category_totals.len(), 1);

        // Deleting the SO removes its contribution on the next load.
        f.sales.delete(&so.id).await.unwrap();
        let snapshot = f.dashboard.load().await.unwrap();
        assert_eq!(snapshot.category_totals[0].sales, 0.0);
        assert_eq!(snapshot.category_totals[0].profit, 0.0);
    }

    #[tokio::test]
    async fn low_stock_rows_come_from_live_inventory() {
        let f = fixture();
        for (name, stock) in [("Rice", 49), ("Atta", 80)] {
            f.ledger
                .create_item(NewItem {
                    name: name.to_string(),
                    category: "Groceries".to_string(),
                    stock,
                    cost: 10.0,
                    price: 15.0,
                })
                .await
                .unwrap();
        }

        let snapshot = f.dashboard.load().await.unwrap();
        assert_eq!(snapshot.low_stock_items.len(), 1);
        assert_eq!(snapshot.low_stock_items[0].name, "Rice");
        assert_eq!(snapshot.low_stock_items[0].quantity, 49);
    }
}
