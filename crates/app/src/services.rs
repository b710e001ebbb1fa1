use stockroom_dashboard::DashboardService;
use stockroom_inventory::InventoryLedger;
use stockroom_orders::{PurchaseOrderService, SalesOrderService};
use stockroom_store::DocumentStore;

use crate::config::AppConfig;
use crate::views::{DashboardView, InventoryView, PurchaseOrderView, SalesOrderView};

/// The core services, wired over one injected store handle.
///
/// The store client is constructed by the host and passed in; nothing in
/// the workspace holds a lazily-initialized global handle.
#[derive(Debug, Clone)]
pub struct AppServices<S> {
    pub inventory: InventoryLedger<S>,
    pub purchasing: PurchaseOrderService<S>,
    pub sales: SalesOrderService<S>,
    pub dashboard: DashboardService<S>,
    pub config: AppConfig,
}

impl<S> AppServices<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, AppConfig::default())
    }

    pub fn with_config(store: S, config: AppConfig) -> Self {
        Self {
            inventory: InventoryLedger::new(store.clone()),
            purchasing: PurchaseOrderService::new(store.clone()),
            sales: SalesOrderService::new(store.clone()),
            dashboard: DashboardService::new(store),
            config,
        }
    }

    pub fn dashboard_view(&self) -> DashboardView<S> {
        DashboardView::new(self.clone())
    }

    pub fn inventory_view(&self) -> InventoryView<S> {
        InventoryView::new(self.clone())
    }

    pub fn purchase_order_view(&self) -> PurchaseOrderView<S> {
        PurchaseOrderView::new(self.clone())
    }

    pub fn sales_order_view(&self) -> SalesOrderView<S> {
        SalesOrderView::new(self.clone())
    }
}
