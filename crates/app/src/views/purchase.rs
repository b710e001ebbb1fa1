use serde::Serialize;

use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_inventory::InventoryItem;
use stockroom_orders::{Cart, LineCandidate, PurchaseOrder, Vendor};
use stockroom_store::DocumentStore;

use crate::config::DEFAULT_CATEGORIES;
use crate::services::AppServices;
use crate::session::{InFlight, with_timeout};

/// Row of the purchase-order list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderSummary {
    pub id: DocumentId,
    pub po_number: String,
    pub po_date: String,
    pub vendor_name: String,
    pub total_amount: f64,
    pub items_count: usize,
}

impl From<&PurchaseOrder> for PurchaseOrderSummary {
    fn from(order: &PurchaseOrder) -> Self {
        Self {
            id: order.id.clone(),
            po_number: order.po_number.clone(),
            po_date: order.po_date.clone(),
            vendor_name: order.vendor_name.clone(),
            total_amount: order.total_amount,
            items_count: order.items.len(),
        }
    }
}

/// What the purchase-order screen renders.
///
/// `cart` doubles as the mode indicator: `None` means browsing,
/// `Some` carries [`stockroom_orders::CartMode`] (create vs edit).
#[derive(Debug, Default)]
pub struct PurchaseOrderState {
    pub po_list: Vec<PurchaseOrderSummary>,
    pub categories: Vec<String>,
    pub selected_category: Option<String>,
    /// Item picker contents for the selected category.
    pub items: Vec<InventoryItem>,
    pub cart: Option<Cart>,
    pub vendor: Vendor,
    /// Order shown in the detail dialog.
    pub selected: Option<PurchaseOrder>,
}

/// Purchase-order screen: list, entry dialog, detail dialog.
#[derive(Debug)]
pub struct PurchaseOrderView<S> {
    services: AppServices<S>,
    in_flight: InFlight,
    pub state: PurchaseOrderState,
}

impl<S> PurchaseOrderView<S>
where
    S: DocumentStore + Clone,
{
    pub(crate) fn new(services: AppServices<S>) -> Self {
        Self {
            services,
            in_flight: InFlight::default(),
            state: PurchaseOrderState {
                categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
                ..PurchaseOrderState::default()
            },
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub async fn refresh_list(&mut self) -> DomainResult<()> {
        let orders = with_timeout(
            self.services.config.request_timeout,
            self.services.purchasing.list(),
        )
        .await?;
        self.state.po_list = orders.iter().map(PurchaseOrderSummary::from).collect();
        Ok(())
    }

    /// Open the entry dialog on a fresh cart. Allocates the order number, so
    /// the double-submit guard applies.
    pub async fn start_create(&mut self) -> DomainResult<()> {
        let _guard = self.in_flight.begin()?;
        let cart = with_timeout(
            self.services.config.request_timeout,
            self.services.purchasing.start_create(),
        )
        .await?;

        self.state.cart = Some(cart);
        self.state.vendor = Vendor::default();
        Ok(())
    }

    /// Open the entry dialog on a deep copy of a committed order.
    pub async fn start_edit(&mut self, id: &DocumentId) -> DomainResult<()> {
        let result = with_timeout(
            self.services.config.request_timeout,
            self.services.purchasing.start_edit(id),
        )
        .await;

        match result {
            Ok((order, cart)) => {
                self.state.vendor = Vendor {
                    name: order.vendor_name.clone(),
                    contact: order.vendor_contact.clone(),
                };
                self.state.cart = Some(cart);
                Ok(())
            }
            Err(DomainError::NotFound) => {
                self.refresh_after_stale_target().await;
                Err(DomainError::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    /// Category picked inside the entry dialog: load the item picker.
    pub async fn select_category(&mut self, category: &str) -> DomainResult<()> {
        self.state.selected_category = Some(category.to_string());
        self.state.items = with_timeout(
            self.services.config.request_timeout,
            self.services.inventory.list_by_category(category),
        )
        .await?;
        Ok(())
    }

    /// Add a line for the typed item name.
    ///
    /// A name matching the picker resolves to that existing item; anything
    /// else becomes a new item and requires `cost` and `price`.
    pub fn add_line(
        &mut self,
        name: &str,
        qty: i64,
        cost: Option<f64>,
        price: Option<f64>,
    ) -> DomainResult<()> {
        let candidate = self.pick_candidate(name, cost, price)?;
        let cart = self
            .state
            .cart
            .as_mut()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;
        cart.add_line(candidate, qty)
    }

    pub fn remove_line(&mut self, index: usize) -> DomainResult<()> {
        let cart = self
            .state
            .cart
            .as_mut()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;
        cart.remove_line(index)
    }

    pub fn change_qty(&mut self, index: usize, qty: i64) -> DomainResult<()> {
        let cart = self
            .state
            .cart
            .as_mut()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;
        // Receipts have no stock bound.
        cart.change_qty(index, qty, None)
    }

    pub fn set_vendor(&mut self, name: &str, contact: &str) {
        self.state.vendor = Vendor {
            name: name.to_string(),
            contact: contact.to_string(),
        };
    }

    /// Commit the cart. On success the dialog closes (cart cleared) and the
    /// list reloads; on a retriable failure the cart stays as typed.
    pub async fn commit(&mut self) -> DomainResult<PurchaseOrder> {
        let cart = self
            .state
            .cart
            .as_ref()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;

        let _guard = self.in_flight.begin()?;
        let order = with_timeout(
            self.services.config.request_timeout,
            self.services.purchasing.commit(cart, &self.state.vendor),
        )
        .await?;
        drop(_guard);

        self.state.cart = None;
        self.refresh_list().await?;
        Ok(order)
    }

    /// Discard the in-progress cart. The allocated number stays burned.
    pub fn cancel(&mut self) {
        self.state.cart = None;
    }

    /// Open the detail dialog for one order.
    pub async fn select(&mut self, id: &DocumentId) -> DomainResult<()> {
        let result = with_timeout(
            self.services.config.request_timeout,
            self.services.purchasing.get(id),
        )
        .await;

        match result {
            Ok(order) => {
                self.state.selected = Some(order);
                Ok(())
            }
            Err(DomainError::NotFound) => {
                self.refresh_after_stale_target().await;
                Err(DomainError::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    pub fn close_detail(&mut self) {
        self.state.selected = None;
    }

    pub async fn delete(&mut self, id: &DocumentId) -> DomainResult<()> {
        let _guard = self.in_flight.begin()?;
        let result = with_timeout(
            self.services.config.request_timeout,
            self.services.purchasing.delete(id),
        )
        .await;
        drop(_guard);

        // Successful or stale, the list on screen changed under us.
        self.refresh_after_stale_target().await;
        result
    }

    fn pick_candidate(
        &self,
        name: &str,
        cost: Option<f64>,
        price: Option<f64>,
    ) -> DomainResult<LineCandidate> {
        if let Some(item) = self.state.items.iter().find(|i| i.name == name) {
            return Ok(LineCandidate::Existing { item: item.clone() });
        }

        let category = self
            .state
            .selected_category
            .clone()
            .ok_or_else(|| DomainError::validation("select a category first"))?;
        Ok(LineCandidate::New {
            name: name.to_string(),
            category,
            cost: cost.unwrap_or(0.0),
            price: price.unwrap_or(0.0),
        })
    }

    async fn refresh_after_stale_target(&mut self) {
        if let Err(e) = self.refresh_list().await {
            tracing::warn!(error = %e, "purchase order list refresh failed");
        }
    }
}
