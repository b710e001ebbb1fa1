use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_inventory::InventoryItem;
use stockroom_orders::{Cart, LineCandidate, SalesOrder};
use stockroom_store::DocumentStore;

use crate::config::DEFAULT_CATEGORIES;
use crate::services::AppServices;
use crate::session::{InFlight, with_timeout};

/// What the sales-order screen renders.
///
/// `cart` doubles as the mode indicator: `None` means browsing,
/// `Some` carries [`stockroom_orders::CartMode`] (create vs edit).
#[derive(Debug, Default)]
pub struct SalesOrderState {
    pub so_list: Vec<SalesOrder>,
    pub categories: Vec<String>,
    pub selected_category: Option<String>,
    /// Item picker contents for the selected category.
    pub items: Vec<InventoryItem>,
    pub cart: Option<Cart>,
    pub customer: String,
    /// Order shown in the detail dialog.
    pub selected: Option<SalesOrder>,
}

/// Sales-order screen: list, entry dialog, detail dialog.
///
/// Lines come only from existing inventory; quantities are checked against
/// stock when added or changed (a screen-level guard, not a hard guarantee
/// under concurrent sessions).
#[derive(Debug)]
pub struct SalesOrderView<S> {
    services: AppServices<S>,
    in_flight: InFlight,
    pub state: SalesOrderState,
}

impl<S> SalesOrderView<S>
where
    S: DocumentStore + Clone,
{
    pub(crate) fn new(services: AppServices<S>) -> Self {
        Self {
            services,
            in_flight: InFlight::default(),
            state: SalesOrderState {
                categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
                ..SalesOrderState::default()
            },
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub async fn refresh_list(&mut self) -> DomainResult<()> {
        self.state.so_list = with_timeout(
            self.services.config.request_timeout,
            self.services.sales.list(),
        )
        .await?;
        Ok(())
    }

    /// Open the entry dialog on a fresh cart. Allocates the order number, so
    /// the double-submit guard applies.
    pub async fn start_create(&mut self) -> DomainResult<()> {
        let _guard = self.in_flight.begin()?;
        let cart = with_timeout(
            self.services.config.request_timeout,
            self.services.sales.start_create(),
        )
        .await?;

        self.state.cart = Some(cart);
        self.state.customer.clear();
        self.state.items.clear();
        self.state.selected_category = None;
        Ok(())
    }

    /// Open the entry dialog on a deep copy of a committed order.
    pub async fn start_edit(&mut self, id: &DocumentId) -> DomainResult<()> {
        let result = with_timeout(
            self.services.config.request_timeout,
            self.services.sales.start_edit(id),
        )
        .await;

        match result {
            Ok((order, cart)) => {
                self.state.customer = order.customer.clone();
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

    /// Add a line for an item picked from the loaded category.
    pub fn add_line(&mut self, item_id: &DocumentId, qty: i64) -> DomainResult<()> {
        let item = self
            .state
            .items
            .iter()
            .find(|i| &i.id == item_id)
            .cloned()
            .ok_or_else(|| DomainError::validation("select an item"))?;

        let cart = self
            .state
            .cart
            .as_mut()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;
        cart.add_line(LineCandidate::Existing { item }, qty)
    }

    pub fn remove_line(&mut self, index: usize) -> DomainResult<()> {
        let cart = self
            .state
            .cart
            .as_mut()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;
        cart.remove_line(index)
    }

    /// Change a line quantity; revalidated against current stock.
    pub async fn change_qty(&mut self, index: usize, qty: i64) -> DomainResult<()> {
        let cart = self
            .state
            .cart
            .as_mut()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;
        with_timeout(
            self.services.config.request_timeout,
            self.services.sales.change_qty(cart, index, qty),
        )
        .await
    }

    pub fn set_customer(&mut self, customer: &str) {
        self.state.customer = customer.to_string();
    }

    /// Commit the cart. On success the dialog closes (cart cleared) and the
    /// list reloads; on a retriable failure the cart stays as typed.
    pub async fn commit(&mut self) -> DomainResult<SalesOrder> {
        let cart = self
            .state
            .cart
            .as_ref()
            .ok_or_else(|| DomainError::validation("no order in progress"))?;

        let _guard = self.in_flight.begin()?;
        let order = with_timeout(
            self.services.config.request_timeout,
            self.services.sales.commit(cart, &self.state.customer),
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
            self.services.sales.get(id),
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
            self.services.sales.delete(id),
        )
        .await;
        drop(_guard);

        self.refresh_after_stale_target().await;
        result
    }

    async fn refresh_after_stale_target(&mut self) {
        if let Err(e) = self.refresh_list().await {
            tracing::warn!(error = %e, "sales order list refresh failed");
        }
    }
}
