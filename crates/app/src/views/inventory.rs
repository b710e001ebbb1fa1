use serde::Serialize;

use stockroom_core::{DocumentId, DomainError, DomainResult};
use stockroom_inventory::{InventoryItem, NewItem};
use stockroom_store::DocumentStore;

use crate::config::DEFAULT_CATEGORIES;
use crate::services::AppServices;
use crate::session::{InFlight, with_timeout};

/// What the inventory screen renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryState {
    pub categories: Vec<String>,
    pub selected_category: Option<String>,
    pub items: Vec<InventoryItem>,
}

impl Default for InventoryState {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            selected_category: None,
            items: Vec::new(),
        }
    }
}

/// Inventory screen: browse by category, add/edit/delete items.
#[derive(Debug)]
pub struct InventoryView<S> {
    services: AppServices<S>,
    in_flight: InFlight,
    pub state: InventoryState,
}

impl<S> InventoryView<S>
where
    S: DocumentStore + Clone,
{
    pub(crate) fn new(services: AppServices<S>) -> Self {
        Self {
            services,
            in_flight: InFlight::default(),
            state: InventoryState::default(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Category tile pressed: select and load its items.
    pub async fn select_category(&mut self, category: &str) -> DomainResult<()> {
        self.state.selected_category = Some(category.to_string());
        self.refresh().await
    }

    /// Reload the items of the selected category.
    pub async fn refresh(&mut self) -> DomainResult<()> {
        let Some(category) = self.state.selected_category.clone() else {
            self.state.items.clear();
            return Ok(());
        };

        self.state.items = with_timeout(
            self.services.config.request_timeout,
            self.services.inventory.list_by_category(&category),
        )
        .await?;
        Ok(())
    }

    /// Add-item dialog saved: create the item under the selected category.
    pub async fn add_item(
        &mut self,
        name: &str,
        stock: i64,
        cost: f64,
        price: f64,
    ) -> DomainResult<()> {
        let category = self
            .state
            .selected_category
            .clone()
            .ok_or_else(|| DomainError::validation("select a category first"))?;

        let _guard = self.in_flight.begin()?;
        with_timeout(
            self.services.config.request_timeout,
            self.services.inventory.create_item(NewItem {
                name: name.to_string(),
                category,
                stock,
                cost,
                price,
            }),
        )
        .await?;
        drop(_guard);

        self.refresh().await
    }

    /// Edit mode saved: persist the edited rows in one batch.
    pub async fn save_edits(&mut self, edited: Vec<InventoryItem>) -> DomainResult<()> {
        if edited.is_empty() {
            return Err(DomainError::validation("nothing to save"));
        }

        let _guard = self.in_flight.begin()?;
        with_timeout(
            self.services.config.request_timeout,
            self.services.inventory.save_edits(&edited),
        )
        .await?;
        drop(_guard);

        self.refresh().await
    }

    pub async fn delete_item(&mut self, id: &DocumentId) -> DomainResult<()> {
        let _guard = self.in_flight.begin()?;
        let result = with_timeout(
            self.services.config.request_timeout,
            self.services.inventory.delete_item(id),
        )
        .await;
        drop(_guard);

        // Even a vanished target means the list on screen is stale.
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "inventory refresh after delete failed");
        }
        result
    }
}
