use serde::Serialize;

use stockroom_core::DomainResult;
use stockroom_dashboard::{CategorySummary, LowStockItem, ProfitTrendPoint};
use stockroom_store::DocumentStore;

use crate::services::AppServices;
use crate::session::{InFlight, with_timeout};

/// What the dashboard screen renders.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub category_totals: Vec<CategorySummary>,
    pub low_stock_items: Vec<LowStockItem>,
    pub profit_trend: Vec<ProfitTrendPoint>,
}

/// Dashboard screen: read-only rollup, recomputed on every refresh.
#[derive(Debug)]
pub struct DashboardView<S> {
    services: AppServices<S>,
    in_flight: InFlight,
    pub state: DashboardState,
}

impl<S> DashboardView<S>
where
    S: DocumentStore + Clone,
{
    pub(crate) fn new(services: AppServices<S>) -> Self {
        Self {
            services,
            in_flight: InFlight::default(),
            state: DashboardState::default(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    pub async fn refresh(&mut self) -> DomainResult<()> {
        let _guard = self.in_flight.begin()?;
        let snapshot = with_timeout(
            self.services.config.request_timeout,
            self.services.dashboard.load(),
        )
        .await?;

        self.state.category_totals = snapshot.category_totals;
        self.state.low_stock_items = snapshot.low_stock_items;
        self.state.profit_trend = snapshot.profit_trend;
        Ok(())
    }
}
