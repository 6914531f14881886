//! Chart update dispatch
//!
//! Routes the current dataset to each chart's option builder and applies
//! the result through the registry. The id-to-builder mapping is a static
//! table covering every cataloged chart. Dispatch for a tab staggers the
//! applies; a failing builder or a dead handle skips that one chart and
//! the rest of the batch proceeds.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use busboard_common::{ChartId, ReportDataset, Result, Tab};

use crate::catalog;
use crate::charts;
use crate::state::DashboardState;

pub type UpdateFn = fn(&ReportDataset) -> Result<Value>;

fn cnlx_options(data: &ReportDataset) -> Result<Value> {
    charts::target_breakdown_options(data, "CNLX")
}

fn gara_options(data: &ReportDataset) -> Result<Value> {
    charts::target_breakdown_options(data, "GARA")
}

fn nvpv_options(data: &ReportDataset) -> Result<Value> {
    charts::target_breakdown_options(data, "NVPV")
}

/// Option builder for a chart id. Total over the catalog.
pub fn update_fn(id: ChartId) -> Option<UpdateFn> {
    let f: UpdateFn = match id {
        catalog::SOURCE_CHART => charts::source_options,
        catalog::ENTERPRISE_CHART => charts::enterprise_options,
        catalog::TYPE_CHART => charts::type_options,
        catalog::SEVERITY_CHART => charts::severity_options,
        catalog::TARGET_CHART => charts::target_options,
        catalog::STATUS_CHART => charts::status_options,
        catalog::ROUTE_CHART => charts::route_options,
        catalog::CONTENT_CHART => charts::content_options,
        catalog::ENTERPRISE_TYPE_MATRIX => charts::enterprise_type_matrix_options,
        catalog::TIME_TREND_CHART => charts::time_trend_options,
        catalog::SEVERITY_TYPE_CHART => charts::severity_type_options,
        catalog::RISK_ANALYSIS_CHART => charts::risk_analysis_options,
        catalog::ROUTE_MONTHLY_CHART => charts::route_monthly_options,
        catalog::CNLX_ANALYTICS => cnlx_options,
        catalog::GARA_ANALYTICS => gara_options,
        catalog::NVPV_ANALYTICS => nvpv_options,
        catalog::PRAISE_BY_SOURCE_CHART => charts::praise_by_source_options,
        catalog::PRAISE_BY_ENTERPRISE_CHART => charts::praise_by_enterprise_options,
        catalog::RESPONSE_RATE_CHART => charts::response_rate_options,
        catalog::RESPONSE_TIME_CHART => charts::response_time_options,
        catalog::NETWORK_ANALYSIS_CHART => charts::network_analysis_options,
        catalog::HEATMAP_CHART => charts::heatmap_options,
        catalog::CORRELATION_CHART => charts::correlation_options,
        _ => return None,
    };
    Some(f)
}

pub struct ChartUpdateDispatcher {
    state: Arc<DashboardState>,
}

impl ChartUpdateDispatcher {
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self { state }
    }

    /// Build and apply one chart's options. Returns whether the apply
    /// happened; dead handles and builder failures are skipped with a log
    /// line, never propagated.
    pub fn update_chart(&self, id: ChartId, data: &ReportDataset) -> bool {
        if !self.state.registry.is_live(id) {
            debug!("chart {} not live, skipping update", id);
            return false;
        }
        let Some(build) = update_fn(id) else {
            warn!("no update routing for chart {}", id);
            return false;
        };
        let options = match build(data) {
            Ok(options) => options,
            Err(e) => {
                warn!("skipping chart {}: {}", id, e);
                return false;
            }
        };
        match self.state.registry.apply(id, &options) {
            Ok(()) => true,
            Err(e) => {
                warn!("error applying options to chart {}: {}", id, e);
                false
            }
        }
    }

    /// Staggered dispatch across one tab's charts, in catalog order.
    pub async fn update_tab(&self, tab: Tab, data: &ReportDataset) -> usize {
        let stagger = self.state.config.update_stagger();
        let mut updated = 0;
        let mut first = true;
        for &id in catalog::charts_for_tab(tab) {
            if !first {
                sleep(stagger).await;
            }
            first = false;
            if self.update_chart(id, data) {
                updated += 1;
            }
        }
        debug!("updated {} charts on tab {}", updated, tab);
        updated
    }

    pub async fn update_active_tab(&self, data: &ReportDataset) -> usize {
        self.update_tab(self.state.active_tab(), data).await
    }

    /// Unstaggered dispatch to every live chart on every tab. Used after
    /// an explicit refresh, where all tabs must agree on the new dataset.
    pub fn force_update_all(&self, data: &ReportDataset) -> usize {
        let mut updated = 0;
        for id in catalog::all_charts() {
            if self.update_chart(id, data) {
                updated += 1;
            }
        }
        updated
    }
}
