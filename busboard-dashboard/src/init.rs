//! Lazy per-tab chart construction
//!
//! Charts are built the first time their tab becomes active, never at page
//! load. High-priority charts are constructed immediately; the rest follow
//! one by one with a short pacing delay so a tab switch stays responsive.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{info, warn};

use busboard_common::Tab;

use crate::catalog;
use crate::state::DashboardState;

pub struct TabInitializer {
    state: Arc<DashboardState>,
}

impl TabInitializer {
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self { state }
    }

    /// Construct the tab's charts if this is its first activation.
    ///
    /// The initialized mark is taken synchronously before any await, so two
    /// racing activations of the same tab agree on a single winner and the
    /// loser returns without touching the registry. Returns whether this
    /// call performed the construction.
    ///
    /// Construction order is the catalog order: high-priority charts first
    /// with no delay, the remainder staggered. When this function returns,
    /// every chart of the tab has been through `create`, which is what lets
    /// callers dispatch data immediately afterwards.
    pub async fn ensure_tab_initialized(&self, tab: Tab) -> bool {
        if !self.state.mark_tab_initialized(tab) {
            return false;
        }

        let charts = catalog::charts_for_tab(tab);
        if charts.is_empty() {
            info!("tab {} has no charts", tab);
            return true;
        }
        info!("initializing {} charts for tab {}", charts.len(), tab);

        let delay = self.state.config.chart_render_delay();
        let mut first_deferred = true;
        for &id in charts {
            if catalog::is_high_priority(id) {
                self.create_chart(id);
                continue;
            }
            // No delay before the first deferred chart, only between them.
            if !first_deferred {
                sleep(delay).await;
            }
            first_deferred = false;
            self.create_chart(id);
        }
        true
    }

    /// Construct every chart of every tab that is already initialized but
    /// whose handle is missing or disposed. Used after recovery paths where
    /// instances may have been torn down. Re-creations are paced with the
    /// same per-chart delay as first-time construction.
    pub async fn repair_charts(&self) -> usize {
        let delay = self.state.config.chart_render_delay();
        let mut repaired = 0;
        for tab in Tab::ALL {
            if !self.state.is_tab_initialized(tab) {
                continue;
            }
            for &id in catalog::charts_for_tab(tab) {
                if self.state.registry.is_live(id) {
                    continue;
                }
                if repaired > 0 {
                    sleep(delay).await;
                }
                match self.state.registry.create(id) {
                    Ok(()) => repaired += 1,
                    Err(e) => warn!("error repairing chart {}: {}", id, e),
                }
            }
        }
        if repaired > 0 {
            info!("repaired {} chart instances", repaired);
        }
        repaired
    }

    fn create_chart(&self, id: busboard_common::ChartId) {
        // A missing container must not abort the rest of the tab.
        if let Err(e) = self.state.registry.create(id) {
            warn!("error creating chart {}: {}", id, e);
        }
    }
}
