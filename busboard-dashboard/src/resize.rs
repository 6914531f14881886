//! Resize coordination
//!
//! Three resize triggers, three policies:
//! - window resize: debounced, refits only the active tab's charts
//! - tab switch: fixed settle delay, refits the newly shown tab
//! - sidebar toggle: longer settle delay, refits every live chart with a
//!   small stagger between them
//!
//! The debounce is an epoch counter instead of a cancellable timer: each
//! trigger bumps the epoch and schedules a sleep; when the sleep ends the
//! task fires only if no newer trigger has bumped the epoch since.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

use busboard_common::Tab;

use crate::catalog;
use crate::state::DashboardState;

pub struct ResizeCoordinator {
    state: Arc<DashboardState>,
}

impl ResizeCoordinator {
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self { state }
    }

    /// Window resize trigger. Schedules a debounced refit of the active
    /// tab; a burst of triggers collapses into the last one. The returned
    /// handle resolves to whether this trigger was the one that fired.
    pub fn on_window_resize(&self) -> JoinHandle<bool> {
        let epoch = self.state.bump_resize_epoch();
        let state = self.state.clone();
        let debounce = self.state.config.debounce();
        tokio::spawn(async move {
            sleep(debounce).await;
            if state.resize_epoch() != epoch {
                return false;
            }
            debug!("window resize settled, refitting active tab");
            refit_tab(&state, state.active_tab());
            true
        })
    }

    /// Refit the given tab's charts after its panel has finished its CSS
    /// transition. Awaited by the caller so the subsequent data dispatch
    /// happens against correctly sized charts.
    pub async fn on_tab_switch(&self, tab: Tab) {
        sleep(self.state.config.tab_settle()).await;
        refit_tab(&self.state, tab);
    }

    /// Sidebar toggle changes the width of every panel, so every live
    /// chart is refit, staggered to avoid a reflow burst.
    pub async fn on_sidebar_toggle(&self) {
        sleep(self.state.config.sidebar_settle()).await;
        let stagger = self.state.config.update_stagger();
        let ids = self.state.registry.live_ids();
        debug!("sidebar settled, refitting {} charts", ids.len());
        let mut first = true;
        for id in ids {
            if !first {
                sleep(stagger).await;
            }
            first = false;
            self.state.registry.refit_to_container(id);
        }
    }
}

/// Refit every live chart of one tab to its current container box.
/// Hidden or missing containers are skipped inside the registry.
fn refit_tab(state: &DashboardState, tab: Tab) {
    for &id in catalog::charts_for_tab(tab) {
        state.registry.refit_to_container(id);
    }
}
