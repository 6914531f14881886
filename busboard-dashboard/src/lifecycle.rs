//! Page lifecycle: visibility changes, auto-refresh, unload cleanup

use std::sync::Arc;

use tokio::time::interval;
use tracing::{debug, info};

use crate::dispatch::ChartUpdateDispatcher;
use crate::fetch::FetchManager;
use crate::state::DashboardState;

pub struct LifecycleManager {
    state: Arc<DashboardState>,
}

impl LifecycleManager {
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self { state }
    }

    /// Visibility change: record the flag and pause or resume chart
    /// animations. Animations only resume when they are enabled in the
    /// configuration in the first place.
    pub fn on_visibility_change(&self, visible: bool) {
        self.state.set_page_visible(visible);
        debug!("page visibility changed: {}", visible);
        if visible {
            if self.state.config.animations_enabled {
                self.state.registry.set_animations(true);
            }
        } else {
            self.state.registry.set_animations(false);
        }
    }

    /// Periodic refresh of the active tab. Ticks while the page is hidden
    /// or a fetch is in flight are skipped, not deferred; the next tick
    /// happens a full interval later regardless.
    pub fn spawn_auto_refresh(
        &self,
        fetch: Arc<FetchManager>,
        dispatcher: Arc<ChartUpdateDispatcher>,
    ) {
        let state = self.state.clone();
        let period = state.config.auto_refresh_interval();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            // The immediate first tick duplicates startup; swallow it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !state.page_visible() || state.fetch_in_flight() {
                    debug!("skipping auto-refresh: page hidden or fetch in progress");
                    continue;
                }
                if let Some(data) = fetch.fetch_latest().await {
                    dispatcher.update_active_tab(&data).await;
                }
            }
        });
        self.state.set_auto_refresh_task(handle);
    }

    /// Unload cleanup, best effort: stop the refresh task, invalidate any
    /// pending resize timer, dispose every chart, and drop cached data.
    /// The state object itself stays usable; nothing here can fail.
    pub async fn on_unload(&self) {
        info!("cleaning up dashboard resources");
        self.state.abort_auto_refresh();
        self.state.bump_resize_epoch();
        self.state.registry.dispose_all();
        self.state.invalidate_cache().await;
        self.state.clear_last_dataset();
    }
}
