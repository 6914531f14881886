//! Dashboard facade
//!
//! Wires the coordinator pieces to the injected collaborators and exposes
//! the handful of entry points the page shell calls: startup, tab
//! switches, resize triggers, refresh, export, visibility and unload.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

use busboard_common::{
    DashboardConfig, DashboardError, ReportDataset, Result, SummaryStats, Tab,
};

use crate::dispatch::ChartUpdateDispatcher;
use crate::engine::{ChartHost, RenderEngine};
use crate::export::{self, ReportKind, WorkbookWriter};
use crate::fetch::{FetchManager, SearchBackend};
use crate::init::TabInitializer;
use crate::lifecycle::LifecycleManager;
use crate::registry::ChartRegistry;
use crate::resize::ResizeCoordinator;
use crate::state::{Banner, BannerKind, DashboardState};

/// Point-in-time snapshot of the coordinator, for the status panel.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStatus {
    pub active_tab: Tab,
    pub initialized_tabs: usize,
    pub live_charts: usize,
    pub fetch_in_flight: bool,
    pub page_visible: bool,
    pub has_data: bool,
}

pub struct Dashboard {
    state: Arc<DashboardState>,
    fetch: Arc<FetchManager>,
    dispatcher: Arc<ChartUpdateDispatcher>,
    initializer: TabInitializer,
    resize: ResizeCoordinator,
    lifecycle: LifecycleManager,
    writer: Arc<dyn WorkbookWriter>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        engine: Arc<dyn RenderEngine>,
        host: Arc<dyn ChartHost>,
        backend: Arc<dyn SearchBackend>,
        writer: Arc<dyn WorkbookWriter>,
    ) -> Self {
        let registry = ChartRegistry::new(
            engine,
            host,
            config.max_chart_height,
            config.animations_enabled,
        );
        let state = Arc::new(DashboardState::new(config, registry));
        Self {
            fetch: Arc::new(FetchManager::new(state.clone(), backend)),
            dispatcher: Arc::new(ChartUpdateDispatcher::new(state.clone())),
            initializer: TabInitializer::new(state.clone()),
            resize: ResizeCoordinator::new(state.clone()),
            lifecycle: LifecycleManager::new(state.clone()),
            writer,
            state,
        }
    }

    pub fn state(&self) -> &Arc<DashboardState> {
        &self.state
    }

    /// Startup: build the default tab's charts, load data into them, and
    /// start the periodic refresh.
    pub async fn start(&self) {
        let tab = self.state.active_tab();
        info!("starting dashboard on tab {}", tab);
        self.initializer.ensure_tab_initialized(tab).await;
        self.initializer.repair_charts().await;
        if let Some(data) = self.fetch.fetch_latest().await {
            self.dispatcher.update_active_tab(&data).await;
        }
        self.lifecycle
            .spawn_auto_refresh(self.fetch.clone(), self.dispatcher.clone());
    }

    /// Tab switch: activate, lazily construct, refit after the panel
    /// settles, then dispatch the current dataset to the tab's charts.
    /// No fetch happens here; the tab renders whatever data is current.
    pub async fn show_tab(&self, tab: Tab) {
        self.state.set_active_tab(tab);
        self.initializer.ensure_tab_initialized(tab).await;
        self.resize.on_tab_switch(tab).await;
        if let Some(data) = self.state.last_dataset() {
            self.dispatcher.update_tab(tab, &data).await;
        }
    }

    /// Manual refresh: run the normal fetch machine (cache and fallback
    /// included), then push the result to every live chart on every tab.
    /// Returns `false` when skipped because a fetch was already running.
    pub async fn refresh(&self) -> bool {
        let Some(data) = self.fetch.fetch_latest().await else {
            return false;
        };
        let updated = self.dispatcher.force_update_all(&data);
        info!("refresh updated {} charts", updated);
        true
    }

    pub fn on_window_resize(&self) {
        let _ = self.resize.on_window_resize();
    }

    pub async fn on_sidebar_toggle(&self) {
        self.resize.on_sidebar_toggle().await;
    }

    pub fn on_visibility_change(&self, visible: bool) {
        self.lifecycle.on_visibility_change(visible);
    }

    /// Export one report type from the current dataset. Fails (with an
    /// error banner) when no data has been fetched yet.
    pub fn export(&self, kind: ReportKind) -> Result<Vec<PathBuf>> {
        let Some(data) = self.state.last_dataset() else {
            self.state.publish_banner(
                BannerKind::Error,
                "Chưa có dữ liệu để xuất. Vui lòng làm mới dữ liệu trước.",
            );
            return Err(DashboardError::Export("no dataset fetched yet".to_string()));
        };
        let workbook = export::build_workbook(kind, &data)?;
        self.writer.write(&workbook, &kind.file_stem(Utc::now()))
    }

    pub async fn shutdown(&self) {
        self.lifecycle.on_unload().await;
    }

    pub fn subscribe_banners(&self) -> broadcast::Receiver<Banner> {
        self.state.subscribe_banners()
    }

    pub fn status(&self) -> DashboardStatus {
        DashboardStatus {
            active_tab: self.state.active_tab(),
            initialized_tabs: self.state.initialized_tab_count(),
            live_charts: self.state.registry.live_count(),
            fetch_in_flight: self.state.fetch_in_flight(),
            page_visible: self.state.page_visible(),
            has_data: self.state.last_dataset().is_some(),
        }
    }

    /// Headline counters for the stats strip, from the current dataset.
    pub fn summary(&self) -> Option<SummaryStats> {
        self.state
            .last_dataset()
            .map(|data: Arc<ReportDataset>| SummaryStats::from_dataset(&data))
    }
}
