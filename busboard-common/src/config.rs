use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Dashboard configuration
///
/// All timing knobs live here; components receive the config once at
/// startup and never consult ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Search endpoint answering the aggregation query.
    pub search_url: String,
    /// Bound on one search round trip.
    pub fetch_timeout_ms: u64,
    /// Time-to-live of a cached dataset.
    pub cache_ttl_ms: u64,
    /// Quiet window for window-resize debouncing.
    pub debounce_ms: u64,
    /// Settle delay before measuring containers after a layout change
    /// (sidebar collapse/expand), letting CSS transitions finish.
    pub sidebar_settle_ms: u64,
    /// Settle delay before refitting charts after a tab switch.
    pub tab_settle_ms: u64,
    /// Per-chart delay when constructing a tab's regular charts.
    pub chart_render_delay_ms: u64,
    /// Per-chart delay when pushing data updates to a tab.
    pub update_stagger_ms: u64,
    /// Interval between automatic data refreshes.
    pub auto_refresh_interval_ms: u64,
    /// Whether chart animation is enabled; the visibility manager clears
    /// this on live handles while the page is hidden.
    pub animations_enabled: bool,
    /// Hard cap on chart height, preventing runaway stretching while a
    /// flex container has not yet settled.
    pub max_chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            search_url: String::from("http://127.0.0.1:9200/report/_search"),
            fetch_timeout_ms: 10_000,
            cache_ttl_ms: 300_000,          // 5 minutes
            debounce_ms: 150,
            sidebar_settle_ms: 300,
            tab_settle_ms: 100,
            chart_render_delay_ms: 25,
            update_stagger_ms: 50,
            auto_refresh_interval_ms: 300_000, // 5 minutes
            animations_enabled: true,
            max_chart_height: 500,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from an optional TOML file, overlaid with
    /// `BUSBOARD_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("BUSBOARD"))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        tracing::debug!("loaded configuration: search_url={}", config.search_url);
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn sidebar_settle(&self) -> Duration {
        Duration::from_millis(self.sidebar_settle_ms)
    }

    pub fn tab_settle(&self) -> Duration {
        Duration::from_millis(self.tab_settle_ms)
    }

    pub fn chart_render_delay(&self) -> Duration {
        Duration::from_millis(self.chart_render_delay_ms)
    }

    pub fn update_stagger(&self) -> Duration {
        Duration::from_millis(self.update_stagger_ms)
    }

    pub fn auto_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.auto_refresh_interval_ms)
    }
}
