//! Chart registry: owns the engine instance bound to each chart id
//!
//! The registry is the only component that creates or disposes engine
//! instances. Every operation is guarded by a liveness check so calls on
//! missing or disposed handles degrade to silent no-ops, and one chart's
//! engine failure never aborts work on its siblings.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};

use busboard_common::{ChartId, DashboardError, Result};

use crate::engine::{ChartHost, RenderEngine};

/// Width applied when a container reports zero width during a refit.
const FALLBACK_RESIZE_WIDTH: u32 = 600;
/// Height applied when a container reports zero height during a refit.
const FALLBACK_RESIZE_HEIGHT: u32 = 400;

/// Live binding between a chart id and its engine instance.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    pub disposed: bool,
    pub last_known_size: (u32, u32),
    pub animations: bool,
}

pub struct ChartRegistry {
    engine: Arc<dyn RenderEngine>,
    host: Arc<dyn ChartHost>,
    charts: DashMap<ChartId, ChartHandle>,
    max_chart_height: u32,
    animations_enabled: bool,
}

impl ChartRegistry {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        host: Arc<dyn ChartHost>,
        max_chart_height: u32,
        animations_enabled: bool,
    ) -> Self {
        Self {
            engine,
            host,
            charts: DashMap::new(),
            max_chart_height,
            animations_enabled,
        }
    }

    /// Create the engine instance for a chart. No-op when a live handle
    /// already exists; a disposed handle is replaced (reinit is permitted).
    ///
    /// A container measuring 0x0 (hidden tab) gets deterministic fallback
    /// dimensions from its size-class hint, applied as explicit inline
    /// dimensions, so the engine never sees a zero-area canvas.
    pub fn create(&self, id: ChartId) -> Result<()> {
        if let Some(handle) = self.charts.get(&id) {
            if !handle.disposed {
                debug!("chart {} already initialized", id);
                return Ok(());
            }
        }

        let container = self
            .host
            .container(id)
            .ok_or_else(|| DashboardError::MissingElement(id.to_string()))?;

        let (width, height) = if container.is_zero_sized() {
            let (w, h) = container.size_class.fallback_size();
            debug!("chart {} in hidden tab, using fallback size {}x{}", id, w, h);
            self.host.set_container_size(id, w, h);
            (w, h)
        } else {
            (container.width, container.height)
        };

        self.engine.init(id, width, height)?;
        self.charts.insert(
            id,
            ChartHandle {
                disposed: false,
                last_known_size: (width, height),
                animations: self.animations_enabled,
            },
        );
        self.engine.show_loading(id);
        debug!("initialized chart {} at {}x{}", id, width, height);
        Ok(())
    }

    /// Dispose a chart's engine instance. Idempotent; safe on missing ids.
    pub fn dispose(&self, id: ChartId) {
        if let Some(mut handle) = self.charts.get_mut(&id) {
            if !handle.disposed {
                self.engine.dispose(id);
                handle.disposed = true;
                debug!("disposed chart {}", id);
            }
        }
    }

    /// Refit a live chart to the given box. Width and height are clamped
    /// to sane bounds; missing or disposed handles are silent no-ops.
    pub fn resize(&self, id: ChartId, width: u32, height: u32) {
        let Some(mut handle) = self.charts.get_mut(&id) else {
            return;
        };
        if handle.disposed {
            return;
        }

        let width = if width == 0 { FALLBACK_RESIZE_WIDTH } else { width };
        let height = if height == 0 { FALLBACK_RESIZE_HEIGHT } else { height };
        let height = height.min(self.max_chart_height);

        match self.engine.resize(id, width, height) {
            Ok(()) => handle.last_known_size = (width, height),
            Err(e) => warn!("error resizing chart {}: {}", id, e),
        }
    }

    /// Measure the chart's container and refit to it. Containers that are
    /// absent or report zero dimensions are skipped silently (hidden tab,
    /// not an error). Returns whether a resize was issued.
    pub fn refit_to_container(&self, id: ChartId) -> bool {
        let Some(container) = self.host.container(id) else {
            return false;
        };
        if container.is_zero_sized() {
            return false;
        }
        if !self.is_live(id) {
            return false;
        }
        self.resize(id, container.width, container.height);
        true
    }

    /// Apply an option object to a live chart, clearing its loading state.
    /// Missing or disposed handles are silent no-ops.
    pub fn apply(&self, id: ChartId, options: &Value) -> Result<()> {
        if !self.is_live(id) {
            return Ok(());
        }
        self.engine.hide_loading(id);
        self.engine.apply_options(id, options)
    }

    /// Toggle the animation flag on every live handle (cosmetic pause
    /// while the page is hidden).
    pub fn set_animations(&self, enabled: bool) {
        for mut entry in self.charts.iter_mut() {
            if entry.disposed {
                continue;
            }
            entry.animations = enabled;
            let id = *entry.key();
            if let Err(e) = self
                .engine
                .apply_options(id, &serde_json::json!({ "animation": enabled }))
            {
                warn!("error toggling animation on chart {}: {}", id, e);
            }
        }
    }

    /// Dispose every live handle. Each disposal is independently guarded.
    pub fn dispose_all(&self) {
        let ids: Vec<ChartId> = self.charts.iter().map(|e| *e.key()).collect();
        for id in ids {
            self.dispose(id);
        }
    }

    pub fn is_live(&self, id: ChartId) -> bool {
        self.charts.get(&id).map_or(false, |h| !h.disposed)
    }

    pub fn live_ids(&self) -> Vec<ChartId> {
        self.charts
            .iter()
            .filter(|e| !e.disposed)
            .map(|e| *e.key())
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.charts.iter().filter(|e| !e.disposed).count()
    }

    pub fn handle(&self, id: ChartId) -> Option<ChartHandle> {
        self.charts.get(&id).map(|h| h.clone())
    }
}
