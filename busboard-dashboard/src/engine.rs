//! Collaborator traits for the rendering engine and the container host
//!
//! The engine is the external charting library: given a container and a
//! declarative option object it produces pixels. The host is whatever owns
//! the container elements (the document). Both are injected at startup so
//! the coordinator can be exercised against recording fakes in tests.

use serde_json::Value;

use busboard_common::{ChartId, Result, SizeClass};

/// Measured container element for one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    pub width: u32,
    pub height: u32,
    pub size_class: SizeClass,
}

impl Container {
    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rendering engine collaborator. Instances are keyed by chart id; the
/// engine owns its own per-instance resources and releases them on
/// `dispose`. Calls never suspend.
pub trait RenderEngine: Send + Sync {
    /// Initialize an engine instance bound to the chart's container.
    /// The coordinator guarantees non-zero dimensions.
    fn init(&self, id: ChartId, width: u32, height: u32) -> Result<()>;

    /// Apply a declarative option object to a live instance.
    fn apply_options(&self, id: ChartId, options: &Value) -> Result<()>;

    /// Refit a live instance to the given box.
    fn resize(&self, id: ChartId, width: u32, height: u32) -> Result<()>;

    /// Release the instance. Must tolerate unknown ids.
    fn dispose(&self, id: ChartId);

    fn show_loading(&self, id: ChartId);

    fn hide_loading(&self, id: ChartId);
}

/// Container host collaborator: element lookup and measurement.
pub trait ChartHost: Send + Sync {
    /// Measure the container for a chart, or `None` if the element is not
    /// present in the document.
    fn container(&self, id: ChartId) -> Option<Container>;

    /// Apply explicit inline dimensions to a container, used before engine
    /// init when the measured box is 0x0.
    fn set_container_size(&self, id: ChartId, width: u32, height: u32);
}
