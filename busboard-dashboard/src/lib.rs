//! Chart lifecycle and tab-scoped rendering coordinator
//!
//! This crate decides which charts exist, when they are created, how they
//! are resized, and how they are kept in sync with fetched report data:
//! - Lazy, priority-ordered chart construction per tab (at most once)
//! - Debounced window-resize refitting scoped to the visible tab
//! - Serialized fetching with a TTL cache and a deterministic mock fallback
//! - Staggered per-chart data dispatch with per-chart failure isolation
//! - Page visibility and unload handling
//!
//! The rendering engine, container host, search backend, and spreadsheet
//! writer are collaborator traits; everything else is in-memory,
//! page-lifetime state owned by a single [`state::DashboardState`].

pub mod catalog;
pub mod charts;
pub mod dashboard;
pub mod dispatch;
pub mod engine;
pub mod export;
pub mod fetch;
pub mod init;
pub mod lifecycle;
pub mod mock;
pub mod registry;
pub mod resize;
pub mod state;

pub use dashboard::{Dashboard, DashboardStatus};
pub use engine::{ChartHost, Container, RenderEngine};
pub use export::{CsvWorkbookWriter, ReportKind, Sheet, Workbook, WorkbookWriter};
pub use fetch::{EsSearchClient, FetchManager, SearchBackend};
pub use registry::{ChartHandle, ChartRegistry};
pub use state::{Banner, BannerKind, DashboardState};

#[cfg(test)]
pub(crate) mod test_util;
