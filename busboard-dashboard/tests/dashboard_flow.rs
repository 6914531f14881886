//! End-to-end flow through the public facade: startup on mock fallback,
//! tab switching, and the construction-before-dispatch ordering contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use busboard_common::{
    ChartId, DashboardConfig, DashboardError, ReportDataset, Result, SizeClass, Tab,
};
use busboard_dashboard::catalog;
use busboard_dashboard::{
    ChartHost, Container, CsvWorkbookWriter, Dashboard, RenderEngine, ReportKind, SearchBackend,
};

static SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
struct Call {
    kind: &'static str,
    seq: u64,
    options: Option<Value>,
}

#[derive(Default)]
struct RecordingEngine {
    calls: DashMap<ChartId, Vec<Call>>,
}

impl RecordingEngine {
    fn record(&self, id: ChartId, kind: &'static str, options: Option<Value>) {
        self.calls.entry(id).or_default().push(Call {
            kind,
            seq: SEQ.fetch_add(1, Ordering::SeqCst),
            options,
        });
    }

    fn first_seq(&self, id: ChartId, kind: &str) -> Option<u64> {
        self.calls
            .get(&id)
            .and_then(|calls| calls.iter().find(|c| c.kind == kind).map(|c| c.seq))
    }

    fn applied_options(&self, id: ChartId) -> Option<Value> {
        self.calls.get(&id).and_then(|calls| {
            calls
                .iter()
                .rev()
                .find(|c| c.kind == "apply")
                .and_then(|c| c.options.clone())
        })
    }
}

impl RenderEngine for RecordingEngine {
    fn init(&self, id: ChartId, _width: u32, _height: u32) -> Result<()> {
        self.record(id, "init", None);
        Ok(())
    }

    fn apply_options(&self, id: ChartId, options: &Value) -> Result<()> {
        self.record(id, "apply", Some(options.clone()));
        Ok(())
    }

    fn resize(&self, id: ChartId, _width: u32, _height: u32) -> Result<()> {
        self.record(id, "resize", None);
        Ok(())
    }

    fn dispose(&self, id: ChartId) {
        self.record(id, "dispose", None);
    }

    fn show_loading(&self, _id: ChartId) {}

    fn hide_loading(&self, _id: ChartId) {}
}

struct StaticHost;

impl ChartHost for StaticHost {
    fn container(&self, _id: ChartId) -> Option<Container> {
        Some(Container {
            width: 640,
            height: 400,
            size_class: SizeClass::Default,
        })
    }

    fn set_container_size(&self, _id: ChartId, _width: u32, _height: u32) {}
}

/// Backend that always refuses the connection, forcing the mock fallback.
struct UnreachableBackend;

#[async_trait]
impl SearchBackend for UnreachableBackend {
    async fn search(&self, _query: &Value) -> Result<ReportDataset> {
        Err(DashboardError::Transport("connection refused".to_string()))
    }
}

fn build_dashboard() -> (Dashboard, Arc<RecordingEngine>, tempfile::TempDir) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let engine = Arc::new(RecordingEngine::default());
    let export_dir = tempfile::tempdir().expect("create temp dir");
    let dashboard = Dashboard::new(
        DashboardConfig::default(),
        engine.clone(),
        Arc::new(StaticHost),
        Arc::new(UnreachableBackend),
        Arc::new(CsvWorkbookWriter::new(export_dir.path())),
    );
    (dashboard, engine, export_dir)
}

#[tokio::test(start_paused = true)]
async fn source_chart_receives_total_and_percentages_from_fallback_data() {
    let (dashboard, engine, _dir) = build_dashboard();
    let mut banners = dashboard.subscribe_banners();

    dashboard.start().await;

    // The backend is down, so a warning banner precedes the mock render.
    let banner = banners.try_recv().expect("fallback banner");
    assert!(banner.message.contains("dữ liệu mẫu"));

    let options = engine
        .applied_options(catalog::SOURCE_CHART)
        .expect("source chart rendered");
    assert_eq!(options["total"], 10_000);

    let slices = options["series"][0]["data"].as_array().expect("pie slices");
    let facebook = slices.iter().find(|s| s["name"] == "facebook").expect("facebook slice");
    assert_eq!(facebook["value"], 3440);
    assert_eq!(facebook["percent"], 34.4);

    dashboard.state().abort_auto_refresh();
}

#[tokio::test(start_paused = true)]
async fn tab_switch_constructs_before_dispatching() {
    let (dashboard, engine, _dir) = build_dashboard();
    dashboard.start().await;

    dashboard.show_tab(Tab::Detailed).await;

    for &id in catalog::charts_for_tab(Tab::Detailed) {
        let init = engine.first_seq(id, "init").expect("chart constructed");
        let apply = engine.first_seq(id, "apply").expect("chart updated");
        assert!(
            init < apply,
            "chart {id} must be constructed before it receives data"
        );
    }

    // Switching back must not rebuild the overview charts.
    dashboard.show_tab(Tab::Overview).await;
    for &id in catalog::charts_for_tab(Tab::Overview) {
        let inits = engine
            .calls
            .get(&id)
            .map(|calls| calls.iter().filter(|c| c.kind == "init").count())
            .unwrap_or(0);
        assert_eq!(inits, 1, "chart {id} constructed more than once");
    }

    dashboard.state().abort_auto_refresh();
}

#[tokio::test(start_paused = true)]
async fn export_and_shutdown_round_out_the_session() {
    let (dashboard, engine, dir) = build_dashboard();
    dashboard.start().await;

    let paths = dashboard
        .export(ReportKind::Comprehensive)
        .expect("export succeeds with fallback data");
    assert_eq!(paths.len(), 5);
    for path in &paths {
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
    }

    dashboard.shutdown().await;
    let status = dashboard.status();
    assert_eq!(status.live_charts, 0);
    assert!(!status.has_data);
    assert!(
        engine
            .calls
            .get(&catalog::SOURCE_CHART)
            .map(|calls| calls.iter().any(|c| c.kind == "dispose"))
            .unwrap_or(false)
    );
}
