//! Recording fakes shared across the crate's tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::time::{sleep, Duration};

use busboard_common::{ChartId, DashboardConfig, DashboardError, ReportDataset, Result, SizeClass};

use crate::catalog;
use crate::engine::{ChartHost, Container, RenderEngine};
use crate::fetch::SearchBackend;
use crate::mock::generate_mock_dataset;
use crate::registry::ChartRegistry;
use crate::state::DashboardState;

static SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    SEQ.fetch_add(1, Ordering::SeqCst)
}

/// One recorded engine call. `seq` is a global monotonic counter so tests
/// can assert cross-chart ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Init { width: u32, height: u32, seq: u64 },
    Apply { animation: Option<bool>, seq: u64 },
    Resize { width: u32, height: u32, seq: u64 },
    Dispose,
    ShowLoading,
    HideLoading,
}

/// Rendering engine fake that records every call per chart id.
#[derive(Default)]
pub struct MockEngine {
    events: DashMap<ChartId, Vec<EngineEvent>>,
}

impl MockEngine {
    fn record(&self, id: ChartId, event: EngineEvent) {
        self.events.entry(id).or_default().push(event);
    }

    pub fn events(&self, id: ChartId) -> Vec<EngineEvent> {
        self.events.get(&id).map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, id: ChartId, pred: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events(id).iter().filter(|e| pred(e)).count()
    }

    pub fn init_count(&self, id: ChartId) -> usize {
        self.count(id, |e| matches!(e, EngineEvent::Init { .. }))
    }

    /// Sequence number of the first event matching the predicate.
    pub fn seq_of_first(
        &self,
        id: ChartId,
        pred: impl Fn(&EngineEvent) -> bool,
    ) -> Option<u64> {
        self.events(id).iter().find(|e| pred(e)).and_then(|e| match e {
            EngineEvent::Init { seq, .. }
            | EngineEvent::Apply { seq, .. }
            | EngineEvent::Resize { seq, .. } => Some(*seq),
            _ => None,
        })
    }
}

impl RenderEngine for MockEngine {
    fn init(&self, id: ChartId, width: u32, height: u32) -> Result<()> {
        self.record(id, EngineEvent::Init { width, height, seq: next_seq() });
        Ok(())
    }

    fn apply_options(&self, id: ChartId, options: &Value) -> Result<()> {
        let animation = options.get("animation").and_then(Value::as_bool);
        self.record(id, EngineEvent::Apply { animation, seq: next_seq() });
        Ok(())
    }

    fn resize(&self, id: ChartId, width: u32, height: u32) -> Result<()> {
        self.record(id, EngineEvent::Resize { width, height, seq: next_seq() });
        Ok(())
    }

    fn dispose(&self, id: ChartId) {
        self.record(id, EngineEvent::Dispose);
    }

    fn show_loading(&self, id: ChartId) {
        self.record(id, EngineEvent::ShowLoading);
    }

    fn hide_loading(&self, id: ChartId) {
        self.record(id, EngineEvent::HideLoading);
    }
}

/// Container host fake backed by a map of measured boxes.
#[derive(Default)]
pub struct MockHost {
    containers: DashMap<ChartId, Container>,
}

impl MockHost {
    pub fn insert(&self, id: ChartId, width: u32, height: u32, size_class: SizeClass) {
        self.containers.insert(id, Container { width, height, size_class });
    }

    pub fn remove(&self, id: ChartId) {
        self.containers.remove(&id);
    }
}

impl ChartHost for MockHost {
    fn container(&self, id: ChartId) -> Option<Container> {
        self.containers.get(&id).map(|c| *c)
    }

    fn set_container_size(&self, id: ChartId, width: u32, height: u32) {
        if let Some(mut container) = self.containers.get_mut(&id) {
            container.width = width;
            container.height = height;
        }
    }
}

/// Search backend fake: counts calls, optionally fails or stalls.
pub struct CountingBackend {
    calls: AtomicUsize,
    fail: bool,
    delay: Option<Duration>,
}

impl CountingBackend {
    pub fn ok() -> Self {
        Self { calls: AtomicUsize::new(0), fail: false, delay: None }
    }

    pub fn failing() -> Self {
        Self { calls: AtomicUsize::new(0), fail: true, delay: None }
    }

    pub fn slow() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            delay: Some(Duration::from_secs(5)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for CountingBackend {
    async fn search(&self, _query: &Value) -> Result<ReportDataset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if self.fail {
            return Err(DashboardError::Transport("connection refused".to_string()));
        }
        Ok(generate_mock_dataset())
    }
}

fn build_state(
    config: DashboardConfig,
    missing: &[ChartId],
) -> (Arc<DashboardState>, Arc<MockEngine>) {
    let engine = Arc::new(MockEngine::default());
    let host = Arc::new(MockHost::default());
    for id in catalog::all_charts() {
        if !missing.contains(&id) {
            host.insert(id, 640, 400, SizeClass::Default);
        }
    }
    let registry = ChartRegistry::new(
        engine.clone(),
        host,
        config.max_chart_height,
        config.animations_enabled,
    );
    (Arc::new(DashboardState::new(config, registry)), engine)
}

/// State with every cataloged container present at 640x400.
pub fn test_state_with_mocks() -> (Arc<DashboardState>, Arc<MockEngine>) {
    build_state(DashboardConfig::default(), &[])
}

/// Same, with the given containers absent from the document.
pub fn test_state_missing(missing: &[ChartId]) -> (Arc<DashboardState>, Arc<MockEngine>) {
    build_state(DashboardConfig::default(), missing)
}

pub fn test_state() -> Arc<DashboardState> {
    build_state(DashboardConfig::default(), &[]).0
}

pub fn test_state_with_config(config: DashboardConfig) -> Arc<DashboardState> {
    build_state(config, &[]).0
}
