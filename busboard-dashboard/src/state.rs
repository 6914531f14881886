//! Shared dashboard state
//!
//! One `DashboardState` instance owns everything that lives for the page
//! lifetime: the chart registry, the initialized-tab set, the active tab,
//! the fetch-serialization flag, the report cache, and the banner channel.
//! Components hold an `Arc<DashboardState>` instead of threading a dozen
//! globals around.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use busboard_common::{DashboardConfig, ReportDataset, Tab};

use crate::registry::ChartRegistry;

/// All report charts share one dataset, so the cache holds one entry.
const REPORT_CACHE_KEY: &str = "report";

/// One cached fetch result with its fetch timestamp.
#[derive(Clone)]
pub struct CachedReport {
    pub data: Arc<ReportDataset>,
    pub fetched_at: DateTime<Utc>,
}

/// Severity of a user-facing notification banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Warning,
    Error,
}

/// User-facing notification published on the banner channel.
#[derive(Debug, Clone)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

pub struct DashboardState {
    pub config: DashboardConfig,
    pub registry: ChartRegistry,
    initialized_tabs: RwLock<HashSet<Tab>>,
    active_tab: RwLock<Tab>,
    fetch_in_flight: AtomicBool,
    page_visible: AtomicBool,
    resize_epoch: AtomicU64,
    last_dataset: RwLock<Option<Arc<ReportDataset>>>,
    cache: Cache<&'static str, CachedReport>,
    banner_tx: broadcast::Sender<Banner>,
    auto_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardState {
    pub fn new(config: DashboardConfig, registry: ChartRegistry) -> Self {
        let cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(config.cache_ttl())
            .build();
        let (banner_tx, _) = broadcast::channel(16);
        Self {
            config,
            registry,
            initialized_tabs: RwLock::new(HashSet::new()),
            active_tab: RwLock::new(Tab::default()),
            fetch_in_flight: AtomicBool::new(false),
            page_visible: AtomicBool::new(true),
            resize_epoch: AtomicU64::new(0),
            last_dataset: RwLock::new(None),
            cache,
            banner_tx,
            auto_refresh: Mutex::new(None),
        }
    }

    // --- tab bookkeeping ---

    /// Mark a tab initialized. Returns `false` when it already was, so the
    /// caller skips construction. The check and insert are a single atomic
    /// step under the lock; a tab is never initialized twice.
    pub fn mark_tab_initialized(&self, tab: Tab) -> bool {
        let mut tabs = self.initialized_tabs.write().unwrap_or_else(|e| e.into_inner());
        tabs.insert(tab)
    }

    pub fn is_tab_initialized(&self, tab: Tab) -> bool {
        let tabs = self.initialized_tabs.read().unwrap_or_else(|e| e.into_inner());
        tabs.contains(&tab)
    }

    pub fn initialized_tab_count(&self) -> usize {
        let tabs = self.initialized_tabs.read().unwrap_or_else(|e| e.into_inner());
        tabs.len()
    }

    pub fn active_tab(&self) -> Tab {
        *self.active_tab.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_active_tab(&self, tab: Tab) {
        *self.active_tab.write().unwrap_or_else(|e| e.into_inner()) = tab;
    }

    // --- fetch serialization ---

    /// Claim the single fetch slot. Returns `false` when a fetch is already
    /// running; the caller must skip, not queue. The winner releases the
    /// slot with [`end_fetch`](Self::end_fetch).
    pub fn begin_fetch(&self) -> bool {
        self.fetch_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_fetch(&self) {
        self.fetch_in_flight.store(false, Ordering::Release);
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight.load(Ordering::Acquire)
    }

    // --- visibility ---

    pub fn page_visible(&self) -> bool {
        self.page_visible.load(Ordering::Acquire)
    }

    pub fn set_page_visible(&self, visible: bool) {
        self.page_visible.store(visible, Ordering::Release);
    }

    // --- resize debouncing ---

    /// Advance the resize epoch, invalidating any pending debounce timer.
    /// Returns the new epoch for the timer being scheduled now.
    pub fn bump_resize_epoch(&self) -> u64 {
        self.resize_epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn resize_epoch(&self) -> u64 {
        self.resize_epoch.load(Ordering::Acquire)
    }

    // --- report data ---

    /// The most recent dataset dispatched to charts, real or mock. Kept
    /// outside the TTL cache so late tab initialization can render without
    /// refetching.
    pub fn last_dataset(&self) -> Option<Arc<ReportDataset>> {
        self.last_dataset
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_last_dataset(&self, data: Arc<ReportDataset>) {
        *self.last_dataset.write().unwrap_or_else(|e| e.into_inner()) = Some(data);
    }

    pub fn clear_last_dataset(&self) {
        *self.last_dataset.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub async fn cached_report(&self) -> Option<CachedReport> {
        self.cache.get(&REPORT_CACHE_KEY).await
    }

    pub async fn store_report(&self, data: Arc<ReportDataset>) {
        let entry = CachedReport {
            data,
            fetched_at: Utc::now(),
        };
        self.cache.insert(REPORT_CACHE_KEY, entry).await;
    }

    pub async fn invalidate_cache(&self) {
        self.cache.invalidate(&REPORT_CACHE_KEY).await;
    }

    // --- banners ---

    pub fn publish_banner(&self, kind: BannerKind, message: impl Into<String>) {
        let banner = Banner {
            kind,
            message: message.into(),
        };
        debug!("banner {:?}: {}", banner.kind, banner.message);
        // Send fails only when no UI is subscribed, which is fine.
        let _ = self.banner_tx.send(banner);
    }

    pub fn subscribe_banners(&self) -> broadcast::Receiver<Banner> {
        self.banner_tx.subscribe()
    }

    // --- background tasks ---

    /// Register the auto-refresh task, aborting any previous one.
    pub fn set_auto_refresh_task(&self, handle: JoinHandle<()>) {
        let mut slot = self.auto_refresh.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = slot.replace(handle) {
            old.abort();
        }
    }

    pub fn abort_auto_refresh(&self) {
        let mut slot = self.auto_refresh.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}
