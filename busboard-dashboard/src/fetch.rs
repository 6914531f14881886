//! Report fetching: serialized network access, TTL cache, mock fallback
//!
//! One fetch at a time. A second trigger while a fetch is in flight is
//! skipped outright, never queued. The happy path consults the TTL cache
//! first; a transport failure substitutes the deterministic mock dataset
//! and surfaces a warning banner, so the dispatcher always receives a
//! dataset with every aggregation it can route.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use busboard_common::{DashboardConfig, DashboardError, ReportDataset, Result};

use crate::mock;
use crate::state::{BannerKind, DashboardState};

/// Search backend collaborator. The production implementation speaks HTTP
/// to an Elasticsearch-style endpoint; tests inject counting fakes.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &Value) -> Result<ReportDataset>;
}

/// HTTP search client. Timeouts are enforced by the underlying client and
/// reported as [`DashboardError::Timeout`].
pub struct EsSearchClient {
    http: reqwest::Client,
    url: String,
}

impl EsSearchClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| DashboardError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: config.search_url.clone(),
        })
    }
}

#[async_trait]
impl SearchBackend for EsSearchClient {
    async fn search(&self, query: &Value) -> Result<ReportDataset> {
        let response = self
            .http
            .post(&self.url)
            .json(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DashboardError::Timeout
                } else {
                    DashboardError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(DashboardError::Transport(format!(
                "search endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<ReportDataset>()
            .await
            .map_err(|e| DashboardError::MalformedData(e.to_string()))
    }
}

/// The aggregation request sent on every fetch: one terms aggregation per
/// dimension, nested sub-aggregations for the matrix views, a per-hour
/// date histogram for the time trend, and a filtered subset for praise
/// reports.
pub fn build_search_query() -> Value {
    json!({
        "size": 0,
        "query": { "match_all": {} },
        "aggs": {
            "nguon_agg": { "terms": { "field": "nguon.keyword", "size": 10 } },
            "xi_nghiep_agg": { "terms": { "field": "xi_nghiep.keyword", "size": 15 } },
            "loai_agg": { "terms": { "field": "loai.keyword", "size": 10 } },
            "cap_do_agg": { "terms": { "field": "cap_do", "size": 5 } },
            "doi_tuong_agg": { "terms": { "field": "doi_tuong.keyword", "size": 10 } },
            "trang_thai_agg": { "terms": { "field": "trang_thai.keyword", "size": 5 } },
            "tuyen_agg": { "terms": { "field": "tuyen.keyword", "size": 20 } },
            "noi_dung_agg": { "terms": { "field": "noi_dung.keyword", "size": 15 } },
            "total_records": { "value_count": { "field": "_id" } },
            "enterprise_type_matrix": {
                "terms": { "field": "xi_nghiep.keyword", "size": 10 },
                "aggs": { "by_type": { "terms": { "field": "loai.keyword", "size": 6 } } }
            },
            "severity_type_matrix": {
                "terms": { "field": "cap_do", "size": 3 },
                "aggs": { "by_type": { "terms": { "field": "loai.keyword", "size": 6 } } }
            },
            "target_analysis": {
                "terms": { "field": "doi_tuong.keyword", "size": 5 },
                "aggs": {
                    "by_source": { "terms": { "field": "nguon.keyword", "size": 3 } },
                    "by_severity": { "terms": { "field": "cap_do", "size": 3 } }
                }
            },
            "time_analysis": {
                "date_histogram": {
                    "field": "created_at",
                    "calendar_interval": "hour",
                    "min_doc_count": 1
                }
            },
            "praise_analysis": {
                "filter": { "term": { "loai.keyword": "Khen ngợi" } },
                "aggs": {
                    "by_source": { "terms": { "field": "nguon.keyword", "size": 3 } },
                    "by_enterprise": { "terms": { "field": "xi_nghiep.keyword", "size": 10 } }
                }
            }
        }
    })
}

pub struct FetchManager {
    state: Arc<DashboardState>,
    backend: Arc<dyn SearchBackend>,
}

impl FetchManager {
    pub fn new(state: Arc<DashboardState>, backend: Arc<dyn SearchBackend>) -> Self {
        Self { state, backend }
    }

    /// Produce the dataset charts should render next.
    ///
    /// Returns `None` when another fetch is already in flight (the trigger
    /// is dropped, not queued). Otherwise the result is always a dataset:
    /// cached when fresh, live when the backend answers, mock when it does
    /// not. The returned dataset has already been stored as the current
    /// one, so late-initializing tabs can pick it up without refetching.
    pub async fn fetch_latest(&self) -> Option<Arc<ReportDataset>> {
        if !self.state.begin_fetch() {
            debug!("fetch already in flight, skipping trigger");
            return None;
        }
        let data = self.fetch_inner().await;
        self.state.end_fetch();
        Some(data)
    }

    async fn fetch_inner(&self) -> Arc<ReportDataset> {
        if let Some(cached) = self.state.cached_report().await {
            debug!("using cached report from {}", cached.fetched_at);
            self.state.set_last_dataset(cached.data.clone());
            return cached.data;
        }

        let query = build_search_query();
        let data = match self.backend.search(&query).await {
            Ok(dataset) => {
                info!(
                    "fetched report with {} aggregations",
                    dataset.aggregations.len()
                );
                Arc::new(dataset)
            }
            Err(e) => {
                warn!("search backend unavailable, using mock data: {}", e);
                self.state.publish_banner(
                    BannerKind::Warning,
                    "Không thể kết nối máy chủ dữ liệu, đang hiển thị dữ liệu mẫu",
                );
                Arc::new(mock::generate_mock_dataset())
            }
        };

        self.state.store_report(data.clone()).await;
        self.state.set_last_dataset(data.clone());
        data
    }
}
