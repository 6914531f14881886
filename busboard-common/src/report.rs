//! Report data model for the aggregation search backend
//!
//! The backend answers a single search request with a set of named
//! aggregations. Each aggregation is one of four shapes, modeled here as a
//! sum type instead of ad hoc property-presence checks:
//! - `Terms`: ranked buckets (insertion order is ranking order)
//! - `DateHistogram`: time buckets carrying a formatted timestamp
//! - `ValueCount`: a single counter
//! - `Filtered`: a filtered subset count with nested sub-aggregations
//!
//! A `ReportDataset` is immutable once produced; a new fetch produces a
//! wholly new dataset shared by reference across consumers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known aggregation names produced by the search query and routed by
/// the chart update dispatcher.
pub mod agg {
    pub const SOURCE: &str = "nguon_agg";
    pub const ENTERPRISE: &str = "xi_nghiep_agg";
    pub const TYPE: &str = "loai_agg";
    pub const SEVERITY: &str = "cap_do_agg";
    pub const TARGET: &str = "doi_tuong_agg";
    pub const STATUS: &str = "trang_thai_agg";
    pub const ROUTE: &str = "tuyen_agg";
    pub const CONTENT: &str = "noi_dung_agg";
    pub const TOTAL_RECORDS: &str = "total_records";
    pub const ENTERPRISE_TYPE_MATRIX: &str = "enterprise_type_matrix";
    pub const SEVERITY_TYPE_MATRIX: &str = "severity_type_matrix";
    pub const TARGET_ANALYSIS: &str = "target_analysis";
    pub const TIME_ANALYSIS: &str = "time_analysis";
    pub const PRAISE_ANALYSIS: &str = "praise_analysis";

    /// Status bucket key that counts as processed.
    pub const STATUS_PROCESSED: &str = "Đã xử lý";
}

/// Bucket key from a terms aggregation. Most dimensions use string keys;
/// severity levels come back as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketKey {
    Num(i64),
    Text(String),
}

impl BucketKey {
    pub fn as_display(&self) -> String {
        match self {
            BucketKey::Num(n) => n.to_string(),
            BucketKey::Text(s) => s.clone(),
        }
    }

    pub fn matches(&self, s: &str) -> bool {
        match self {
            BucketKey::Num(n) => n.to_string() == s,
            BucketKey::Text(t) => t == s,
        }
    }
}

/// One category's key and document count from a terms aggregation.
/// Nested sub-aggregations (matrix views) are flattened alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub doc_count: u64,
    #[serde(flatten, default, skip_serializing_if = "HashMap::is_empty")]
    pub sub: HashMap<String, Aggregation>,
}

impl Bucket {
    pub fn new(key: impl Into<String>, doc_count: u64) -> Self {
        Self {
            key: BucketKey::Text(key.into()),
            doc_count,
            sub: HashMap::new(),
        }
    }

    pub fn numeric(key: i64, doc_count: u64) -> Self {
        Self {
            key: BucketKey::Num(key),
            doc_count,
            sub: HashMap::new(),
        }
    }

    pub fn with_sub(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.sub.insert(name.into(), aggregation);
        self
    }

    /// Buckets of a nested terms sub-aggregation, if present.
    pub fn sub_terms(&self, name: &str) -> Option<&[Bucket]> {
        match self.sub.get(name) {
            Some(Aggregation::Terms { buckets }) => Some(buckets),
            _ => None,
        }
    }
}

/// One interval from a date-histogram aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateBucket {
    pub key_as_string: String,
    pub key: i64,
    pub doc_count: u64,
}

/// One named aggregation result.
///
/// Untagged deserialization resolves by field shape. `Terms` comes first
/// so an empty bucket list stays a terms result; date-histogram buckets
/// still fall through to `DateHistogram` because their `key_as_string`
/// field is not a valid sub-aggregation. Filtered results carry a
/// top-level `doc_count`, value counts carry `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Aggregation {
    Terms {
        buckets: Vec<Bucket>,
    },
    DateHistogram {
        buckets: Vec<DateBucket>,
    },
    Filtered {
        doc_count: u64,
        #[serde(flatten, default, skip_serializing_if = "HashMap::is_empty")]
        sub: HashMap<String, Aggregation>,
    },
    ValueCount {
        value: u64,
    },
}

impl Aggregation {
    pub fn terms(buckets: Vec<Bucket>) -> Self {
        Aggregation::Terms { buckets }
    }
}

/// Immutable result of one search round trip. Unknown response fields
/// (hits, took, shards) are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDataset {
    #[serde(default)]
    pub aggregations: HashMap<String, Aggregation>,
}

impl ReportDataset {
    pub fn get(&self, name: &str) -> Option<&Aggregation> {
        self.aggregations.get(name)
    }

    /// Ranked buckets of a terms aggregation, if present and of that shape.
    pub fn terms(&self, name: &str) -> Option<&[Bucket]> {
        match self.aggregations.get(name) {
            Some(Aggregation::Terms { buckets }) => Some(buckets),
            _ => None,
        }
    }

    pub fn date_histogram(&self, name: &str) -> Option<&[DateBucket]> {
        match self.aggregations.get(name) {
            Some(Aggregation::DateHistogram { buckets }) => Some(buckets),
            _ => None,
        }
    }

    pub fn value(&self, name: &str) -> Option<u64> {
        match self.aggregations.get(name) {
            Some(Aggregation::ValueCount { value }) => Some(*value),
            _ => None,
        }
    }

    pub fn filtered(&self, name: &str) -> Option<(u64, &HashMap<String, Aggregation>)> {
        match self.aggregations.get(name) {
            Some(Aggregation::Filtered { doc_count, sub }) => Some((*doc_count, sub)),
            _ => None,
        }
    }

    /// Total record count, falling back to summing the source aggregation
    /// when the value-count aggregation is absent.
    pub fn total_records(&self) -> Option<u64> {
        self.value(agg::TOTAL_RECORDS).or_else(|| {
            self.terms(agg::SOURCE)
                .map(|buckets| buckets.iter().map(|b| b.doc_count).sum())
        })
    }
}

/// Percentage of total, rounded to one decimal place.
pub fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Headline numbers derived from the current dataset, shown above the
/// charts and reused by the comprehensive export sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_records: u64,
    pub enterprise_count: usize,
    pub route_count: usize,
    pub source_count: usize,
    /// Share of reports in the processed state, in percent.
    pub processed_ratio: f64,
}

impl SummaryStats {
    pub fn from_dataset(dataset: &ReportDataset) -> Self {
        let total_records = dataset.total_records().unwrap_or(0);
        let processed = dataset
            .terms(agg::STATUS)
            .and_then(|buckets| {
                buckets
                    .iter()
                    .find(|b| b.key.matches(agg::STATUS_PROCESSED))
                    .map(|b| b.doc_count)
            })
            .unwrap_or(0);

        Self {
            total_records,
            enterprise_count: dataset.terms(agg::ENTERPRISE).map_or(0, |b| b.len()),
            route_count: dataset.terms(agg::ROUTE).map_or(0, |b| b.len()),
            source_count: dataset.terms(agg::SOURCE).map_or(0, |b| b.len()),
            processed_ratio: percent_of(processed, total_records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terms_aggregation_round_trip() {
        let raw = json!({
            "aggregations": {
                "nguon_agg": {
                    "buckets": [
                        { "key": "facebook", "doc_count": 3440 },
                        { "key": "zalo", "doc_count": 3312 }
                    ]
                }
            }
        });

        let dataset: ReportDataset = serde_json::from_value(raw).unwrap();
        let buckets = dataset.terms(agg::SOURCE).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, BucketKey::Text("facebook".into()));
        assert_eq!(buckets[0].doc_count, 3440);
    }

    #[test]
    fn test_numeric_keys_deserialize() {
        let raw = json!({
            "aggregations": {
                "cap_do_agg": {
                    "buckets": [
                        { "key": 2, "doc_count": 4200 },
                        { "key": 1, "doc_count": 3400 }
                    ]
                }
            }
        });

        let dataset: ReportDataset = serde_json::from_value(raw).unwrap();
        let buckets = dataset.terms(agg::SEVERITY).unwrap();
        assert_eq!(buckets[0].key, BucketKey::Num(2));
        assert!(buckets[0].key.matches("2"));
    }

    #[test]
    fn test_empty_terms_buckets_stay_a_terms_result() {
        // A backend with zero matching documents answers an empty bucket
        // list; that is valid data, not a malformed shape.
        let raw = json!({
            "aggregations": {
                "tuyen_agg": { "buckets": [] }
            }
        });

        let dataset: ReportDataset = serde_json::from_value(raw).unwrap();
        assert!(matches!(
            dataset.get(agg::ROUTE),
            Some(Aggregation::Terms { .. })
        ));
        assert_eq!(dataset.terms(agg::ROUTE).map(|b| b.len()), Some(0));
    }

    #[test]
    fn test_aggregation_shapes_disambiguate() {
        let raw = json!({
            "aggregations": {
                "total_records": { "value": 10000 },
                "time_analysis": {
                    "buckets": [
                        { "key_as_string": "1970-01-01T00:29:03.000Z", "key": 1743, "doc_count": 812 }
                    ]
                },
                "praise_analysis": {
                    "doc_count": 1671,
                    "by_source": {
                        "buckets": [ { "key": "facebook", "doc_count": 600 } ]
                    }
                }
            }
        });

        let dataset: ReportDataset = serde_json::from_value(raw).unwrap();
        assert_eq!(dataset.value(agg::TOTAL_RECORDS), Some(10000));
        assert_eq!(dataset.date_histogram(agg::TIME_ANALYSIS).unwrap().len(), 1);

        let (count, sub) = dataset.filtered(agg::PRAISE_ANALYSIS).unwrap();
        assert_eq!(count, 1671);
        assert!(matches!(sub.get("by_source"), Some(Aggregation::Terms { .. })));
    }

    #[test]
    fn test_nested_sub_aggregations_flatten() {
        let raw = json!({
            "aggregations": {
                "enterprise_type_matrix": {
                    "buckets": [
                        {
                            "key": "Buýt Cầu Bươu",
                            "doc_count": 1155,
                            "by_type": {
                                "buckets": [ { "key": "Khác", "doc_count": 400 } ]
                            }
                        }
                    ]
                }
            }
        });

        let dataset: ReportDataset = serde_json::from_value(raw).unwrap();
        let buckets = dataset.terms(agg::ENTERPRISE_TYPE_MATRIX).unwrap();
        let by_type = buckets[0].sub_terms("by_type").unwrap();
        assert_eq!(by_type[0].doc_count, 400);
    }

    #[test]
    fn test_total_records_falls_back_to_source_sum() {
        let mut dataset = ReportDataset::default();
        dataset.aggregations.insert(
            agg::SOURCE.to_string(),
            Aggregation::terms(vec![Bucket::new("facebook", 3440), Bucket::new("zalo", 3312)]),
        );
        assert_eq!(dataset.total_records(), Some(6752));
    }

    #[test]
    fn test_percent_of_rounds_to_one_decimal() {
        assert_eq!(percent_of(3440, 10000), 34.4);
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(5, 0), 0.0);
    }

    #[test]
    fn test_summary_stats() {
        let mut dataset = ReportDataset::default();
        dataset
            .aggregations
            .insert(agg::TOTAL_RECORDS.to_string(), Aggregation::ValueCount { value: 10000 });
        dataset.aggregations.insert(
            agg::STATUS.to_string(),
            Aggregation::terms(vec![
                Bucket::new(agg::STATUS_PROCESSED, 5012),
                Bucket::new("Đang xử lý", 4988),
            ]),
        );
        dataset.aggregations.insert(
            agg::ROUTE.to_string(),
            Aggregation::terms(vec![Bucket::new("BRT01", 253), Bucket::new("49", 202)]),
        );

        let stats = SummaryStats::from_dataset(&dataset);
        assert_eq!(stats.total_records, 10000);
        assert_eq!(stats.route_count, 2);
        assert_eq!(stats.processed_ratio, 50.1);
    }
}
