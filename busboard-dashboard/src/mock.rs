//! Deterministic-shape mock dataset
//!
//! Substituted when the search backend is unreachable. The shape is fixed:
//! every aggregation name the dispatcher can route is present, with the
//! same nesting as the live response. Bucket counts mirror a known
//! reference snapshot; only the time-trend counts are randomized.

use chrono::{DurationRound, Utc};
use rand::Rng;

use busboard_common::report::{agg, Aggregation, Bucket, DateBucket, ReportDataset};

/// Build the full mock dataset, covering all fourteen routable
/// aggregations.
pub fn generate_mock_dataset() -> ReportDataset {
    let mut dataset = ReportDataset::default();
    let aggs = &mut dataset.aggregations;

    aggs.insert(
        agg::TOTAL_RECORDS.to_string(),
        Aggregation::ValueCount { value: 10_000 },
    );

    aggs.insert(
        agg::SOURCE.to_string(),
        Aggregation::terms(vec![
            Bucket::new("facebook", 3440),
            Bucket::new("zalo", 3312),
            Bucket::new("call", 3248),
        ]),
    );

    aggs.insert(
        agg::ENTERPRISE.to_string(),
        Aggregation::terms(vec![
            Bucket::new("Buýt Cầu Bươu", 1155),
            Bucket::new("Xí nghiệp Xe Khách Nam", 1153),
            Bucket::new("Buýt nhanh BRT", 1145),
            Bucket::new("Buýt 10-10", 1127),
            Bucket::new("Công ty Cổ phần Xe Điện", 1008),
            Bucket::new("Xí nghiệp Xe Khách Bắc", 950),
            Bucket::new("Buýt Nội Bài", 890),
            Bucket::new("Xe Khách Phương Nam", 820),
            Bucket::new("Buýt Thăng Long", 780),
            Bucket::new("Xe Buýt Hà Nội", 672),
        ]),
    );

    aggs.insert(
        agg::TYPE.to_string(),
        Aggregation::terms(vec![
            Bucket::new("Khác", 1706),
            Bucket::new("Góp ý", 1703),
            Bucket::new("Khen ngợi", 1671),
            Bucket::new("Phản ánh", 1650),
            Bucket::new("Khiếu nại", 1635),
            Bucket::new("Báo cáo sự cố", 1635),
        ]),
    );

    aggs.insert(
        agg::SEVERITY.to_string(),
        Aggregation::terms(vec![
            Bucket::numeric(2, 4200),
            Bucket::numeric(1, 3400),
            Bucket::numeric(3, 2400),
        ]),
    );

    aggs.insert(
        agg::TARGET.to_string(),
        Aggregation::terms(vec![
            Bucket::new("CNLX", 3390),
            Bucket::new("GARA", 3337),
            Bucket::new("NVPV", 3273),
        ]),
    );

    aggs.insert(
        agg::STATUS.to_string(),
        Aggregation::terms(vec![
            Bucket::new("Đã xử lý", 5012),
            Bucket::new("Đang xử lý", 4988),
        ]),
    );

    aggs.insert(
        agg::ROUTE.to_string(),
        Aggregation::terms(vec![
            Bucket::new("BRT01", 253),
            Bucket::new("49", 202),
            Bucket::new("26", 169),
            Bucket::new("146", 167),
            Bucket::new("17", 158),
            Bucket::new("92", 153),
            Bucket::new("22A", 149),
            Bucket::new("15", 144),
            Bucket::new("12", 143),
            Bucket::new("34", 143),
            Bucket::new("08", 140),
            Bucket::new("23", 138),
            Bucket::new("32", 135),
            Bucket::new("45", 132),
            Bucket::new("67", 128),
        ]),
    );

    aggs.insert(
        agg::CONTENT.to_string(),
        Aggregation::terms(vec![
            Bucket::new("Khác", 5748),
            Bucket::new("Hạ tầng, luồng tuyến", 587),
            Bucket::new("NVPV", 573),
            Bucket::new("Chất lượng phục vụ", 520),
            Bucket::new("Thiết bị xe", 485),
            Bucket::new("Vé, cước", 450),
            Bucket::new("Lịch trình", 420),
            Bucket::new("An toàn giao thông", 380),
            Bucket::new("Vệ sinh xe", 350),
            Bucket::new("Điều độ", 320),
            Bucket::new("Tài xế", 290),
            Bucket::new("Phụ xe", 275),
            Bucket::new("Trạm dừng", 260),
            Bucket::new("Thông tin hành trình", 240),
            Bucket::new("Kỹ thuật xe", 102),
        ]),
    );

    aggs.insert(
        agg::ENTERPRISE_TYPE_MATRIX.to_string(),
        Aggregation::terms(vec![
            Bucket::new("Buýt Cầu Bươu", 1155).with_sub(
                "by_type",
                Aggregation::terms(vec![
                    Bucket::new("Khác", 400),
                    Bucket::new("Góp ý", 300),
                    Bucket::new("Phản ánh", 250),
                    Bucket::new("Khen ngợi", 205),
                ]),
            ),
            Bucket::new("Xí nghiệp Xe Khách Nam", 1153).with_sub(
                "by_type",
                Aggregation::terms(vec![
                    Bucket::new("Khác", 380),
                    Bucket::new("Góp ý", 320),
                    Bucket::new("Phản ánh", 270),
                    Bucket::new("Khen ngợi", 183),
                ]),
            ),
        ]),
    );

    aggs.insert(
        agg::SEVERITY_TYPE_MATRIX.to_string(),
        Aggregation::terms(vec![
            Bucket::numeric(1, 3400).with_sub(
                "by_type",
                Aggregation::terms(vec![
                    Bucket::new("Khen ngợi", 1200),
                    Bucket::new("Góp ý", 1000),
                    Bucket::new("Khác", 1200),
                ]),
            ),
            Bucket::numeric(2, 4200).with_sub(
                "by_type",
                Aggregation::terms(vec![
                    Bucket::new("Phản ánh", 1500),
                    Bucket::new("Góp ý", 1400),
                    Bucket::new("Khác", 1300),
                ]),
            ),
            Bucket::numeric(3, 2400).with_sub(
                "by_type",
                Aggregation::terms(vec![
                    Bucket::new("Khiếu nại", 1200),
                    Bucket::new("Báo cáo sự cố", 800),
                    Bucket::new("Phản ánh", 400),
                ]),
            ),
        ]),
    );

    aggs.insert(
        agg::TARGET_ANALYSIS.to_string(),
        Aggregation::terms(vec![
            target_bucket("CNLX", 3390, [1200, 1100, 1090], [1500, 1000, 890]),
            target_bucket("GARA", 3337, [1150, 1100, 1087], [1400, 1200, 737]),
            target_bucket("NVPV", 3273, [1090, 1112, 1071], [1300, 1200, 773]),
        ]),
    );

    aggs.insert(
        agg::TIME_ANALYSIS.to_string(),
        Aggregation::DateHistogram {
            buckets: generate_time_series(),
        },
    );

    let mut praise_sub = std::collections::HashMap::new();
    praise_sub.insert(
        "by_source".to_string(),
        Aggregation::terms(vec![
            Bucket::new("facebook", 600),
            Bucket::new("zalo", 550),
            Bucket::new("call", 521),
        ]),
    );
    praise_sub.insert(
        "by_enterprise".to_string(),
        Aggregation::terms(vec![
            Bucket::new("Buýt Cầu Bươu", 205),
            Bucket::new("Xí nghiệp Xe Khách Nam", 183),
            Bucket::new("Buýt nhanh BRT", 175),
            Bucket::new("Buýt 10-10", 168),
            Bucket::new("Công ty Cổ phần Xe Điện", 145),
        ]),
    );
    aggs.insert(
        agg::PRAISE_ANALYSIS.to_string(),
        Aggregation::Filtered {
            doc_count: 1671,
            sub: praise_sub,
        },
    );

    dataset
}

fn target_bucket(
    key: &str,
    doc_count: u64,
    by_source: [u64; 3],
    by_severity: [u64; 3],
) -> Bucket {
    Bucket::new(key, doc_count)
        .with_sub(
            "by_source",
            Aggregation::terms(vec![
                Bucket::new("facebook", by_source[0]),
                Bucket::new("zalo", by_source[1]),
                Bucket::new("call", by_source[2]),
            ]),
        )
        .with_sub(
            "by_severity",
            Aggregation::terms(vec![
                Bucket::numeric(2, by_severity[0]),
                Bucket::numeric(1, by_severity[1]),
                Bucket::numeric(3, by_severity[2]),
            ]),
        )
}

/// Nine hourly intervals ending at the current hour, with randomized
/// counts in [500, 2500). Matches the calendar interval the live query
/// requests.
fn generate_time_series() -> Vec<DateBucket> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let end = now
        .duration_trunc(chrono::Duration::hours(1))
        .unwrap_or(now);
    (0..9i64)
        .map(|i| {
            let at = end - chrono::Duration::hours(8 - i);
            DateBucket {
                key_as_string: at.to_rfc3339(),
                key: at.timestamp_millis(),
                doc_count: rng.gen_range(500..2500),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_covers_every_routable_aggregation() {
        let data = generate_mock_dataset();
        assert_eq!(data.aggregations.len(), 14);
        assert_eq!(data.total_records(), Some(10_000));
        assert_eq!(data.terms(agg::SOURCE).unwrap().len(), 3);
        assert_eq!(data.date_histogram(agg::TIME_ANALYSIS).unwrap().len(), 9);
        let (praise_count, praise_sub) = data.filtered(agg::PRAISE_ANALYSIS).unwrap();
        assert_eq!(praise_count, 1671);
        assert!(praise_sub.contains_key("by_source"));
        assert!(praise_sub.contains_key("by_enterprise"));
    }

    #[test]
    fn test_matrix_buckets_carry_nested_terms() {
        let data = generate_mock_dataset();
        let matrix = data.terms(agg::ENTERPRISE_TYPE_MATRIX).unwrap();
        assert_eq!(matrix[0].sub_terms("by_type").unwrap().len(), 4);

        let targets = data.terms(agg::TARGET_ANALYSIS).unwrap();
        for bucket in targets {
            assert!(bucket.sub_terms("by_source").is_some());
            assert!(bucket.sub_terms("by_severity").is_some());
        }
    }

    #[test]
    fn test_time_series_buckets_are_hourly_and_bounded() {
        let data = generate_mock_dataset();
        let buckets = data.date_histogram(agg::TIME_ANALYSIS).unwrap();
        for bucket in buckets {
            assert!((500..2500).contains(&bucket.doc_count));
        }
        for pair in buckets.windows(2) {
            assert_eq!(pair[1].key - pair[0].key, 3_600_000);
        }
        // The newest bucket sits at or just before the current moment.
        assert!(buckets[8].key <= Utc::now().timestamp_millis());
    }

    #[test]
    fn test_mock_survives_a_serde_round_trip() {
        let data = generate_mock_dataset();
        let json = serde_json::to_string(&data).unwrap();
        let back: ReportDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_records(), Some(10_000));
        assert_eq!(
            back.terms(agg::SEVERITY).unwrap()[0].key.as_display(),
            "2"
        );
        assert_eq!(back.date_histogram(agg::TIME_ANALYSIS).unwrap().len(), 9);
    }
}
