//! Per-chart option builders
//!
//! Each builder is a pure function from the current dataset to the
//! declarative option object handed to the rendering engine. A builder
//! fails with `MalformedData` when the aggregation it depends on is
//! absent or has the wrong shape; the dispatcher turns that into a
//! skipped chart, never a crashed dispatch.

use serde_json::{json, Value};

use busboard_common::report::{agg, percent_of, Bucket, ReportDataset};
use busboard_common::{DashboardError, Result};

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| DashboardError::MalformedData(format!("missing aggregation {name}")))
}

fn severity_label(bucket: &Bucket) -> String {
    match bucket.key.as_display().as_str() {
        "1" => "Thấp".to_string(),
        "2" => "Trung bình".to_string(),
        "3" => "Cao".to_string(),
        other => other.to_string(),
    }
}

fn pie_data(buckets: &[Bucket]) -> Vec<Value> {
    buckets
        .iter()
        .map(|b| json!({ "value": b.doc_count, "name": b.key.as_display() }))
        .collect()
}

fn bar_axis(buckets: &[Bucket]) -> (Vec<String>, Vec<u64>) {
    let labels = buckets.iter().map(|b| b.key.as_display()).collect();
    let counts = buckets.iter().map(|b| b.doc_count).collect();
    (labels, counts)
}

// --- overview tab ---

/// Source-distribution doughnut. Exposes the grand total and each slice's
/// percentage of it alongside the raw counts.
pub fn source_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::SOURCE), agg::SOURCE)?;
    let total: u64 = buckets.iter().map(|b| b.doc_count).sum();
    let slices: Vec<Value> = buckets
        .iter()
        .map(|b| {
            json!({
                "value": b.doc_count,
                "name": b.key.as_display(),
                "percent": percent_of(b.doc_count, total),
            })
        })
        .collect();
    Ok(json!({
        "tooltip": { "trigger": "item" },
        "legend": { "orient": "vertical", "left": "left" },
        "total": total,
        "series": [{
            "name": "Nguồn báo cáo",
            "type": "pie",
            "radius": ["40%", "70%"],
            "data": slices,
        }],
    }))
}

pub fn enterprise_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::ENTERPRISE), agg::ENTERPRISE)?;
    let (labels, counts) = bar_axis(buckets);
    Ok(json!({
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "category", "data": labels, "axisLabel": { "rotate": 30 } },
        "yAxis": { "type": "value" },
        "series": [{ "name": "Xí nghiệp", "type": "bar", "data": counts }],
    }))
}

pub fn type_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::TYPE), agg::TYPE)?;
    Ok(json!({
        "tooltip": { "trigger": "item", "formatter": "{a} <br/>{b}: {c} ({d}%)" },
        "series": [{
            "name": "Loại báo cáo",
            "type": "pie",
            "radius": "50%",
            "data": pie_data(buckets),
        }],
    }))
}

pub fn severity_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::SEVERITY), agg::SEVERITY)?;
    let slices: Vec<Value> = buckets
        .iter()
        .map(|b| json!({ "value": b.doc_count, "name": severity_label(b) }))
        .collect();
    Ok(json!({
        "tooltip": { "trigger": "item", "formatter": "{a} <br/>{b}: {c} ({d}%)" },
        "series": [{ "name": "Cấp độ", "type": "pie", "radius": "50%", "data": slices }],
    }))
}

pub fn target_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::TARGET), agg::TARGET)?;
    Ok(json!({
        "tooltip": { "trigger": "item" },
        "series": [{
            "name": "Đối tượng",
            "type": "pie",
            "radius": ["30%", "60%"],
            "data": pie_data(buckets),
        }],
    }))
}

pub fn status_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::STATUS), agg::STATUS)?;
    Ok(json!({
        "tooltip": { "trigger": "item", "formatter": "{a} <br/>{b}: {c} ({d}%)" },
        "series": [{ "name": "Trạng thái", "type": "pie", "radius": "50%", "data": pie_data(buckets) }],
    }))
}

pub fn route_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::ROUTE), agg::ROUTE)?;
    let (labels, counts) = bar_axis(buckets);
    Ok(json!({
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "category", "data": labels },
        "yAxis": { "type": "value" },
        "series": [{ "name": "Tuyến", "type": "bar", "data": counts }],
    }))
}

pub fn content_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::CONTENT), agg::CONTENT)?;
    let (labels, counts) = bar_axis(buckets);
    Ok(json!({
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "value" },
        "yAxis": { "type": "category", "data": labels, "inverse": true },
        "series": [{ "name": "Nội dung", "type": "bar", "data": counts }],
    }))
}

// --- detailed tab ---

/// Stacked bar of report types per enterprise, one series per type.
pub fn enterprise_type_matrix_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::ENTERPRISE_TYPE_MATRIX), agg::ENTERPRISE_TYPE_MATRIX)?;
    let enterprises: Vec<String> = buckets.iter().map(|b| b.key.as_display()).collect();

    let mut type_names: Vec<String> = Vec::new();
    for bucket in buckets {
        for sub in bucket.sub_terms("by_type").unwrap_or(&[]) {
            let name = sub.key.as_display();
            if !type_names.contains(&name) {
                type_names.push(name);
            }
        }
    }

    let series: Vec<Value> = type_names
        .iter()
        .map(|type_name| {
            let counts: Vec<u64> = buckets
                .iter()
                .map(|b| {
                    b.sub_terms("by_type")
                        .unwrap_or(&[])
                        .iter()
                        .find(|s| s.key.matches(type_name))
                        .map_or(0, |s| s.doc_count)
                })
                .collect();
            json!({ "name": type_name, "type": "bar", "stack": "total", "data": counts })
        })
        .collect();

    Ok(json!({
        "tooltip": { "trigger": "axis", "axisPointer": { "type": "shadow" } },
        "legend": {},
        "xAxis": { "type": "category", "data": enterprises, "axisLabel": { "rotate": 30 } },
        "yAxis": { "type": "value" },
        "series": series,
    }))
}

pub fn time_trend_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.date_histogram(agg::TIME_ANALYSIS), agg::TIME_ANALYSIS)?;
    let labels: Vec<&str> = buckets.iter().map(|b| b.key_as_string.as_str()).collect();
    let counts: Vec<u64> = buckets.iter().map(|b| b.doc_count).collect();
    Ok(json!({
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "category", "data": labels },
        "yAxis": { "type": "value" },
        "series": [{ "name": "Báo cáo theo giờ", "type": "line", "smooth": true, "areaStyle": {}, "data": counts }],
    }))
}

pub fn severity_type_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::SEVERITY_TYPE_MATRIX), agg::SEVERITY_TYPE_MATRIX)?;
    let severities: Vec<String> = buckets.iter().map(severity_label).collect();

    let mut type_names: Vec<String> = Vec::new();
    for bucket in buckets {
        for sub in bucket.sub_terms("by_type").unwrap_or(&[]) {
            let name = sub.key.as_display();
            if !type_names.contains(&name) {
                type_names.push(name);
            }
        }
    }

    let series: Vec<Value> = type_names
        .iter()
        .map(|type_name| {
            let counts: Vec<u64> = buckets
                .iter()
                .map(|b| {
                    b.sub_terms("by_type")
                        .unwrap_or(&[])
                        .iter()
                        .find(|s| s.key.matches(type_name))
                        .map_or(0, |s| s.doc_count)
                })
                .collect();
            json!({ "name": type_name, "type": "bar", "stack": "severity", "data": counts })
        })
        .collect();

    Ok(json!({
        "tooltip": { "trigger": "axis", "axisPointer": { "type": "shadow" } },
        "legend": {},
        "xAxis": { "type": "category", "data": severities },
        "yAxis": { "type": "value" },
        "series": series,
    }))
}

/// Risk scatter: severity level against report volume, bubble size by
/// volume.
pub fn risk_analysis_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::SEVERITY_TYPE_MATRIX), agg::SEVERITY_TYPE_MATRIX)?;
    let points: Vec<Value> = buckets
        .iter()
        .map(|b| json!([b.key.as_display(), b.doc_count, b.doc_count / 100]))
        .collect();
    Ok(json!({
        "tooltip": { "trigger": "item" },
        "xAxis": { "type": "category", "name": "Cấp độ" },
        "yAxis": { "type": "value", "name": "Số báo cáo" },
        "series": [{ "name": "Mức rủi ro", "type": "scatter", "data": points }],
    }))
}

pub fn route_monthly_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::ROUTE), agg::ROUTE)?;
    let top: Vec<&Bucket> = buckets.iter().take(10).collect();
    let labels: Vec<String> = top.iter().map(|b| b.key.as_display()).collect();
    let counts: Vec<u64> = top.iter().map(|b| b.doc_count).collect();
    Ok(json!({
        "tooltip": { "trigger": "axis" },
        "legend": {},
        "xAxis": { "type": "category", "data": labels },
        "yAxis": { "type": "value" },
        "series": [{ "name": "Báo cáo theo tuyến", "type": "bar", "data": counts }],
    }))
}

// --- analytics tab ---

/// Per-target breakdown, shared by the CNLX, GARA and NVPV charts: the
/// target's reports split by source, with its severity profile alongside.
pub fn target_breakdown_options(data: &ReportDataset, target: &str) -> Result<Value> {
    let buckets = require(data.terms(agg::TARGET_ANALYSIS), agg::TARGET_ANALYSIS)?;
    let bucket = require(
        buckets.iter().find(|b| b.key.matches(target)),
        agg::TARGET_ANALYSIS,
    )?;
    let by_source = bucket.sub_terms("by_source").unwrap_or(&[]);
    let by_severity = bucket.sub_terms("by_severity").unwrap_or(&[]);
    let severity_slices: Vec<Value> = by_severity
        .iter()
        .map(|b| json!({ "value": b.doc_count, "name": severity_label(b) }))
        .collect();
    Ok(json!({
        "tooltip": { "trigger": "item" },
        "legend": { "bottom": 0 },
        "total": bucket.doc_count,
        "series": [
            {
                "name": format!("{target} theo nguồn"),
                "type": "pie",
                "radius": ["20%", "45%"],
                "center": ["30%", "50%"],
                "data": pie_data(by_source),
            },
            {
                "name": format!("{target} theo cấp độ"),
                "type": "pie",
                "radius": ["20%", "45%"],
                "center": ["70%", "50%"],
                "data": severity_slices,
            },
        ],
    }))
}

fn praise_sub_terms<'a>(data: &'a ReportDataset, sub_name: &str) -> Result<&'a [Bucket]> {
    let (_, sub) = require(data.filtered(agg::PRAISE_ANALYSIS), agg::PRAISE_ANALYSIS)?;
    match sub.get(sub_name) {
        Some(busboard_common::report::Aggregation::Terms { buckets }) => Ok(buckets),
        _ => Err(DashboardError::MalformedData(format!(
            "missing aggregation {}.{sub_name}",
            agg::PRAISE_ANALYSIS
        ))),
    }
}

pub fn praise_by_source_options(data: &ReportDataset) -> Result<Value> {
    let buckets = praise_sub_terms(data, "by_source")?;
    Ok(json!({
        "tooltip": { "trigger": "item", "formatter": "{a} <br/>{b}: {c} ({d}%)" },
        "series": [{ "name": "Khen ngợi theo nguồn", "type": "pie", "radius": "50%", "data": pie_data(buckets) }],
    }))
}

pub fn praise_by_enterprise_options(data: &ReportDataset) -> Result<Value> {
    let buckets = praise_sub_terms(data, "by_enterprise")?;
    let (labels, counts) = bar_axis(buckets);
    Ok(json!({
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "value" },
        "yAxis": { "type": "category", "data": labels, "inverse": true },
        "series": [{ "name": "Khen ngợi theo xí nghiệp", "type": "bar", "data": counts }],
    }))
}

/// Processed-versus-pending gauge built from the status aggregation.
pub fn response_rate_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::STATUS), agg::STATUS)?;
    let total: u64 = buckets.iter().map(|b| b.doc_count).sum();
    let processed = buckets
        .iter()
        .find(|b| b.key.matches(agg::STATUS_PROCESSED))
        .map_or(0, |b| b.doc_count);
    let rate = percent_of(processed, total);
    Ok(json!({
        "tooltip": { "formatter": "{a} <br/>{b}: {c}%" },
        "series": [{
            "name": "Tỷ lệ xử lý",
            "type": "gauge",
            "max": 100,
            "data": [{ "value": rate, "name": "Đã xử lý" }],
        }],
    }))
}

pub fn response_time_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.date_histogram(agg::TIME_ANALYSIS), agg::TIME_ANALYSIS)?;
    let labels: Vec<&str> = buckets.iter().map(|b| b.key_as_string.as_str()).collect();
    let counts: Vec<u64> = buckets.iter().map(|b| b.doc_count).collect();
    Ok(json!({
        "tooltip": { "trigger": "axis" },
        "xAxis": { "type": "category", "data": labels },
        "yAxis": { "type": "value" },
        "series": [{ "name": "Khối lượng theo giờ", "type": "bar", "data": counts }],
    }))
}

/// Relation graph linking targets to the sources reporting on them.
pub fn network_analysis_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::TARGET_ANALYSIS), agg::TARGET_ANALYSIS)?;
    let mut nodes: Vec<Value> = Vec::new();
    let mut links: Vec<Value> = Vec::new();
    let mut source_names: Vec<String> = Vec::new();

    for bucket in buckets {
        let target = bucket.key.as_display();
        nodes.push(json!({
            "name": target,
            "symbolSize": (bucket.doc_count / 100).max(10),
            "category": 0,
        }));
        for sub in bucket.sub_terms("by_source").unwrap_or(&[]) {
            let source = sub.key.as_display();
            if !source_names.contains(&source) {
                source_names.push(source.clone());
                nodes.push(json!({
                    "name": source,
                    "symbolSize": 20,
                    "category": 1,
                }));
            }
            links.push(json!({
                "source": source,
                "target": target,
                "value": sub.doc_count,
            }));
        }
    }

    Ok(json!({
        "tooltip": {},
        "series": [{
            "name": "Liên kết nguồn",
            "type": "graph",
            "layout": "force",
            "roam": true,
            "categories": [{ "name": "Đối tượng" }, { "name": "Nguồn" }],
            "data": nodes,
            "links": links,
        }],
    }))
}

/// Enterprise-by-type heatmap cells from the matrix aggregation.
pub fn heatmap_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::ENTERPRISE_TYPE_MATRIX), agg::ENTERPRISE_TYPE_MATRIX)?;
    let enterprises: Vec<String> = buckets.iter().map(|b| b.key.as_display()).collect();

    let mut type_names: Vec<String> = Vec::new();
    let mut cells: Vec<Value> = Vec::new();
    let mut max_count = 0u64;
    for (x, bucket) in buckets.iter().enumerate() {
        for sub in bucket.sub_terms("by_type").unwrap_or(&[]) {
            let name = sub.key.as_display();
            let y = match type_names.iter().position(|n| *n == name) {
                Some(pos) => pos,
                None => {
                    type_names.push(name);
                    type_names.len() - 1
                }
            };
            max_count = max_count.max(sub.doc_count);
            cells.push(json!([x, y, sub.doc_count]));
        }
    }

    Ok(json!({
        "tooltip": { "position": "top" },
        "xAxis": { "type": "category", "data": enterprises, "axisLabel": { "rotate": 30 } },
        "yAxis": { "type": "category", "data": type_names },
        "visualMap": { "min": 0, "max": max_count, "orient": "horizontal", "left": "center" },
        "series": [{ "name": "Mật độ báo cáo", "type": "heatmap", "data": cells }],
    }))
}

/// Severity-to-volume correlation scatter with per-type detail points.
pub fn correlation_options(data: &ReportDataset) -> Result<Value> {
    let buckets = require(data.terms(agg::SEVERITY_TYPE_MATRIX), agg::SEVERITY_TYPE_MATRIX)?;
    let mut points: Vec<Value> = Vec::new();
    for bucket in buckets {
        let severity = bucket.key.as_display();
        for sub in bucket.sub_terms("by_type").unwrap_or(&[]) {
            points.push(json!([severity, sub.doc_count, sub.key.as_display()]));
        }
    }
    Ok(json!({
        "tooltip": { "trigger": "item" },
        "xAxis": { "type": "category", "name": "Cấp độ" },
        "yAxis": { "type": "value", "name": "Số báo cáo" },
        "series": [{ "name": "Tương quan cấp độ", "type": "scatter", "symbolSize": 14, "data": points }],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::generate_mock_dataset;

    #[test]
    fn test_source_options_expose_total_and_percentages() {
        let data = generate_mock_dataset();
        let options = source_options(&data).unwrap();

        assert_eq!(options["total"], 10_000);
        let slices = options["series"][0]["data"].as_array().unwrap();
        let facebook = slices
            .iter()
            .find(|s| s["name"] == "facebook")
            .unwrap();
        assert_eq!(facebook["value"], 3440);
        assert_eq!(facebook["percent"], 34.4);
    }

    #[test]
    fn test_missing_aggregation_is_a_builder_error() {
        let data = ReportDataset::default();
        let err = source_options(&data).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedData(_)));
        assert!(time_trend_options(&data).is_err());
        assert!(praise_by_source_options(&data).is_err());
    }

    #[test]
    fn test_matrix_builder_emits_one_series_per_type() {
        let data = generate_mock_dataset();
        let options = enterprise_type_matrix_options(&data).unwrap();
        let series = options["series"].as_array().unwrap();
        // Mock matrix carries four distinct report types.
        assert_eq!(series.len(), 4);
        for s in series {
            assert_eq!(s["stack"], "total");
            assert_eq!(s["data"].as_array().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_severity_keys_map_to_vietnamese_labels() {
        let data = generate_mock_dataset();
        let options = severity_options(&data).unwrap();
        let names: Vec<&str> = options["series"][0]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Trung bình", "Thấp", "Cao"]);
    }

    #[test]
    fn test_target_breakdown_selects_the_requested_target() {
        let data = generate_mock_dataset();
        let options = target_breakdown_options(&data, "GARA").unwrap();
        assert_eq!(options["total"], 3337);
        assert!(target_breakdown_options(&data, "UNKNOWN").is_err());
    }

    #[test]
    fn test_response_rate_uses_processed_share() {
        let data = generate_mock_dataset();
        let options = response_rate_options(&data).unwrap();
        // 5012 of 10000 processed.
        assert_eq!(options["series"][0]["data"][0]["value"], 50.1);
    }

    #[test]
    fn test_network_links_every_source_to_every_target() {
        let data = generate_mock_dataset();
        let options = network_analysis_options(&data).unwrap();
        let series = &options["series"][0];
        // 3 targets + 3 distinct sources.
        assert_eq!(series["data"].as_array().unwrap().len(), 6);
        assert_eq!(series["links"].as_array().unwrap().len(), 9);
    }
}
