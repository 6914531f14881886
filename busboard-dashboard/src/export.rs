//! Spreadsheet export
//!
//! Turns the current dataset into tabular sheets (header row plus one row
//! per bucket, with percentage-of-total columns) and hands them to a
//! writer collaborator. The bundled writer emits one CSV file per sheet;
//! the sheet model itself is format-agnostic.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use busboard_common::report::{agg, ReportDataset};
use busboard_common::{DashboardError, Result};

/// The exportable report types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    SourceAnalysis,
    TargetAnalysis,
    RouteAnalysis,
    EnterpriseAnalysis,
    PraiseAnalysis,
    Comprehensive,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::SourceAnalysis,
        ReportKind::TargetAnalysis,
        ReportKind::RouteAnalysis,
        ReportKind::EnterpriseAnalysis,
        ReportKind::PraiseAnalysis,
        ReportKind::Comprehensive,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::SourceAnalysis => "source-analysis",
            ReportKind::TargetAnalysis => "target-analysis",
            ReportKind::RouteAnalysis => "route-analysis",
            ReportKind::EnterpriseAnalysis => "enterprise-analysis",
            ReportKind::PraiseAnalysis => "praise-analysis",
            ReportKind::Comprehensive => "tong_hop",
        }
    }

    /// Download file stem: report slug plus the current date.
    pub fn file_stem(&self, at: DateTime<Utc>) -> String {
        format!("bao_cao_{}_{}", self.slug(), at.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for ReportKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "source-analysis" => Ok(ReportKind::SourceAnalysis),
            "target-analysis" => Ok(ReportKind::TargetAnalysis),
            "route-analysis" => Ok(ReportKind::RouteAnalysis),
            "enterprise-analysis" => Ok(ReportKind::EnterpriseAnalysis),
            "praise-analysis" => Ok(ReportKind::PraiseAnalysis),
            "comprehensive" | "tong_hop" => Ok(ReportKind::Comprehensive),
            other => Err(DashboardError::Export(format!(
                "unsupported report type: {other}"
            ))),
        }
    }
}

/// One tabular sheet: a name, a header row and data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// Writer collaborator. The output format is up to the implementation;
/// sheets arrive as plain string rows.
pub trait WorkbookWriter: Send + Sync {
    /// Persist the workbook under the given file stem, returning the
    /// paths written.
    fn write(&self, workbook: &Workbook, stem: &str) -> Result<Vec<PathBuf>>;
}

/// Writes one CSV file per sheet: `<stem>.csv` for a single-sheet
/// workbook, `<stem>_<sheet>.csv` otherwise.
pub struct CsvWorkbookWriter {
    dir: PathBuf,
}

impl CsvWorkbookWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl WorkbookWriter for CsvWorkbookWriter {
    fn write(&self, workbook: &Workbook, stem: &str) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(workbook.sheets.len());
        for sheet in &workbook.sheets {
            let file_name = if workbook.sheets.len() == 1 {
                format!("{stem}.csv")
            } else {
                format!("{stem}_{}.csv", slugify(&sheet.name))
            };
            let path = self.dir.join(file_name);
            let mut writer = csv::Writer::from_writer(File::create(&path)?);
            for row in &sheet.rows {
                writer
                    .write_record(row)
                    .map_err(|e| DashboardError::Export(e.to_string()))?;
            }
            writer
                .flush()
                .map_err(|e| DashboardError::Export(e.to_string()))?;
            paths.push(path);
        }
        info!("exported {} sheets under stem {}", paths.len(), stem);
        Ok(paths)
    }
}

fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

fn percent_cell(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", count as f64 / total as f64 * 100.0)
}

fn total_records(data: &ReportDataset) -> Result<u64> {
    data.total_records().ok_or_else(|| {
        DashboardError::Export(format!("missing aggregation {}", agg::TOTAL_RECORDS))
    })
}

fn terms<'a>(data: &'a ReportDataset, name: &str) -> Result<&'a [busboard_common::report::Bucket]> {
    data.terms(name)
        .ok_or_else(|| DashboardError::Export(format!("missing aggregation {name}")))
}

/// Build the sheets for one report type from the current dataset.
pub fn build_workbook(kind: ReportKind, data: &ReportDataset) -> Result<Workbook> {
    let sheets = match kind {
        ReportKind::SourceAnalysis => vec![source_sheet(data, "Phân tích nguồn")?],
        ReportKind::TargetAnalysis => vec![target_sheet(data, "Phân tích đối tượng")?],
        ReportKind::RouteAnalysis => vec![route_sheet(data, "Phân tích tuyến")?],
        ReportKind::EnterpriseAnalysis => vec![enterprise_sheet(data, "Phân tích xí nghiệp")?],
        ReportKind::PraiseAnalysis => vec![praise_sheet(data)?],
        ReportKind::Comprehensive => vec![
            summary_sheet(data)?,
            source_sheet(data, "Nguồn")?,
            target_sheet(data, "Đối tượng")?,
            route_sheet(data, "Tuyến")?,
            enterprise_sheet(data, "Xí nghiệp")?,
        ],
    };
    Ok(Workbook { sheets })
}

fn source_sheet(data: &ReportDataset, name: &str) -> Result<Sheet> {
    let total = total_records(data)?;
    let mut rows = vec![vec![
        "Nguồn".to_string(),
        "Số lượng".to_string(),
        "Tỷ lệ %".to_string(),
    ]];
    for bucket in terms(data, agg::SOURCE)? {
        rows.push(vec![
            bucket.key.as_display(),
            bucket.doc_count.to_string(),
            percent_cell(bucket.doc_count, total),
        ]);
    }
    Ok(Sheet {
        name: name.to_string(),
        rows,
    })
}

fn target_sheet(data: &ReportDataset, name: &str) -> Result<Sheet> {
    let total = total_records(data)?;
    let mut rows = vec![vec![
        "Đối tượng".to_string(),
        "Số lượng".to_string(),
        "Tỷ lệ %".to_string(),
    ]];
    for bucket in terms(data, agg::TARGET)? {
        rows.push(vec![
            bucket.key.as_display(),
            bucket.doc_count.to_string(),
            percent_cell(bucket.doc_count, total),
        ]);
    }
    Ok(Sheet {
        name: name.to_string(),
        rows,
    })
}

/// Route sheet ranks by bucket position: the first five routes are high
/// priority, the next five medium, the rest low.
fn route_sheet(data: &ReportDataset, name: &str) -> Result<Sheet> {
    let mut rows = vec![vec![
        "Tuyến".to_string(),
        "Số báo cáo".to_string(),
        "Mức độ ưu tiên".to_string(),
    ]];
    for (index, bucket) in terms(data, agg::ROUTE)?.iter().enumerate() {
        let priority = if index < 5 {
            "Cao"
        } else if index < 10 {
            "Trung bình"
        } else {
            "Thấp"
        };
        rows.push(vec![
            bucket.key.as_display(),
            bucket.doc_count.to_string(),
            priority.to_string(),
        ]);
    }
    Ok(Sheet {
        name: name.to_string(),
        rows,
    })
}

fn enterprise_sheet(data: &ReportDataset, name: &str) -> Result<Sheet> {
    let total = total_records(data)?;
    let mut rows = vec![vec![
        "Xí nghiệp".to_string(),
        "Số báo cáo".to_string(),
        "Tỷ lệ %".to_string(),
        "Xếp hạng".to_string(),
    ]];
    for (index, bucket) in terms(data, agg::ENTERPRISE)?.iter().enumerate() {
        rows.push(vec![
            bucket.key.as_display(),
            bucket.doc_count.to_string(),
            percent_cell(bucket.doc_count, total),
            (index + 1).to_string(),
        ]);
    }
    Ok(Sheet {
        name: name.to_string(),
        rows,
    })
}

fn praise_sheet(data: &ReportDataset) -> Result<Sheet> {
    let (_, sub) = data.filtered(agg::PRAISE_ANALYSIS).ok_or_else(|| {
        DashboardError::Export(format!("missing aggregation {}", agg::PRAISE_ANALYSIS))
    })?;
    let buckets = match sub.get("by_enterprise") {
        Some(busboard_common::report::Aggregation::Terms { buckets }) => buckets,
        _ => {
            return Err(DashboardError::Export(format!(
                "missing aggregation {}.by_enterprise",
                agg::PRAISE_ANALYSIS
            )))
        }
    };
    let mut rows = vec![vec![
        "Xí nghiệp".to_string(),
        "Số lời khen".to_string(),
        "Nguồn chính".to_string(),
    ]];
    for bucket in buckets {
        rows.push(vec![
            bucket.key.as_display(),
            bucket.doc_count.to_string(),
            "Đa nguồn".to_string(),
        ]);
    }
    Ok(Sheet {
        name: "Phân tích khen ngợi".to_string(),
        rows,
    })
}

fn summary_sheet(data: &ReportDataset) -> Result<Sheet> {
    let total = total_records(data)?;
    let enterprises = terms(data, agg::ENTERPRISE)?.len();
    let routes = terms(data, agg::ROUTE)?.len();
    let sources = terms(data, agg::SOURCE)?.len();
    let processed = terms(data, agg::STATUS)?
        .iter()
        .find(|b| b.key.matches(agg::STATUS_PROCESSED))
        .map_or(0, |b| b.doc_count);

    let rows = vec![
        vec!["Chỉ số".to_string(), "Giá trị".to_string()],
        vec!["Tổng số báo cáo".to_string(), total.to_string()],
        vec!["Số xí nghiệp".to_string(), enterprises.to_string()],
        vec!["Số tuyến".to_string(), routes.to_string()],
        vec!["Số nguồn".to_string(), sources.to_string()],
        vec![
            "Tỷ lệ đã xử lý".to_string(),
            format!("{}%", percent_cell(processed, total)),
        ],
    ];
    Ok(Sheet {
        name: "Tổng quan".to_string(),
        rows,
    })
}
