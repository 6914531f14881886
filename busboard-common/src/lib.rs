//! Shared vocabulary for the BusBoard dashboard
//!
//! This crate provides:
//! - The error taxonomy used across the dashboard
//! - Core identifiers (chart ids, tabs, size classes)
//! - The report/aggregation data model returned by the search backend
//! - Dashboard configuration

pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use report::{Aggregation, Bucket, BucketKey, DateBucket, ReportDataset, SummaryStats};
pub use types::{ChartId, SizeClass, Tab};
