//! Static tab catalog: which charts belong to which tab, and which of
//! them are constructed first when a tab becomes active.

use busboard_common::{ChartId, Tab};

pub const SOURCE_CHART: ChartId = "sourceChart";
pub const ENTERPRISE_CHART: ChartId = "enterpriseChart";
pub const TYPE_CHART: ChartId = "typeChart";
pub const SEVERITY_CHART: ChartId = "severityChart";
pub const TARGET_CHART: ChartId = "targetChart";
pub const STATUS_CHART: ChartId = "statusChart";
pub const ROUTE_CHART: ChartId = "routeChart";
pub const CONTENT_CHART: ChartId = "contentChart";

pub const ENTERPRISE_TYPE_MATRIX: ChartId = "enterpriseTypeMatrix";
pub const TIME_TREND_CHART: ChartId = "timeTrendChart";
pub const SEVERITY_TYPE_CHART: ChartId = "severityTypeChart";
pub const RISK_ANALYSIS_CHART: ChartId = "riskAnalysisChart";
pub const ROUTE_MONTHLY_CHART: ChartId = "routeMonthlyChart";

pub const CNLX_ANALYTICS: ChartId = "cnlxAnalytics";
pub const GARA_ANALYTICS: ChartId = "garaAnalytics";
pub const NVPV_ANALYTICS: ChartId = "nvpvAnalytics";
pub const PRAISE_BY_SOURCE_CHART: ChartId = "praiseBySourceChart";
pub const PRAISE_BY_ENTERPRISE_CHART: ChartId = "praiseByEnterpriseChart";
pub const RESPONSE_RATE_CHART: ChartId = "responseRateChart";
pub const RESPONSE_TIME_CHART: ChartId = "responseTimeChart";
pub const NETWORK_ANALYSIS_CHART: ChartId = "networkAnalysisChart";
pub const HEATMAP_CHART: ChartId = "heatmapChart";
pub const CORRELATION_CHART: ChartId = "correlationChart";

const OVERVIEW_CHARTS: &[ChartId] = &[
    SOURCE_CHART,
    ENTERPRISE_CHART,
    TYPE_CHART,
    SEVERITY_CHART,
    TARGET_CHART,
    STATUS_CHART,
    ROUTE_CHART,
    CONTENT_CHART,
];

const DETAILED_CHARTS: &[ChartId] = &[
    ENTERPRISE_TYPE_MATRIX,
    TIME_TREND_CHART,
    SEVERITY_TYPE_CHART,
    RISK_ANALYSIS_CHART,
    ROUTE_MONTHLY_CHART,
];

const ANALYTICS_CHARTS: &[ChartId] = &[
    CNLX_ANALYTICS,
    GARA_ANALYTICS,
    NVPV_ANALYTICS,
    PRAISE_BY_SOURCE_CHART,
    PRAISE_BY_ENTERPRISE_CHART,
    RESPONSE_RATE_CHART,
    RESPONSE_TIME_CHART,
    NETWORK_ANALYSIS_CHART,
    HEATMAP_CHART,
    CORRELATION_CHART,
];

const EXPORTS_CHARTS: &[ChartId] = &[];

/// Charts rendered synchronously when their tab first becomes active.
const HIGH_PRIORITY_CHARTS: &[ChartId] =
    &[SOURCE_CHART, ENTERPRISE_CHART, TYPE_CHART, SEVERITY_CHART];

/// Ordered chart list for a tab. Order is construction and dispatch order.
pub fn charts_for_tab(tab: Tab) -> &'static [ChartId] {
    match tab {
        Tab::Overview => OVERVIEW_CHARTS,
        Tab::Detailed => DETAILED_CHARTS,
        Tab::Analytics => ANALYTICS_CHARTS,
        Tab::Exports => EXPORTS_CHARTS,
    }
}

pub fn is_high_priority(id: ChartId) -> bool {
    HIGH_PRIORITY_CHARTS.contains(&id)
}

/// Every chart id across all tabs, in tab order.
pub fn all_charts() -> impl Iterator<Item = ChartId> {
    Tab::ALL.into_iter().flat_map(|tab| charts_for_tab(tab).iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_charts_belong_to_exactly_one_tab() {
        let mut seen = HashSet::new();
        for id in all_charts() {
            assert!(seen.insert(id), "chart {} appears in more than one tab", id);
        }
        assert_eq!(seen.len(), 23);
    }

    #[test]
    fn test_high_priority_charts_are_cataloged() {
        let all: HashSet<_> = all_charts().collect();
        for id in [SOURCE_CHART, ENTERPRISE_CHART, TYPE_CHART, SEVERITY_CHART] {
            assert!(is_high_priority(id));
            assert!(all.contains(id));
        }
        assert!(!is_high_priority(ROUTE_CHART));
    }
}
