//! Comparative statistics types
//!
//! Every ratio or percentage that can hit a zero denominator is an
//! `Option<f64>`: `None` means "not applicable" and serialises as `null`.

use super::{
    ActivityFrequency, AnalysisWarning, OutlierBoundary, OutlierMethod, TreatmentPeriod,
    WeeklyAverage,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentile set P10-P99 (linear interpolation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    /// 50th percentile IS the median
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Descriptive statistics over one observation set
///
/// An empty set yields `count == 0`, zero moments and no percentiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub median: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub percentiles: Option<Percentiles>,
}

/// Statistics over a set of user-week cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserWeekStatistics {
    pub total_observations: usize,
    pub unique_users: usize,
    pub unique_weeks: usize,
    pub total_commits: u64,
    pub commits: DescriptiveStats,
    pub zero_commit_weeks: usize,
    pub active_weeks: usize,
    pub zero_commit_percentage: Option<f64>,
    pub active_percentage: Option<f64>,
}

/// One metric before and after filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: String,
    pub original: f64,
    pub filtered: f64,
    /// `None` when the original value is zero
    pub change_pct: Option<f64>,
}

/// Original vs. filtered observation set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeforeAfterComparison {
    pub rows: Vec<ComparisonRow>,
    pub removed_count: usize,
    pub removed_min: Option<u64>,
    pub removed_max: Option<u64>,
    /// Up to five largest removed values, descending
    pub top_removed: Vec<u64>,
}

/// Mean commits per user-week cell within a treatment period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAverage {
    pub period: TreatmentPeriod,
    pub cells: usize,
    pub mean_commits: f64,
}

/// Aggregate over active user-week cells sharing a month or quarter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalStats {
    pub active_weeks: usize,
    pub total_commits: u64,
    pub mean_commits: f64,
    pub median_commits: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalPatterns {
    /// Month number (1-12) of the bucket start
    pub monthly: BTreeMap<u32, TemporalStats>,
    /// Quarter number (1-4) of the bucket start
    pub quarterly: BTreeMap<u32, TemporalStats>,
}

/// Outlier pass applied to user-week cells in a cohort summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellOutlierSummary {
    pub method: OutlierMethod,
    pub boundary: Option<OutlierBoundary>,
    pub removed: usize,
    pub retained: usize,
}

/// Full user-week summary for one cohort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSummary {
    pub label: String,
    pub total_users: usize,
    pub cohort_size: usize,
    pub weeks: Vec<NaiveDate>,
    pub pre_treatment_weeks: usize,
    pub treatment_week: NaiveDate,
    pub observations: usize,
    pub cell_outliers: CellOutlierSummary,
    pub clean_stats: UserWeekStatistics,
    pub activity_frequency: ActivityFrequency,
    pub temporal: TemporalPatterns,
    pub period_averages: Vec<PeriodAverage>,
    /// Clean per-week sums divided by the cohort size
    pub weekly_averages: Vec<WeeklyAverage>,
    pub before_after: BeforeAfterComparison,
    pub warnings: Vec<AnalysisWarning>,
}

/// One metric across two cohorts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortComparisonRow {
    pub metric: String,
    pub left: f64,
    pub right: f64,
    /// `left / right`, `None` when `right` is zero
    pub ratio: Option<f64>,
}

/// Cross-cohort comparison (e.g. treated vs. control country)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortComparison {
    pub left_label: String,
    pub right_label: String,
    pub rows: Vec<CohortComparisonRow>,
    pub percentile_rows: Vec<CohortComparisonRow>,
    /// Pearson r of the weekly per-user averages over shared pre-treatment weeks
    pub pre_treatment_correlation: Option<f64>,
}

/// Both cohort summaries with their comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortComparisonReport {
    pub left: CohortSummary,
    pub right: CohortSummary,
    pub comparison: CohortComparison,
}
