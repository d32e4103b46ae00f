//! Report formatting and output generation
//!
//! Provides formatting for analysis results via the [`ReportFormatter`] facade.
//! Supports Console, JSON, and Plotly output formats.

pub mod individual;
pub mod outliers;
pub mod summary;
pub mod utils;
pub mod weekly;

use crate::errors::AppResult;
use crate::types::analysis_results::{
    CohortComparisonReport, CohortSummary, IndividualAnalysisReport, PowerUserExclusionReport,
    UserWeekAnalysisReport, WeeklyOutlierReport, WeeklyTotalsReport,
};

/// Output format options for analysis reports
#[derive(Debug, Clone, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Plotly,
}

/// Facade for all report formatting operations
pub struct ReportFormatter;

impl ReportFormatter {
    // Utilities
    pub fn format_number(n: usize) -> String {
        utils::format_number(n)
    }

    // Weekly
    pub fn format_weekly_totals(r: &WeeklyTotalsReport, f: &OutputFormat) -> AppResult<String> {
        weekly::format_weekly_totals(r, f)
    }
    pub fn format_power_user_exclusion(
        r: &PowerUserExclusionReport,
        f: &OutputFormat,
    ) -> AppResult<String> {
        weekly::format_power_user_exclusion(r, f)
    }

    // Outliers
    pub fn format_weekly_outliers(r: &WeeklyOutlierReport, f: &OutputFormat) -> AppResult<String> {
        outliers::format_weekly_outliers(r, f)
    }
    pub fn format_user_week_analysis(
        r: &UserWeekAnalysisReport,
        f: &OutputFormat,
    ) -> AppResult<String> {
        outliers::format_user_week_analysis(r, f)
    }

    // Individual
    pub fn format_individual_analysis(
        r: &IndividualAnalysisReport,
        f: &OutputFormat,
    ) -> AppResult<String> {
        individual::format_individual_analysis(r, f)
    }

    // Summary
    pub fn format_cohort_summary(r: &CohortSummary, f: &OutputFormat) -> AppResult<String> {
        summary::format_cohort_summary(r, f)
    }
    pub fn format_cohort_comparison(
        r: &CohortComparisonReport,
        f: &OutputFormat,
    ) -> AppResult<String> {
        summary::format_cohort_comparison(r, f)
    }
}
