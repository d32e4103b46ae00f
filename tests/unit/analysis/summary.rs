//! Cohort summary and cross-cohort comparison tests

use commit_activity_research::analysis::AnalysisEngine;
use commit_activity_research::types::analysis_results::{CohortComparisonRow, TreatmentPeriod};
use commit_activity_research::types::{AnalysisConfig, DateRange};

use crate::common::{d, doubled_dataset, study_dataset};

fn row<'a>(rows: &'a [CohortComparisonRow], metric: &str) -> &'a CohortComparisonRow {
    rows.iter()
        .find(|r| r.metric == metric)
        .unwrap_or_else(|| panic!("missing row {}", metric))
}

#[test]
fn test_summary_covers_dense_cohort_matrix() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let summary = engine.summarise_cohort("study");

    assert_eq!(summary.label, "study");
    assert_eq!(summary.total_users, 9);
    assert_eq!(summary.cohort_size, 6);
    assert_eq!(summary.pre_treatment_weeks, 11);
    assert_eq!(summary.treatment_week, d(2024, 7, 17));
    assert_eq!(summary.weeks.len(), 18);
    assert_eq!(summary.observations, 6 * 18);
    assert_eq!(summary.weekly_averages.len(), 18);
}

#[test]
fn test_cell_outliers_split_every_observation() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let summary = engine.summarise_cohort("study");
    let outliers = &summary.cell_outliers;

    assert_eq!(outliers.removed + outliers.retained, summary.observations);
    // A strict P95 cut can only flag cells above the 95th percentile
    assert!(outliers.removed <= 6);
    assert_eq!(summary.before_after.removed_count, outliers.removed);
    assert_eq!(summary.clean_stats.total_observations, outliers.retained);

    let period_cells: usize = summary.period_averages.iter().map(|p| p.cells).sum();
    assert_eq!(period_cells, outliers.retained);
    let periods: Vec<_> = summary.period_averages.iter().map(|p| p.period).collect();
    assert_eq!(
        periods,
        vec![
            TreatmentPeriod::PreTreatment,
            TreatmentPeriod::Treatment,
            TreatmentPeriod::PostTreatment
        ]
    );
}

#[test]
fn test_activity_frequency_counts_cohort_members() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let f = engine.summarise_cohort("study").activity_frequency;

    assert_eq!(f.total_users_with_data, 6);
    assert_eq!(f.total_weeks_possible, 18);
    assert_eq!(
        f.never_active + f.rarely_active + f.sometimes_active + f.often_active + f.very_active,
        6
    );
    // dropout stops after eleven weeks
    assert!(f.often_active >= 1);
}

#[test]
fn test_compare_scaled_cohort() {
    let config = AnalysisConfig::default();
    let left = AnalysisEngine::new(&study_dataset(), config.clone()).unwrap();
    let right = AnalysisEngine::new(&doubled_dataset(), config).unwrap();
    let report = left.compare(&right, "treated", "control");
    let c = &report.comparison;

    assert_eq!(c.left_label, "treated");
    assert_eq!(c.right_label, "control");
    assert_eq!(row(&c.rows, "Consistent Users").ratio, Some(1.0));
    let mean = row(&c.rows, "Mean Commits/User-Week").ratio.unwrap();
    assert!((mean - 0.5).abs() < 1e-9);
    let p50 = row(&c.percentile_rows, "P50").ratio.unwrap();
    assert!((p50 - 0.5).abs() < 1e-9);

    let r = c.pre_treatment_correlation.unwrap();
    assert!((r - 1.0).abs() < 1e-9);
}

#[test]
fn test_compare_with_empty_cohort_has_no_ratio() {
    let left = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let config = AnalysisConfig::builder()
        .treatment(DateRange::new(d(2024, 4, 1), d(2024, 4, 7)).unwrap())
        .build()
        .unwrap();
    let right = AnalysisEngine::new(&study_dataset(), config).unwrap();
    let report = left.compare(&right, "treated", "empty");

    assert_eq!(report.right.cohort_size, 0);
    assert_eq!(row(&report.comparison.rows, "Consistent Users").ratio, None);
}
