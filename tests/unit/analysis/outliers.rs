//! Outlier detection tests over weekly totals and user-week cells

use commit_activity_research::analysis::{AnalysisEngine, OutlierDetector};
use commit_activity_research::types::analysis_results::{
    MatrixDensity, OutlierBoundary, OutlierMethod,
};
use commit_activity_research::types::{AnalysisConfig, OutlierSettings};

use crate::common::study_dataset;

#[test]
fn test_percentile_cutoff_retains_ties_at_boundary() {
    let values = [1.0, 2.0, 3.0, 100.0, 100.0, 100.0];
    let partition =
        OutlierDetector::detect(&OutlierMethod::PercentileCutoff { percentile: 95.0 }, &values);

    assert_eq!(partition.boundary, Some(OutlierBoundary::Above { upper: 100.0 }));
    assert!(partition.flagged.is_empty());
    assert_eq!(partition.retained.len(), 6);
}

#[test]
fn test_iqr_fence_flags_both_sides() {
    let values = [-100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
    let partition = OutlierDetector::detect(&OutlierMethod::IqrFence { multiplier: 1.5 }, &values);

    assert_eq!(partition.flagged, vec![-100.0, 100.0]);
    assert_eq!(partition.retained, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(partition.total(), values.len());
}

#[test]
fn test_all_zero_values_have_no_boundary() {
    for method in [
        OutlierMethod::RelativeThreshold { pct: 50.0 },
        OutlierMethod::PercentileCutoff { percentile: 95.0 },
        OutlierMethod::SigmaBand { k: 2.0 },
    ] {
        let partition = OutlierDetector::detect(&method, &[0.0, 0.0, 0.0]);
        assert_eq!(partition.boundary, None);
        assert!(partition.flagged.is_empty());
    }
}

#[test]
fn test_weekly_outliers_partition_every_week() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let report = engine.weekly_outliers();

    assert_eq!(report.partition.total(), 18);
    assert_eq!(report.categories.len(), 18);

    let totals = engine.weekly_totals(false);
    let mean = totals.total_commits as f64 / totals.weeks.len() as f64;
    let thresholds = report.thresholds.unwrap();
    assert!((thresholds.average - mean).abs() < 1e-9);
    assert!((thresholds.very_high - 2.0 * mean).abs() < 1e-9);
}

#[test]
fn test_percentile_weekly_method_flags_at_most_the_top_week() {
    let config = AnalysisConfig::builder()
        .outliers(OutlierSettings {
            weekly_method: OutlierMethod::PercentileCutoff { percentile: 95.0 },
            ..OutlierSettings::default()
        })
        .build()
        .unwrap();
    let engine = AnalysisEngine::new(&study_dataset(), config).unwrap();
    let report = engine.weekly_outliers();

    assert!(report.partition.flagged.len() <= 1);
    let max_retained = report
        .partition
        .retained
        .iter()
        .map(|w| w.commits)
        .max()
        .unwrap();
    for week in &report.partition.flagged {
        assert!(week.commits > max_retained);
    }
}

#[test]
fn test_user_week_analysis_removes_power_cells() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let report = engine.user_week_analysis();
    let cells = &report.cells;

    assert_eq!(cells.population, 8);
    assert_eq!(cells.total_cells, 8 * 18);
    assert_eq!(cells.original_averages.len(), 18);

    let power_cells = cells
        .removed
        .iter()
        .filter(|c| c.user_id == "power_dev")
        .count();
    assert_eq!(power_cells, 18);
    for cell in &cells.removed {
        assert!(cell.commits as f64 > cell.threshold);
    }

    for (original, cleaned) in cells.original_averages.iter().zip(&cells.cleaned_averages) {
        assert_eq!(original.week_start, cleaned.week_start);
        assert!(cleaned.average_commits <= original.average_commits);
    }

    let ids: Vec<_> = report.power_users.user_ids().collect();
    assert_eq!(ids, vec!["power_dev"]);
    assert_eq!(report.averages_without_power_users.len(), 18);
}

#[test]
fn test_relative_threshold_flags_single_spike() {
    let totals = [100.0, 100.0, 100.0, 400.0];
    let partition =
        OutlierDetector::detect(&OutlierMethod::RelativeThreshold { pct: 100.0 }, &totals);

    assert_eq!(partition.boundary, Some(OutlierBoundary::Above { upper: 350.0 }));
    assert_eq!(partition.flagged, vec![400.0]);
    assert_eq!(partition.retained, vec![100.0, 100.0, 100.0]);
}

#[test]
fn test_raising_relative_threshold_never_flags_more() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let cells: Vec<f64> = engine
        .user_week_matrix(false, MatrixDensity::Dense)
        .observations
        .iter()
        .map(|o| o.commits as f64)
        .collect();

    let mut previous = usize::MAX;
    for pct in [0.0, 25.0, 50.0, 100.0, 200.0, 400.0, 800.0] {
        let flagged = OutlierDetector::detect(&OutlierMethod::RelativeThreshold { pct }, &cells)
            .flagged
            .len();
        assert!(flagged <= previous, "{}% flagged {} > {}", pct, flagged, previous);
        previous = flagged;
    }
}
