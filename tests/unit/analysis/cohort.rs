//! Consistent-user cohort tests

use commit_activity_research::analysis::AnalysisEngine;
use commit_activity_research::types::analysis_results::AnalysisWarning;
use commit_activity_research::types::{AnalysisConfig, DateRange};

use crate::common::{d, study_dataset};

#[test]
fn test_cohort_requires_every_pre_treatment_week() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let selection = engine.period_selection();

    assert_eq!(engine.treatment_bucket(), d(2024, 7, 17));
    let window = engine.pre_treatment_window(&selection);
    assert_eq!(window.len(), 11);
    assert_eq!(window.first(), Some(&d(2024, 5, 1)));
    assert_eq!(window.last(), Some(&d(2024, 7, 10)));

    let cohort = engine.select_cohort(&selection);
    let members: Vec<_> = cohort.cohort.members().collect();
    assert_eq!(
        members,
        vec![
            "dropout",
            "power_dev",
            "steady_1",
            "steady_2",
            "steady_3",
            "weekend_dev"
        ]
    );
    assert_eq!(cohort.candidates, 9);
    assert!(cohort.warnings.is_empty());
}

#[test]
fn test_every_member_is_active_in_every_window_week() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let selection = engine.period_selection();
    let cohort = engine.select_cohort(&selection);
    let bucketer = engine.bucketer();

    for profile in engine.profiles() {
        let active_weeks: std::collections::BTreeSet<_> = profile
            .active_days()
            .map(|(day, _)| bucketer.bucket(day))
            .collect();
        let qualifies = cohort
            .cohort
            .window()
            .iter()
            .all(|week| active_weeks.contains(week));
        assert_eq!(
            cohort.cohort.contains(&profile.user_id),
            qualifies,
            "membership mismatch for {}",
            profile.user_id
        );
    }
}

#[test]
fn test_narrower_window_never_shrinks_cohort() {
    let dataset = study_dataset();
    let full = AnalysisEngine::new(&dataset, AnalysisConfig::default()).unwrap();
    let narrow_config = AnalysisConfig::builder()
        .cohort_window(DateRange::new(d(2024, 5, 1), d(2024, 5, 1)).unwrap())
        .build()
        .unwrap();
    let narrow = AnalysisEngine::new(&dataset, narrow_config).unwrap();

    let full_cohort = full.select_cohort(&full.period_selection()).cohort;
    let narrow_selection = narrow.period_selection();
    assert_eq!(narrow.pre_treatment_window(&narrow_selection).len(), 1);
    let narrow_cohort = narrow.select_cohort(&narrow_selection).cohort;

    assert!(full_cohort.members().all(|u| narrow_cohort.contains(u)));
    assert!(narrow_cohort.contains("bad_dates"));
    assert!(!narrow_cohort.contains("late_joiner"));
}

#[test]
fn test_cohort_totals_are_bounded_by_all_users() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let all = engine.weekly_totals(false);
    let cohort = engine.weekly_totals(true);

    assert_eq!(cohort.user_count, 6);
    assert_eq!(all.weeks.len(), cohort.weeks.len());
    for (a, c) in all.weeks.iter().zip(&cohort.weeks) {
        assert!(c.commits <= a.commits);
    }
}

#[test]
fn test_treatment_before_data_leaves_empty_window() {
    let config = AnalysisConfig::builder()
        .treatment(DateRange::new(d(2024, 4, 1), d(2024, 4, 7)).unwrap())
        .build()
        .unwrap();
    let engine = AnalysisEngine::new(&study_dataset(), config).unwrap();
    let cohort = engine.select_cohort(&engine.period_selection());

    assert!(cohort.cohort.is_empty());
    assert!(cohort
        .warnings
        .contains(&AnalysisWarning::EmptyPreTreatmentWindow));

    let report = engine.weekly_totals(true);
    assert_eq!(report.user_count, 0);
    assert_eq!(report.total_commits, 0);
}
