//! Weekly aggregation tests
//!
//! Bucketing, period selection and the conservation of commits across
//! weekly totals.

use chrono::Datelike;
use commit_activity_research::analysis::AnalysisEngine;
use commit_activity_research::types::analysis_results::AnalysisWarning;
use commit_activity_research::types::{AnalysisConfig, DateRange};

use crate::common::{d, study_dataset, valid_commit_total};

fn default_engine() -> AnalysisEngine {
    AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap()
}

#[test]
fn test_weekly_totals_conserve_in_period_commits() {
    let dataset = study_dataset();
    let engine = default_engine();
    let report = engine.weekly_totals(false);

    assert_eq!(report.user_count, 9);
    assert_eq!(report.weeks.len(), 18);
    assert_eq!(report.weeks.first().unwrap().week_start, d(2024, 5, 1));
    assert_eq!(report.weeks.last().unwrap().week_start, d(2024, 8, 28));

    let summed: u64 = report.weeks.iter().map(|w| w.commits).sum();
    assert_eq!(summed, report.total_commits);
    assert_eq!(report.total_commits, valid_commit_total(&dataset));
    assert_eq!(report.treatment, Some(AnalysisConfig::default().treatment));
    assert!(report
        .warnings
        .contains(&AnalysisWarning::SkippedMalformedDates { count: 1 }));
}

#[test]
fn test_bucketing_is_idempotent_and_anchor_aligned() {
    let engine = default_engine();
    let bucketer = engine.bucketer();
    let anchor = bucketer.anchor();

    for day in d(2024, 3, 1).iter_days().take(240) {
        let bucket = bucketer.bucket(day);
        assert_eq!(bucketer.bucket(bucket), bucket);
        assert_eq!((bucket - anchor).num_days().rem_euclid(7), 0);
        assert!(bucket <= day);
        assert!((day - bucket).num_days() < 7);
    }
}

#[test]
fn test_trim_ends_drops_boundary_weeks() {
    let dataset = study_dataset();
    let config = AnalysisConfig::builder().trim_ends().build().unwrap();
    let engine = AnalysisEngine::new(&dataset, config).unwrap();
    let report = engine.weekly_totals(false);

    assert_eq!(report.weeks.len(), 16);
    assert_eq!(report.weeks[0].week_start, d(2024, 5, 8));
    let trimmed: Vec<_> = report.trimmed.iter().map(|w| w.week_start).collect();
    assert_eq!(trimmed, vec![d(2024, 5, 1), d(2024, 8, 28)]);

    let trimmed_commits: u64 = report.trimmed.iter().map(|w| w.commits).sum();
    assert_eq!(
        report.total_commits + trimmed_commits,
        valid_commit_total(&dataset)
    );
}

#[test]
fn test_shifted_anchor_keeps_every_commit() {
    let dataset = study_dataset();
    let anchor = d(2024, 7, 18);
    let config = AnalysisConfig::builder()
        .anchor(anchor)
        .period(DateRange::new(d(2024, 4, 1), d(2024, 9, 30)).unwrap())
        .build()
        .unwrap();
    let engine = AnalysisEngine::new(&dataset, config).unwrap();
    let report = engine.weekly_totals(false);

    assert_eq!(report.anchor, Some(anchor));
    assert_eq!(report.total_commits, valid_commit_total(&dataset));
    assert!(report
        .weeks
        .iter()
        .all(|w| w.week_start.weekday() == anchor.weekday()));
}

#[test]
fn test_period_without_data_warns() {
    let config = AnalysisConfig::builder()
        .period(DateRange::new(d(2025, 1, 1), d(2025, 2, 1)).unwrap())
        .build()
        .unwrap();
    let engine = AnalysisEngine::new(&study_dataset(), config).unwrap();
    let report = engine.weekly_totals(false);

    assert!(report.weeks.is_empty());
    assert_eq!(report.total_commits, 0);
    assert!(report.warnings.contains(&AnalysisWarning::NoWeeksInPeriod));
}

#[test]
fn test_power_user_exclusion_removes_only_power_commits() {
    let engine = default_engine();
    let all = engine.weekly_totals(false);
    let excluded = engine.weekly_totals_without_power_users();

    let ids: Vec<_> = excluded.power_users.user_ids().collect();
    assert_eq!(ids, vec!["power_dev"]);
    assert_eq!(excluded.weekly.user_count, 8);

    let power_total = engine
        .profiles()
        .iter()
        .find(|p| p.user_id == "power_dev")
        .unwrap()
        .total_commits();
    assert_eq!(
        all.total_commits - excluded.weekly.total_commits,
        power_total
    );
    for (with, without) in all.weeks.iter().zip(&excluded.weekly.weeks) {
        assert_eq!(with.week_start, without.week_start);
        assert!(without.commits <= with.commits);
    }
}
