//! Per-user behavioral metric tests

use chrono::Duration;
use commit_activity_research::analysis::{
    Aggregator, AnalysisEngine, MetricsCalculator, StatisticsReporter, WeekBucketer,
};
use commit_activity_research::types::analysis_results::IndividualAnalysisReport;
use commit_activity_research::types::{AnalysisConfig, DateRange, UserProfile};

use crate::common::{d, study_dataset};

fn report() -> IndividualAnalysisReport {
    AnalysisEngine::new(&study_dataset(), AnalysisConfig::default())
        .unwrap()
        .individual_metrics()
}

#[test]
fn test_streaks_and_breaks() {
    let report = report();
    assert_eq!(report.window.days(), 126);

    let power = &report.metrics["power_dev"];
    assert_eq!(power.longest_streak, 123);
    assert_eq!(power.longest_break, 3);
    assert_eq!(power.active_days, 123);

    let dropout = &report.metrics["dropout"];
    assert_eq!(dropout.longest_streak, 71);
    assert_eq!(dropout.longest_break, 55);
    assert_eq!(dropout.most_active_month.as_deref(), Some("2024-05"));

    let late = &report.metrics["late_joiner"];
    assert_eq!(late.longest_streak, 43);
    assert_eq!(late.longest_break, 80);
    assert_eq!(late.most_active_month.as_deref(), Some("2024-08"));

    let steady = &report.metrics["steady_2"];
    assert_eq!(steady.longest_streak, 5);
}

#[test]
fn test_inactive_user_has_zeroed_metrics() {
    let report = report();
    let silent = &report.metrics["silent"];

    assert_eq!(silent.total_commits, 0);
    assert_eq!(silent.active_days, 0);
    assert_eq!(silent.consistency_score, 0.0);
    assert_eq!(silent.weekday_ratio, 0.0);
    assert_eq!(silent.weekend_ratio, 0.0);
    assert_eq!(silent.longest_streak, 0);
    assert_eq!(silent.longest_break, 126);
    assert_eq!(silent.most_active_month, None);
}

#[test]
fn test_consistency_scores_are_bounded() {
    let report = report();
    for m in report.metrics.values() {
        assert!(
            (0.0..=1.0).contains(&m.consistency_score),
            "{} scored {}",
            m.user_id,
            m.consistency_score
        );
    }

    assert_eq!(report.metrics["steady_3"].consistency_score, 1.0);
    assert_eq!(report.metrics["bad_dates"].consistency_score, 0.0);
    let power = report.metrics["power_dev"].consistency_score;
    assert!(power > 0.7 && power < 1.0);

    assert_eq!(MetricsCalculator::consistency_score(&[4.0]), 0.0);
    assert_eq!(MetricsCalculator::consistency_score(&[2.0, 2.0, 2.0]), 1.0);
}

#[test]
fn test_weekday_and_weekend_ratios_are_complete() {
    let report = report();
    for m in report.metrics.values().filter(|m| m.total_commits > 0) {
        assert!((m.weekday_ratio + m.weekend_ratio - 1.0).abs() < 1e-12);
        assert_eq!(m.weekday_commits + m.weekend_commits, m.total_commits);
        let monthly: u64 = m.monthly_breakdown.values().sum();
        assert_eq!(monthly, m.total_commits);
    }

    assert_eq!(report.metrics["weekend_dev"].weekend_ratio, 1.0);
    assert_eq!(report.metrics["steady_1"].weekday_ratio, 1.0);
}

#[test]
fn test_categories_and_power_users() {
    let report = report();
    let c = &report.categories;

    assert_eq!(c.total(), 9);
    assert_eq!(c.inactive, vec!["silent".to_string()]);
    assert_eq!(c.casual, vec!["bad_dates".to_string()]);
    assert_eq!(c.power_users, vec!["power_dev".to_string()]);
    assert_eq!(c.regular.len(), 6);

    let monthly: Vec<_> = report.monthly_power_users.user_ids().collect();
    assert_eq!(monthly, vec!["power_dev"]);
    assert_eq!(report.monthly_power_users.regular_user_count, 8);
    let average: Vec<_> = report.average_power_users.user_ids().collect();
    assert_eq!(average, vec!["power_dev"]);
}

#[test]
fn test_highlights_and_distributions() {
    let report = report();
    let h = &report.highlights;

    assert_eq!(h.highly_consistent, 7);
    assert_eq!(h.long_streaks, 3);
    assert_eq!(h.weekend_heavy, 1);

    assert!(!report.distributions.is_empty());
    for distribution in &report.distributions {
        assert_eq!(distribution.count, 9, "{}", distribution.metric);
    }
}

#[test]
fn test_three_active_days_scenario() {
    let profile = UserProfile::new(
        "scenario",
        [(d(2024, 5, 1), 5), (d(2024, 5, 2), 5), (d(2024, 5, 8), 5)],
    );
    let bucketer = WeekBucketer::new(d(2024, 5, 1));
    let weekly = Aggregator::user_weekly_commits(&profile, &bucketer);
    assert_eq!(
        weekly.into_iter().collect::<Vec<_>>(),
        vec![(d(2024, 5, 1), 10), (d(2024, 5, 8), 5)]
    );

    let window = DateRange::new(d(2024, 5, 1), d(2024, 5, 8)).unwrap();
    let metrics = MetricsCalculator::calculate(&profile, &window);
    assert_eq!(metrics.consistency_score, 1.0);
    assert_eq!(metrics.longest_streak, 2);
    assert_eq!(metrics.longest_break, 5);
    assert_eq!(metrics.total_commits, 15);
    assert_eq!(metrics.avg_commits_per_day, 15.0 / 8.0);
}

#[test]
fn test_explicit_zero_days_match_absent_days() {
    let with_zero = UserProfile::new("z", [(d(2024, 5, 1), 3), (d(2024, 5, 2), 0)]);
    let without = UserProfile::new("z", [(d(2024, 5, 1), 3)]);
    let window = DateRange::new(d(2024, 5, 1), d(2024, 5, 7)).unwrap();

    let a = MetricsCalculator::calculate(&with_zero, &window);
    let b = MetricsCalculator::calculate(&without, &window);
    assert_eq!(a, b);

    let bucketer = WeekBucketer::new(d(2024, 5, 1));
    assert_eq!(
        Aggregator::user_weekly_commits(&with_zero, &bucketer),
        Aggregator::user_weekly_commits(&without, &bucketer)
    );
}

#[test]
fn test_long_streak_must_exceed_thirty_days() {
    let start = d(2024, 5, 1);
    let streak = |user: &str, days: i64| {
        UserProfile::new(user, (0..days).map(|i| (start + Duration::days(i), 1)))
    };
    let window = DateRange::new(start, d(2024, 6, 30)).unwrap();
    let thirty = MetricsCalculator::calculate(&streak("thirty", 30), &window);
    let thirty_one = MetricsCalculator::calculate(&streak("thirty_one", 31), &window);
    assert_eq!(thirty.longest_streak, 30);
    assert_eq!(thirty_one.longest_streak, 31);

    let highlights = StatisticsReporter::highlights([&thirty, &thirty_one]);
    assert_eq!(highlights.long_streaks, 1);
}
