//! Comparative statistics over observation sets
//!
//! Descriptive statistics, before/after deltas, period and temporal
//! breakdowns, per-metric distributions and cross-cohort ratios. Every ratio
//! or percentage with a possible zero base returns `None` instead of `inf`
//! or `NaN`.

use super::outliers::OutlierDetector;
use super::period::PeriodFilter;
use crate::types::analysis_results::{
    ActivityMetrics, Band, BeforeAfterComparison, BehaviourHighlights, CohortComparison,
    CohortComparisonRow, CohortSummary, ComparisonRow, DescriptiveStats, MetricDistribution,
    MetricOutlierCounts, OutlierBoundary, OutlierMethod, PeriodAverage, Percentiles,
    SigmaBands, TemporalPatterns, TemporalStats, TreatmentPeriod, UserWeekObservation,
    UserWeekStatistics, WeeklyAverage,
};
use crate::types::OutlierSettings;
use crate::utils::math::{
    checked_percent_change, checked_ratio, mean, pearson, percentile_sorted, population_std,
    sorted,
};
use crate::utils::time::quarter_of;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Consistency score above which a user counts as highly consistent
pub const HIGH_CONSISTENCY_SCORE: f64 = 0.7;

/// Streak length (days) counted as a long streak
pub const LONG_STREAK_DAYS: u32 = 30;

/// Weekend share above which a user counts as weekend-heavy
pub const WEEKEND_HEAVY_RATIO: f64 = 0.5;

pub struct StatisticsReporter;

impl StatisticsReporter {
    /// P10..P99 with linear interpolation; `None` for an empty set
    pub fn percentiles(values: &[f64]) -> Option<Percentiles> {
        let ordered = sorted(values);
        let p = |q| percentile_sorted(&ordered, q);
        Some(Percentiles {
            p10: p(10.0)?,
            p25: p(25.0)?,
            p50: p(50.0)?,
            p75: p(75.0)?,
            p90: p(90.0)?,
            p95: p(95.0)?,
            p99: p(99.0)?,
        })
    }

    pub fn describe(values: &[f64]) -> DescriptiveStats {
        let percentiles = Self::percentiles(values);
        DescriptiveStats {
            count: values.len(),
            sum: values.iter().sum(),
            mean: mean(values).unwrap_or(0.0),
            std: population_std(values).unwrap_or(0.0),
            median: percentiles.map(|p| p.p50).unwrap_or(0.0),
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
            percentiles,
        }
    }

    /// Statistics over user-week cells (zero cells included)
    pub fn user_week_statistics(observations: &[UserWeekObservation]) -> UserWeekStatistics {
        let values: Vec<f64> = observations.iter().map(|o| o.commits as f64).collect();
        let unique_users: BTreeSet<&str> =
            observations.iter().map(|o| o.user_id.as_str()).collect();
        let unique_weeks: BTreeSet<NaiveDate> =
            observations.iter().map(|o| o.week_start).collect();
        let active_weeks = observations.iter().filter(|o| o.commits > 0).count();
        let total = observations.len();
        let share = |part: usize| checked_ratio(part as f64, total as f64).map(|r| r * 100.0);

        UserWeekStatistics {
            total_observations: total,
            unique_users: unique_users.len(),
            unique_weeks: unique_weeks.len(),
            total_commits: observations.iter().map(|o| o.commits).sum(),
            commits: Self::describe(&values),
            zero_commit_weeks: total - active_weeks,
            active_weeks,
            zero_commit_percentage: share(total - active_weeks),
            active_percentage: share(active_weeks),
        }
    }

    /// Original vs. filtered cell statistics
    pub fn compare_before_after(
        original: &[UserWeekObservation],
        filtered: &[UserWeekObservation],
        removed: &[UserWeekObservation],
    ) -> BeforeAfterComparison {
        let before = Self::user_week_statistics(original);
        let after = Self::user_week_statistics(filtered);
        let tail = |s: &UserWeekStatistics, pick: fn(&Percentiles) -> f64| {
            s.commits.percentiles.as_ref().map(pick).unwrap_or(0.0)
        };

        let pairs = [
            (
                "Total Observations",
                before.total_observations as f64,
                after.total_observations as f64,
            ),
            ("Mean Commits", before.commits.mean, after.commits.mean),
            ("Median Commits", before.commits.median, after.commits.median),
            ("Std Commits", before.commits.std, after.commits.std),
            ("P95 Commits", tail(&before, |p| p.p95), tail(&after, |p| p.p95)),
            ("P99 Commits", tail(&before, |p| p.p99), tail(&after, |p| p.p99)),
            (
                "Active %",
                before.active_percentage.unwrap_or(0.0),
                after.active_percentage.unwrap_or(0.0),
            ),
        ];

        let rows = pairs
            .into_iter()
            .map(|(metric, original, filtered)| ComparisonRow {
                metric: metric.to_string(),
                original,
                filtered,
                change_pct: checked_percent_change(original, filtered),
            })
            .collect();

        let mut removed_values: Vec<u64> = removed.iter().map(|o| o.commits).collect();
        removed_values.sort_unstable_by(|a, b| b.cmp(a));

        BeforeAfterComparison {
            rows,
            removed_count: removed.len(),
            removed_min: removed_values.last().copied(),
            removed_max: removed_values.first().copied(),
            top_removed: removed_values.into_iter().take(5).collect(),
        }
    }

    /// Mean commits per cell in each treatment period
    ///
    /// All three periods are always present; a period without cells has a
    /// mean of 0.0.
    pub fn period_averages(
        observations: &[UserWeekObservation],
        treatment_bucket: NaiveDate,
    ) -> Vec<PeriodAverage> {
        let mut by_period: BTreeMap<TreatmentPeriod, Vec<f64>> = [
            TreatmentPeriod::PreTreatment,
            TreatmentPeriod::Treatment,
            TreatmentPeriod::PostTreatment,
        ]
        .into_iter()
        .map(|p| (p, Vec::new()))
        .collect();

        for obs in observations {
            by_period
                .entry(PeriodFilter::classify(obs.week_start, treatment_bucket))
                .or_default()
                .push(obs.commits as f64);
        }

        by_period
            .into_iter()
            .map(|(period, values)| PeriodAverage {
                period,
                cells: values.len(),
                mean_commits: mean(&values).unwrap_or(0.0),
            })
            .collect()
    }

    /// Month and quarter stats over active cells, keyed by bucket start
    pub fn temporal_patterns(observations: &[UserWeekObservation]) -> TemporalPatterns {
        let mut monthly: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
        let mut quarterly: BTreeMap<u32, Vec<u64>> = BTreeMap::new();

        for obs in observations.iter().filter(|o| o.commits > 0) {
            let month = obs.week_start.month();
            monthly.entry(month).or_default().push(obs.commits);
            quarterly.entry(quarter_of(month)).or_default().push(obs.commits);
        }

        let summarise = |groups: BTreeMap<u32, Vec<u64>>| -> BTreeMap<u32, TemporalStats> {
            groups
                .into_iter()
                .map(|(key, commits)| {
                    let values: Vec<f64> = commits.iter().map(|c| *c as f64).collect();
                    let stats = TemporalStats {
                        active_weeks: commits.len(),
                        total_commits: commits.iter().sum(),
                        mean_commits: mean(&values).unwrap_or(0.0),
                        median_commits: percentile_sorted(&sorted(&values), 50.0)
                            .unwrap_or(0.0),
                    };
                    (key, stats)
                })
                .collect()
        };

        TemporalPatterns {
            monthly: summarise(monthly),
            quarterly: summarise(quarterly),
        }
    }

    /// Distribution of one per-user metric with tail counts
    ///
    /// Empty or all-zero input has no bands, no tail boundaries and nothing
    /// flagged.
    pub fn metric_distribution(
        metric: &str,
        values: &[f64],
        settings: &OutlierSettings,
    ) -> MetricDistribution {
        let m = mean(values).unwrap_or(0.0);
        let std = population_std(values).unwrap_or(0.0);
        let degenerate = values.is_empty() || values.iter().all(|v| *v == 0.0);

        let band = |k: f64| Band {
            lower: m - k * std,
            upper: m + k * std,
        };
        let sigma_bands = (!degenerate).then(|| SigmaBands {
            one: band(1.0),
            two: band(2.0),
            three: band(3.0),
        });

        let iqr_fences = match OutlierDetector::boundary(
            &OutlierMethod::IqrFence { multiplier: 1.5 },
            values,
        ) {
            Some(OutlierBoundary::Outside { lower, upper }) => Some(Band { lower, upper }),
            _ => None,
        };

        let top_tail_boundary = if degenerate {
            None
        } else {
            percentile_sorted(&sorted(values), settings.top_percentile)
        };
        let bottom_tail_boundary = match OutlierDetector::boundary(
            &OutlierMethod::BottomFraction {
                percentile: settings.bottom_percentile,
                factor: settings.bottom_factor,
            },
            values,
        ) {
            Some(OutlierBoundary::AtOrBelow { lower }) => Some(lower),
            _ => None,
        };

        let count_where =
            |pred: &dyn Fn(f64) -> bool| values.iter().filter(|v| pred(**v)).count();
        let beyond = |k: f64| {
            sigma_bands.map_or(0, |_| count_where(&|v: f64| (v - m).abs() > k * std))
        };
        let flagged = MetricOutlierCounts {
            iqr: iqr_fences.map_or(0, |f| count_where(&|v: f64| v < f.lower || v > f.upper)),
            beyond_2_sigma: beyond(2.0),
            beyond_3_sigma: beyond(3.0),
            top_tail: top_tail_boundary.map_or(0, |b| count_where(&|v: f64| v >= b)),
            bottom_tail: bottom_tail_boundary.map_or(0, |b| count_where(&|v: f64| v <= b)),
        };

        MetricDistribution {
            metric: metric.to_string(),
            count: values.len(),
            mean: m,
            std,
            percentiles: Self::percentiles(values),
            sigma_bands,
            iqr_fences,
            top_tail_boundary,
            bottom_tail_boundary,
            flagged,
        }
    }

    /// Distributions of the headline per-user metrics
    pub fn metric_distributions(
        metrics: &BTreeMap<String, ActivityMetrics>,
        settings: &OutlierSettings,
    ) -> Vec<MetricDistribution> {
        let extract =
            |f: fn(&ActivityMetrics) -> f64| -> Vec<f64> { metrics.values().map(f).collect() };
        vec![
            Self::metric_distribution(
                "total_commits",
                &extract(|m| m.total_commits as f64),
                settings,
            ),
            Self::metric_distribution(
                "avg_commits_per_day",
                &extract(|m| m.avg_commits_per_day),
                settings,
            ),
            Self::metric_distribution(
                "active_days",
                &extract(|m| m.active_days as f64),
                settings,
            ),
            Self::metric_distribution(
                "consistency_score",
                &extract(|m| m.consistency_score),
                settings,
            ),
            Self::metric_distribution(
                "longest_streak",
                &extract(|m| m.longest_streak as f64),
                settings,
            ),
        ]
    }

    pub fn highlights<'a>(
        metrics: impl IntoIterator<Item = &'a ActivityMetrics>,
    ) -> BehaviourHighlights {
        let mut highlights = BehaviourHighlights::default();
        for m in metrics {
            if m.consistency_score > HIGH_CONSISTENCY_SCORE {
                highlights.highly_consistent += 1;
            }
            if m.longest_streak > LONG_STREAK_DAYS {
                highlights.long_streaks += 1;
            }
            if m.weekend_ratio > WEEKEND_HEAVY_RATIO {
                highlights.weekend_heavy += 1;
            }
        }
        highlights
    }

    /// Pearson r of two weekly average series over shared pre-treatment weeks
    pub fn pre_treatment_correlation(
        left: &[WeeklyAverage],
        right: &[WeeklyAverage],
        treatment_bucket: NaiveDate,
    ) -> Option<f64> {
        let right_by_week: BTreeMap<NaiveDate, f64> = right
            .iter()
            .map(|w| (w.week_start, w.average_commits))
            .collect();
        let (xs, ys): (Vec<f64>, Vec<f64>) = left
            .iter()
            .filter(|w| w.week_start < treatment_bucket)
            .filter_map(|w| {
                right_by_week
                    .get(&w.week_start)
                    .map(|r| (w.average_commits, *r))
            })
            .unzip();
        pearson(&xs, &ys)
    }

    /// Side-by-side clean statistics for two cohorts (`left / right` ratios)
    pub fn compare_cohorts(left: &CohortSummary, right: &CohortSummary) -> CohortComparison {
        let row = |metric: &str, l: f64, r: f64| CohortComparisonRow {
            metric: metric.to_string(),
            left: l,
            right: r,
            ratio: checked_ratio(l, r),
        };
        let (a, b) = (&left.clean_stats, &right.clean_stats);

        let rows = vec![
            row(
                "Consistent Users",
                left.cohort_size as f64,
                right.cohort_size as f64,
            ),
            row(
                "User-Week Observations",
                a.total_observations as f64,
                b.total_observations as f64,
            ),
            row("Unique Users", a.unique_users as f64, b.unique_users as f64),
            row("Weeks Analysed", a.unique_weeks as f64, b.unique_weeks as f64),
            row("Mean Commits/User-Week", a.commits.mean, b.commits.mean),
            row("Median Commits/User-Week", a.commits.median, b.commits.median),
            row("Std Commits/User-Week", a.commits.std, b.commits.std),
            row(
                "Active Weeks %",
                a.active_percentage.unwrap_or(0.0),
                b.active_percentage.unwrap_or(0.0),
            ),
        ];

        let pl = a.commits.percentiles.unwrap_or_default();
        let pr = b.commits.percentiles.unwrap_or_default();
        let percentile_rows = vec![
            row("P25", pl.p25, pr.p25),
            row("P50", pl.p50, pr.p50),
            row("P75", pl.p75, pr.p75),
            row("P90", pl.p90, pr.p90),
            row("P95", pl.p95, pr.p95),
        ];

        CohortComparison {
            left_label: left.label.clone(),
            right_label: right.label.clone(),
            rows,
            percentile_rows,
            pre_treatment_correlation: Self::pre_treatment_correlation(
                &left.weekly_averages,
                &right.weekly_averages,
                left.treatment_week,
            ),
        }
    }
}
