//! Per-user behavioral metrics
//!
//! Every metric is computed over a fixed day window by walking each calendar
//! day in order, so missing dates count as explicit zeros. Users are
//! independent of each other; [`MetricsCalculator::calculate_all`] maps them
//! in parallel and collects into an ordered map.

use crate::types::analysis_results::{
    ActivityCategories, ActivityCategory, ActivityFrequency, ActivityMetrics, PowerUser,
    PowerUserMethod, PowerUserReport, UserWeekMatrix,
};
use crate::types::{DateRange, PowerUserSettings, UserProfile};
use crate::utils::math::{mean, population_std};
use crate::utils::time::{
    days_inclusive, is_weekend, month_key, AVERAGE_DAYS_PER_MONTH, DAYS_PER_WEEK,
};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Compute every behavioral metric for one user over `window`
    pub fn calculate(profile: &UserProfile, window: &DateRange) -> ActivityMetrics {
        let days = window.days() as f64;

        let mut total_commits = 0u64;
        let mut weekday_commits = 0u64;
        let mut weekend_commits = 0u64;
        let mut active_values = Vec::new();
        let mut monthly_breakdown: BTreeMap<String, u64> = BTreeMap::new();

        let mut streak = 0u32;
        let mut gap = 0u32;
        let mut longest_streak = 0u32;
        let mut longest_break = 0u32;

        for day in days_inclusive(window.start, window.end) {
            let commits = profile.commits_on(day);
            let month = monthly_breakdown.entry(month_key(day)).or_insert(0);

            if commits > 0 {
                *month += commits;
                total_commits += commits;
                active_values.push(commits as f64);
                if is_weekend(day) {
                    weekend_commits += commits;
                } else {
                    weekday_commits += commits;
                }
                streak += 1;
                gap = 0;
                longest_streak = longest_streak.max(streak);
            } else {
                gap += 1;
                streak = 0;
                longest_break = longest_break.max(gap);
            }
        }

        let most_active_month = if total_commits == 0 {
            None
        } else {
            // Strict `>` keeps the earliest month on ties
            let mut best: Option<(&String, u64)> = None;
            for (month, &commits) in &monthly_breakdown {
                if best.is_none_or(|(_, top)| commits > top) {
                    best = Some((month, commits));
                }
            }
            best.map(|(month, _)| month.clone())
        };

        let (weekday_ratio, weekend_ratio) = if total_commits == 0 {
            (0.0, 0.0)
        } else {
            (
                weekday_commits as f64 / total_commits as f64,
                weekend_commits as f64 / total_commits as f64,
            )
        };

        let per = |divisor: f64| {
            if divisor > 0.0 {
                total_commits as f64 / divisor
            } else {
                0.0
            }
        };

        ActivityMetrics {
            user_id: profile.user_id.clone(),
            total_commits,
            avg_commits_per_day: per(days),
            avg_commits_per_week: per(days / DAYS_PER_WEEK as f64),
            avg_commits_per_month: per(days / AVERAGE_DAYS_PER_MONTH),
            active_days: active_values.len(),
            consistency_score: Self::consistency_score(&active_values),
            longest_streak,
            longest_break,
            monthly_breakdown,
            most_active_month,
            weekday_commits,
            weekend_commits,
            weekday_ratio,
            weekend_ratio,
        }
    }

    /// Metrics for every profile, keyed by user id
    pub fn calculate_all(
        profiles: &[UserProfile],
        window: &DateRange,
    ) -> BTreeMap<String, ActivityMetrics> {
        let metrics: BTreeMap<String, ActivityMetrics> = profiles
            .par_iter()
            .map(|profile| (profile.user_id.clone(), Self::calculate(profile, window)))
            .collect();
        info!(
            "Computed behavioral metrics for {} users over {} days",
            metrics.len(),
            window.days()
        );
        metrics
    }

    /// `1 / (1 + cv)` over active-day values
    ///
    /// 0.0 with fewer than two active days.
    pub fn consistency_score(active_values: &[f64]) -> f64 {
        if active_values.len() < 2 {
            return 0.0;
        }
        match (mean(active_values), population_std(active_values)) {
            (Some(m), Some(std)) if m > 0.0 => 1.0 / (1.0 + std / m),
            _ => 0.0,
        }
    }

    /// Activity tier from window total / configured month count
    pub fn classify_activity(
        metrics: &ActivityMetrics,
        settings: &PowerUserSettings,
    ) -> ActivityCategory {
        if metrics.total_commits == 0 {
            return ActivityCategory::Inactive;
        }
        let monthly_average = metrics.total_commits as f64 / settings.month_count;
        if monthly_average <= settings.casual_monthly_average {
            ActivityCategory::Casual
        } else if monthly_average >= settings.power_monthly_average {
            ActivityCategory::Power
        } else {
            ActivityCategory::Regular
        }
    }

    pub fn categorise<'a>(
        metrics: impl IntoIterator<Item = &'a ActivityMetrics>,
        settings: &PowerUserSettings,
    ) -> ActivityCategories {
        let mut categories = ActivityCategories::default();
        for m in metrics {
            categories.push(Self::classify_activity(m, settings), m.user_id.clone());
        }
        categories
    }

    /// Positive commits per YYYY-MM within `window`
    pub fn monthly_totals(profile: &UserProfile, window: &DateRange) -> HashMap<String, u64> {
        let mut monthly = HashMap::new();
        for (date, commits) in profile.days_in(window.start..=window.end) {
            if commits > 0 {
                *monthly.entry(month_key(date)).or_insert(0) += commits;
            }
        }
        monthly
    }

    /// Identify power users under one of the two definitions
    pub fn power_users(
        profiles: &[UserProfile],
        window: &DateRange,
        method: PowerUserMethod,
    ) -> PowerUserReport {
        let mut power_users: Vec<PowerUser> = profiles
            .par_iter()
            .filter_map(|profile| {
                let monthly = Self::monthly_totals(profile, window);
                let max_monthly_commits = monthly.values().copied().max().unwrap_or(0);
                let total_commits: u64 = monthly.values().sum();

                let is_power = match method {
                    PowerUserMethod::MonthlyPeak { threshold } => max_monthly_commits > threshold,
                    PowerUserMethod::AverageMonthly {
                        threshold,
                        month_count,
                    } => month_count > 0.0 && total_commits as f64 / month_count >= threshold,
                };

                is_power.then(|| PowerUser {
                    user_id: profile.user_id.clone(),
                    max_monthly_commits,
                    total_commits,
                })
            })
            .collect();

        power_users.sort_by(|a, b| {
            b.max_monthly_commits
                .cmp(&a.max_monthly_commits)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        info!(
            "Power users ({:?}): {} of {}",
            method,
            power_users.len(),
            profiles.len()
        );

        PowerUserReport {
            method,
            regular_user_count: profiles.len() - power_users.len(),
            power_users,
        }
    }

    /// Users bucketed by how many weeks of the matrix they were active
    pub fn activity_frequency(matrix: &UserWeekMatrix) -> ActivityFrequency {
        let mut active_weeks: BTreeMap<&str, usize> =
            matrix.users.iter().map(|u| (u.as_str(), 0)).collect();
        for obs in matrix.observations.iter().filter(|o| o.commits > 0) {
            *active_weeks.entry(obs.user_id.as_str()).or_insert(0) += 1;
        }

        let mut frequency = ActivityFrequency {
            total_users_with_data: active_weeks.len(),
            total_weeks_possible: matrix.weeks.len(),
            ..ActivityFrequency::default()
        };
        for &weeks in active_weeks.values() {
            match weeks {
                0 => frequency.never_active += 1,
                1..=5 => frequency.rarely_active += 1,
                6..=10 => frequency.sometimes_active += 1,
                11..=15 => frequency.often_active += 1,
                _ => frequency.very_active += 1,
            }
        }
        frequency
    }
}
