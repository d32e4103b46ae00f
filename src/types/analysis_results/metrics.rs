//! Per-user behavioral metric types

use super::{AnalysisWarning, Percentiles};
use crate::types::DateRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Behavioral metrics for one user over the metrics window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetrics {
    pub user_id: String,
    /// Recomputed over the window (collector totals are ignored)
    pub total_commits: u64,
    /// Divisors are window lengths, not active-period counts
    pub avg_commits_per_day: f64,
    pub avg_commits_per_week: f64,
    pub avg_commits_per_month: f64,
    pub active_days: usize,
    /// `1 / (1 + cv)` over active days; 0.0 when fewer than two active days
    pub consistency_score: f64,
    /// Longest run of consecutive active days
    pub longest_streak: u32,
    /// Longest run of consecutive inactive days (missing dates count)
    pub longest_break: u32,
    /// YYYY-MM -> commits, every month touched by the window present
    pub monthly_breakdown: BTreeMap<String, u64>,
    /// `None` for users with no activity in the window
    pub most_active_month: Option<String>,
    pub weekday_commits: u64,
    pub weekend_commits: u64,
    /// Both ratios are 0.0 when total activity is zero
    pub weekday_ratio: f64,
    pub weekend_ratio: f64,
}

/// Activity tier from average commits per month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Inactive,
    Casual,
    Regular,
    Power,
}

/// Users grouped by [`ActivityCategory`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityCategories {
    pub inactive: Vec<String>,
    pub casual: Vec<String>,
    pub regular: Vec<String>,
    pub power_users: Vec<String>,
}

impl ActivityCategories {
    pub fn total(&self) -> usize {
        self.inactive.len() + self.casual.len() + self.regular.len() + self.power_users.len()
    }

    pub fn push(&mut self, category: ActivityCategory, user_id: String) {
        match category {
            ActivityCategory::Inactive => self.inactive.push(user_id),
            ActivityCategory::Casual => self.casual.push(user_id),
            ActivityCategory::Regular => self.regular.push(user_id),
            ActivityCategory::Power => self.power_users.push(user_id),
        }
    }
}

/// Two deliberately distinct power-user definitions
///
/// They disagree when the window spans a partial month, so neither is
/// derived from the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PowerUserMethod {
    /// More than `threshold` commits within any single calendar month
    MonthlyPeak { threshold: u64 },
    /// Window total / `month_count` >= `threshold`
    AverageMonthly { threshold: f64, month_count: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUser {
    pub user_id: String,
    pub max_monthly_commits: u64,
    pub total_commits: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUserReport {
    pub method: PowerUserMethod,
    /// Sorted by `max_monthly_commits` descending, then user id
    pub power_users: Vec<PowerUser>,
    pub regular_user_count: usize,
}

impl PowerUserReport {
    pub fn contains(&self, user_id: &str) -> bool {
        self.power_users.iter().any(|p| p.user_id == user_id)
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &str> {
        self.power_users.iter().map(|p| p.user_id.as_str())
    }
}

/// Users bucketed by number of active weeks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFrequency {
    pub total_users_with_data: usize,
    pub never_active: usize,
    /// 1-5 active weeks
    pub rarely_active: usize,
    /// 6-10 active weeks
    pub sometimes_active: usize,
    /// 11-15 active weeks
    pub often_active: usize,
    /// 16+ active weeks
    pub very_active: usize,
    pub total_weeks_possible: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

/// mean +/- k x std for k = 1, 2, 3
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaBands {
    pub one: Band,
    pub two: Band,
    pub three: Band,
}

/// How many users each tail rule flagged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricOutlierCounts {
    pub iqr: usize,
    pub beyond_2_sigma: usize,
    pub beyond_3_sigma: usize,
    pub top_tail: usize,
    pub bottom_tail: usize,
}

/// Distribution of one metric across users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub metric: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub percentiles: Option<Percentiles>,
    pub sigma_bands: Option<SigmaBands>,
    pub iqr_fences: Option<Band>,
    /// Upper tail boundary (value >= boundary)
    pub top_tail_boundary: Option<f64>,
    /// Lower tail boundary (value <= boundary)
    pub bottom_tail_boundary: Option<f64>,
    pub flagged: MetricOutlierCounts,
}

/// Headline behaviour counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourHighlights {
    /// Consistency score > 0.7
    pub highly_consistent: usize,
    /// Longest streak > 30 days
    pub long_streaks: usize,
    /// Weekend ratio > 0.5
    pub weekend_heavy: usize,
}

/// Individual-user analysis over the metrics window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualAnalysisReport {
    pub window: DateRange,
    pub user_count: usize,
    pub metrics: BTreeMap<String, ActivityMetrics>,
    pub categories: ActivityCategories,
    pub monthly_power_users: PowerUserReport,
    pub average_power_users: PowerUserReport,
    pub distributions: Vec<MetricDistribution>,
    pub highlights: BehaviourHighlights,
    pub warnings: Vec<AnalysisWarning>,
}
