//! Weekly aggregation types

use super::AnalysisWarning;
use crate::types::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total commits for one week bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTotal {
    /// Bucket start (anchor-relative)
    pub week_start: NaiveDate,
    pub commits: u64,
}

/// Weekly totals across a user population
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyTotalsReport {
    pub anchor: Option<NaiveDate>,
    /// Number of users whose commits were summed
    pub user_count: usize,
    /// Ascending by `week_start`; one entry per selected bucket (zero-filled)
    pub weeks: Vec<WeekTotal>,
    pub total_commits: u64,
    /// Buckets removed by trim-ends mode, with their totals
    pub trimmed: Vec<WeekTotal>,
    /// Treatment range to shade in charts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<DateRange>,
    pub warnings: Vec<AnalysisWarning>,
}

impl WeeklyTotalsReport {
    pub fn peak_week(&self) -> Option<&WeekTotal> {
        self.weeks
            .iter()
            .max_by(|a, b| a.commits.cmp(&b.commits).then(b.week_start.cmp(&a.week_start)))
    }

    pub fn lowest_week(&self) -> Option<&WeekTotal> {
        self.weeks
            .iter()
            .min_by(|a, b| a.commits.cmp(&b.commits).then(a.week_start.cmp(&b.week_start)))
    }

    /// Mean commits per week (0.0 when there are no weeks)
    pub fn average_per_week(&self) -> f64 {
        if self.weeks.is_empty() {
            0.0
        } else {
            self.total_commits as f64 / self.weeks.len() as f64
        }
    }
}

/// One `(user, week, commits)` cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWeekObservation {
    pub user_id: String,
    pub week_start: NaiveDate,
    pub commits: u64,
}

/// Whether zero-commit cells are materialised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixDensity {
    /// Every (user, week) pair, zero-filled
    #[default]
    Dense,
    /// Only cells with commits > 0
    Sparse,
}

/// User x week observation matrix
///
/// `users` is the population the matrix was built for (the cohort when one
/// was applied). Per-week averages divide by `users.len()` regardless of
/// density, so sparse matrices still average over silent users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserWeekMatrix {
    pub density: MatrixDensity,
    /// Ascending bucket starts
    pub weeks: Vec<NaiveDate>,
    /// Ascending user ids
    pub users: Vec<String>,
    /// Ordered by user, then week
    pub observations: Vec<UserWeekObservation>,
}

impl UserWeekMatrix {
    pub fn population(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Sum of commits per week bucket (every bucket present, zero-filled)
    pub fn week_sums(&self) -> BTreeMap<NaiveDate, u64> {
        let mut sums: BTreeMap<NaiveDate, u64> = self.weeks.iter().map(|w| (*w, 0)).collect();
        for obs in &self.observations {
            *sums.entry(obs.week_start).or_insert(0) += obs.commits;
        }
        sums
    }
}

/// Per-week mean commits per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverage {
    pub week_start: NaiveDate,
    pub average_commits: f64,
}

/// Position of a bucket relative to the treatment bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentPeriod {
    PreTreatment,
    Treatment,
    PostTreatment,
}

impl TreatmentPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            TreatmentPeriod::PreTreatment => "Pre-treatment",
            TreatmentPeriod::Treatment => "Treatment",
            TreatmentPeriod::PostTreatment => "Post-treatment",
        }
    }
}
