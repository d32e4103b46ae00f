//! Commit activity input types
//!
//! `Dataset` mirrors the on-disk JSON mapping (`user -> {daily_commits, ...}`)
//! and stays string-keyed. `UserProfile` is the parsed, date-keyed view that
//! every analyser consumes.

use crate::errors::{AppError, AppResult};
use crate::utils::time::parse_iso_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// One user's raw record as supplied by the loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// ISO date string -> commit count
    #[serde(default)]
    pub daily_commits: BTreeMap<String, u64>,

    /// Precomputed total from the collector (not trusted for period-scoped maths)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_commits: Option<u64>,
}

/// Raw input snapshot: user id -> record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub users: BTreeMap<String, UserRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Insert or replace a user's record
    pub fn insert(&mut self, user_id: impl Into<String>, record: UserRecord) {
        self.users.insert(user_id.into(), record);
    }

    /// Parse every user's date keys into [`UserProfile`]s
    ///
    /// Malformed date keys are skipped and counted, never fatal. The run
    /// fails only when there are no users at all, or when every date key in
    /// the snapshot is unparseable.
    pub fn to_profiles(&self) -> AppResult<ParsedDataset> {
        if self.users.is_empty() {
            return Err(AppError::EmptyDataset(
                "input contains no users".to_string(),
            ));
        }

        let mut profiles = Vec::with_capacity(self.users.len());
        let mut total_entries = 0usize;
        let mut skipped_dates = 0usize;

        for (user_id, record) in &self.users {
            let mut daily = BTreeMap::new();
            for (date_str, &count) in &record.daily_commits {
                total_entries += 1;
                match parse_iso_date(date_str) {
                    Ok(date) => {
                        *daily.entry(date).or_insert(0) += count;
                    }
                    Err(e) => {
                        skipped_dates += 1;
                        debug!("Skipping record for user {}: {}", user_id, e);
                    }
                }
            }
            profiles.push(UserProfile {
                user_id: user_id.clone(),
                daily_commits: daily,
                reported_total: record.total_commits,
            });
        }

        if total_entries > 0 && skipped_dates == total_entries {
            return Err(AppError::EmptyDataset(format!(
                "all {} daily entries have unparseable dates",
                total_entries
            )));
        }

        if skipped_dates > 0 {
            warn!(
                "Skipped {} of {} daily entries with malformed dates",
                skipped_dates, total_entries
            );
        }

        Ok(ParsedDataset {
            profiles,
            skipped_dates,
        })
    }
}

/// Single `(user, date, commits)` observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub commit_count: u64,
}

/// A user's parsed daily activity
///
/// Dates are unique and not required to be contiguous; an absent date means
/// zero commits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub daily_commits: BTreeMap<NaiveDate, u64>,
    /// Collector-supplied total, kept for reference only
    pub reported_total: Option<u64>,
}

impl UserProfile {
    pub fn new(
        user_id: impl Into<String>,
        daily: impl IntoIterator<Item = (NaiveDate, u64)>,
    ) -> Self {
        let mut daily_commits = BTreeMap::new();
        for (date, count) in daily {
            *daily_commits.entry(date).or_insert(0) += count;
        }
        Self {
            user_id: user_id.into(),
            daily_commits,
            reported_total: None,
        }
    }

    /// Commits on `date`, zero when absent
    pub fn commits_on(&self, date: NaiveDate) -> u64 {
        self.daily_commits.get(&date).copied().unwrap_or(0)
    }

    /// Entries with a strictly positive count
    pub fn active_days(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.daily_commits
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&date, &count)| (date, count))
    }

    /// Entries falling in `range` (zero counts included)
    pub fn days_in(
        &self,
        range: RangeInclusive<NaiveDate>,
    ) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.daily_commits
            .range(range)
            .map(|(&date, &count)| (date, count))
    }

    /// Recomputed total over `range`
    pub fn total_in(&self, range: RangeInclusive<NaiveDate>) -> u64 {
        self.days_in(range).map(|(_, count)| count).sum()
    }

    /// Recomputed total over every parsed date
    pub fn total_commits(&self) -> u64 {
        self.daily_commits.values().sum()
    }

    /// Flatten into [`DailyRecord`]s
    pub fn records(&self) -> impl Iterator<Item = DailyRecord> + '_ {
        self.daily_commits.iter().map(|(&date, &count)| DailyRecord {
            user_id: self.user_id.clone(),
            date,
            commit_count: count,
        })
    }
}

/// Parsed snapshot handed to the analysis engine
#[derive(Debug, Clone, Default)]
pub struct ParsedDataset {
    /// Sorted by user id
    pub profiles: Vec<UserProfile>,
    /// Daily entries dropped because their date key did not parse
    pub skipped_dates: usize,
}
