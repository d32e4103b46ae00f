//! Common Test Utilities
//!
//! Synthetic commit snapshots shared by the unit and integration suites.
//! Every fixture is deterministic so tests can assert exact cohort
//! membership and category counts.

#![allow(dead_code)]

use chrono::{Datelike, NaiveDate};
use commit_activity_research::types::{Dataset, UserRecord};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// First and last day with activity in [`study_dataset`]
pub const FIRST_DAY: (i32, u32, u32) = (2024, 5, 1);
pub const LAST_DAY: (i32, u32, u32) = (2024, 8, 31);

/// Builder for one user's daily commit map
pub struct UserBuilder {
    daily: BTreeMap<String, u64>,
}

impl UserBuilder {
    pub fn new() -> Self {
        Self {
            daily: BTreeMap::new(),
        }
    }

    /// Add `commits(day)` for every day in `start..=end` where it is non-zero
    pub fn daily(
        mut self,
        start: NaiveDate,
        end: NaiveDate,
        commits: impl Fn(NaiveDate) -> u64,
    ) -> Self {
        for day in start.iter_days().take_while(|day| *day <= end) {
            let count = commits(day);
            if count > 0 {
                *self.daily.entry(day.to_string()).or_insert(0) += count;
            }
        }
        self
    }

    /// Add a raw key, malformed or not
    pub fn raw(mut self, key: &str, commits: u64) -> Self {
        self.daily.insert(key.to_string(), commits);
        self
    }

    pub fn build(self) -> UserRecord {
        let total = self.daily.values().sum();
        UserRecord {
            daily_commits: self.daily,
            total_commits: Some(total),
        }
    }
}

fn is_weekend(day: NaiveDate) -> bool {
    day.weekday().number_from_monday() >= 6
}

/// Nine users spanning every behaviour the analyses distinguish
///
/// - `steady_1..3`: 1/2/3 commits every weekday
/// - `weekend_dev`: 3 commits every Saturday and Sunday
/// - `power_dev`: 10-14 commits every day
/// - `dropout`: 1 commit a day until 2024-07-10
/// - `late_joiner`: 2 commits a day from 2024-07-20
/// - `silent`: no activity at all
/// - `bad_dates`: one valid entry plus one malformed key
pub fn study_dataset() -> Dataset {
    let start = d(FIRST_DAY.0, FIRST_DAY.1, FIRST_DAY.2);
    let end = d(LAST_DAY.0, LAST_DAY.1, LAST_DAY.2);
    let mut dataset = Dataset::default();

    for i in 1..=3u64 {
        dataset.insert(
            format!("steady_{}", i),
            UserBuilder::new()
                .daily(start, end, |day| if is_weekend(day) { 0 } else { i })
                .build(),
        );
    }
    dataset.insert(
        "weekend_dev",
        UserBuilder::new()
            .daily(start, end, |day| if is_weekend(day) { 3 } else { 0 })
            .build(),
    );
    dataset.insert(
        "power_dev",
        UserBuilder::new()
            .daily(start, end, |day| 10 + (day.day() as u64 % 5))
            .build(),
    );
    dataset.insert(
        "dropout",
        UserBuilder::new().daily(start, d(2024, 7, 10), |_| 1).build(),
    );
    dataset.insert(
        "late_joiner",
        UserBuilder::new().daily(d(2024, 7, 20), end, |_| 2).build(),
    );
    dataset.insert("silent", UserBuilder::new().build());
    dataset.insert(
        "bad_dates",
        UserBuilder::new()
            .raw("2024-05-01", 1)
            .raw("05/02/2024", 4)
            .build(),
    );

    dataset
}

/// Same shape as [`study_dataset`] with every count doubled
pub fn doubled_dataset() -> Dataset {
    let mut dataset = study_dataset();
    for record in dataset.users.values_mut() {
        for count in record.daily_commits.values_mut() {
            *count *= 2;
        }
        record.total_commits = record.total_commits.map(|t| t * 2);
    }
    dataset
}

/// Sum of every well-formed daily count in `dataset`
pub fn valid_commit_total(dataset: &Dataset) -> u64 {
    dataset
        .users
        .values()
        .flat_map(|record| record.daily_commits.iter())
        .filter(|(key, _)| NaiveDate::parse_from_str(key, "%Y-%m-%d").is_ok())
        .map(|(_, count)| *count)
        .sum()
}

/// Write `dataset` to a temporary JSON file in the loader's input shape
pub fn write_dataset_json(dataset: &Dataset) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let json = serde_json::to_string_pretty(dataset).unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
