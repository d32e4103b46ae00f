//! Time utilities for temporal analysis
//!
//! Shared calendar helpers for anchor-relative weekly bucketing, day-window
//! walks and month keys used across the temporal analysers.

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Days in one week bucket
pub const DAYS_PER_WEEK: i64 = 7;

/// Mean Gregorian month length, used to express a day window in months
pub const AVERAGE_DAYS_PER_MONTH: f64 = 365.2425 / 12.0;

/// Canonical date format for input keys and report output
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO 8601 date string (YYYY-MM-DD)
///
/// # Examples
/// ```
/// use commit_activity_research::utils::time::parse_iso_date;
/// assert!(parse_iso_date("2024-05-01").is_ok());
/// assert!(parse_iso_date("2024-13-01").is_err());
/// ```
pub fn parse_iso_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT).map_err(|e| AppError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Format a date as YYYY-MM-DD
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Anchor-relative week index: `floor((date - anchor) / 7)`
///
/// Floor division keeps dates before the anchor in negative weeks
/// (`anchor - 1 day` is week -1, not week 0).
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use commit_activity_research::utils::time::week_number;
/// let anchor = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// assert_eq!(week_number(NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(), anchor), 0);
/// assert_eq!(week_number(NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(), anchor), 1);
/// assert_eq!(week_number(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), anchor), -1);
/// ```
pub fn week_number(date: NaiveDate, anchor: NaiveDate) -> i64 {
    (date - anchor).num_days().div_euclid(DAYS_PER_WEEK)
}

/// Start date of the anchor-relative week containing `date`
pub fn week_start(date: NaiveDate, anchor: NaiveDate) -> NaiveDate {
    anchor + Duration::days(DAYS_PER_WEEK * week_number(date, anchor))
}

/// Last day (inclusive) of the week bucket starting at `bucket_start`
pub fn week_end(bucket_start: NaiveDate) -> NaiveDate {
    bucket_start + Duration::days(DAYS_PER_WEEK - 1)
}

/// Every calendar day in `[start, end]`, in order. Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Number of calendar days in `[start, end]` (0 when `start > end`)
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

/// Month key (YYYY-MM) for a date
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Calendar quarter (1-4) for a month number (1-12)
pub fn quarter_of(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

/// Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
