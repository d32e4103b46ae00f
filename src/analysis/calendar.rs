//! Anchor-relative weekly bucketing
//!
//! Buckets are fixed 7-day windows counted from a configurable anchor date,
//! so the same date always lands in the same bucket for a given anchor.
//! Dates before the anchor fall into negative weeks via floor division.

use crate::utils::time::{week_end, week_number, week_start};
use chrono::NaiveDate;

/// Maps calendar dates to their week bucket start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBucketer {
    anchor: NaiveDate,
}

impl WeekBucketer {
    pub fn new(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Start date of the bucket containing `date`
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        week_start(date, self.anchor)
    }

    pub fn week_number(&self, date: NaiveDate) -> i64 {
        week_number(date, self.anchor)
    }

    /// Last day (inclusive) of the bucket containing `date`
    pub fn bucket_end(&self, date: NaiveDate) -> NaiveDate {
        week_end(self.bucket(date))
    }
}
