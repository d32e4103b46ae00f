//! Caller-visible analysis warnings
//!
//! Degenerate-but-deterministic outcomes are reported here rather than as
//! errors, so a report can distinguish "no outliers found" from "the
//! configuration left nothing to analyse".

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// No bucket precedes the treatment bucket; every user is disqualified
    EmptyPreTreatmentWindow,
    /// Pre-treatment window is non-empty but no user qualified
    EmptyCohort { window_weeks: usize },
    /// Trim-ends mode needs more than two buckets; all buckets were kept
    TooFewWeeksToTrim { week_count: usize },
    /// Period filtering left no buckets
    NoWeeksInPeriod,
    /// Daily entries dropped at load time
    SkippedMalformedDates { count: usize },
    /// Excluding power users left nobody to average over
    NoRegularUsers,
}

impl fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisWarning::EmptyPreTreatmentWindow => write!(
                f,
                "pre-treatment window is empty: no user can qualify for the cohort"
            ),
            AnalysisWarning::EmptyCohort { window_weeks } => write!(
                f,
                "no user was active in all {} pre-treatment weeks",
                window_weeks
            ),
            AnalysisWarning::TooFewWeeksToTrim { week_count } => write!(
                f,
                "only {} weeks available: first and last weeks kept",
                week_count
            ),
            AnalysisWarning::NoWeeksInPeriod => {
                write!(f, "no week buckets fall inside the analysis period")
            }
            AnalysisWarning::SkippedMalformedDates { count } => {
                write!(f, "{} daily entries skipped due to malformed dates", count)
            }
            AnalysisWarning::NoRegularUsers => {
                write!(f, "no regular users remain after removing power users")
            }
        }
    }
}
