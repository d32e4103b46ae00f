//! Period filtering of week buckets
//!
//! Two selection modes: an explicit inclusive range of bucket starts, or
//! "trim ends" which drops the earliest and latest observed bucket to avoid
//! partial boundary weeks.

use crate::types::analysis_results::{AnalysisWarning, TreatmentPeriod};
use crate::types::DateRange;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::warn;

/// Buckets kept by a period filter, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodSelection {
    pub weeks: Vec<NaiveDate>,
    /// Buckets dropped by trim-ends mode
    pub trimmed: Vec<NaiveDate>,
    pub warnings: Vec<AnalysisWarning>,
}

pub struct PeriodFilter;

impl PeriodFilter {
    /// Buckets with `start <= bucket <= end`, deduplicated and ascending
    pub fn filter_in_range(
        buckets: impl IntoIterator<Item = NaiveDate>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<NaiveDate> {
        buckets
            .into_iter()
            .filter(|b| start <= *b && *b <= end)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Drop the earliest and latest bucket
    ///
    /// With two or fewer buckets nothing is dropped and a
    /// [`AnalysisWarning::TooFewWeeksToTrim`] is attached.
    pub fn trim_ends(buckets: impl IntoIterator<Item = NaiveDate>) -> PeriodSelection {
        let sorted: Vec<NaiveDate> = buckets
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if sorted.len() <= 2 {
            warn!(
                "Only {} week buckets available, keeping first and last weeks",
                sorted.len()
            );
            return PeriodSelection {
                warnings: vec![AnalysisWarning::TooFewWeeksToTrim {
                    week_count: sorted.len(),
                }],
                weeks: sorted,
                trimmed: Vec::new(),
            };
        }

        let last = sorted.len() - 1;
        PeriodSelection {
            trimmed: vec![sorted[0], sorted[last]],
            weeks: sorted[1..last].to_vec(),
            warnings: Vec::new(),
        }
    }

    /// Apply an explicit range, or trim-ends mode when `period` is `None`
    pub fn select(
        buckets: impl IntoIterator<Item = NaiveDate>,
        period: Option<&DateRange>,
    ) -> PeriodSelection {
        let mut selection = match period {
            Some(range) => PeriodSelection {
                weeks: Self::filter_in_range(buckets, range.start, range.end),
                ..PeriodSelection::default()
            },
            None => Self::trim_ends(buckets),
        };
        if selection.weeks.is_empty() {
            warn!("No week buckets fall inside the analysis period");
            selection.warnings.push(AnalysisWarning::NoWeeksInPeriod);
        }
        selection
    }

    /// Buckets strictly before the treatment bucket
    pub fn pre_treatment(weeks: &[NaiveDate], treatment_bucket: NaiveDate) -> Vec<NaiveDate> {
        weeks
            .iter()
            .copied()
            .filter(|w| *w < treatment_bucket)
            .collect()
    }

    pub fn classify(bucket: NaiveDate, treatment_bucket: NaiveDate) -> TreatmentPeriod {
        match bucket.cmp(&treatment_bucket) {
            std::cmp::Ordering::Less => TreatmentPeriod::PreTreatment,
            std::cmp::Ordering::Equal => TreatmentPeriod::Treatment,
            std::cmp::Ordering::Greater => TreatmentPeriod::PostTreatment,
        }
    }
}
