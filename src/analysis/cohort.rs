//! Consistent-user cohort selection
//!
//! A user joins the cohort iff their weekly map, restricted to the
//! requirement window, has an entry for every window bucket and every such
//! entry is positive. Activity outside the window is irrelevant.

use super::aggregation::Aggregator;
use super::calendar::WeekBucketer;
use crate::types::analysis_results::{AnalysisWarning, Cohort, CohortSelection};
use crate::types::UserProfile;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

pub struct CohortFilter;

impl CohortFilter {
    /// Whether one user's weekly map satisfies the window requirement
    ///
    /// An empty window disqualifies everyone.
    pub fn qualifies(weekly: &BTreeMap<NaiveDate, u64>, window: &BTreeSet<NaiveDate>) -> bool {
        if window.is_empty() {
            return false;
        }
        let in_window: Vec<u64> = weekly
            .iter()
            .filter(|(week, _)| window.contains(*week))
            .map(|(_, &commits)| commits)
            .collect();
        in_window.len() == window.len() && in_window.iter().all(|&c| c > 0)
    }

    /// Select the cohort from precomputed weekly maps
    pub fn consistent_users<'a>(
        weekly_by_user: impl IntoIterator<Item = (&'a str, &'a BTreeMap<NaiveDate, u64>)>,
        window: &[NaiveDate],
    ) -> CohortSelection {
        let window: BTreeSet<NaiveDate> = window.iter().copied().collect();
        let mut candidates = 0usize;
        let mut members = BTreeSet::new();

        for (user_id, weekly) in weekly_by_user {
            candidates += 1;
            if Self::qualifies(weekly, &window) {
                members.insert(user_id.to_string());
            }
        }

        let mut warnings = Vec::new();
        if window.is_empty() {
            warn!("Pre-treatment window is empty; no user can qualify for the cohort");
            warnings.push(AnalysisWarning::EmptyPreTreatmentWindow);
        } else if members.is_empty() {
            warn!(
                "No user was active in all {} pre-treatment weeks",
                window.len()
            );
            warnings.push(AnalysisWarning::EmptyCohort {
                window_weeks: window.len(),
            });
        }

        info!(
            "Consistent users: {} of {} ({} required weeks)",
            members.len(),
            candidates,
            window.len()
        );

        CohortSelection {
            cohort: Cohort::new(members, window.into_iter().collect()),
            candidates,
            warnings,
        }
    }

    /// Bucket every profile and select the cohort over `window`
    pub fn select(
        profiles: &[UserProfile],
        bucketer: &WeekBucketer,
        window: &[NaiveDate],
    ) -> CohortSelection {
        let weekly: Vec<(&str, BTreeMap<NaiveDate, u64>)> = profiles
            .iter()
            .map(|p| {
                (
                    p.user_id.as_str(),
                    Aggregator::user_weekly_commits(p, bucketer),
                )
            })
            .collect();
        Self::consistent_users(weekly.iter().map(|(id, w)| (*id, w)), window)
    }
}
