//! Weekly aggregation of daily commit records
//!
//! Only strictly positive daily counts are summed: an explicit zero on a date
//! contributes exactly what an absent date does. Averages over a user-week
//! matrix always divide by the population it was built for, never by the
//! number of active cells.

use super::calendar::WeekBucketer;
use super::period::PeriodSelection;
use crate::types::analysis_results::{
    AnalysisWarning, Cohort, MatrixDensity, UserWeekMatrix, UserWeekObservation, WeekTotal,
    WeeklyAverage, WeeklyTotalsReport,
};
use crate::types::UserProfile;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

pub struct Aggregator;

impl Aggregator {
    /// Bucket one user's positive daily counts into weekly sums
    ///
    /// Every key in the result has a positive value.
    pub fn user_weekly_commits(
        profile: &UserProfile,
        bucketer: &WeekBucketer,
    ) -> BTreeMap<NaiveDate, u64> {
        let mut weekly = BTreeMap::new();
        for (date, count) in profile.active_days() {
            *weekly.entry(bucketer.bucket(date)).or_insert(0) += count;
        }
        weekly
    }

    /// Buckets in which any user has a positive count
    pub fn observed_buckets<'a>(
        profiles: impl IntoIterator<Item = &'a UserProfile>,
        bucketer: &WeekBucketer,
    ) -> BTreeSet<NaiveDate> {
        profiles
            .into_iter()
            .flat_map(|p| p.active_days().map(|(date, _)| bucketer.bucket(date)))
            .collect()
    }

    /// Total commits per selected bucket
    ///
    /// Every selected bucket appears in the report, zero-filled. Buckets that
    /// trim-ends mode removed are reported separately in `trimmed`.
    pub fn weekly_totals<'a>(
        profiles: impl IntoIterator<Item = &'a UserProfile>,
        bucketer: &WeekBucketer,
        selection: &PeriodSelection,
        cohort: Option<&'a Cohort>,
    ) -> WeeklyTotalsReport {
        let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        let mut user_count = 0usize;

        for profile in Self::members(profiles, cohort) {
            user_count += 1;
            for (week, commits) in Self::user_weekly_commits(profile, bucketer) {
                *totals.entry(week).or_insert(0) += commits;
            }
        }

        let lookup = |weeks: &[NaiveDate]| -> Vec<WeekTotal> {
            weeks
                .iter()
                .map(|&week_start| WeekTotal {
                    week_start,
                    commits: totals.get(&week_start).copied().unwrap_or(0),
                })
                .collect()
        };

        let weeks = lookup(&selection.weeks);
        let trimmed = lookup(&selection.trimmed);
        let total_commits = weeks.iter().map(|w| w.commits).sum();

        debug!(
            "Weekly totals: {} users, {} weeks, {} commits",
            user_count,
            weeks.len(),
            total_commits
        );

        WeeklyTotalsReport {
            anchor: Some(bucketer.anchor()),
            user_count,
            weeks,
            total_commits,
            trimmed,
            treatment: None,
            warnings: selection.warnings.clone(),
        }
    }

    /// Build the user x week observation matrix over `weeks`
    ///
    /// Dense matrices materialise every (user, week) pair with zero default;
    /// sparse ones keep only cells with commits > 0. Either way `users` is
    /// the full population considered.
    pub fn user_week_matrix<'a>(
        profiles: impl IntoIterator<Item = &'a UserProfile>,
        bucketer: &WeekBucketer,
        weeks: &[NaiveDate],
        cohort: Option<&'a Cohort>,
        density: MatrixDensity,
    ) -> UserWeekMatrix {
        let weeks: Vec<NaiveDate> = weeks
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut members: Vec<&UserProfile> = Self::members(profiles, cohort).collect();
        members.sort_by(|a, b| a.user_id.cmp(&b.user_id));

        let mut observations = Vec::with_capacity(match density {
            MatrixDensity::Dense => members.len() * weeks.len(),
            MatrixDensity::Sparse => 0,
        });

        for profile in &members {
            let weekly = Self::user_weekly_commits(profile, bucketer);
            for &week_start in &weeks {
                let commits = weekly.get(&week_start).copied().unwrap_or(0);
                if density == MatrixDensity::Sparse && commits == 0 {
                    continue;
                }
                observations.push(UserWeekObservation {
                    user_id: profile.user_id.clone(),
                    week_start,
                    commits,
                });
            }
        }

        UserWeekMatrix {
            density,
            weeks,
            users: members.iter().map(|p| p.user_id.clone()).collect(),
            observations,
        }
    }

    /// Per-week sum divided by the matrix population
    pub fn weekly_averages(matrix: &UserWeekMatrix) -> Vec<WeeklyAverage> {
        Self::averages_from_sums(&matrix.week_sums(), matrix.population())
    }

    /// Weekly averages over the matrix users not in `excluded`
    ///
    /// When nobody remains the averages are all zero and
    /// [`AnalysisWarning::NoRegularUsers`] is returned.
    pub fn averages_excluding(
        matrix: &UserWeekMatrix,
        excluded: &BTreeSet<String>,
    ) -> (Vec<WeeklyAverage>, Vec<AnalysisWarning>) {
        let remaining = matrix
            .users
            .iter()
            .filter(|u| !excluded.contains(*u))
            .count();

        let mut sums: BTreeMap<NaiveDate, u64> = matrix.weeks.iter().map(|w| (*w, 0)).collect();
        for obs in matrix
            .observations
            .iter()
            .filter(|o| !excluded.contains(&o.user_id))
        {
            *sums.entry(obs.week_start).or_insert(0) += obs.commits;
        }

        let mut warnings = Vec::new();
        if remaining == 0 {
            warn!("No regular users remain after exclusion");
            warnings.push(AnalysisWarning::NoRegularUsers);
        }
        (Self::averages_from_sums(&sums, remaining), warnings)
    }

    pub(crate) fn averages_from_sums(
        sums: &BTreeMap<NaiveDate, u64>,
        population: usize,
    ) -> Vec<WeeklyAverage> {
        sums.iter()
            .map(|(&week_start, &sum)| WeeklyAverage {
                week_start,
                average_commits: if population == 0 {
                    0.0
                } else {
                    sum as f64 / population as f64
                },
            })
            .collect()
    }

    fn members<'a>(
        profiles: impl IntoIterator<Item = &'a UserProfile>,
        cohort: Option<&'a Cohort>,
    ) -> impl Iterator<Item = &'a UserProfile> {
        profiles
            .into_iter()
            .filter(move |p| cohort.is_none_or(|c| c.contains(&p.user_id)))
    }
}
