//! Consistent-user cohort types

use super::AnalysisWarning;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Frozen set of users active in every bucket of the requirement window
///
/// Built once per run and never mutated; there is no public way to add or
/// remove members after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    members: BTreeSet<String>,
    window: Vec<NaiveDate>,
}

impl Cohort {
    pub(crate) fn new(members: BTreeSet<String>, window: Vec<NaiveDate>) -> Self {
        Self { members, window }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.members.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Requirement window (ascending bucket starts)
    pub fn window(&self) -> &[NaiveDate] {
        &self.window
    }
}

/// Cohort plus the population it was selected from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CohortSelection {
    pub cohort: Cohort,
    pub candidates: usize,
    pub warnings: Vec<AnalysisWarning>,
}
