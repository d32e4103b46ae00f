//! Outlier detection over numeric observation sets
//!
//! Every method derives a boundary from the input and splits it into
//! retained and flagged observations. Methods are read-only over their
//! input, so several can be run over the same set. Empty or all-zero input
//! yields no boundary and nothing flagged.

use super::aggregation::Aggregator;
use crate::types::analysis_results::{
    CategorisedWeek, CategoryThresholds, CellOutlier, CellOutlierReport, OutlierBoundary,
    OutlierMethod, OutlierPartition, OutlierVerdict, UserWeekMatrix, UserWeekObservation,
    WeekCategory, WeekTotal,
};
use crate::utils::math::{mean, percentile_sorted, population_std, sorted};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Anything with a single numeric value an outlier method can judge
pub trait Observation {
    fn value(&self) -> f64;
}

impl Observation for f64 {
    fn value(&self) -> f64 {
        *self
    }
}

impl Observation for u64 {
    fn value(&self) -> f64 {
        *self as f64
    }
}

impl Observation for WeekTotal {
    fn value(&self) -> f64 {
        self.commits as f64
    }
}

impl Observation for UserWeekObservation {
    fn value(&self) -> f64 {
        self.commits as f64
    }
}

pub struct OutlierDetector;

impl OutlierDetector {
    /// Boundary `method` derives from `values`
    ///
    /// `None` for empty input, all-zero input, or a zero mean under the
    /// relative threshold.
    pub fn boundary(method: &OutlierMethod, values: &[f64]) -> Option<OutlierBoundary> {
        if values.is_empty() || values.iter().all(|v| *v == 0.0) {
            return None;
        }

        match *method {
            OutlierMethod::RelativeThreshold { pct } => {
                let m = mean(values)?;
                if m == 0.0 {
                    return None;
                }
                Some(OutlierBoundary::Above {
                    upper: m * (1.0 + pct / 100.0),
                })
            }
            OutlierMethod::PercentileCutoff { percentile } => {
                let upper = percentile_sorted(&sorted(values), percentile)?;
                Some(OutlierBoundary::Above { upper })
            }
            OutlierMethod::IqrFence { multiplier } => {
                let (lower, upper) = Self::iqr_fences(values, multiplier)?;
                Some(OutlierBoundary::Outside { lower, upper })
            }
            OutlierMethod::SigmaBand { k } => {
                let m = mean(values)?;
                let std = population_std(values)?;
                Some(OutlierBoundary::Outside {
                    lower: m - k * std,
                    upper: m + k * std,
                })
            }
            OutlierMethod::BottomFraction { percentile, factor } => {
                let p = percentile_sorted(&sorted(values), percentile)?;
                Some(OutlierBoundary::AtOrBelow { lower: p * factor })
            }
        }
    }

    /// `(Q1 - m x IQR, Q3 + m x IQR)`
    pub fn iqr_fences(values: &[f64], multiplier: f64) -> Option<(f64, f64)> {
        let ordered = sorted(values);
        let q1 = percentile_sorted(&ordered, 25.0)?;
        let q3 = percentile_sorted(&ordered, 75.0)?;
        let iqr = q3 - q1;
        Some((q1 - multiplier * iqr, q3 + multiplier * iqr))
    }

    /// One verdict per observation, in input order
    pub fn evaluate<T: Observation + Clone>(
        method: &OutlierMethod,
        observations: &[T],
    ) -> Vec<OutlierVerdict<T>> {
        let values: Vec<f64> = observations.iter().map(Observation::value).collect();
        let boundary = Self::boundary(method, &values);
        observations
            .iter()
            .zip(values)
            .map(|(obs, value)| OutlierVerdict {
                observation: obs.clone(),
                method: method.name().to_string(),
                boundary,
                is_outlier: boundary.is_some_and(|b| b.flags(value)),
            })
            .collect()
    }

    /// Split `observations` into retained and flagged, preserving order
    pub fn detect<T: Observation + Clone>(
        method: &OutlierMethod,
        observations: &[T],
    ) -> OutlierPartition<T> {
        let values: Vec<f64> = observations.iter().map(Observation::value).collect();
        let boundary = Self::boundary(method, &values);

        let (flagged, retained): (Vec<T>, Vec<T>) = observations
            .iter()
            .cloned()
            .partition(|obs| boundary.is_some_and(|b| b.flags(obs.value())));

        debug!(
            "{} ({}): {} flagged of {}",
            method.name(),
            method.describe(),
            flagged.len(),
            observations.len()
        );

        OutlierPartition {
            method: *method,
            boundary,
            retained,
            flagged,
        }
    }

    /// Mean-relative categories for weekly totals
    ///
    /// A zero mean leaves every week `Normal` with no deviation.
    pub fn categorise_weeks(
        weeks: &[WeekTotal],
    ) -> (Option<CategoryThresholds>, Vec<CategorisedWeek>) {
        let values: Vec<f64> = weeks.iter().map(Observation::value).collect();
        let thresholds = mean(&values)
            .filter(|m| *m > 0.0)
            .map(|average| CategoryThresholds {
                average,
                high: average * 1.5,
                very_high: average * 2.0,
                low: average * 0.5,
            });

        let categories = weeks
            .iter()
            .map(|week| {
                let value = week.commits as f64;
                let (category, deviation_pct) = match thresholds {
                    Some(t) => {
                        let category = if value >= t.very_high {
                            WeekCategory::VeryHigh
                        } else if value >= t.high {
                            WeekCategory::High
                        } else if value <= t.low {
                            WeekCategory::Low
                        } else {
                            WeekCategory::Normal
                        };
                        (category, Some((value - t.average) / t.average * 100.0))
                    }
                    None => (WeekCategory::Normal, None),
                };
                CategorisedWeek {
                    week_start: week.week_start,
                    commits: week.commits,
                    category,
                    deviation_pct,
                }
            })
            .collect();

        (thresholds, categories)
    }

    /// Week-local relative threshold over user-week cells
    ///
    /// Each week's mean is that week's sum over the matrix population. A
    /// cell is removed when `commits > mean x (1 + pct / 100)`. Cleaned
    /// averages count removed cells as zero and keep the population as the
    /// denominator.
    pub fn remove_cell_outliers(matrix: &UserWeekMatrix, pct: f64) -> CellOutlierReport {
        let population = matrix.population();
        let original_sums = matrix.week_sums();
        let original_averages = Aggregator::averages_from_sums(&original_sums, population);

        let thresholds: BTreeMap<NaiveDate, (f64, f64)> = original_averages
            .iter()
            .filter(|avg| avg.average_commits > 0.0)
            .map(|avg| {
                (
                    avg.week_start,
                    (avg.average_commits, avg.average_commits * (1.0 + pct / 100.0)),
                )
            })
            .collect();

        let mut cleaned_sums: BTreeMap<NaiveDate, u64> =
            matrix.weeks.iter().map(|w| (*w, 0)).collect();
        let mut removed = Vec::new();

        for obs in &matrix.observations {
            match thresholds.get(&obs.week_start) {
                Some(&(week_average, threshold)) if obs.commits as f64 > threshold => {
                    removed.push(CellOutlier {
                        user_id: obs.user_id.clone(),
                        week_start: obs.week_start,
                        commits: obs.commits,
                        week_average,
                        threshold,
                    });
                }
                _ => {
                    *cleaned_sums.entry(obs.week_start).or_insert(0) += obs.commits;
                }
            }
        }

        debug!(
            "Cell outliers at {}% above week average: {} of {} cells",
            pct,
            removed.len(),
            matrix.observations.len()
        );

        CellOutlierReport {
            threshold_pct: pct,
            population,
            total_cells: matrix.observations.len(),
            original_averages,
            cleaned_averages: Aggregator::averages_from_sums(&cleaned_sums, population),
            removed,
        }
    }
}
