//! Outlier detection types

use super::{AnalysisWarning, PowerUserReport, WeekTotal, WeeklyAverage, WeeklyTotalsReport};
use crate::errors::{AppError, AppResult};
use crate::types::DateRange;
use crate::utils::math::safe_percentage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Interchangeable outlier detection methods
///
/// Every method is read-only over its input; several can be run over the
/// same observation set without interference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum OutlierMethod {
    /// Flags values `> mean x (1 + pct / 100)`
    RelativeThreshold { pct: f64 },
    /// Flags values `> P(percentile)`; ties at the boundary are retained
    PercentileCutoff { percentile: f64 },
    /// Flags values outside `[Q1 - m x IQR, Q3 + m x IQR]`
    IqrFence { multiplier: f64 },
    /// Flags values with `|value - mean| > k x std`
    SigmaBand { k: f64 },
    /// Flags values `<= P(percentile) x factor` (low-tail rule)
    BottomFraction { percentile: f64, factor: f64 },
}

impl OutlierMethod {
    pub fn name(&self) -> &'static str {
        match self {
            OutlierMethod::RelativeThreshold { .. } => "relative_threshold",
            OutlierMethod::PercentileCutoff { .. } => "percentile_cutoff",
            OutlierMethod::IqrFence { .. } => "iqr_fence",
            OutlierMethod::SigmaBand { .. } => "sigma_band",
            OutlierMethod::BottomFraction { .. } => "bottom_fraction",
        }
    }

    /// Human-readable description including the parameter
    pub fn describe(&self) -> String {
        match self {
            OutlierMethod::RelativeThreshold { pct } => format!("> {}% above mean", pct),
            OutlierMethod::PercentileCutoff { percentile } => format!("> P{}", percentile),
            OutlierMethod::IqrFence { multiplier } => {
                format!("outside {} x IQR fences", multiplier)
            }
            OutlierMethod::SigmaBand { k } => format!("beyond {} sigma", k),
            OutlierMethod::BottomFraction { percentile, factor } => {
                format!("<= P{} x {}", percentile, factor)
            }
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        let ok = match *self {
            OutlierMethod::RelativeThreshold { pct } => pct.is_finite() && pct >= -100.0,
            OutlierMethod::PercentileCutoff { percentile } => (0.0..=100.0).contains(&percentile),
            OutlierMethod::IqrFence { multiplier } => multiplier.is_finite() && multiplier >= 0.0,
            OutlierMethod::SigmaBand { k } => k.is_finite() && k >= 0.0,
            OutlierMethod::BottomFraction { percentile, factor } => {
                (0.0..=100.0).contains(&percentile) && factor.is_finite() && factor >= 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "invalid parameter for outlier method {}: {:?}",
                self.name(),
                self
            )))
        }
    }
}

/// Numeric boundary a method derived from its input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutlierBoundary {
    /// Flag `value > upper`
    Above { upper: f64 },
    /// Flag `value < lower || value > upper`
    Outside { lower: f64, upper: f64 },
    /// Flag `value <= lower`
    AtOrBelow { lower: f64 },
}

impl OutlierBoundary {
    pub fn flags(&self, value: f64) -> bool {
        match *self {
            OutlierBoundary::Above { upper } => value > upper,
            OutlierBoundary::Outside { lower, upper } => value < lower || value > upper,
            OutlierBoundary::AtOrBelow { lower } => value <= lower,
        }
    }
}

/// Per-observation verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierVerdict<T> {
    pub observation: T,
    pub method: String,
    /// `None` when the input was empty or all-zero
    pub boundary: Option<OutlierBoundary>,
    pub is_outlier: bool,
}

/// Retained/flagged split produced by one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierPartition<T> {
    pub method: OutlierMethod,
    pub boundary: Option<OutlierBoundary>,
    pub retained: Vec<T>,
    pub flagged: Vec<T>,
}

impl<T> OutlierPartition<T> {
    pub fn total(&self) -> usize {
        self.retained.len() + self.flagged.len()
    }

    /// Flagged share of the input in percent (0.0 for empty input)
    pub fn outlier_rate(&self) -> f64 {
        safe_percentage(self.flagged.len(), self.total())
    }
}

/// Mean-relative band for a weekly total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekCategory {
    /// At least 100% above the mean
    VeryHigh,
    /// At least 50% above the mean
    High,
    Normal,
    /// At least 50% below the mean
    Low,
}

/// Thresholds derived from the mean weekly total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    pub average: f64,
    pub high: f64,
    pub very_high: f64,
    pub low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorisedWeek {
    pub week_start: NaiveDate,
    pub commits: u64,
    pub category: WeekCategory,
    /// Signed deviation from the mean in percent (`None` when the mean is zero)
    pub deviation_pct: Option<f64>,
}

/// Weekly-total outlier analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyOutlierReport {
    pub partition: OutlierPartition<WeekTotal>,
    pub thresholds: Option<CategoryThresholds>,
    pub categories: Vec<CategorisedWeek>,
    pub warnings: Vec<AnalysisWarning>,
}

impl WeeklyOutlierReport {
    pub fn count(&self, category: WeekCategory) -> usize {
        self.categories.iter().filter(|w| w.category == category).count()
    }
}

/// A user-week cell above its own week's relative threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellOutlier {
    pub user_id: String,
    pub week_start: NaiveDate,
    pub commits: u64,
    pub week_average: f64,
    pub threshold: f64,
}

/// Week-local cell outlier removal with before/after weekly averages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellOutlierReport {
    pub threshold_pct: f64,
    pub population: usize,
    pub total_cells: usize,
    pub original_averages: Vec<WeeklyAverage>,
    /// Removed cells count as zero; the denominator stays the population
    pub cleaned_averages: Vec<WeeklyAverage>,
    pub removed: Vec<CellOutlier>,
}

impl CellOutlierReport {
    pub fn outlier_rate(&self) -> f64 {
        safe_percentage(self.removed.len(), self.total_cells)
    }
}

/// User-week view: cell outliers plus averages without power users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWeekAnalysisReport {
    pub cells: CellOutlierReport,
    pub power_users: PowerUserReport,
    /// Weekly averages over the users that are not power users
    pub averages_without_power_users: Vec<WeeklyAverage>,
    pub treatment: DateRange,
    pub warnings: Vec<AnalysisWarning>,
}

/// Weekly totals with power users removed, alongside who was removed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUserExclusionReport {
    pub power_users: PowerUserReport,
    pub weekly: WeeklyTotalsReport,
}
