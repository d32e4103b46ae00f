//! Analysis configuration
//!
//! One explicit, immutable parameter set for a whole run: bucketing anchor,
//! analysis period, treatment split, cohort window, outlier thresholds and
//! power-user thresholds.

use super::analysis_results::OutlierMethod;
use crate::errors::{AppError, AppResult};
use crate::utils::time::{day_count, format_iso};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::Config(format!(
                "date range start {} is after end {}",
                format_iso(start),
                format_iso(end)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered
    pub fn days(&self) -> i64 {
        day_count(self.start, self.end)
    }
}

/// Thresholds for the outlier analyses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierSettings {
    /// Method used for weekly-total outliers
    pub weekly_method: OutlierMethod,
    /// Method used for user-week cells in the cohort summary
    pub cell_method: OutlierMethod,
    /// Week-local relative threshold (%) for user-week cells
    pub cell_relative_pct: f64,
    /// Upper tail rule for per-user metric distributions (value >= P`top_percentile`)
    pub top_percentile: f64,
    /// Lower tail rule: value <= P`bottom_percentile` x `bottom_factor`
    pub bottom_percentile: f64,
    pub bottom_factor: f64,
}

impl Default for OutlierSettings {
    fn default() -> Self {
        Self {
            weekly_method: OutlierMethod::RelativeThreshold { pct: 50.0 },
            cell_method: OutlierMethod::PercentileCutoff { percentile: 95.0 },
            cell_relative_pct: 50.0,
            top_percentile: 99.0,
            bottom_percentile: 25.0,
            bottom_factor: 0.25,
        }
    }
}

/// Thresholds for user activity classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUserSettings {
    /// Commits within any single calendar month above which a user is a power user
    pub monthly_threshold: u64,
    /// Average commits per month at or below which a user is casual
    pub casual_monthly_average: f64,
    /// Average commits per month at or above which a user is a power user
    pub power_monthly_average: f64,
    /// Fixed month divisor for the average-based classification
    pub month_count: f64,
}

impl Default for PowerUserSettings {
    fn default() -> Self {
        Self {
            monthly_threshold: 200,
            casual_monthly_average: 3.0,
            power_monthly_average: 200.0,
            month_count: 4.0,
        }
    }
}

/// Complete parameter set for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Reference date for 7-day week buckets
    pub anchor: NaiveDate,
    /// Inclusive range of bucket start dates to keep; `None` trims the
    /// earliest and latest observed bucket instead
    pub period: Option<DateRange>,
    /// Treatment event range; its start selects the treatment bucket
    pub treatment: DateRange,
    /// Restricts the cohort requirement window further (defaults to every
    /// in-period bucket before treatment)
    pub cohort_window: Option<DateRange>,
    /// Day window for per-user behavioral metrics
    pub metrics_window: DateRange,
    /// Day window scanned for monthly power users
    pub power_user_window: DateRange,
    pub outliers: OutlierSettings,
    pub power_users: PowerUserSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        Self {
            anchor: date(2024, 5, 1),
            period: Some(DateRange {
                start: date(2024, 5, 1),
                end: date(2024, 9, 4),
            }),
            treatment: DateRange {
                start: date(2024, 7, 17),
                end: date(2024, 7, 24),
            },
            cohort_window: None,
            metrics_window: DateRange {
                start: date(2024, 5, 1),
                end: date(2024, 9, 3),
            },
            power_user_window: DateRange {
                start: date(2024, 5, 1),
                end: date(2024, 9, 4),
            },
            outliers: OutlierSettings::default(),
            power_users: PowerUserSettings::default(),
        }
    }
}

/// Builder for AnalysisConfig with validation
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    anchor: Option<NaiveDate>,
    period: Option<Option<DateRange>>,
    treatment: Option<DateRange>,
    cohort_window: Option<DateRange>,
    metrics_window: Option<DateRange>,
    power_user_window: Option<DateRange>,
    outliers: Option<OutlierSettings>,
    power_users: Option<PowerUserSettings>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Keep buckets starting within `[start, end]`
    pub fn period(mut self, range: DateRange) -> Self {
        self.period = Some(Some(range));
        self
    }

    /// Drop the first and last observed bucket instead of using a range
    pub fn trim_ends(mut self) -> Self {
        self.period = Some(None);
        self
    }

    pub fn treatment(mut self, range: DateRange) -> Self {
        self.treatment = Some(range);
        self
    }

    pub fn cohort_window(mut self, range: DateRange) -> Self {
        self.cohort_window = Some(range);
        self
    }

    pub fn metrics_window(mut self, range: DateRange) -> Self {
        self.metrics_window = Some(range);
        self
    }

    pub fn power_user_window(mut self, range: DateRange) -> Self {
        self.power_user_window = Some(range);
        self
    }

    pub fn outliers(mut self, settings: OutlierSettings) -> Self {
        self.outliers = Some(settings);
        self
    }

    pub fn power_users(mut self, settings: PowerUserSettings) -> Self {
        self.power_users = Some(settings);
        self
    }

    /// Build the configuration, validating threshold values
    pub fn build(self) -> AppResult<AnalysisConfig> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            anchor: self.anchor.unwrap_or(defaults.anchor),
            period: self.period.unwrap_or(defaults.period),
            treatment: self.treatment.unwrap_or(defaults.treatment),
            cohort_window: self.cohort_window.or(defaults.cohort_window),
            metrics_window: self.metrics_window.unwrap_or(defaults.metrics_window),
            power_user_window: self
                .power_user_window
                .unwrap_or(defaults.power_user_window),
            outliers: self.outliers.unwrap_or(defaults.outliers),
            power_users: self.power_users.unwrap_or(defaults.power_users),
        };
        config.validate()?;
        Ok(config)
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
    }

    /// Reject parameter combinations that cannot produce meaningful output
    pub fn validate(&self) -> AppResult<()> {
        self.outliers.weekly_method.validate()?;
        self.outliers.cell_method.validate()?;
        if !(0.0..=100.0).contains(&self.outliers.top_percentile)
            || !(0.0..=100.0).contains(&self.outliers.bottom_percentile)
        {
            return Err(AppError::Config(
                "tail percentiles must be within [0, 100]".to_string(),
            ));
        }
        if self.outliers.cell_relative_pct < 0.0 {
            return Err(AppError::Config(
                "cell relative threshold must not be negative".to_string(),
            ));
        }
        if self.power_users.month_count <= 0.0 {
            return Err(AppError::Config(
                "power_users.month_count must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
