//! Commit activity analysis
//!
//! Turns a parsed commit snapshot into weekly series, cohort statistics,
//! outlier verdicts and per-user behavioral metrics. Nothing here performs
//! I/O; every operation returns a plain serialisable report.
//!
//! ## Overview
//!
//! The module is organised around the `AnalysisEngine`, which owns the parsed
//! profiles and one immutable [`AnalysisConfig`]:
//!
//! - **Weekly totals** - commits per anchor-relative week bucket
//! - **Weekly outliers** - relative/percentile/IQR/sigma verdicts and categories
//! - **User-week analysis** - week-local cell outliers and power-user exclusion
//! - **Individual metrics** - streaks, consistency, seasonal and weekday splits
//! - **Cohort summary** - consistent-user statistics before and after cleaning
//! - **Report Generation** - console, JSON and Plotly output
//!
//! ## Usage
//!
//! ```rust
//! use commit_activity_research::analysis::AnalysisEngine;
//! use commit_activity_research::errors::AppResult;
//! use commit_activity_research::types::{AnalysisConfig, Dataset};
//!
//! fn example(dataset: &Dataset) -> AppResult<()> {
//!     let engine = AnalysisEngine::new(dataset, AnalysisConfig::default())?;
//!
//!     let weekly = engine.weekly_totals(true);
//!     let outliers = engine.weekly_outliers();
//!     let individual = engine.individual_metrics();
//!     let summary = engine.summarise_cohort("bangladesh");
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod calendar;
pub mod cohort;
pub mod metrics;
pub mod outliers;
pub mod period;
pub mod reports;
pub mod statistics;

pub use aggregation::Aggregator;
pub use calendar::WeekBucketer;
pub use cohort::CohortFilter;
pub use metrics::MetricsCalculator;
pub use outliers::{Observation, OutlierDetector};
pub use period::{PeriodFilter, PeriodSelection};
pub use reports::{OutputFormat, ReportFormatter};
pub use statistics::StatisticsReporter;

use crate::errors::AppResult;
use crate::types::analysis_results::{
    AnalysisWarning, CellOutlierSummary, CohortComparisonReport, CohortSelection, CohortSummary,
    IndividualAnalysisReport, MatrixDensity, PowerUserExclusionReport, PowerUserMethod,
    PowerUserReport, UserWeekAnalysisReport, UserWeekMatrix, WeeklyOutlierReport,
    WeeklyTotalsReport,
};
use crate::types::{AnalysisConfig, Dataset, UserProfile};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::info;

/// Main analysis engine
///
/// Holds the read-only snapshot and configuration for one run. Every
/// analysis borrows `&self`, so several can run over the same engine.
pub struct AnalysisEngine {
    profiles: Vec<UserProfile>,
    config: AnalysisConfig,
    bucketer: WeekBucketer,
    load_warnings: Vec<AnalysisWarning>,
}

impl AnalysisEngine {
    /// Parse `dataset` and validate `config`
    ///
    /// Malformed date keys are skipped and surface as a
    /// [`AnalysisWarning::SkippedMalformedDates`] on every report.
    pub fn new(dataset: &Dataset, config: AnalysisConfig) -> AppResult<Self> {
        let parsed = dataset.to_profiles()?;
        let mut engine = Self::from_profiles(parsed.profiles, config)?;
        if parsed.skipped_dates > 0 {
            engine
                .load_warnings
                .push(AnalysisWarning::SkippedMalformedDates {
                    count: parsed.skipped_dates,
                });
        }
        Ok(engine)
    }

    /// Build an engine over already-parsed profiles
    pub fn from_profiles(profiles: Vec<UserProfile>, config: AnalysisConfig) -> AppResult<Self> {
        config.validate()?;
        info!(
            "Analysis engine: {} users, anchor {}",
            profiles.len(),
            config.anchor
        );
        Ok(Self {
            bucketer: WeekBucketer::new(config.anchor),
            profiles,
            config,
            load_warnings: Vec::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn profiles(&self) -> &[UserProfile] {
        &self.profiles
    }

    pub fn bucketer(&self) -> &WeekBucketer {
        &self.bucketer
    }

    /// Bucket containing the treatment start date
    pub fn treatment_bucket(&self) -> NaiveDate {
        self.bucketer.bucket(self.config.treatment.start)
    }

    /// Week buckets kept by the configured period
    pub fn period_selection(&self) -> PeriodSelection {
        let observed = Aggregator::observed_buckets(&self.profiles, &self.bucketer);
        PeriodFilter::select(observed, self.config.period.as_ref())
    }

    /// In-period buckets before treatment, narrowed by the cohort window
    pub fn pre_treatment_window(&self, selection: &PeriodSelection) -> Vec<NaiveDate> {
        PeriodFilter::pre_treatment(&selection.weeks, self.treatment_bucket())
            .into_iter()
            .filter(|week| {
                self.config
                    .cohort_window
                    .is_none_or(|range| range.contains(*week))
            })
            .collect()
    }

    /// Users active in every pre-treatment week
    pub fn select_cohort(&self, selection: &PeriodSelection) -> CohortSelection {
        let window = self.pre_treatment_window(selection);
        CohortFilter::select(&self.profiles, &self.bucketer, &window)
    }

    /// Total commits per selected week
    ///
    /// With `consistent_only` the totals cover the consistent-user cohort
    /// and the cohort warnings are attached to the report.
    pub fn weekly_totals(&self, consistent_only: bool) -> WeeklyTotalsReport {
        let selection = self.period_selection();
        let mut warnings = self.load_warnings.clone();

        let mut report = if consistent_only {
            let cohort_selection = self.select_cohort(&selection);
            warnings.extend(cohort_selection.warnings.iter().cloned());
            Aggregator::weekly_totals(
                &self.profiles,
                &self.bucketer,
                &selection,
                Some(&cohort_selection.cohort),
            )
        } else {
            Aggregator::weekly_totals(&self.profiles, &self.bucketer, &selection, None)
        };

        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        report.treatment = Some(self.config.treatment);
        report
    }

    /// Weekly totals over every user except monthly-peak power users
    pub fn weekly_totals_without_power_users(&self) -> PowerUserExclusionReport {
        let power_users = self.monthly_power_users();
        let selection = self.period_selection();
        let regular = self
            .profiles
            .iter()
            .filter(|p| !power_users.contains(&p.user_id));

        let mut weekly = Aggregator::weekly_totals(regular, &self.bucketer, &selection, None);
        if weekly.user_count == 0 {
            weekly.warnings.push(AnalysisWarning::NoRegularUsers);
        }
        let mut warnings = self.load_warnings.clone();
        warnings.append(&mut weekly.warnings);
        weekly.warnings = warnings;
        weekly.treatment = Some(self.config.treatment);

        PowerUserExclusionReport {
            power_users,
            weekly,
        }
    }

    /// Outlier verdicts and mean-relative categories for weekly totals
    pub fn weekly_outliers(&self) -> WeeklyOutlierReport {
        let totals = self.weekly_totals(false);
        let partition = OutlierDetector::detect(&self.config.outliers.weekly_method, &totals.weeks);
        let (thresholds, categories) = OutlierDetector::categorise_weeks(&totals.weeks);

        info!(
            "Weekly outliers: {} of {} weeks flagged",
            partition.flagged.len(),
            partition.total()
        );

        WeeklyOutlierReport {
            partition,
            thresholds,
            categories,
            warnings: totals.warnings,
        }
    }

    /// User x week matrix over the selected weeks
    pub fn user_week_matrix(
        &self,
        consistent_only: bool,
        density: MatrixDensity,
    ) -> UserWeekMatrix {
        let selection = self.period_selection();
        let cohort_selection = consistent_only.then(|| self.select_cohort(&selection));
        Aggregator::user_week_matrix(
            &self.profiles,
            &self.bucketer,
            &selection.weeks,
            cohort_selection.as_ref().map(|c| &c.cohort),
            density,
        )
    }

    /// User x week matrix over users with at least one commit on a valid date
    pub fn contributor_matrix(&self, density: MatrixDensity) -> UserWeekMatrix {
        let selection = self.period_selection();
        Self::contributor_matrix_for(&self.profiles, &self.bucketer, &selection, density)
    }

    fn contributor_matrix_for(
        profiles: &[UserProfile],
        bucketer: &WeekBucketer,
        selection: &PeriodSelection,
        density: MatrixDensity,
    ) -> UserWeekMatrix {
        Aggregator::user_week_matrix(
            profiles.iter().filter(|p| p.active_days().next().is_some()),
            bucketer,
            &selection.weeks,
            None,
            density,
        )
    }

    /// Week-local cell outliers and averages without power users
    ///
    /// The population is every user with at least one commit on a valid
    /// date; users who never committed do not dilute the weekly means.
    pub fn user_week_analysis(&self) -> UserWeekAnalysisReport {
        let selection = self.period_selection();
        let matrix = Self::contributor_matrix_for(
            &self.profiles,
            &self.bucketer,
            &selection,
            MatrixDensity::Dense,
        );

        let cells =
            OutlierDetector::remove_cell_outliers(&matrix, self.config.outliers.cell_relative_pct);
        let power_users = self.monthly_power_users();
        let excluded: BTreeSet<String> = power_users.user_ids().map(str::to_string).collect();
        let (averages_without_power_users, exclusion_warnings) =
            Aggregator::averages_excluding(&matrix, &excluded);

        let mut warnings = self.load_warnings.clone();
        warnings.extend(selection.warnings);
        warnings.extend(exclusion_warnings);

        UserWeekAnalysisReport {
            cells,
            power_users,
            averages_without_power_users,
            treatment: self.config.treatment,
            warnings,
        }
    }

    /// Behavioral metrics, categories, power users and distributions
    pub fn individual_metrics(&self) -> IndividualAnalysisReport {
        let window = self.config.metrics_window;
        let settings = &self.config.power_users;

        let metrics = MetricsCalculator::calculate_all(&self.profiles, &window);
        let categories = MetricsCalculator::categorise(metrics.values(), settings);
        let average_power_users = MetricsCalculator::power_users(
            &self.profiles,
            &window,
            PowerUserMethod::AverageMonthly {
                threshold: settings.power_monthly_average,
                month_count: settings.month_count,
            },
        );
        let distributions =
            StatisticsReporter::metric_distributions(&metrics, &self.config.outliers);
        let highlights = StatisticsReporter::highlights(metrics.values());

        IndividualAnalysisReport {
            window,
            user_count: self.profiles.len(),
            categories,
            monthly_power_users: self.monthly_power_users(),
            average_power_users,
            distributions,
            highlights,
            metrics,
            warnings: self.load_warnings.clone(),
        }
    }

    /// Consistent-user summary: dense cohort matrix, cell outliers removed
    /// with the configured cell method, statistics over the clean cells
    pub fn summarise_cohort(&self, label: &str) -> CohortSummary {
        let selection = self.period_selection();
        let treatment_week = self.treatment_bucket();
        let cohort_selection = self.select_cohort(&selection);
        let cohort = &cohort_selection.cohort;

        let matrix = Aggregator::user_week_matrix(
            &self.profiles,
            &self.bucketer,
            &selection.weeks,
            Some(cohort),
            MatrixDensity::Dense,
        );

        let method = self.config.outliers.cell_method;
        let partition = OutlierDetector::detect(&method, &matrix.observations);
        let clean = UserWeekMatrix {
            observations: partition.retained.clone(),
            ..matrix.clone()
        };

        let mut warnings = self.load_warnings.clone();
        warnings.extend(selection.warnings.iter().cloned());
        warnings.extend(cohort_selection.warnings.iter().cloned());

        info!(
            "Cohort summary '{}': {} of {} users, {} cells, {} removed",
            label,
            cohort.len(),
            self.profiles.len(),
            matrix.observations.len(),
            partition.flagged.len()
        );

        CohortSummary {
            label: label.to_string(),
            total_users: self.profiles.len(),
            cohort_size: cohort.len(),
            weeks: matrix.weeks.clone(),
            pre_treatment_weeks: cohort.window().len(),
            treatment_week,
            observations: matrix.observations.len(),
            cell_outliers: CellOutlierSummary {
                method,
                boundary: partition.boundary,
                removed: partition.flagged.len(),
                retained: partition.retained.len(),
            },
            clean_stats: StatisticsReporter::user_week_statistics(&clean.observations),
            activity_frequency: MetricsCalculator::activity_frequency(&clean),
            temporal: StatisticsReporter::temporal_patterns(&clean.observations),
            period_averages: StatisticsReporter::period_averages(
                &clean.observations,
                treatment_week,
            ),
            weekly_averages: Aggregator::weekly_averages(&clean),
            before_after: StatisticsReporter::compare_before_after(
                &matrix.observations,
                &partition.retained,
                &partition.flagged,
            ),
            warnings,
        }
    }

    /// Summarise this engine's cohort against another's
    pub fn compare(
        &self,
        other: &AnalysisEngine,
        left_label: &str,
        right_label: &str,
    ) -> CohortComparisonReport {
        let left = self.summarise_cohort(left_label);
        let right = other.summarise_cohort(right_label);
        let comparison = StatisticsReporter::compare_cohorts(&left, &right);
        CohortComparisonReport {
            left,
            right,
            comparison,
        }
    }

    fn monthly_power_users(&self) -> PowerUserReport {
        MetricsCalculator::power_users(
            &self.profiles,
            &self.config.power_user_window,
            PowerUserMethod::MonthlyPeak {
                threshold: self.config.power_users.monthly_threshold,
            },
        )
    }
}
