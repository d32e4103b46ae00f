use crate::errors::{AppError, AppResult};
use crate::types::analysis_results::OutlierMethod;
use crate::types::{AnalysisConfig, DateRange, OutlierSettings, PowerUserSettings};
use crate::utils::time::{format_iso, parse_iso_date};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub calendar: CalendarConfig,
    pub period: PeriodConfig,
    pub outliers: OutliersConfig,
    pub power_users: PowerUsersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Primary commit dataset
    pub input_json: PathBuf,
    /// Second cohort for comparisons
    #[serde(default)]
    pub comparison_json: Option<PathBuf>,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub anchor_date: String,
}

/// Dates are YYYY-MM-DD strings, parsed in [`AppConfig::analysis_config`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodConfig {
    /// Inclusive bucket-start range; trim-ends mode when either bound is absent
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    pub treatment_start: String,
    pub treatment_end: String,
    #[serde(default)]
    pub cohort_start: Option<String>,
    #[serde(default)]
    pub cohort_end: Option<String>,
    pub metrics_start: String,
    pub metrics_end: String,
    pub power_start: String,
    pub power_end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutliersConfig {
    /// Weekly-total method: relative | percentile | iqr | sigma
    pub method: String,
    pub relative_pct: f64,
    pub percentile: f64,
    pub sigma: f64,
    pub iqr_multiplier: f64,
    pub cell_relative_pct: f64,
    /// Percentile cut applied to user-week cells in cohort summaries
    pub cell_percentile: f64,
    pub top_percentile: f64,
    pub bottom_percentile: f64,
    pub bottom_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUsersConfig {
    pub monthly_threshold: u64,
    pub casual_monthly_average: f64,
    pub power_monthly_average: f64,
    pub month_count: f64,
}

impl OutliersConfig {
    /// Resolve the named weekly-total method with its parameter
    pub fn weekly_method(&self) -> AppResult<OutlierMethod> {
        match self.method.trim().to_ascii_lowercase().as_str() {
            "relative" => Ok(OutlierMethod::RelativeThreshold {
                pct: self.relative_pct,
            }),
            "percentile" => Ok(OutlierMethod::PercentileCutoff {
                percentile: self.percentile,
            }),
            "iqr" => Ok(OutlierMethod::IqrFence {
                multiplier: self.iqr_multiplier,
            }),
            "sigma" => Ok(OutlierMethod::SigmaBand { k: self.sigma }),
            other => Err(AppError::Config(format!(
                "unknown outlier method '{}' (expected relative, percentile, iqr or sigma)",
                other
            ))),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let analysis = AnalysisConfig::default();
        let outliers = OutlierSettings::default();
        let power = PowerUserSettings::default();
        let (start, end) = match analysis.period {
            Some(range) => (Some(format_iso(range.start)), Some(format_iso(range.end))),
            None => (None, None),
        };

        Self {
            paths: PathsConfig {
                input_json: PathBuf::from("./data/commits.json"),
                comparison_json: None,
                output_dir: PathBuf::from("./output_data"),
            },
            calendar: CalendarConfig {
                anchor_date: format_iso(analysis.anchor),
            },
            period: PeriodConfig {
                start,
                end,
                treatment_start: format_iso(analysis.treatment.start),
                treatment_end: format_iso(analysis.treatment.end),
                cohort_start: None,
                cohort_end: None,
                metrics_start: format_iso(analysis.metrics_window.start),
                metrics_end: format_iso(analysis.metrics_window.end),
                power_start: format_iso(analysis.power_user_window.start),
                power_end: format_iso(analysis.power_user_window.end),
            },
            outliers: OutliersConfig {
                method: "relative".to_string(),
                relative_pct: 50.0,
                percentile: 95.0,
                sigma: 2.0,
                iqr_multiplier: 1.5,
                cell_relative_pct: outliers.cell_relative_pct,
                cell_percentile: 95.0,
                top_percentile: outliers.top_percentile,
                bottom_percentile: outliers.bottom_percentile,
                bottom_factor: outliers.bottom_factor,
            },
            power_users: PowerUsersConfig {
                monthly_threshold: power.monthly_threshold,
                casual_monthly_average: power.casual_monthly_average,
                power_monthly_average: power.power_monthly_average,
                month_count: power.month_count,
            },
        }
    }
}

fn parse_range(start: &str, end: &str) -> AppResult<DateRange> {
    DateRange::new(parse_iso_date(start)?, parse_iso_date(end)?)
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    ///
    /// `ACTIVITY_PERIOD__TREATMENT_START=2024-07-17` overrides
    /// `period.treatment_start`.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default(
                "paths.input_json",
                defaults.paths.input_json.to_string_lossy().to_string(),
            )?
            .set_default(
                "paths.output_dir",
                defaults.paths.output_dir.to_string_lossy().to_string(),
            )?
            .set_default("calendar.anchor_date", defaults.calendar.anchor_date)?
            .set_default("period.treatment_start", defaults.period.treatment_start)?
            .set_default("period.treatment_end", defaults.period.treatment_end)?
            .set_default("period.metrics_start", defaults.period.metrics_start)?
            .set_default("period.metrics_end", defaults.period.metrics_end)?
            .set_default("period.power_start", defaults.period.power_start)?
            .set_default("period.power_end", defaults.period.power_end)?
            .set_default("outliers.method", defaults.outliers.method)?
            .set_default("outliers.relative_pct", defaults.outliers.relative_pct)?
            .set_default("outliers.percentile", defaults.outliers.percentile)?
            .set_default("outliers.sigma", defaults.outliers.sigma)?
            .set_default("outliers.iqr_multiplier", defaults.outliers.iqr_multiplier)?
            .set_default(
                "outliers.cell_relative_pct",
                defaults.outliers.cell_relative_pct,
            )?
            .set_default("outliers.cell_percentile", defaults.outliers.cell_percentile)?
            .set_default("outliers.top_percentile", defaults.outliers.top_percentile)?
            .set_default(
                "outliers.bottom_percentile",
                defaults.outliers.bottom_percentile,
            )?
            .set_default("outliers.bottom_factor", defaults.outliers.bottom_factor)?
            .set_default(
                "power_users.monthly_threshold",
                defaults.power_users.monthly_threshold,
            )?
            .set_default(
                "power_users.casual_monthly_average",
                defaults.power_users.casual_monthly_average,
            )?
            .set_default(
                "power_users.power_monthly_average",
                defaults.power_users.power_monthly_average,
            )?
            .set_default("power_users.month_count", defaults.power_users.month_count)?;

        if let Some(start) = defaults.period.start {
            builder = builder.set_default("period.start", start)?;
        }
        if let Some(end) = defaults.period.end {
            builder = builder.set_default("period.end", end)?;
        }

        let config = builder
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // ACTIVITY_<SECTION>__<KEY> env variables override everything
            .add_source(
                Environment::with_prefix("ACTIVITY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Result<Self, ConfigError> {
        // Try to load config for defaults, but don't fail if not found
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse and validate into the engine's configuration
    pub fn analysis_config(&self) -> AppResult<AnalysisConfig> {
        let p = &self.period;
        let mut builder = AnalysisConfig::builder()
            .anchor(parse_iso_date(&self.calendar.anchor_date)?)
            .treatment(parse_range(&p.treatment_start, &p.treatment_end)?)
            .metrics_window(parse_range(&p.metrics_start, &p.metrics_end)?)
            .power_user_window(parse_range(&p.power_start, &p.power_end)?)
            .outliers(OutlierSettings {
                weekly_method: self.outliers.weekly_method()?,
                cell_method: OutlierMethod::PercentileCutoff {
                    percentile: self.outliers.cell_percentile,
                },
                cell_relative_pct: self.outliers.cell_relative_pct,
                top_percentile: self.outliers.top_percentile,
                bottom_percentile: self.outliers.bottom_percentile,
                bottom_factor: self.outliers.bottom_factor,
            })
            .power_users(PowerUserSettings {
                monthly_threshold: self.power_users.monthly_threshold,
                casual_monthly_average: self.power_users.casual_monthly_average,
                power_monthly_average: self.power_users.power_monthly_average,
                month_count: self.power_users.month_count,
            });

        builder = match (&p.start, &p.end) {
            (Some(start), Some(end)) => builder.period(parse_range(start, end)?),
            _ => builder.trim_ends(),
        };
        if let (Some(start), Some(end)) = (&p.cohort_start, &p.cohort_end) {
            builder = builder.cohort_window(parse_range(start, end)?);
        }

        builder.build()
    }
}
