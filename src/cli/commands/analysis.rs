use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::processor::{CsvExporter, JsonDatasetLoader};
use crate::types::analysis_results::{MatrixDensity, WeeklyTotalsReport};
use clap::{Args, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::{AnalysisEngine, OutputFormat, ReportFormatter};

// ===== Helper Functions =====

/// Parse output format string to OutputFormat enum
fn parse_format(format_str: &str) -> OutputFormat {
    match format_str.to_lowercase().as_str() {
        "json" => OutputFormat::Json,
        "plotly" => OutputFormat::Plotly,
        _ => OutputFormat::Console,
    }
}

/// Write output to file with safe directory creation
fn write_output_to_file(path: &Path, content: &str, description: &str) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("{} written to: {}", description, path.display());
    Ok(())
}

/// Load the dataset named by `input` (or config) into an engine
fn build_engine(input: &Option<PathBuf>, app_config: &AppConfig) -> AppResult<AnalysisEngine> {
    let path = input
        .clone()
        .unwrap_or_else(|| app_config.paths.input_json.clone());
    let dataset = JsonDatasetLoader::load(&path)?;
    AnalysisEngine::new(&dataset, app_config.analysis_config()?)
}

fn write_weekly_csv(report: &WeeklyTotalsReport, path: &Path) -> AppResult<()> {
    let rows = CsvExporter::write_weekly_totals(report, File::create(path)?)?;
    info!("Wrote {} weekly totals to {}", rows, path.display());
    Ok(())
}

/// Run an analysis command with file output support
///
/// JSON and Plotly output go to `--output`, or to
/// `<output_dir>/plots/<default_filename>` when no path is given.
fn run_analysis_with_file_output<T, F, G>(
    args: &CommonArgs,
    default_filename: &str,
    description: &str,
    analyse_fn: F,
    format_fn: G,
) -> AppResult<()>
where
    F: FnOnce(&AnalysisEngine, &AppConfig) -> AppResult<T>,
    G: FnOnce(&T, &OutputFormat) -> AppResult<String>,
{
    let app_config = args.resolve_config()?;
    let engine = build_engine(&args.input, &app_config)?;
    let analysis = analyse_fn(&engine, &app_config)?;
    let parsed_format = parse_format(&args.format);
    let formatted_output = format_fn(&analysis, &parsed_format)?;

    if let Some(path) = &args.output {
        write_output_to_file(path, &formatted_output, description)?;
    } else if matches!(parsed_format, OutputFormat::Json | OutputFormat::Plotly) {
        let default_path = app_config.paths.output_dir.join("plots").join(default_filename);
        write_output_to_file(&default_path, &formatted_output, description)?;
    } else {
        print!("{}", formatted_output);
    }
    Ok(())
}

// ===== Command Definitions =====

/// Options shared by every analysis
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Commit dataset JSON (overrides paths.input_json in config.toml)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Output format (console, json, or plotly)
    #[arg(long, default_value = "console")]
    pub format: String,

    /// Output file path (if not specified, console output goes to stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Week bucket anchor date (YYYY-MM-DD)
    #[arg(long)]
    pub anchor: Option<String>,

    /// First bucket start kept (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last bucket start kept (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Drop the first and last observed week instead of using a date range
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub trim_ends: bool,

    /// Treatment start date (YYYY-MM-DD)
    #[arg(long)]
    pub treatment_start: Option<String>,

    /// Treatment end date (YYYY-MM-DD)
    #[arg(long)]
    pub treatment_end: Option<String>,

    /// Weekly outlier method (relative, percentile, iqr, sigma)
    #[arg(long)]
    pub method: Option<String>,

    /// Relative threshold in percent above the mean
    #[arg(long)]
    pub threshold_pct: Option<f64>,

    /// Monthly commit count above which a user is a power user
    #[arg(long)]
    pub monthly_threshold: Option<u64>,
}

impl CommonArgs {
    /// Config file/env values with command-line overrides applied
    pub fn resolve_config(&self) -> AppResult<AppConfig> {
        let mut config = AppConfig::get_defaults()?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(anchor) = &self.anchor {
            config.calendar.anchor_date = anchor.clone();
        }
        if self.trim_ends {
            config.period.start = None;
            config.period.end = None;
        }
        if let Some(start) = &self.start {
            config.period.start = Some(start.clone());
        }
        if let Some(end) = &self.end {
            config.period.end = Some(end.clone());
        }
        if let Some(start) = &self.treatment_start {
            config.period.treatment_start = start.clone();
        }
        if let Some(end) = &self.treatment_end {
            config.period.treatment_end = end.clone();
        }
        if let Some(method) = &self.method {
            config.outliers.method = method.clone();
        }
        if let Some(pct) = self.threshold_pct {
            config.outliers.relative_pct = pct;
            config.outliers.cell_relative_pct = pct;
        }
        if let Some(threshold) = self.monthly_threshold {
            config.power_users.monthly_threshold = threshold;
        }
    }
}

/// Commit activity analyses
#[derive(Args)]
pub struct AnalyseCommand {
    #[command(subcommand)]
    pub analysis_type: AnalysisCommands,
}

impl AnalyseCommand {
    pub fn run(&self) -> AppResult<()> {
        run_analysis(&self.analysis_type)
    }
}

/// Analysis command types
#[derive(Subcommand)]
pub enum AnalysisCommands {
    /// Total commits per week bucket
    Weekly {
        #[command(flatten)]
        common: CommonArgs,

        /// Only users active in every pre-treatment week
        #[arg(long)]
        consistent_only: bool,

        /// Drop users above the monthly power-user threshold
        #[arg(long, conflicts_with = "consistent_only")]
        exclude_power_users: bool,

        /// Also write the weekly totals as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Outlier detection and categories for weekly totals
    Outliers {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Week-local user-week outliers and averages without power users
    UserWeek {
        #[command(flatten)]
        common: CommonArgs,

        /// Also write the dense user-week table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Per-user behavioral metrics and their distributions
    Individual {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Consistent-user cohort summary
    Summary {
        #[command(flatten)]
        common: CommonArgs,

        /// Cohort label used in report titles
        #[arg(long, default_value = "cohort")]
        label: String,

        /// Also write the clean weekly averages as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Compare two cohorts (e.g. treated vs. control country)
    Compare {
        #[command(flatten)]
        common: CommonArgs,

        /// Second dataset (overrides paths.comparison_json)
        #[arg(long)]
        comparison: Option<PathBuf>,

        #[arg(long, default_value = "treated")]
        left_label: String,

        #[arg(long, default_value = "control")]
        right_label: String,
    },
}

/// Run analysis commands
pub fn run_analysis(command: &AnalysisCommands) -> AppResult<()> {
    match command {
        AnalysisCommands::Weekly {
            common,
            consistent_only,
            exclude_power_users,
            csv,
        } => {
            if *exclude_power_users {
                run_analysis_with_file_output(
                    common,
                    "weekly_without_power_users.json",
                    "Weekly totals without power users",
                    |e, _| {
                        let report = e.weekly_totals_without_power_users();
                        if let Some(path) = csv {
                            write_weekly_csv(&report.weekly, path)?;
                        }
                        Ok(report)
                    },
                    ReportFormatter::format_power_user_exclusion,
                )
            } else {
                let consistent = *consistent_only;
                run_analysis_with_file_output(
                    common,
                    "weekly_commits.json",
                    "Weekly totals",
                    move |e, _| {
                        let report = e.weekly_totals(consistent);
                        if let Some(path) = csv {
                            write_weekly_csv(&report, path)?;
                        }
                        Ok(report)
                    },
                    ReportFormatter::format_weekly_totals,
                )
            }
        }

        AnalysisCommands::Outliers { common } => run_analysis_with_file_output(
            common,
            "weekly_outliers.json",
            "Weekly outlier analysis",
            |e, _| Ok(e.weekly_outliers()),
            ReportFormatter::format_weekly_outliers,
        ),

        AnalysisCommands::UserWeek { common, csv } => run_analysis_with_file_output(
            common,
            "user_week_analysis.json",
            "User-week analysis",
            |e, _| {
                if let Some(path) = csv {
                    let matrix = e.contributor_matrix(MatrixDensity::Dense);
                    CsvExporter::export_user_weeks(&matrix, path)?;
                }
                Ok(e.user_week_analysis())
            },
            ReportFormatter::format_user_week_analysis,
        ),

        AnalysisCommands::Individual { common } => run_analysis_with_file_output(
            common,
            "individual_analysis.json",
            "Individual user analysis",
            |e, _| Ok(e.individual_metrics()),
            ReportFormatter::format_individual_analysis,
        ),

        AnalysisCommands::Summary { common, label, csv } => run_analysis_with_file_output(
            common,
            "cohort_summary.json",
            "Cohort summary",
            |e, _| {
                let summary = e.summarise_cohort(label);
                if let Some(path) = csv {
                    let rows = CsvExporter::write_weekly_averages(
                        &summary.weekly_averages,
                        File::create(path)?,
                    )?;
                    info!("Wrote {} weekly averages to {}", rows, path.display());
                }
                Ok(summary)
            },
            ReportFormatter::format_cohort_summary,
        ),

        AnalysisCommands::Compare {
            common,
            comparison,
            left_label,
            right_label,
        } => run_analysis_with_file_output(
            common,
            "cohort_comparison.json",
            "Cohort comparison",
            |e, app_config| {
                let path = comparison
                    .clone()
                    .or_else(|| app_config.paths.comparison_json.clone())
                    .ok_or_else(|| {
                        AppError::Config(
                            "No comparison dataset provided. Use --comparison or configure paths.comparison_json in config.toml".to_string(),
                        )
                    })?;
                info!("Comparison dataset: {}", path.display());
                let other = build_engine(&Some(path), app_config)?;
                Ok(e.compare(&other, left_label, right_label))
            },
            ReportFormatter::format_cohort_comparison,
        ),
    }
}
