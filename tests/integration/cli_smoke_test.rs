//! CLI Smoke Test
//!
//! Runs every report through every output format, then drives the analysis
//! commands end to end against a dataset written to disk.

use commit_activity_research::analysis::{AnalysisEngine, OutputFormat, ReportFormatter};
use commit_activity_research::cli::commands::analysis::{run_analysis, AnalysisCommands, CommonArgs};
use commit_activity_research::errors::AppResult;
use commit_activity_research::types::AnalysisConfig;

use crate::common::{doubled_dataset, study_dataset, write_dataset_json};

const FORMATS: [OutputFormat; 3] = [
    OutputFormat::Console,
    OutputFormat::Json,
    OutputFormat::Plotly,
];

fn check_formats<T>(
    name: &str,
    report: &T,
    format_fn: impl Fn(&T, &OutputFormat) -> AppResult<String>,
) {
    for format in &FORMATS {
        let output = format_fn(report, format)
            .unwrap_or_else(|e| panic!("{} failed for {:?}: {}", name, format, e));
        assert!(!output.is_empty(), "{} produced empty {:?} output", name, format);

        match format {
            OutputFormat::Console => {
                assert!(output.contains("📊"), "{} console output has no header", name);
            }
            OutputFormat::Json => {
                serde_json::from_str::<serde_json::Value>(&output)
                    .unwrap_or_else(|e| panic!("{} JSON is invalid: {}", name, e));
            }
            OutputFormat::Plotly => {
                let chart: serde_json::Value = serde_json::from_str(&output).unwrap();
                assert!(chart["data"].is_array(), "{} chart has no traces", name);
                assert!(chart["layout"].is_object(), "{} chart has no layout", name);
            }
        }
    }
}

#[test]
fn test_all_reports_in_all_formats() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let control = AnalysisEngine::new(&doubled_dataset(), AnalysisConfig::default()).unwrap();

    check_formats(
        "weekly_totals",
        &engine.weekly_totals(true),
        ReportFormatter::format_weekly_totals,
    );
    check_formats(
        "power_user_exclusion",
        &engine.weekly_totals_without_power_users(),
        ReportFormatter::format_power_user_exclusion,
    );
    check_formats(
        "weekly_outliers",
        &engine.weekly_outliers(),
        ReportFormatter::format_weekly_outliers,
    );
    check_formats(
        "user_week_analysis",
        &engine.user_week_analysis(),
        ReportFormatter::format_user_week_analysis,
    );
    check_formats(
        "individual_analysis",
        &engine.individual_metrics(),
        ReportFormatter::format_individual_analysis,
    );
    check_formats(
        "cohort_summary",
        &engine.summarise_cohort("study"),
        ReportFormatter::format_cohort_summary,
    );
    check_formats(
        "cohort_comparison",
        &engine.compare(&control, "treated", "control"),
        ReportFormatter::format_cohort_comparison,
    );
}

#[test]
fn test_console_reports_surface_warnings() {
    let engine = AnalysisEngine::new(&study_dataset(), AnalysisConfig::default()).unwrap();
    let output =
        ReportFormatter::format_weekly_totals(&engine.weekly_totals(false), &OutputFormat::Console)
            .unwrap();
    assert!(output.contains("malformed"));
}

fn common_args(input: &std::path::Path, format: &str, output: &std::path::Path) -> CommonArgs {
    CommonArgs {
        input: Some(input.to_path_buf()),
        format: format.to_string(),
        output: Some(output.to_path_buf()),
        ..CommonArgs::default()
    }
}

#[test]
fn test_commands_write_requested_output() -> anyhow::Result<()> {
    let input = write_dataset_json(&study_dataset());
    let comparison = write_dataset_json(&doubled_dataset());
    let dir = tempfile::tempdir()?;

    let commands = vec![
        (
            "weekly.json",
            AnalysisCommands::Weekly {
                common: common_args(input.path(), "json", &dir.path().join("weekly.json")),
                consistent_only: true,
                exclude_power_users: false,
                csv: Some(dir.path().join("weekly.csv")),
            },
        ),
        (
            "outliers.txt",
            AnalysisCommands::Outliers {
                common: common_args(input.path(), "console", &dir.path().join("outliers.txt")),
            },
        ),
        (
            "user_week.json",
            AnalysisCommands::UserWeek {
                common: common_args(input.path(), "plotly", &dir.path().join("user_week.json")),
                csv: Some(dir.path().join("user_weeks.csv")),
            },
        ),
        (
            "individual.json",
            AnalysisCommands::Individual {
                common: common_args(input.path(), "json", &dir.path().join("individual.json")),
            },
        ),
        (
            "summary.txt",
            AnalysisCommands::Summary {
                common: common_args(input.path(), "console", &dir.path().join("summary.txt")),
                label: "study".to_string(),
                csv: Some(dir.path().join("averages.csv")),
            },
        ),
        (
            "compare.json",
            AnalysisCommands::Compare {
                common: common_args(input.path(), "json", &dir.path().join("compare.json")),
                comparison: Some(comparison.path().to_path_buf()),
                left_label: "treated".to_string(),
                right_label: "control".to_string(),
            },
        ),
    ];

    for (file, command) in &commands {
        run_analysis(command)?;
        let content = std::fs::read_to_string(dir.path().join(file))?;
        assert!(!content.is_empty(), "{} is empty", file);
    }

    let csv = std::fs::read_to_string(dir.path().join("user_weeks.csv"))?;
    // the silent user has no cells
    assert_eq!(csv.lines().count(), 1 + 8 * 18);
    let weekly = std::fs::read_to_string(dir.path().join("weekly.csv"))?;
    assert_eq!(weekly.lines().next(), Some("week_start,commits"));
    assert_eq!(weekly.lines().count(), 1 + 18);
    let averages = std::fs::read_to_string(dir.path().join("averages.csv"))?;
    assert_eq!(averages.lines().count(), 1 + 18);
    Ok(())
}
