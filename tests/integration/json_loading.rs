//! Dataset loading and input validation

use commit_activity_research::analysis::AnalysisEngine;
use commit_activity_research::errors::AppError;
use commit_activity_research::processor::JsonDatasetLoader;
use commit_activity_research::types::analysis_results::AnalysisWarning;
use commit_activity_research::types::AnalysisConfig;

use crate::common::{study_dataset, write_dataset_json};

#[test]
fn test_fixture_survives_file_round_trip() -> anyhow::Result<()> {
    let dataset = study_dataset();
    let file = write_dataset_json(&dataset);

    let loaded = JsonDatasetLoader::load(file.path())?;
    assert_eq!(loaded, dataset);
    assert_eq!(loaded.len(), 9);
    assert!(loaded.users["silent"].daily_commits.is_empty());
    Ok(())
}

#[test]
fn test_malformed_keys_are_skipped_and_counted() -> anyhow::Result<()> {
    let dataset = JsonDatasetLoader::parse(
        r#"{
            "alice": {"daily_commits": {"2024-05-01": 2, "2024-13-01": 1, "yesterday": 4}},
            "bob": {"daily_commits": {"2024-05-02": 1}}
        }"#,
    )?;
    let engine = AnalysisEngine::new(&dataset, AnalysisConfig::default())?;
    let report = engine.weekly_totals(false);

    assert_eq!(report.total_commits, 3);
    assert!(report
        .warnings
        .contains(&AnalysisWarning::SkippedMalformedDates { count: 2 }));
    Ok(())
}

#[test]
fn test_empty_object_is_fatal() {
    let dataset = JsonDatasetLoader::parse("{}").unwrap();
    let result = AnalysisEngine::new(&dataset, AnalysisConfig::default());
    assert!(matches!(result, Err(AppError::EmptyDataset(_))));
}

#[test]
fn test_all_dates_malformed_is_fatal() {
    let dataset =
        JsonDatasetLoader::parse(r#"{"alice": {"daily_commits": {"01/05/2024": 3}}}"#).unwrap();
    let result = AnalysisEngine::new(&dataset, AnalysisConfig::default());
    assert!(matches!(result, Err(AppError::EmptyDataset(_))));
}

#[test]
fn test_negative_counts_are_rejected() {
    let result =
        JsonDatasetLoader::parse(r#"{"alice": {"daily_commits": {"2024-05-01": -3}}}"#);
    assert!(matches!(result, Err(AppError::InvalidData(_))));
}

#[test]
fn test_users_without_activity_still_count() -> anyhow::Result<()> {
    let dataset = JsonDatasetLoader::parse(
        r#"{"alice": {"daily_commits": {"2024-05-01": 2}}, "bob": {"daily_commits": {}}}"#,
    )?;
    let engine = AnalysisEngine::new(&dataset, AnalysisConfig::default())?;

    assert_eq!(engine.weekly_totals(false).user_count, 2);
    let individual = engine.individual_metrics();
    assert_eq!(individual.categories.inactive, vec!["bob".to_string()]);
    Ok(())
}
