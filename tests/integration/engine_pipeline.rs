//! End-to-end analysis pipeline: JSON file -> engine -> reports -> exports

use commit_activity_research::analysis::AnalysisEngine;
use commit_activity_research::processor::{CsvExporter, JsonDatasetLoader};
use commit_activity_research::types::analysis_results::MatrixDensity;
use commit_activity_research::types::AnalysisConfig;

use crate::common::{study_dataset, valid_commit_total, write_dataset_json};

fn engine_from_file() -> anyhow::Result<AnalysisEngine> {
    let file = write_dataset_json(&study_dataset());
    let dataset = JsonDatasetLoader::load(file.path())?;
    Ok(AnalysisEngine::new(&dataset, AnalysisConfig::default())?)
}

#[test]
fn test_every_report_serialises() -> anyhow::Result<()> {
    let engine = engine_from_file()?;

    let weekly = serde_json::to_value(engine.weekly_totals(false))?;
    assert_eq!(weekly["weeks"].as_array().map(Vec::len), Some(18));
    assert_eq!(
        weekly["total_commits"].as_u64(),
        Some(valid_commit_total(&study_dataset()))
    );
    assert_eq!(weekly["warnings"][0]["kind"], "skipped_malformed_dates");

    let outliers = serde_json::to_value(engine.weekly_outliers())?;
    assert_eq!(outliers["partition"]["method"]["method"], "relative_threshold");

    let user_week = serde_json::to_value(engine.user_week_analysis())?;
    assert!(user_week["cells"]["removed"].is_array());

    let individual = serde_json::to_value(engine.individual_metrics())?;
    assert_eq!(individual["user_count"], 9);

    let summary = serde_json::to_value(engine.summarise_cohort("study"))?;
    assert_eq!(summary["cohort_size"], 6);
    assert_eq!(summary["treatment_week"], "2024-07-17");
    Ok(())
}

#[test]
fn test_analyses_do_not_interfere() -> anyhow::Result<()> {
    let engine = engine_from_file()?;

    let first = serde_json::to_value(engine.weekly_totals(true))?;
    let _ = engine.weekly_outliers();
    let _ = engine.user_week_analysis();
    let _ = engine.individual_metrics();
    let _ = engine.summarise_cohort("study");
    let second = serde_json::to_value(engine.weekly_totals(true))?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_dense_cohort_matrix_exports_every_cell() -> anyhow::Result<()> {
    let engine = engine_from_file()?;
    let matrix = engine.user_week_matrix(true, MatrixDensity::Dense);
    assert_eq!(matrix.population(), 6);
    assert_eq!(matrix.observations.len(), 6 * 18);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("user_weeks.csv");
    CsvExporter::export_user_weeks(&matrix, &path)?;

    let content = std::fs::read_to_string(&path)?;
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("user_id,week_start,commits"));
    assert_eq!(lines.count(), 6 * 18);
    Ok(())
}

#[test]
fn test_sparse_matrix_keeps_only_active_cells() -> anyhow::Result<()> {
    let engine = engine_from_file()?;
    let sparse = engine.user_week_matrix(false, MatrixDensity::Sparse);
    let dense = engine.user_week_matrix(false, MatrixDensity::Dense);

    assert_eq!(sparse.users, dense.users);
    assert!(sparse.observations.iter().all(|o| o.commits > 0));
    assert_eq!(
        sparse.observations.len(),
        dense.observations.iter().filter(|o| o.commits > 0).count()
    );
    assert_eq!(sparse.week_sums(), dense.week_sums());
    Ok(())
}
