//! CSV export of weekly series and user-week observation tables

use crate::errors::AppResult;
use crate::types::analysis_results::{UserWeekMatrix, WeeklyAverage, WeeklyTotalsReport};
use crate::utils::time::format_iso;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct ObservationRow<'a> {
    user_id: &'a str,
    week_start: String,
    commits: u64,
}

#[derive(Serialize)]
struct WeekRow {
    week_start: String,
    commits: u64,
}

#[derive(Serialize)]
struct AverageRow {
    week_start: String,
    average_commits: f64,
}

pub struct CsvExporter;

impl CsvExporter {
    /// One row per `(user, week)` cell of the matrix
    pub fn write_user_weeks<W: Write>(matrix: &UserWeekMatrix, writer: W) -> AppResult<usize> {
        let mut csv = WriterBuilder::new().from_writer(writer);
        for obs in &matrix.observations {
            csv.serialize(ObservationRow {
                user_id: &obs.user_id,
                week_start: format_iso(obs.week_start),
                commits: obs.commits,
            })?;
        }
        csv.flush()?;
        Ok(matrix.observations.len())
    }

    pub fn write_weekly_totals<W: Write>(
        report: &WeeklyTotalsReport,
        writer: W,
    ) -> AppResult<usize> {
        let mut csv = WriterBuilder::new().from_writer(writer);
        for week in &report.weeks {
            csv.serialize(WeekRow {
                week_start: format_iso(week.week_start),
                commits: week.commits,
            })?;
        }
        csv.flush()?;
        Ok(report.weeks.len())
    }

    pub fn write_weekly_averages<W: Write>(
        averages: &[WeeklyAverage],
        writer: W,
    ) -> AppResult<usize> {
        let mut csv = WriterBuilder::new().from_writer(writer);
        for week in averages {
            csv.serialize(AverageRow {
                week_start: format_iso(week.week_start),
                average_commits: week.average_commits,
            })?;
        }
        csv.flush()?;
        Ok(averages.len())
    }

    /// Write the user-week table to `path`
    pub fn export_user_weeks(matrix: &UserWeekMatrix, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let rows = Self::write_user_weeks(matrix, std::fs::File::create(path)?)?;
        info!("Wrote {} user-week rows to {}", rows, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::analysis_results::{MatrixDensity, UserWeekObservation, WeekTotal};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_user_week_rows() {
        let matrix = UserWeekMatrix {
            density: MatrixDensity::Dense,
            weeks: vec![d(2024, 5, 1)],
            users: vec!["alice".to_string(), "bob".to_string()],
            observations: vec![
                UserWeekObservation {
                    user_id: "alice".to_string(),
                    week_start: d(2024, 5, 1),
                    commits: 4,
                },
                UserWeekObservation {
                    user_id: "bob".to_string(),
                    week_start: d(2024, 5, 1),
                    commits: 0,
                },
            ],
        };

        let mut buffer = Vec::new();
        let rows = CsvExporter::write_user_weeks(&matrix, &mut buffer).unwrap();
        assert_eq!(rows, 2);
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "user_id,week_start,commits\nalice,2024-05-01,4\nbob,2024-05-01,0\n"
        );
    }

    #[test]
    fn test_weekly_totals_rows() {
        let report = WeeklyTotalsReport {
            weeks: vec![WeekTotal {
                week_start: d(2024, 5, 8),
                commits: 12,
            }],
            total_commits: 12,
            ..WeeklyTotalsReport::default()
        };
        let mut buffer = Vec::new();
        CsvExporter::write_weekly_totals(&report, &mut buffer).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "week_start,commits\n2024-05-08,12\n"
        );
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_weeks.csv");
        CsvExporter::export_user_weeks(&UserWeekMatrix::default(), &path).unwrap();
        assert!(path.exists());
    }
}
