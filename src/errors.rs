use thiserror::Error;

/// Application-wide error type - single point of truth
///
/// Record-level problems (a malformed date key, a zero-commit day) are never
/// errors: they are skipped and counted. Configuration inconsistencies that
/// still produce a deterministic result are reported as
/// [`AnalysisWarning`](crate::types::analysis_results::AnalysisWarning)s.
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Date string that is not a valid YYYY-MM-DD calendar date
    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    /// Input absent or entirely unparseable - no partial results are claimed
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

