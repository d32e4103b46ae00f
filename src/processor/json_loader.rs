//! JSON dataset loading
//!
//! Reads the collector's `{user: {daily_commits: {date: n}, ...}}` mapping.
//! Unknown per-user fields are ignored.

use crate::errors::AppResult;
use crate::types::Dataset;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub struct JsonDatasetLoader;

impl JsonDatasetLoader {
    /// Load a dataset from a JSON file
    ///
    /// A missing file is `AppError::Io`; malformed JSON (including negative
    /// counts) is `AppError::InvalidData`.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Dataset> {
        let path = path.as_ref();
        info!("Loading commit data from {}", path.display());

        let reader = BufReader::new(File::open(path)?);
        let dataset: Dataset = serde_json::from_reader(reader)?;

        info!("Loaded data for {} users", dataset.len());
        Ok(dataset)
    }

    /// Parse a dataset from an in-memory JSON string
    pub fn parse(json: &str) -> AppResult<Dataset> {
        Ok(serde_json::from_str(json)?)
    }
}
