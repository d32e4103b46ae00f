//! Commit Activity Research
//!
//! Weekly commit aggregation, consistent-user cohorts, outlier detection and
//! per-user behavioral metrics around a treatment period.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod errors;
pub mod processor;
pub mod types;
pub mod utils;
