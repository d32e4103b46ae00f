//! Commit Activity Research - Type System
//!
//! - `activity`: Input snapshot and parsed per-user daily activity
//! - `analysis_config`: Run parameters (anchor, period, treatment, thresholds)
//! - `analysis_results`: Serialisable report types produced by the analysers
//! - `visualisation`: Plotly chart types

mod activity;
mod analysis_config;
pub mod analysis_results;
pub mod visualisation;

pub use activity::{DailyRecord, Dataset, ParsedDataset, UserProfile, UserRecord};
pub use analysis_config::{
    AnalysisConfig, AnalysisConfigBuilder, DateRange, OutlierSettings, PowerUserSettings,
};
