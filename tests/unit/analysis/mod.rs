//! Analysis module unit tests

pub mod cohort;
pub mod metrics;
pub mod outliers;
pub mod summary;
pub mod weekly;
