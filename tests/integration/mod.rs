//! Integration tests

pub mod cli_smoke_test;
pub mod engine_pipeline;
pub mod json_loading;
