//! Input loading and tabular export
//!
//! The analysis core never touches the filesystem; these collaborators read
//! the JSON snapshot in and write CSV tables out.

pub mod csv_writer;
pub mod json_loader;

pub use csv_writer::CsvExporter;
pub use json_loader::JsonDatasetLoader;
