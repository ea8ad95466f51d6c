//! Conversion capability
//!
//! A converter turns one CSV file into one table of the output database. The
//! batch loader only knows the [`Converter`] trait; it hands over the input
//! file, the database path and the table name, and gets back success or an
//! error.
//!
//! Two converters are provided:
//!
//! - [`CsvConverter`]: built in, parses the file with the `csv` crate and
//!   inserts it through `rusqlite`, inferring column types
//! - [`CommandConverter`]: runs an external program once per file

mod builtin;
mod command;

pub use builtin::{CsvConverter, CsvOptions};
pub use command::CommandConverter;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One unit of work for a converter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// CSV file to read
    pub csv_path: PathBuf,
    /// SQLite database to write into
    pub db_path: PathBuf,
    /// Table to create
    pub table: String,
}

/// What a successful conversion reports back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Number of rows loaded, when the converter knows it
    pub rows: Option<u64>,
}

/// A routine that loads one CSV file as one table
pub trait Converter {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Create `request.table` in `request.db_path` from `request.csv_path`
    fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutcome>;
}
