#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Halfway - load a directory of CSV files into SQLite
//!
//! Halfway discovers every CSV file in a directory and loads each one into a
//! freshly created SQLite database as its own table, named after the file
//! (minus its final extension). It can be used as both a command-line
//! application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Library: batch loader, converters, output database | `rusqlite`, `csv`, `glob` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | The `halfway` binary | All above + `clap`, `indicatif` |
//!
//! # Architecture
//!
//! - **[`database`]**: SQLite connection management, table schemas and the
//!   output database
//! - **[`convert`]**: the conversion capability (`Converter` trait) with a
//!   built-in CSV converter and an external command converter
//! - **[`lens`]**: the batch loader (`BatchLens`) and output utilities
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use halfway::lens::batch::{BatchLens, LoaderSettings};
//!
//! let settings = LoaderSettings::for_dir("data", "halfway.db");
//! let report = BatchLens::new(settings).run()?;
//! for table in &report.tables {
//!     println!("{} -> {} ({:?} rows)", table.file, table.table, table.rows);
//! }
//! ```

pub mod config;
pub mod convert;
pub mod database;
pub mod lens;

// =============================================================================
// Configuration
// =============================================================================

pub use self::config::HalfwayConfig;

// =============================================================================
// Database
// =============================================================================

pub use database::{DatabaseConn, OutputDatabase, TableSummary};

// =============================================================================
// Conversion
// =============================================================================

pub use convert::{
    CommandConverter, ConversionOutcome, ConversionRequest, Converter, CsvConverter, CsvOptions,
};

// =============================================================================
// Batch loading
// =============================================================================

pub use lens::batch::{
    BatchLens, BatchLoadArgs, BatchProgress, BatchProgressCallback, FailurePolicy, LoadError,
    LoadReport, LoaderSettings, TableLoad,
};
pub use lens::utils::OutputFormat;
