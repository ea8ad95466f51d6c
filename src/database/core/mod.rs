//! Core database infrastructure
//!
//! This module provides the foundational database components:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `TableSchema`: Column naming, type inference and DDL for loaded tables

mod connection;
mod schema;

pub use connection::{quote_identifier, DatabaseConn};
pub use schema::{
    generated_column_names, normalize_column_names, ColumnDef, ColumnType, ColumnTypeInference,
    TableSchema,
};
