//! Database module
//!
//! This module provides all database functionality for halfway, organized into:
//!
//! - **core**: Core database infrastructure (SQLite connection, table schemas)
//! - **output**: The batch output database (reset, create, inspect)
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   └── schema      # Column naming, type inference, DDL
//! │
//! └── output          # OutputDatabase: the file a batch writes into
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use halfway::database::OutputDatabase;
//! use std::path::Path;
//!
//! let path = Path::new("halfway.db");
//! OutputDatabase::reset(path)?;
//! let db = OutputDatabase::open(path)?;
//! for table in db.summary()? {
//!     println!("{}: {} rows", table.name, table.rows);
//! }
//! ```

pub mod core;
mod output;

pub use self::core::{
    quote_identifier, ColumnDef, ColumnType, ColumnTypeInference, DatabaseConn, TableSchema,
};
pub use output::{OutputDatabase, TableSummary};
