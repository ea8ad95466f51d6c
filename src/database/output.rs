//! Output database
//!
//! The single SQLite file a batch writes into. It is destroyed and recreated
//! at the start of every batch, then filled one table per CSV file.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::database::core::DatabaseConn;

/// Suffixes of files SQLite may keep next to a database
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Summary of one table in the output database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct TableSummary {
    pub name: String,
    pub rows: u64,
    pub columns: usize,
}

/// Handle to the batch output database
pub struct OutputDatabase {
    db: DatabaseConn,
}

impl OutputDatabase {
    /// Delete the database file at `path` and its sidecar files, if present
    ///
    /// Returns whether a database file was removed. Missing files are not an
    /// error; anything else (permissions, path is a directory) is.
    pub fn reset(path: &Path) -> io::Result<bool> {
        let removed = remove_if_exists(path)?;
        if removed {
            info!("removed existing output database {}", path.display());
        }

        for suffix in SIDECAR_SUFFIXES {
            let sidecar = sidecar_path(path, suffix);
            if remove_if_exists(&sidecar)? {
                debug!("removed stale {}", sidecar.display());
            }
        }

        Ok(removed)
    }

    /// Open (creating if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Output path is not valid UTF-8: {}", path.display()))?;
        let db = DatabaseConn::open_path(path_str)?;
        Ok(Self { db })
    }

    /// Open the database at `path`, failing if the file does not exist
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!(
                "Output database {} does not exist, run a load first",
                path.display()
            ));
        }
        Self::open(path)
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    /// User table names, sorted
    pub fn tables(&self) -> Result<Vec<String>> {
        self.db.table_names()
    }

    /// Name, row count and column count of every table
    pub fn summary(&self) -> Result<Vec<TableSummary>> {
        self.tables()?
            .into_iter()
            .map(|name| {
                let rows = self.db.table_count(&name)?;
                let columns = self.db.table_columns(&name)?.len();
                Ok(TableSummary {
                    name,
                    rows,
                    columns,
                })
            })
            .collect()
    }
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("halfway.db");

        assert!(!OutputDatabase::reset(&path).unwrap());
    }

    #[test]
    fn test_reset_removes_database_and_sidecars() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("halfway.db");
        std::fs::write(&path, b"stale").unwrap();
        std::fs::write(temp_dir.path().join("halfway.db-journal"), b"stale").unwrap();
        std::fs::write(temp_dir.path().join("halfway.db-wal"), b"stale").unwrap();

        assert!(OutputDatabase::reset(&path).unwrap());
        assert!(!path.exists());
        assert!(!temp_dir.path().join("halfway.db-journal").exists());
        assert!(!temp_dir.path().join("halfway.db-wal").exists());
    }

    #[test]
    fn test_reset_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("halfway.db");
        std::fs::create_dir(&path).unwrap();

        assert!(OutputDatabase::reset(&path).is_err());
    }

    #[test]
    fn test_open_existing_requires_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.db");

        assert!(OutputDatabase::open_existing(&path).is_err());
    }

    #[test]
    fn test_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("halfway.db");
        let db = OutputDatabase::open(&path).unwrap();
        db.connection()
            .execute_batch(
                "CREATE TABLE riders (id INTEGER, name TEXT);
                 INSERT INTO riders VALUES (1, 'a'), (2, 'b');
                 CREATE TABLE stations (code TEXT);",
            )
            .unwrap();

        let summary = db.summary().unwrap();
        assert_eq!(
            summary,
            vec![
                TableSummary {
                    name: "riders".to_string(),
                    rows: 2,
                    columns: 2,
                },
                TableSummary {
                    name: "stations".to_string(),
                    rows: 0,
                    columns: 1,
                },
            ]
        );
    }
}
