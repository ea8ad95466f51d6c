//! Batch lens types
//!
//! Plans, reports and progress events produced by a batch load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// What happens when one file fails to load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the batch on the first failure (default)
    #[default]
    FailFast,
    /// Record the failure and continue with the next file
    KeepGoing,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::KeepGoing => write!(f, "keep-going"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-fast" | "failfast" | "abort" => Ok(FailurePolicy::FailFast),
            "keep-going" | "keepgoing" | "continue" => Ok(FailurePolicy::KeepGoing),
            _ => Err(format!(
                "Unknown failure policy '{}'. Valid policies: fail-fast, keep-going",
                s
            )),
        }
    }
}

/// A discovered CSV file and the table it loads into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvSource {
    pub path: PathBuf,
    pub table: String,
}

/// Ordered, validated list of files to load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPlan {
    pub sources: Vec<CsvSource>,
}

impl LoadPlan {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn tables(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.table.as_str()).collect()
    }
}

/// Outcome of a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loaded,
    Failed,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Loaded => write!(f, "loaded"),
            LoadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Per-file entry of a [`LoadReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLoad {
    pub file: String,
    pub table: String,
    pub status: LoadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableLoad {
    pub fn loaded(source: &CsvSource, rows: Option<u64>) -> Self {
        Self {
            file: source.path.display().to_string(),
            table: source.table.clone(),
            status: LoadStatus::Loaded,
            rows,
            error: None,
        }
    }

    pub fn failed(source: &CsvSource, error: &str) -> Self {
        Self {
            file: source.path.display().to_string(),
            table: source.table.clone(),
            status: LoadStatus::Failed,
            rows: None,
            error: Some(error.to_string()),
        }
    }
}

/// Result of one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub output: String,
    pub converter: String,
    pub policy: FailurePolicy,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn loaded_count(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| t.status == LoadStatus::Loaded)
            .count()
    }

    pub fn failed(&self) -> Vec<&TableLoad> {
        self.tables
            .iter()
            .filter(|t| t.status == LoadStatus::Failed)
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.tables.iter().any(|t| t.status == LoadStatus::Failed)
    }

    /// Sum of known row counts
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().filter_map(|t| t.rows).sum()
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Progress information for batch loads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BatchProgress {
    /// The output database is being recreated
    Resetting { output: String },
    /// Discovery finished
    Discovered { total: usize },
    /// A file is about to be converted (`index` is 1-based)
    Loading {
        index: usize,
        total: usize,
        file: String,
        table: String,
    },
    /// A file was converted
    Loaded {
        index: usize,
        total: usize,
        table: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        rows: Option<u64>,
    },
    /// A file failed to convert
    Failed {
        index: usize,
        total: usize,
        table: String,
        error: String,
    },
    /// The batch finished
    Complete { loaded: usize, failed: usize },
}

/// Type alias for progress callback function
pub type BatchProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;
