//! Batch-level errors

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that end a batch
#[derive(Debug)]
pub enum LoadError {
    /// The existing output database could not be removed or recreated
    Reset { path: PathBuf, source: io::Error },
    /// The input directory could not be listed, or the pattern is invalid
    Discovery { dir: PathBuf, message: String },
    /// Two input files map to the same table name
    DuplicateTableName {
        table: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// The converter failed on one file (fail-fast mode)
    Conversion {
        path: PathBuf,
        table: String,
        message: String,
    },
}

impl LoadError {
    pub fn discovery(dir: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Discovery {
            dir: dir.to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Reset { path, source } => {
                write!(
                    f,
                    "Unable to reset output database {}: {}",
                    path.display(),
                    source
                )
            }
            LoadError::Discovery { dir, message } => {
                write!(f, "Unable to list CSV files in {}: {}", dir.display(), message)
            }
            LoadError::DuplicateTableName {
                table,
                first,
                second,
            } => write!(
                f,
                "Duplicate table name '{}': both {} and {} map to it",
                table,
                first.display(),
                second.display()
            ),
            LoadError::Conversion {
                path,
                table,
                message,
            } => write!(
                f,
                "Failed to load {} into table '{}': {}",
                path.display(),
                table,
                message
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Reset { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = LoadError::DuplicateTableName {
            table: "data".to_string(),
            first: PathBuf::from("data.csv"),
            second: PathBuf::from("DATA.csv"),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate table name 'data': both data.csv and DATA.csv map to it"
        );

        let err = LoadError::Conversion {
            path: PathBuf::from("bad.csv"),
            table: "bad".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load bad.csv into table 'bad': boom"
        );
    }

    #[test]
    fn test_into_anyhow() {
        let err = LoadError::discovery(std::path::Path::new("/nowhere"), "missing");
        let any: anyhow::Error = err.into();
        assert!(any.downcast_ref::<LoadError>().is_some());
    }
}
