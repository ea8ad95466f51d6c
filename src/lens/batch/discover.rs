//! Input discovery and planning

use glob::{MatchOptions, Pattern};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::error::LoadError;
use super::types::{CsvSource, LoadPlan};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Table name for a CSV file: the file name without its final extension
///
/// `riders.csv` gives `riders`, `data.backup.csv` gives `data.backup`.
pub fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Regular files directly inside `dir` whose name matches `pattern`
///
/// Sorted by file name. `exclude` (typically the output database) is never
/// returned even when it matches.
pub fn discover_csv_files(
    dir: &Path,
    pattern: &str,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>, LoadError> {
    let matcher = Pattern::new(pattern)
        .map_err(|e| LoadError::discovery(dir, format!("invalid pattern '{}': {}", pattern, e)))?;

    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::discovery(dir, e.to_string()))?;
    let excluded = exclude.and_then(|p| p.canonicalize().ok());

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::discovery(dir, e.to_string()))?;
        let path = entry.path();

        let Some(name) = entry.file_name().to_str().map(|s| s.to_string()) else {
            warn!("skipping file with non UTF-8 name: {}", path.display());
            continue;
        };
        if !matcher.matches_with(&name, MATCH_OPTIONS) || !path.is_file() {
            continue;
        }
        if let (Some(excluded), Ok(canonical)) = (&excluded, path.canonicalize()) {
            if &canonical == excluded {
                debug!("skipping output database {}", path.display());
                continue;
            }
        }
        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Pair every file with its table name and reject name collisions
///
/// SQLite table names are case-insensitive, so `Data.csv` and `data.CSV`
/// collide.
pub fn plan_sources(files: Vec<PathBuf>) -> Result<LoadPlan, LoadError> {
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut sources = Vec::with_capacity(files.len());

    for path in files {
        let Some(table) = table_name_for(&path) else {
            warn!("skipping {}: no usable table name", path.display());
            continue;
        };

        let key = table.to_ascii_lowercase();
        if let Some(first) = seen.get(&key) {
            return Err(LoadError::DuplicateTableName {
                table,
                first: first.clone(),
                second: path,
            });
        }
        seen.insert(key, path.clone());
        sources.push(CsvSource { path, table });
    }

    Ok(LoadPlan { sources })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "a\n1\n").unwrap();
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_table_name_strips_final_extension() {
        assert_eq!(
            table_name_for(Path::new("riders.csv")),
            Some("riders".to_string())
        );
        assert_eq!(
            table_name_for(Path::new("/tmp/data.backup.csv")),
            Some("data.backup".to_string())
        );
        assert_eq!(
            table_name_for(Path::new("noext")),
            Some("noext".to_string())
        );
    }

    #[test]
    fn test_discover_sorted_and_filtered() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "stations.csv");
        touch(temp_dir.path(), "riders.csv");
        touch(temp_dir.path(), "notes.txt");
        touch(temp_dir.path(), "data.backup.csv");
        std::fs::create_dir(temp_dir.path().join("dir.csv")).unwrap();

        let files = discover_csv_files(temp_dir.path(), "*.csv", None).unwrap();
        assert_eq!(
            names(&files),
            vec!["data.backup.csv", "riders.csv", "stations.csv"]
        );
    }

    #[test]
    fn test_discover_pattern_is_case_sensitive() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "upper.CSV");
        touch(temp_dir.path(), "lower.csv");

        let files = discover_csv_files(temp_dir.path(), "*.csv", None).unwrap();
        assert_eq!(names(&files), vec!["lower.csv"]);

        let files = discover_csv_files(temp_dir.path(), "*.[cC][sS][vV]", None).unwrap();
        assert_eq!(names(&files), vec!["lower.csv", "upper.CSV"]);
    }

    #[test]
    fn test_discover_skips_hidden_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "riders.csv");
        touch(temp_dir.path(), ".hidden.csv");
        std::fs::write(temp_dir.path().join("._riders.csv"), [0x00u8, 0x05, 0x16, 0xff]).unwrap();

        let files = discover_csv_files(temp_dir.path(), "*.csv", None).unwrap();
        assert_eq!(names(&files), vec!["riders.csv"]);

        let files = discover_csv_files(temp_dir.path(), ".*.csv", None).unwrap();
        assert_eq!(names(&files), vec!["._riders.csv", ".hidden.csv"]);
    }

    #[test]
    fn test_discover_excludes_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "riders.csv");
        touch(temp_dir.path(), "halfway.db");

        let output = temp_dir.path().join("halfway.db");
        let files = discover_csv_files(temp_dir.path(), "*", Some(&output)).unwrap();
        assert_eq!(names(&files), vec!["riders.csv"]);
    }

    #[test]
    fn test_discover_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing");

        assert!(matches!(
            discover_csv_files(&missing, "*.csv", None),
            Err(LoadError::Discovery { .. })
        ));
        assert!(matches!(
            discover_csv_files(temp_dir.path(), "[", None),
            Err(LoadError::Discovery { .. })
        ));
    }

    #[test]
    fn test_plan_distinct_names() {
        let plan = plan_sources(vec![
            PathBuf::from("data.csv"),
            PathBuf::from("data.backup.csv"),
        ])
        .unwrap();
        assert_eq!(plan.tables(), vec!["data", "data.backup"]);
    }

    #[test]
    fn test_plan_rejects_duplicates() {
        let result = plan_sources(vec![PathBuf::from("Data.csv"), PathBuf::from("data.CSV")]);
        match result {
            Err(LoadError::DuplicateTableName {
                table,
                first,
                second,
            }) => {
                assert_eq!(table, "data");
                assert_eq!(first, PathBuf::from("Data.csv"));
                assert_eq!(second, PathBuf::from("data.CSV"));
            }
            other => panic!("expected duplicate table name, got {:?}", other),
        }
    }
}
