//! Built-in CSV converter
//!
//! Reads the file twice: once to infer column types, once to insert. The
//! table is created and filled inside a single transaction, so a file that
//! fails halfway leaves no table behind.

use anyhow::{anyhow, Result};
use csv::{ReaderBuilder, StringRecord};
use rusqlite::types::Value;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::{ConversionOutcome, ConversionRequest, Converter};
use crate::database::core::{
    generated_column_names, normalize_column_names, ColumnDef, ColumnType, ColumnTypeInference,
    DatabaseConn, TableSchema,
};

/// CSV dialect accepted by [`CsvConverter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Whether the first row holds column names
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

/// In-process CSV to SQLite converter
#[derive(Debug, Clone, Default)]
pub struct CsvConverter {
    options: CsvOptions,
}

impl CsvConverter {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    fn reader(&self, path: &Path) -> Result<csv::Reader<File>> {
        ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(self.options.has_header)
            .from_path(path)
            .map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))
    }

    /// First pass: column names and types
    pub fn infer_schema(&self, path: &Path, table: &str) -> Result<TableSchema> {
        let mut reader = self.reader(path)?;

        let mut names = if self.options.has_header {
            let headers = reader
                .headers()
                .map_err(|e| anyhow!("Failed to read header of {}: {}", path.display(), e))?;
            normalize_column_names(headers.iter())
        } else {
            Vec::new()
        };

        let mut inferences: Vec<ColumnTypeInference> =
            vec![ColumnTypeInference::new(); names.len()];
        let mut record = StringRecord::new();
        let mut line = 0usize;

        while reader
            .read_record(&mut record)
            .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?
        {
            line += 1;
            // Headerless files take their width from the first record
            if names.is_empty() && !self.options.has_header {
                names = generated_column_names(record.len());
                inferences = vec![ColumnTypeInference::new(); names.len()];
            }
            for (inference, field) in inferences.iter_mut().zip(record.iter()) {
                inference.observe(field);
            }
        }

        if names.is_empty() {
            return Err(anyhow!("{} has no columns", path.display()));
        }

        debug!("inferred schema of {} from {} rows", path.display(), line);

        let columns = names
            .into_iter()
            .zip(inferences)
            .map(|(name, inference)| ColumnDef {
                name,
                column_type: inference.resolve(),
            })
            .collect();
        Ok(TableSchema::new(table, columns))
    }

    /// Second pass: create the table and insert every row
    fn load(&self, path: &Path, db: &DatabaseConn, schema: &TableSchema) -> Result<u64> {
        let mut reader = self.reader(path)?;

        let tx = db.transaction()?;
        tx.execute(&schema.create_table_sql(), [])
            .map_err(|e| anyhow!("Failed to create table '{}': {}", schema.table, e))?;

        let mut rows = 0u64;
        {
            let mut stmt = tx
                .prepare(&schema.insert_sql())
                .map_err(|e| anyhow!("Failed to prepare statement: {}", e))?;

            let mut record = StringRecord::new();
            while reader
                .read_record(&mut record)
                .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?
            {
                let values: Vec<Value> = schema
                    .columns
                    .iter()
                    .zip(record.iter())
                    .map(|(column, field)| to_sql_value(field, column.column_type))
                    .collect();
                stmt.execute(rusqlite::params_from_iter(values))
                    .map_err(|e| {
                        anyhow!(
                            "Failed to insert row {} into '{}': {}",
                            rows + 1,
                            schema.table,
                            e
                        )
                    })?;
                rows += 1;
            }
        }

        tx.commit()
            .map_err(|e| anyhow!("Failed to commit table '{}': {}", schema.table, e))?;
        Ok(rows)
    }
}

impl Converter for CsvConverter {
    fn name(&self) -> &str {
        "csv"
    }

    fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutcome> {
        let schema = self.infer_schema(&request.csv_path, &request.table)?;

        let db_path = request
            .db_path
            .to_str()
            .ok_or_else(|| anyhow!("Database path is not valid UTF-8"))?;
        let db = DatabaseConn::open_path(db_path)?;

        let rows = self.load(&request.csv_path, &db, &schema)?;
        Ok(ConversionOutcome { rows: Some(rows) })
    }
}

/// Empty fields become NULL; the rest follow the column type
fn to_sql_value(field: &str, column_type: ColumnType) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match column_type {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(field.to_string())),
        ColumnType::Real => trimmed
            .parse::<f64>()
            .map(Value::Real)
            .unwrap_or_else(|_| Value::Text(field.to_string())),
        ColumnType::Text => Value::Text(field.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn request(dir: &TempDir, csv_path: PathBuf, table: &str) -> ConversionRequest {
        ConversionRequest {
            csv_path,
            db_path: dir.path().join("halfway.db"),
            table: table.to_string(),
        }
    }

    #[test]
    fn test_convert_infers_types() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(
            &temp_dir,
            "stations.csv",
            "code,name,lat,zone\nBNK,Bank,51.513,1\nWAT,Waterloo,51.503,\n",
        );

        let converter = CsvConverter::default();
        let outcome = converter
            .convert(&request(&temp_dir, csv_path, "stations"))
            .unwrap();
        assert_eq!(outcome.rows, Some(2));

        let db = DatabaseConn::open_path(temp_dir.path().join("halfway.db").to_str().unwrap())
            .unwrap();
        let types: Vec<(String, String)> = db
            .conn
            .prepare("SELECT name, type FROM pragma_table_info('stations')")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(
            types,
            vec![
                ("code".to_string(), "TEXT".to_string()),
                ("name".to_string(), "TEXT".to_string()),
                ("lat".to_string(), "REAL".to_string()),
                ("zone".to_string(), "INTEGER".to_string()),
            ]
        );

        let null_zones: u32 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM stations WHERE zone IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(null_zones, 1);

        let lat: f64 = db
            .conn
            .query_row("SELECT lat FROM stations WHERE code = 'BNK'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!((lat - 51.513).abs() < 1e-9);
    }

    #[test]
    fn test_convert_header_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(&temp_dir, "empty.csv", "a,b\n");

        let outcome = CsvConverter::default()
            .convert(&request(&temp_dir, csv_path, "empty"))
            .unwrap();
        assert_eq!(outcome.rows, Some(0));
    }

    #[test]
    fn test_convert_without_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(&temp_dir, "raw.csv", "1;x\n2;y\n3;z\n");

        let converter = CsvConverter::new(CsvOptions {
            delimiter: b';',
            has_header: false,
        });
        let outcome = converter
            .convert(&request(&temp_dir, csv_path, "raw"))
            .unwrap();
        assert_eq!(outcome.rows, Some(3));

        let db = DatabaseConn::open_path(temp_dir.path().join("halfway.db").to_str().unwrap())
            .unwrap();
        assert_eq!(
            db.table_columns("raw").unwrap(),
            vec!["column_1", "column_2"]
        );
    }

    #[test]
    fn test_convert_ragged_rows_leave_no_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(&temp_dir, "bad.csv", "a,b\n1,2\n3\n");

        let result = CsvConverter::default().convert(&request(&temp_dir, csv_path, "bad"));
        assert!(result.is_err());

        let db = DatabaseConn::open_path(temp_dir.path().join("halfway.db").to_str().unwrap())
            .unwrap();
        assert!(!db.table_exists("bad").unwrap());
    }

    #[test]
    fn test_convert_existing_table_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(&temp_dir, "riders.csv", "id\n1\n");
        let converter = CsvConverter::default();

        converter
            .convert(&request(&temp_dir, csv_path.clone(), "riders"))
            .unwrap();
        assert!(converter
            .convert(&request(&temp_dir, csv_path, "riders"))
            .is_err());
    }

    #[test]
    fn test_convert_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("nope.csv");

        assert!(CsvConverter::default()
            .convert(&request(&temp_dir, csv_path, "nope"))
            .is_err());
    }

    #[test]
    fn test_to_sql_value() {
        assert_eq!(to_sql_value("", ColumnType::Integer), Value::Null);
        assert_eq!(to_sql_value(" 7 ", ColumnType::Integer), Value::Integer(7));
        assert_eq!(to_sql_value("2.5", ColumnType::Real), Value::Real(2.5));
        assert_eq!(
            to_sql_value(" padded ", ColumnType::Text),
            Value::Text(" padded ".to_string())
        );
    }
}
