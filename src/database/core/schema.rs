//! Table schema definitions
//!
//! Every loaded table gets its schema from the CSV it came from: the header
//! row names the columns and the data rows decide each column's type.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::connection::quote_identifier;

/// SQLite storage class chosen for a CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Running type inference for one column
///
/// Starts optimistic (integer) and widens to real, then text, as values are
/// observed. Empty values do not take part.
#[derive(Debug, Clone, Copy)]
pub struct ColumnTypeInference {
    seen_value: bool,
    all_integer: bool,
    all_real: bool,
}

impl ColumnTypeInference {
    pub fn new() -> Self {
        Self {
            seen_value: false,
            all_integer: true,
            all_real: true,
        }
    }

    /// Account for one raw field
    pub fn observe(&mut self, raw: &str) {
        let value = raw.trim();
        if value.is_empty() {
            return;
        }
        self.seen_value = true;

        if self.all_integer && value.parse::<i64>().is_err() {
            self.all_integer = false;
        }
        if self.all_real && !is_real(value) {
            self.all_real = false;
        }
    }

    /// The narrowest type that holds every observed value
    pub fn resolve(&self) -> ColumnType {
        if !self.seen_value {
            ColumnType::Text
        } else if self.all_integer {
            ColumnType::Integer
        } else if self.all_real {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }
}

impl Default for ColumnTypeInference {
    fn default() -> Self {
        Self::new()
    }
}

// `f64::from_str` accepts "inf" and "NaN"; those stay text
fn is_real(value: &str) -> bool {
    value.parse::<f64>().map(|v| v.is_finite()).unwrap_or(false)
}

/// A column of a loaded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

/// Schema for one table created from one CSV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(table: &str, columns: Vec<ColumnDef>) -> Self {
        Self {
            table: table.to_string(),
            columns,
        }
    }

    /// `CREATE TABLE` statement for this schema
    ///
    /// Deliberately without `IF NOT EXISTS`: loading into an existing table
    /// must fail instead of appending.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE {} ({})",
            quote_identifier(&self.table),
            columns
        )
    }

    /// Parameterized `INSERT` statement covering every column
    pub fn insert_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table),
            columns,
            placeholders
        )
    }
}

/// Turn raw header fields into usable, unique column names
///
/// Blank names become `column_N` (1-based position). Repeats, compared
/// case-insensitively as SQLite does, get a `_2`, `_3`... suffix.
pub fn normalize_column_names<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for (idx, raw) in headers.into_iter().enumerate() {
        let trimmed = raw.trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate.to_ascii_lowercase()) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        taken.insert(candidate.to_ascii_lowercase());
        names.push(candidate);
    }

    names
}

/// Generated column names for files without a header row
pub fn generated_column_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("column_{}", i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(values: &[&str]) -> ColumnType {
        let mut inference = ColumnTypeInference::new();
        for v in values {
            inference.observe(v);
        }
        inference.resolve()
    }

    #[test]
    fn test_infer_column_types() {
        assert_eq!(infer(&["1", "2", "-30"]), ColumnType::Integer);
        assert_eq!(infer(&["1", "2.5", ""]), ColumnType::Real);
        assert_eq!(infer(&["51.5", "-0.12"]), ColumnType::Real);
        assert_eq!(infer(&["1", "Bank"]), ColumnType::Text);
        assert_eq!(infer(&["", "  "]), ColumnType::Text);
        assert_eq!(infer(&[]), ColumnType::Text);
        assert_eq!(infer(&["NaN", "inf"]), ColumnType::Text);
    }

    #[test]
    fn test_normalize_column_names() {
        let names = normalize_column_names(vec![" code ", "", "Name", "name", "NAME"]);
        assert_eq!(names, vec!["code", "column_2", "Name", "name_2", "NAME_3"]);
    }

    #[test]
    fn test_generated_column_names() {
        assert_eq!(
            generated_column_names(3),
            vec!["column_1", "column_2", "column_3"]
        );
    }

    #[test]
    fn test_schema_sql() {
        let schema = TableSchema::new(
            "data.backup",
            vec![
                ColumnDef {
                    name: "code".to_string(),
                    column_type: ColumnType::Text,
                },
                ColumnDef {
                    name: "lat".to_string(),
                    column_type: ColumnType::Real,
                },
            ],
        );

        assert_eq!(
            schema.create_table_sql(),
            "CREATE TABLE \"data.backup\" (\"code\" TEXT, \"lat\" REAL)"
        );
        assert_eq!(
            schema.insert_sql(),
            "INSERT INTO \"data.backup\" (\"code\", \"lat\") VALUES (?1, ?2)"
        );
    }
}
