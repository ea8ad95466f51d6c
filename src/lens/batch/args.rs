//! Batch lens arguments
//!
//! Every field is optional: unset fields fall back to [`HalfwayConfig`].
//! The struct doubles as the clap argument group of `halfway load`.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::FailurePolicy;
use crate::config::{parse_delimiter, HalfwayConfig};
use crate::convert::CsvOptions;
use crate::lens::utils::bool_from_str;

/// Arguments for a batch load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct BatchLoadArgs {
    /// Directory to scan for CSV files [default: current directory]
    #[cfg_attr(feature = "cli", clap(short, long, value_name = "DIR"))]
    #[serde(default)]
    pub input_dir: Option<PathBuf>,

    /// Output SQLite database, deleted and recreated on every run [default: halfway.db]
    #[cfg_attr(feature = "cli", clap(short, long, value_name = "FILE"))]
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// File name pattern selecting the input files [default: *.csv]
    #[cfg_attr(feature = "cli", clap(short, long, value_name = "GLOB"))]
    #[serde(default)]
    pub pattern: Option<String>,

    /// Keep loading the remaining files after one fails
    #[cfg_attr(feature = "cli", clap(short = 'k', long))]
    #[serde(default, deserialize_with = "bool_from_str")]
    pub keep_going: bool,

    /// Field delimiter for the built-in converter [default: ,]
    #[cfg_attr(feature = "cli", clap(short, long, value_name = "CHAR"))]
    #[serde(default)]
    pub delimiter: Option<String>,

    /// Treat the first row as data; columns are named column_1, column_2, ...
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default, deserialize_with = "bool_from_str")]
    pub no_header: bool,

    /// External converter run as `COMMAND [ARGS] <csv> <db> <table>` instead of the built-in one
    #[cfg_attr(feature = "cli", clap(long, value_name = "COMMAND"))]
    #[serde(default)]
    pub command: Option<String>,

    /// Extra argument for the external converter (repeatable)
    #[cfg_attr(
        feature = "cli",
        clap(long = "command-arg", value_name = "ARG", allow_hyphen_values = true)
    )]
    #[serde(default)]
    pub command_args: Vec<String>,
}

/// Which converter a batch uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConverterChoice {
    /// The in-process CSV converter
    Builtin,
    /// An external program
    Command { program: String, args: Vec<String> },
}

/// Fully resolved settings of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub pattern: String,
    pub policy: FailurePolicy,
    pub csv: CsvOptions,
    pub converter: ConverterChoice,
}

impl LoaderSettings {
    /// Settings for `input_dir` with every other value at its default
    pub fn for_dir(input_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        let defaults = HalfwayConfig::default();
        Self {
            input_dir: input_dir.into(),
            output_path: output_path.into(),
            pattern: defaults.pattern,
            policy: defaults.failure_policy,
            csv: CsvOptions::default(),
            converter: ConverterChoice::Builtin,
        }
    }
}

impl BatchLoadArgs {
    /// Merge these arguments over `config`; arguments win
    pub fn resolve(&self, config: &HalfwayConfig) -> Result<LoaderSettings> {
        let input_dir = self
            .input_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.input_dir));
        let output_path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output_path));
        let pattern = self
            .pattern
            .clone()
            .unwrap_or_else(|| config.pattern.clone());

        let policy = if self.keep_going {
            FailurePolicy::KeepGoing
        } else {
            config.failure_policy
        };

        let delimiter = match &self.delimiter {
            Some(d) => parse_delimiter(d)?,
            None => config.delimiter,
        };
        let delimiter =
            u8::try_from(delimiter).map_err(|_| anyhow!("Delimiter must be an ASCII character"))?;

        let csv = CsvOptions {
            delimiter,
            has_header: config.has_header && !self.no_header,
        };

        let converter = match (&self.command, &config.converter_command) {
            (Some(program), _) => ConverterChoice::Command {
                program: program.clone(),
                args: self.command_args.clone(),
            },
            (None, Some(program)) => ConverterChoice::Command {
                program: program.clone(),
                args: if self.command_args.is_empty() {
                    config.converter_args.clone()
                } else {
                    self.command_args.clone()
                },
            },
            (None, None) => ConverterChoice::Builtin,
        };

        Ok(LoaderSettings {
            input_dir,
            output_path,
            pattern,
            policy,
            csv,
            converter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let settings = BatchLoadArgs::default()
            .resolve(&HalfwayConfig::default())
            .unwrap();

        assert_eq!(settings.input_dir, PathBuf::from("."));
        assert_eq!(settings.output_path, PathBuf::from("halfway.db"));
        assert_eq!(settings.pattern, "*.csv");
        assert_eq!(settings.policy, FailurePolicy::FailFast);
        assert_eq!(settings.csv, CsvOptions::default());
        assert_eq!(settings.converter, ConverterChoice::Builtin);
    }

    #[test]
    fn test_args_override_config() {
        let config = HalfwayConfig {
            output_path: "config.db".to_string(),
            delimiter: ';',
            converter_command: Some("from-config".to_string()),
            converter_args: vec!["--a".to_string()],
            ..Default::default()
        };
        let args = BatchLoadArgs {
            output: Some(PathBuf::from("args.db")),
            keep_going: true,
            no_header: true,
            delimiter: Some("|".to_string()),
            ..Default::default()
        };

        let settings = args.resolve(&config).unwrap();
        assert_eq!(settings.output_path, PathBuf::from("args.db"));
        assert_eq!(settings.policy, FailurePolicy::KeepGoing);
        assert_eq!(settings.csv.delimiter, b'|');
        assert!(!settings.csv.has_header);
        assert_eq!(
            settings.converter,
            ConverterChoice::Command {
                program: "from-config".to_string(),
                args: vec!["--a".to_string()],
            }
        );
    }

    #[test]
    fn test_command_flag_replaces_config_command() {
        let config = HalfwayConfig {
            converter_command: Some("from-config".to_string()),
            converter_args: vec!["--a".to_string()],
            ..Default::default()
        };
        let args = BatchLoadArgs {
            command: Some("csv2sqlite".to_string()),
            ..Default::default()
        };

        assert_eq!(
            args.resolve(&config).unwrap().converter,
            ConverterChoice::Command {
                program: "csv2sqlite".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_invalid_delimiter() {
        let args = BatchLoadArgs {
            delimiter: Some("ab".to_string()),
            ..Default::default()
        };
        assert!(args.resolve(&HalfwayConfig::default()).is_err());
    }

    #[test]
    fn test_deserialize_args() {
        let args: BatchLoadArgs =
            serde_json::from_str(r#"{"input_dir": "data", "keep_going": "true"}"#).unwrap();
        assert_eq!(args.input_dir, Some(PathBuf::from("data")));
        assert!(args.keep_going);
        assert!(!args.no_header);
    }
}
