use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::lens::batch::FailurePolicy;
use crate::lens::utils::parse_bool;

/// Name of the per-directory configuration file
pub const LOCAL_CONFIG_FILE: &str = "halfway.toml";

/// Default output database path, relative to the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "halfway.db";

/// Default pattern matched against file names
pub const DEFAULT_PATTERN: &str = "*.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HalfwayConfig {
    /// Directory scanned for CSV files
    pub input_dir: String,

    /// SQLite file recreated by every batch
    pub output_path: String,

    /// Glob pattern matched against file names in `input_dir`
    pub pattern: String,

    /// What to do when one file fails to load
    pub failure_policy: FailurePolicy,

    /// Field delimiter for the built-in converter
    pub delimiter: char,

    /// Whether CSV files start with a header row
    pub has_header: bool,

    /// External converter program; the built-in converter is used when unset
    pub converter_command: Option<String>,

    /// Extra arguments passed to the external converter before the file arguments
    pub converter_args: Vec<String>,

    /// Configuration files that were read, lowest priority first
    pub files: Vec<String>,
}

const EMPTY_CONFIG: &str = r#"### halfway configuration file

### directory scanned for CSV files
# input_dir = "."

### database recreated on every run
# output_path = "halfway.db"

### file name pattern
# pattern = "*.csv"

### fail-fast (default) or keep-going
# failure_policy = "fail-fast"

### CSV dialect for the built-in converter
# delimiter = ","
# has_header = true

### external converter, run as: <command> [args] <csv> <db> <table>
# converter_command = "csv2sqlite"
# converter_args = ""
"#;

impl Default for HalfwayConfig {
    fn default() -> Self {
        Self {
            input_dir: ".".to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            failure_policy: FailurePolicy::FailFast,
            delimiter: ',',
            has_header: true,
            converter_command: None,
            converter_args: vec![],
            files: vec![],
        }
    }
}

impl HalfwayConfig {
    /// Function to create and initialize a new configuration
    ///
    /// Sources, lowest priority first: the user file
    /// (`<config dir>/halfway/halfway.toml`), `./halfway.toml`, the file given
    /// by `path` (which must exist), then `HALFWAY_*` environment variables.
    pub fn new(path: &Option<String>) -> Result<HalfwayConfig> {
        let mut builder = Config::builder();
        let mut files = vec![];

        let mut candidates: Vec<PathBuf> = vec![];
        if let Some(user) = Self::user_config_path() {
            candidates.push(user);
        }
        candidates.push(PathBuf::from(LOCAL_CONFIG_FILE));

        for candidate in candidates {
            if candidate.is_file() {
                builder = builder.add_source(config::File::from(candidate.as_path()));
                files.push(candidate.display().to_string());
            }
        }

        if let Some(p) = path {
            let explicit = Path::new(p.as_str());
            if !explicit.is_file() {
                return Err(anyhow!("Configuration file {} does not exist", p));
            }
            builder = builder.add_source(config::File::from(explicit));
            files.push(p.clone());
        }

        // E.g., `HALFWAY_OUTPUT_PATH=out.db halfway` would set the output database
        builder = builder.add_source(config::Environment::with_prefix("HALFWAY"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let values = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let mut config = Self::from_values(&values)?;
        config.files = files;
        Ok(config)
    }

    /// Build a configuration from flat key/value settings
    pub fn from_values(values: &HashMap<String, String>) -> Result<HalfwayConfig> {
        let defaults = HalfwayConfig::default();

        let non_empty = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        let failure_policy = match (values.get("failure_policy"), values.get("keep_going")) {
            (Some(policy), _) => FailurePolicy::from_str(policy).map_err(|e| anyhow!(e))?,
            (None, Some(keep_going)) => match parse_bool(keep_going) {
                Some(true) => FailurePolicy::KeepGoing,
                Some(false) => FailurePolicy::FailFast,
                None => return Err(anyhow!("Invalid keep_going value '{}'", keep_going)),
            },
            (None, None) => defaults.failure_policy,
        };

        let delimiter = match values.get("delimiter") {
            Some(d) => parse_delimiter(d)?,
            None => defaults.delimiter,
        };

        let has_header = match values.get("has_header") {
            Some(h) => parse_bool(h).ok_or_else(|| anyhow!("Invalid has_header value '{}'", h))?,
            None => defaults.has_header,
        };

        let converter_args = values
            .get("converter_args")
            .map(|a| a.split_whitespace().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        Ok(HalfwayConfig {
            input_dir: non_empty("input_dir").unwrap_or(defaults.input_dir),
            output_path: non_empty("output_path").unwrap_or(defaults.output_path),
            pattern: non_empty("pattern").unwrap_or(defaults.pattern),
            failure_policy,
            delimiter,
            has_header,
            converter_command: non_empty("converter_command"),
            converter_args,
            files: vec![],
        })
    }

    /// Path of the per-user configuration file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("halfway").join(LOCAL_CONFIG_FILE))
    }

    /// Write a commented template to `path`, refusing to overwrite
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(anyhow!("{} already exists", path.display()));
        }
        std::fs::write(path, EMPTY_CONFIG)
            .map_err(|e| anyhow!("Unable to create config file {}: {}", path.display(), e))
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Input Directory:    {}", self.input_dir),
            format!("Output Database:    {}", self.output_path),
            format!("File Pattern:       {}", self.pattern),
            format!("Failure Policy:     {}", self.failure_policy),
            format!("Delimiter:          {:?}", self.delimiter),
            format!("Header Row:         {}", self.has_header),
        ];

        match &self.converter_command {
            Some(cmd) if self.converter_args.is_empty() => {
                lines.push(format!("Converter:          {}", cmd))
            }
            Some(cmd) => lines.push(format!(
                "Converter:          {} {}",
                cmd,
                self.converter_args.join(" ")
            )),
            None => lines.push("Converter:          built-in".to_string()),
        }

        if self.files.is_empty() {
            lines.push("Config Files:       (none)".to_string());
        } else {
            lines.push(format!("Config Files:       {}", self.files.join(", ")));
        }

        lines.join("\n")
    }
}

/// Parse a single-character ASCII delimiter; `\t` and `tab` mean tab
pub fn parse_delimiter(s: &str) -> Result<char> {
    let c = match s {
        "\\t" | "tab" => '\t',
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(anyhow!("Delimiter must be a single character, got '{}'", s)),
            }
        }
    };
    if !c.is_ascii() {
        return Err(anyhow!("Delimiter must be an ASCII character, got '{}'", c));
    }
    Ok(c)
}
