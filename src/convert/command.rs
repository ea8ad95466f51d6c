//! External command converter
//!
//! Delegates each file to another program, invoked as
//! `program [args...] <csv_path> <db_path> <table>`.

use anyhow::{anyhow, Result};
use std::process::Command;
use tracing::debug;

use super::{ConversionOutcome, ConversionRequest, Converter};

/// Runs an external program once per CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }

    fn command(&self, request: &ConversionRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&request.csv_path)
            .arg(&request.db_path)
            .arg(&request.table);
        command
    }
}

impl Converter for CommandConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert(&self, request: &ConversionRequest) -> Result<ConversionOutcome> {
        debug!(
            "running {} for {} -> {}",
            self.program,
            request.csv_path.display(),
            request.table
        );

        let output = self
            .command(request)
            .output()
            .map_err(|e| anyhow!("Failed to run converter '{}': {}", self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(if stderr.is_empty() {
                anyhow!("Converter '{}' exited with {}", self.program, output.status)
            } else {
                anyhow!(
                    "Converter '{}' exited with {}: {}",
                    self.program,
                    output.status,
                    stderr
                )
            });
        }

        Ok(ConversionOutcome { rows: None })
    }
}
