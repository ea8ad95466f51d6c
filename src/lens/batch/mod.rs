//! Batch lens
//!
//! Loads every CSV file of a directory into a freshly created SQLite
//! database, one table per file.
//!
//! A batch runs in two stages:
//!
//! 1. **Resetting**: the output database (and any SQLite sidecar file) is
//!    deleted and an empty database is created in its place.
//! 2. **Loading**: matching files are discovered, sorted by name, paired with
//!    their table names (file name minus the final extension) and handed to
//!    the converter one at a time.
//!
//! Under [`FailurePolicy::FailFast`] the first conversion error ends the
//! batch; tables loaded before it stay in the database. Under
//! [`FailurePolicy::KeepGoing`] the error is recorded in the report and the
//! next file is loaded.
//!
//! # Example
//!
//! ```rust,ignore
//! use halfway::lens::batch::{BatchLens, LoaderSettings};
//!
//! let lens = BatchLens::new(LoaderSettings::for_dir(".", "halfway.db"));
//! let report = lens.run()?;
//! println!("loaded {} tables", report.loaded_count());
//! ```

pub mod args;
pub mod discover;
pub mod error;
pub mod types;

pub use args::{BatchLoadArgs, ConverterChoice, LoaderSettings};
pub use discover::{discover_csv_files, plan_sources, table_name_for};
pub use error::LoadError;
pub use types::{
    BatchProgress, BatchProgressCallback, CsvSource, FailurePolicy, LoadPlan, LoadReport,
    LoadStatus, TableLoad,
};

use chrono::Utc;
use tracing::{info, warn};

use crate::convert::{CommandConverter, ConversionRequest, Converter, CsvConverter};
use crate::database::OutputDatabase;

/// Batch lens: the CSV directory to SQLite database loader
pub struct BatchLens {
    settings: LoaderSettings,
    converter: Box<dyn Converter>,
}

impl BatchLens {
    /// Create a lens using the converter named in `settings`
    pub fn new(settings: LoaderSettings) -> Self {
        let converter: Box<dyn Converter> = match &settings.converter {
            ConverterChoice::Builtin => Box::new(CsvConverter::new(settings.csv)),
            ConverterChoice::Command { program, args } => {
                Box::new(CommandConverter::new(program, args.clone()))
            }
        };
        Self::with_converter(settings, converter)
    }

    /// Create a lens with an explicit converter
    pub fn with_converter(settings: LoaderSettings, converter: Box<dyn Converter>) -> Self {
        Self {
            settings,
            converter,
        }
    }

    /// Discover input files and derive table names without touching the output
    pub fn plan(&self) -> Result<LoadPlan, LoadError> {
        let files = discover_csv_files(
            &self.settings.input_dir,
            &self.settings.pattern,
            Some(&self.settings.output_path),
        )?;
        plan_sources(files)
    }

    /// Run the batch
    pub fn run(&self) -> Result<LoadReport, LoadError> {
        self.run_with_progress(None)
    }

    /// Run the batch, reporting progress through `callback`
    pub fn run_with_progress(
        &self,
        callback: Option<BatchProgressCallback>,
    ) -> Result<LoadReport, LoadError> {
        let notify = |progress: BatchProgress| {
            if let Some(ref cb) = callback {
                cb(progress);
            }
        };

        let started_at = Utc::now();
        let output = &self.settings.output_path;

        // Resetting
        notify(BatchProgress::Resetting {
            output: output.display().to_string(),
        });
        self.reset_output()?;

        // Loading
        let plan = self.plan()?;
        let total = plan.len();
        notify(BatchProgress::Discovered { total });

        if plan.is_empty() {
            warn!(
                "no files matching '{}' in {}, output database is empty",
                self.settings.pattern,
                self.settings.input_dir.display()
            );
        } else {
            info!(
                "loading {} file(s) into {} with the {} converter",
                total,
                output.display(),
                self.converter.name()
            );
        }

        let mut tables = Vec::with_capacity(total);
        for (idx, source) in plan.sources.iter().enumerate() {
            let index = idx + 1;
            notify(BatchProgress::Loading {
                index,
                total,
                file: source.path.display().to_string(),
                table: source.table.clone(),
            });

            let request = ConversionRequest {
                csv_path: source.path.clone(),
                db_path: output.clone(),
                table: source.table.clone(),
            };

            match self.converter.convert(&request) {
                Ok(outcome) => {
                    match outcome.rows {
                        Some(rows) => info!(
                            "loaded {} into '{}' ({} rows)",
                            source.path.display(),
                            source.table,
                            rows
                        ),
                        None => info!("loaded {} into '{}'", source.path.display(), source.table),
                    }
                    notify(BatchProgress::Loaded {
                        index,
                        total,
                        table: source.table.clone(),
                        rows: outcome.rows,
                    });
                    tables.push(TableLoad::loaded(source, outcome.rows));
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    tracing::error!(
                        "failed to load {} into '{}': {}",
                        source.path.display(),
                        source.table,
                        message
                    );
                    notify(BatchProgress::Failed {
                        index,
                        total,
                        table: source.table.clone(),
                        error: message.clone(),
                    });

                    match self.settings.policy {
                        FailurePolicy::FailFast => {
                            return Err(LoadError::Conversion {
                                path: source.path.clone(),
                                table: source.table.clone(),
                                message,
                            });
                        }
                        FailurePolicy::KeepGoing => {
                            tables.push(TableLoad::failed(source, &message));
                        }
                    }
                }
            }
        }

        let report = LoadReport {
            output: output.display().to_string(),
            converter: self.converter.name().to_string(),
            policy: self.settings.policy,
            started_at,
            finished_at: Utc::now(),
            tables,
        };

        notify(BatchProgress::Complete {
            loaded: report.loaded_count(),
            failed: report.failed().len(),
        });

        Ok(report)
    }

    /// Delete the output database and create an empty one in its place
    fn reset_output(&self) -> Result<(), LoadError> {
        let output = &self.settings.output_path;
        OutputDatabase::reset(output).map_err(|source| LoadError::Reset {
            path: output.clone(),
            source,
        })?;

        OutputDatabase::open(output).map_err(|e| LoadError::Reset {
            path: output.clone(),
            source: std::io::Error::other(e.to_string()),
        })?;
        Ok(())
    }
}
