use anyhow::Result;
use clap::Args;
use halfway::lens::utils::OutputFormat;
use halfway::{HalfwayConfig, OutputDatabase};
use std::path::PathBuf;
use tabled::settings::Style;
use tabled::Table;

/// Arguments for the Tables command
#[derive(Args)]
pub struct TablesArgs {
    /// Database to inspect [default: the configured output database]
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(config: &HalfwayConfig, args: TablesArgs, output_format: OutputFormat) -> Result<()> {
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output_path));
    let db = OutputDatabase::open_existing(&path)?;
    let summary = db.summary()?;

    match output_format {
        OutputFormat::Table => {
            if summary.is_empty() {
                println!("{} has no tables", path.display());
            } else {
                println!("{}", Table::new(&summary).with(Style::rounded()));
            }
        }
        OutputFormat::Markdown => {
            println!("{}", Table::new(&summary).with(Style::markdown()));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            println!("{}", output_format.to_json(&summary)?);
        }
        OutputFormat::JsonLine => {
            for t in &summary {
                println!("{}", output_format.to_json(t)?);
            }
        }
        OutputFormat::Psv => {
            println!("name|rows|columns");
            for t in &summary {
                println!("{}|{}|{}", t.name, t.rows, t.columns);
            }
        }
    }
    Ok(())
}
