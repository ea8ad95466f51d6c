mod commands;

use clap::{Parser, Subcommand};
use halfway::lens::batch::BatchLoadArgs;
use halfway::lens::utils::OutputFormat;
use halfway::HalfwayConfig;
use tracing::Level;

use commands::config::ConfigArgs;
use commands::tables::TablesArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, ./halfway.toml is read when present
    #[clap(short, long, global = true)]
    config: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every CSV file of a directory into a fresh database (default)
    Load(BatchLoadArgs),

    /// List the tables of the output database with their row counts
    Tables(TablesArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match HalfwayConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    let output_format = cli.format.unwrap_or_default();

    let result = match cli
        .command
        .unwrap_or_else(|| Commands::Load(BatchLoadArgs::default()))
    {
        Commands::Load(args) => commands::load::run(&config, args, output_format),
        Commands::Tables(args) => commands::tables::run(&config, args, output_format),
        Commands::Config(args) => commands::config::run(&config, args, output_format),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}
