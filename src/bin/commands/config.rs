use anyhow::Result;
use clap::Args;
use halfway::config::LOCAL_CONFIG_FILE;
use halfway::lens::utils::OutputFormat;
use halfway::HalfwayConfig;
use std::path::Path;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write a commented ./halfway.toml template (never overwrites)
    #[clap(long)]
    pub init: bool,
}

pub fn run(config: &HalfwayConfig, args: ConfigArgs, output_format: OutputFormat) -> Result<()> {
    if args.init {
        let path = Path::new(LOCAL_CONFIG_FILE);
        HalfwayConfig::write_template(path)?;
        println!("Created {}", path.display());
        return Ok(());
    }

    if output_format.is_json() {
        println!("{}", output_format.to_json(config)?);
    } else {
        println!("{}", config.summary());
        if let Some(user) = HalfwayConfig::user_config_path() {
            println!("User Config Path:   {}", user.display());
        }
    }
    Ok(())
}
