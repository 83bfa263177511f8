use crate::config::ConfigLoader;
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged)
    Show {
        /// Extra config file layered on top of user and project config
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Show configuration file paths
    Path,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show { config } => show_config(config),
        ConfigCommands::Path => show_paths(),
    }
}

fn show_config(explicit: Option<PathBuf>) -> Result<()> {
    let config = ConfigLoader::load(explicit.as_deref())?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{}", toml_str);
    Ok(())
}

fn show_paths() -> Result<()> {
    println!("User config:    {:?}", ConfigLoader::user_config_path());
    println!("Project config: {:?}", ConfigLoader::project_config_path());
    Ok(())
}
