use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "ocular", about = "Plugin host with an operator console")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Inspect the plugin catalog
    Plugin(commands::plugin::PluginArgs),
    /// Run the host and read console commands from stdin
    Run(commands::run::RunArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Plugin(args) => commands::plugin::run(args),
        Commands::Run(args) => commands::run::run(args).await,
    }
}
