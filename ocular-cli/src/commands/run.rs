//! Run the plugin host with stdin as the operator console

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use ocular_api::{HostProxy, event::CONSOLE_INPUT};
use ocular_core::{PluginCatalog, PluginHost};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ConfigLoader;

/// Host run arguments
#[derive(Args)]
pub struct RunArgs {
    /// Extra config file layered on top of user and project config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Additional plugins to load at startup
    #[arg(long = "autoload", value_name = "ID")]
    pub autoload: Vec<String>,
}

/// Run the host until stdin closes or Ctrl-C
pub async fn run(args: RunArgs) -> Result<()> {
    let mut config = ConfigLoader::load(args.config.as_deref())?;
    for id in args.autoload {
        if !config.plugins.autoload.contains(&id) {
            config.plugins.autoload.push(id);
        }
    }

    let host = PluginHost::new(config.runtime.host_config(), PluginCatalog::with_builtins());
    host.seed_data(config.data.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let loaded = host.load_all(&config.plugins.autoload);
    info!(
        plugins = loaded.len(),
        tick_ms = config.runtime.tick_ms,
        "Host started, type 'help' for console commands"
    );

    let token = CancellationToken::new();
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down");
            ctrl_c.cancel();
        }
    });

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let result = drive(&host, lines, token, config.runtime.tick_interval()).await;

    host.shutdown();
    info!("Host stopped");
    result
}

/// Main loop: tick on an interval and forward console lines until EOF or
/// cancellation
pub async fn drive<R>(
    host: &Arc<PluginHost>,
    mut lines: Lines<R>,
    token: CancellationToken,
    tick_interval: Duration,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => host.tick(),
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !line.trim().is_empty() {
                            host.send_event(CONSOLE_INPUT, &line);
                        }
                    }
                    None => {
                        debug!("Console input closed");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
