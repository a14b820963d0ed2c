use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::init_logging;
use crate::config::load_config;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug, cli.log_format)?;

    info!("Starting soulbrowser-actor v{}", env!("CARGO_PKG_VERSION"));

    let loaded = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let cli_context = CliContext::new(loaded.config, loaded.path);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}
