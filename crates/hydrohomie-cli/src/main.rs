//! CLI entry point for HydroHomie.
//!
//! This binary provides the `hydrohomie` command: `run` starts the
//! interactive tracker, `status` summarizes what the profile holds.

mod cli;
mod config;
mod helpers;
mod repl;
mod status;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::helpers::{init_tracing, open_store};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    init_tracing(&config.logging.level);
    info!(path = %cli.config.display(), "configuration loaded");

    let store = open_store(&cli, &config)?;

    match cli.command {
        Commands::Run => repl::cmd_run(store, &config).await,
        Commands::Status => status::cmd_status(store, &config),
    }
}
