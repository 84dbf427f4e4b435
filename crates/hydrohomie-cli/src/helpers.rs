//! Shared helper functions used across CLI subcommands.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hydrohomie_store::{MemoryStore, SharedStore, SqliteStore};

use crate::cli::Cli;
use crate::config::AppConfig;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
/// Logs go to stderr so they never interleave with REPL output.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Open the profile selected by the command line, or the configured one.
pub fn open_store(cli: &Cli, config: &AppConfig) -> Result<SharedStore> {
    if cli.memory {
        info!("using in-memory profile");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = cli.profile.as_ref().unwrap_or(&config.storage.path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let store = SqliteStore::open(path)
        .with_context(|| format!("failed to open profile {}", path.display()))?;
    info!(path = %path.display(), "profile opened");
    Ok(Arc::new(store))
}

/// A fixed-width text progress bar for `percent` in `[0, 100]`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
