//! CLI argument definitions for HydroHomie.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// HydroHomie -- daily water intake tracker.
#[derive(Parser)]
#[command(
    name = "hydrohomie",
    version,
    about = "HydroHomie -- daily water intake tracker",
    long_about = "Track how much water you drink against a daily goal, with simple \
                  per-user accounts and a cached encouragement message."
)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// SQLite profile to use instead of the configured storage path.
    #[arg(long, global = true, conflicts_with = "memory")]
    pub profile: Option<PathBuf>,

    /// Use a throwaway in-memory profile.
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive tracker.
    Run,

    /// Show the persisted session and profile contents.
    Status,
}
