//! Subcommand: `hydrohomie status`.
//!
//! Prints what the profile holds without starting the tracker: session,
//! registered accounts, the signed-in user's saved record, the cached
//! encouragement, and the raw keys.

use std::io::Write;

use anyhow::{Context, Result};

use hydrohomie_account::AccountRegistry;
use hydrohomie_encourage::stored_entry;
use hydrohomie_store::SharedStore;
use hydrohomie_tracker::{find_record, format_ml};

use crate::config::AppConfig;

pub fn cmd_status(store: SharedStore, config: &AppConfig) -> Result<()> {
    write_status(&store, config, &mut std::io::stdout())
}

pub fn write_status(store: &SharedStore, config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let registry = AccountRegistry::load(store.clone(), config.registry_config())
        .context("failed to load accounts")?;

    writeln!(out)?;
    writeln!(out, "  HydroHomie Status:")?;
    writeln!(out, "    Registered users: {}", registry.user_count())?;
    match registry.current_user() {
        Some(user) => {
            writeln!(
                out,
                "    Session:          {} (registered {})",
                user.username,
                user.created_at.format("%Y-%m-%d")
            )?;
            let record = find_record(store.as_ref(), &user.username, &config.tracker_config())
                .context("failed to read hydration data")?;
            match record {
                Some(r) => writeln!(
                    out,
                    "    Saved progress:   {} / {} ml, {} sips (drink amount {} ml)",
                    format_ml(r.current_water_ml),
                    format_ml(r.daily_goal_ml),
                    r.sips_taken,
                    format_ml(r.drink_amount_ml)
                )?,
                None => writeln!(out, "    Saved progress:   none")?,
            }
        }
        None => writeln!(out, "    Session:          signed out")?,
    }

    let entry = stored_entry(store.as_ref()).context("failed to read encouragement cache")?;
    match entry {
        Some(entry) => {
            let state = if entry.is_fresh(config.cache_ttl()) {
                "fresh"
            } else {
                "expired"
            };
            writeln!(out, "    Encouragement:    {state}, \"{}\"", entry.data)?;
        }
        None => writeln!(out, "    Encouragement:    not cached")?,
    }

    let mut stored = store.keys().context("failed to list profile keys")?;
    stored.sort();
    writeln!(out, "    Stored keys:      {}", stored.join(", "))?;
    writeln!(out)?;
    Ok(())
}
