//! Layout of the profile database.
//!
//! A profile holds a single table, `kv_entries`. Its layout version lives in
//! SQLite's `user_version` header field: 0 means a file nobody has set up
//! yet, which is initialized in one transaction. Any other version must be
//! [`PROFILE_VERSION`] and the table must carry the expected columns, or the
//! profile is refused before anything is written to it.

use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Layout version written to new profiles.
pub const PROFILE_VERSION: i32 = 1;

const ENTRY_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

const CREATE_ENTRIES: &str = "
    CREATE TABLE IF NOT EXISTS kv_entries (
        key        TEXT PRIMARY KEY,
        value      TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );";

/// The layout version recorded in the profile header.
pub fn version(conn: &Connection) -> StoreResult<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Initialize a new profile, or check that an existing one is readable.
pub fn prepare(conn: &mut Connection) -> StoreResult<()> {
    match version(conn)? {
        0 => {
            initialize(conn)?;
            verify(conn)
        }
        PROFILE_VERSION => verify(conn),
        found => Err(StoreError::UnsupportedProfile {
            found,
            supported: PROFILE_VERSION,
        }),
    }
}

fn initialize(conn: &mut Connection) -> StoreResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(CREATE_ENTRIES)?;
    tx.pragma_update(None, "user_version", PROFILE_VERSION)?;
    tx.commit()?;
    info!(version = PROFILE_VERSION, "profile initialized");
    Ok(())
}

fn verify(conn: &Connection) -> StoreResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('kv_entries')")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if present.is_empty() {
        return Err(StoreError::MalformedProfile(
            "table kv_entries is missing".into(),
        ));
    }
    if let Some(missing) = ENTRY_COLUMNS
        .iter()
        .find(|column| !present.iter().any(|p| p == *column))
    {
        return Err(StoreError::MalformedProfile(format!(
            "column kv_entries.{missing} is missing"
        )));
    }

    debug!(version = PROFILE_VERSION, "profile layout verified");
    Ok(())
}
