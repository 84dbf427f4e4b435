//! SQLite-backed [`KeyValueStore`].
//!
//! One row per key in `kv_entries`. This is the durable profile: accounts,
//! the session, hydration records and the cached encouragement all live in
//! this one file.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, info, instrument};

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;
use crate::schema;

/// How long a second process on the same profile waits for the write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent key-value store over one SQLite connection. Clones share the
/// connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a profile file and check its layout.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening profile");
        Self::from_connection(Connection::open(path)?)
    }

    /// A fresh profile that lives only as long as the handle.
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("opening in-memory profile");
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> StoreResult<Self> {
        // WAL keeps `status` readable while a REPL holds the profile open.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::prepare(&mut conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(format!("profile connection: {e}")))?;
        f(&conn)
    }
}

impl KeyValueStore for SqliteStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    #[instrument(skip(self, value))]
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let now = Utc::now().timestamp();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value, now],
            )?;
            debug!(key, "profile entry written");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM kv_entries WHERE key = ?1",
                rusqlite::params![key],
            )?;
            if deleted > 0 {
                debug!(key, "profile entry removed");
            }
            Ok(())
        })
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv_entries ORDER BY key ASC")?;
            let keys = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(keys)
        })
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let store = setup_store();
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn set_and_get() {
        let store = setup_store();
        store.set("isAuthenticated", "true").unwrap();
        assert_eq!(
            store.get("isAuthenticated").unwrap(),
            Some("true".to_string())
        );
    }

    #[test]
    fn set_overwrites() {
        let store = setup_store();
        store.set("key1", "old").unwrap();
        store.set("key1", "new").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some("new".to_string()));
        assert_eq!(store.keys().unwrap().len(), 1);
    }

    #[test]
    fn remove_existing_and_missing() {
        let store = setup_store();
        store.set("key1", "val").unwrap();
        store.remove("key1").unwrap();
        assert!(store.get("key1").unwrap().is_none());

        // Removing again is a no-op.
        store.remove("key1").unwrap();
    }

    #[test]
    fn keys_are_listed_in_order() {
        let store = setup_store();
        store.set("demoUsers", "{}").unwrap();
        store.set("currentUser", "null").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["currentUser", "demoUsers"]);
    }

    #[test]
    fn clones_share_the_same_profile() {
        let store = setup_store();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }
}
