//! Integration tests for the hydrohomie-store crate.
//!
//! These exercise the SQLite profile on disk (via tempfile) through the
//! same trait object the account and tracker crates use.

use std::sync::Arc;

use hydrohomie_store::schema::{self, PROFILE_VERSION};
use hydrohomie_store::{
    KeyValueStore, MemoryStore, SharedStore, SqliteStore, StoreError, keys, load_json_or_default,
    save_json,
};

// ═══════════════════════════════════════════════════════════════════════
//  Profile lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn profile_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.set(keys::IS_AUTHENTICATED, "true").unwrap();
        save_json(&store, keys::ALL_HYDRATION_DATA, &vec![1, 2, 3]).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(
        store.get(keys::IS_AUTHENTICATED).unwrap().as_deref(),
        Some("true")
    );
    let data: Vec<u32> = load_json_or_default(&store, keys::ALL_HYDRATION_DATA).unwrap();
    assert_eq!(data, vec![1, 2, 3]);
    assert!(path.exists());
}

#[test]
fn reopening_keeps_the_layout_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.db");

    SqliteStore::open(&path).unwrap().set("k", "v").unwrap();
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

    let conn = rusqlite::Connection::open(&path).unwrap();
    assert_eq!(schema::version(&conn).unwrap(), PROFILE_VERSION);
}

#[test]
fn profile_from_a_newer_layout_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", PROFILE_VERSION + 1)
            .unwrap();
    }

    let err = SqliteStore::open(&path).err().unwrap();
    assert!(matches!(err, StoreError::UnsupportedProfile { .. }), "{err}");
}

// ═══════════════════════════════════════════════════════════════════════
//  Corruption recovery through the shared handle
// ═══════════════════════════════════════════════════════════════════════

fn backends() -> Vec<SharedStore> {
    vec![
        Arc::new(MemoryStore::new()),
        Arc::new(SqliteStore::open_in_memory().unwrap()),
    ]
}

#[test]
fn corrupt_entry_falls_back_and_is_cleared_on_every_backend() {
    for store in backends() {
        store.set(keys::DEMO_USERS, "{\"alice\": ").unwrap();

        let users: std::collections::BTreeMap<String, serde_json::Value> =
            load_json_or_default(store.as_ref(), keys::DEMO_USERS).unwrap();
        assert!(users.is_empty());
        assert!(store.get(keys::DEMO_USERS).unwrap().is_none());
    }
}

#[test]
fn keys_reflect_writes_and_removals() {
    for store in backends() {
        store.set(keys::CURRENT_USER, "null").unwrap();
        store.set(keys::ENCOURAGEMENT_CACHE, "{}").unwrap();
        store.remove(keys::CURRENT_USER).unwrap();

        assert_eq!(store.keys().unwrap(), vec![keys::ENCOURAGEMENT_CACHE]);
    }
}
