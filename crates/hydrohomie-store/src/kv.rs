//! The [`KeyValueStore`] contract and JSON helpers layered on top of it.
//!
//! The store is a flat string map. Structured values are JSON-encoded by
//! the caller; [`load_json_or_default`] centralises the recovery rule for
//! malformed entries so every caller degrades the same way.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::StoreResult;

/// Synchronous get/set/remove over a persistent string map.
///
/// Implementations must return `Ok(None)` for a missing key and treat
/// `remove` of a missing key as a no-op. Errors are reserved for backend
/// failures.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key` if present.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Shared, type-erased store handle passed between components.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Load a JSON value from `key`, falling back to `T::default()`.
///
/// A missing key yields the default. A value that fails to parse is logged,
/// removed from the store, and also yields the default. Only backend
/// failures are returned as errors.
pub fn load_json_or_default<T>(store: &dyn KeyValueStore, key: &str) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key)? else {
        debug!(key, "no stored value, using default");
        return Ok(T::default());
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(key, %err, "stored value is corrupt, discarding");
            store.remove(key)?;
            Ok(T::default())
        }
    }
}

/// Serialize `value` as JSON and write it under `key`.
pub fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    debug!(key, bytes = raw.len(), "stored value updated");
    Ok(())
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn missing_key_yields_default() {
        let store = MemoryStore::new();
        let value: Vec<u32> = load_json_or_default(&store, "absent").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let mut map = BTreeMap::new();
        map.insert("alice".to_string(), 3u32);

        save_json(&store, "counts", &map).unwrap();
        let loaded: BTreeMap<String, u32> = load_json_or_default(&store, "counts").unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn corrupt_value_is_discarded() {
        let store = MemoryStore::new();
        store.set("counts", "{not json").unwrap();

        let loaded: BTreeMap<String, u32> = load_json_or_default(&store, "counts").unwrap();
        assert!(loaded.is_empty());
        assert!(store.get("counts").unwrap().is_none());
    }

    #[test]
    fn wrong_shape_is_treated_as_corrupt() {
        let store = MemoryStore::new();
        store.set("list", r#"{"a": 1}"#).unwrap();

        let loaded: Vec<u32> = load_json_or_default(&store, "list").unwrap();
        assert!(loaded.is_empty());
        assert!(store.get("list").unwrap().is_none());
    }

    #[test]
    fn json_null_loads_as_none() {
        let store = MemoryStore::new();
        store.set("maybe", "null").unwrap();

        let loaded: Option<String> = load_json_or_default(&store, "maybe").unwrap();
        assert!(loaded.is_none());
        // A valid `null` is not corruption and stays in place.
        assert_eq!(store.get("maybe").unwrap().as_deref(), Some("null"));
    }
}
