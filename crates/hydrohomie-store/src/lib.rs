//! # hydrohomie-store
//!
//! Persistence substrate for HydroHomie.
//!
//! Every piece of durable state (the user registry, the signed-in session,
//! the per-user hydration records and the encouragement cache) lives in one
//! flat string-to-string map, addressed by the constants in [`keys`]. The
//! map is reached through the synchronous [`KeyValueStore`] trait so the
//! callers never know which profile backend they are talking to.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  load_json_or_default / save_json       │
//! │  (corrupt entries are logged + dropped) │
//! ├─────────────────────────────────────────┤
//! │  KeyValueStore (get / set / remove)     │
//! ├────────────────────┬────────────────────┤
//! │  MemoryStore       │  SqliteStore       │
//! │  (HashMap)         │  (kv_entries)      │
//! │                    │  WAL connection    │
//! │                    │  schema check      │
//! └────────────────────┴────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use hydrohomie_store::{keys, load_json_or_default, SqliteStore};
//!
//! let store = SqliteStore::open("data/hydrohomie.db")?;
//! let users: BTreeMap<String, User> = load_json_or_default(&store, keys::DEMO_USERS)?;
//! ```

pub mod error;
pub mod keys;
pub mod kv;
pub mod memory;
pub mod schema;
pub mod sqlite;

// ── re-exports ───────────────────────────────────────────────────────

pub use error::{StoreError, StoreResult};
pub use kv::{KeyValueStore, SharedStore, load_json_or_default, save_json};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
