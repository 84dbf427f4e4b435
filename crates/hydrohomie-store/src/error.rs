//! Error types for the hydrohomie-store crate.
//!
//! All storage operations return [`StoreError`] via [`StoreResult`].
//! A missing key is never an error; only backend failures are.

use thiserror::Error;

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization failed while writing a value.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The profile was written with a layout this build does not read.
    #[error("profile layout v{found} is not supported (expected v{supported})")]
    UnsupportedProfile { found: i32, supported: i32 },

    /// The profile file does not have the expected table layout.
    #[error("malformed profile: {0}")]
    MalformedProfile(String),

    /// A shared handle's lock was poisoned by a panicking holder.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}
