//! Error types for the hydration tracker.
//!
//! Field validation problems are state, not errors; they live on the
//! tracker and are read back through `active_errors()`. [`TrackerError`]
//! covers refused transitions and persistence failures.

use hydrohomie_store::StoreError;

/// Alias for `Result<T, TrackerError>`.
pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Reading or writing the profile failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Save was requested while nobody is signed in.
    #[error("cannot save hydration data: not authenticated")]
    NotAuthenticated,

    /// The session changed but the tracker still holds the previous
    /// identity's state.
    #[error("loaded state belongs to `{loaded}` but `{active}` is signed in")]
    IdentityMismatch { loaded: String, active: String },

    /// A drink was requested while the guard forbids it.
    #[error("drink refused: {0}")]
    DrinkBlocked(DrinkBlocked),
}

/// Why a drink transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DrinkBlocked {
    #[error("no daily goal set")]
    GoalUnset,

    #[error("no drink amount set")]
    AmountUnset,

    #[error("an input is invalid")]
    InvalidInput,

    #[error("daily goal already reached")]
    GoalReached,
}
