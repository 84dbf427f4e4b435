//! Error types for the account registry.
//!
//! Rejected credentials are not errors; they come back inside an
//! [`AuthOutcome`](crate::AuthOutcome). [`AccountError`] covers the cases
//! where the registry itself could not do its job.

use hydrohomie_store::StoreError;

/// Alias for `Result<T, AccountError>`.
pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Reading or writing the profile failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The system random source refused to produce a login string.
    #[error("failed to generate login string")]
    TokenGeneration,
}
