//! Encouragement error types.

use hydrohomie_store::StoreError;

/// Alias for `Result<T, EncouragementError>`.
pub type EncouragementResult<T> = Result<T, EncouragementError>;

#[derive(Debug, thiserror::Error)]
pub enum EncouragementError {
    /// The request could not be sent, or the service answered with a
    /// non-success status. `status` is `None` for transport failures.
    #[error("encouragement service error: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// The service answered 2xx but without usable text.
    #[error("malformed encouragement response: {0}")]
    MalformedResponse(String),

    /// The configured base URL cannot be turned into an endpoint.
    #[error("invalid encouragement url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Reading or writing the cache entry failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EncouragementError {
    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        Self::Remote {
            status: None,
            message: err.to_string(),
        }
    }
}
