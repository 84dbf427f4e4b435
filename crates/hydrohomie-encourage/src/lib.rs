//! # hydrohomie-encourage
//!
//! A short motivational line fetched from a remote service, cached in the
//! profile for a fixed time so repeated views do not hit the network.
//!
//! - **[`source`]** -- the [`EncouragementSource`] seam and its reqwest
//!   implementation.
//! - **[`cache`]** -- [`EncouragementCache`]: `fetch`, `refetch`, `cached`.
//! - **[`error`]** -- [`EncouragementError`].

pub mod cache;
pub mod error;
pub mod source;

pub use cache::{CacheEntry, CacheStats, DEFAULT_TTL, EncouragementCache, stored_entry};
pub use error::{EncouragementError, EncouragementResult};
pub use source::{
    DEFAULT_BASE_URL, EncouragementSource, HttpEncouragementSource, SourceConfig, endpoint_url,
};
