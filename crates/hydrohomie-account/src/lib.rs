//! # hydrohomie-account
//!
//! A local stand-in for an account backend. Users register with a username
//! and receive a one-time login string; logging in compares that string for
//! equality. Nothing here is real authentication.
//!
//! - **[`registry`]** -- [`AccountRegistry`]: register / login / logout with
//!   write-through persistence of the user map and the session.
//! - **[`session`]** -- [`AccountSession`] and the [`SharedSession`] handle
//!   injected into the hydration tracker.
//! - **[`user`]** -- the [`User`] record and login-string generation.
//! - **[`error`]** -- [`AccountError`] for backend failures.

pub mod error;
pub mod registry;
pub mod session;
pub mod user;

pub use error::{AccountError, AccountResult};
pub use registry::{AccountRegistry, AuthError, AuthOutcome, RegistryConfig};
pub use session::{AccountSession, Identity, SharedSession};
pub use user::User;
