//! # hydrohomie-tracker
//!
//! The hydration state machine: how much water the active identity has had
//! today, against which goal, in which increments.
//!
//! - **[`tracker`]** -- [`HydrationTracker`], the stateful machine. Loads
//!   the record for the identity in the injected session, applies drink /
//!   edit / reset transitions, saves on request.
//! - **[`validation`]** -- the pure validators shared by the keystroke and
//!   focus-loss passes.
//! - **[`record`]** -- the persisted per-user record and the multi-user
//!   collection it lives in.
//! - **[`config`]** -- defaults and policy switches.
//! - **[`error`]** -- [`TrackerError`].

pub mod config;
pub mod error;
pub mod record;
pub mod tracker;
pub mod validation;

pub use config::{InvalidInputPolicy, SavePolicy, TrackerConfig};
pub use error::{DrinkBlocked, TrackerError, TrackerResult};
pub use record::{HydrationRecord, find_record, stored_records};
pub use tracker::{HydrationTracker, HydrationView, fill_percentage, format_ml};
pub use validation::{
    Field, FieldError, ValidationError, ValidationPass, cross_field_error, validate_field,
};
