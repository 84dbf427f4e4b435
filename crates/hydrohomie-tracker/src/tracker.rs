//! The hydration state machine.
//!
//! A [`HydrationTracker`] holds the in-memory state for exactly one
//! identity: the committed [`HydrationRecord`], the raw text of the two
//! editable inputs, and the three validation slots (goal, drink amount,
//! goal-vs-amount). The identity comes from the injected [`SharedSession`];
//! call [`HydrationTracker::reload`] or [`HydrationTracker::sync_identity`]
//! after the session changes.
//!
//! ## Persistence
//!
//! With the default [`SavePolicy::OnRequest`], in-memory state is the source
//! of truth until [`HydrationTracker::save`] is called. A UI must save
//! before logging out; afterwards the session no longer names the user and
//! `save` fails with [`TrackerError::NotAuthenticated`].
//!
//! ## Drink guard
//!
//! [`HydrationTracker::drink`] enforces its own preconditions and refuses
//! with [`DrinkBlocked`] instead of trusting the caller. The same predicate
//! is exposed as [`HydrationTracker::can_drink`] for disabling controls.

use hydrohomie_account::{Identity, SharedSession};
use hydrohomie_store::SharedStore;
use tracing::{debug, error, info, instrument};

use crate::config::{InvalidInputPolicy, SavePolicy, TrackerConfig};
use crate::error::{DrinkBlocked, TrackerError, TrackerResult};
use crate::record::{self, HydrationRecord};
use crate::validation::{
    Field, FieldError, ValidationError, ValidationPass, cross_field_error, validate_field,
};

/// Percentage of `goal_ml` reached, in `[0, 100]`. A non-positive goal
/// yields 0.
pub fn fill_percentage(current_water_ml: f64, goal_ml: f64) -> f64 {
    if goal_ml > 0.0 {
        (current_water_ml / goal_ml * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Render a millilitre amount the way the inputs show it, without a
/// trailing `.0`.
pub fn format_ml(value: f64) -> String {
    format!("{value}")
}

/// Everything a UI needs to render the tracker in one value.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationView {
    pub identity: Identity,
    pub record: HydrationRecord,
    pub goal_input: String,
    pub drink_amount_input: String,
    pub errors: Vec<ValidationError>,
    pub fill_percentage: f64,
    pub can_drink: bool,
    pub inputs_locked: bool,
}

/// Per-identity hydration state with validated transitions.
pub struct HydrationTracker {
    store: SharedStore,
    session: SharedSession,
    config: TrackerConfig,
    identity: Identity,
    record: HydrationRecord,
    goal_input: String,
    drink_amount_input: String,
    goal_error: Option<FieldError>,
    drink_amount_error: Option<FieldError>,
    goal_vs_drink_error: Option<ValidationError>,
}

impl HydrationTracker {
    /// Create a tracker and load the state for the session's identity.
    pub fn new(
        store: SharedStore,
        session: SharedSession,
        config: TrackerConfig,
    ) -> TrackerResult<Self> {
        let identity = session.identity();
        let record = HydrationRecord::with_defaults(identity.username(), &config);
        let mut tracker = Self {
            store,
            session,
            goal_input: format_ml(record.daily_goal_ml),
            drink_amount_input: format_ml(record.drink_amount_ml),
            config,
            identity,
            record,
            goal_error: None,
            drink_amount_error: None,
            goal_vs_drink_error: None,
        };
        tracker.reload()?;
        Ok(tracker)
    }

    // ── identity ─────────────────────────────────────────────────────

    /// Replace in-memory state with the stored record of the session's
    /// current identity, or the defaults when there is none. The guest
    /// identity always starts from defaults. Clears every validation error.
    #[instrument(skip(self))]
    pub fn reload(&mut self) -> TrackerResult<()> {
        let identity = self.session.identity();
        let stored = match &identity {
            Identity::Guest => None,
            Identity::User(name) => record::find_record(self.store.as_ref(), name, &self.config)?,
        };
        let found = stored.is_some();
        let record = stored
            .unwrap_or_else(|| HydrationRecord::with_defaults(identity.username(), &self.config));

        info!(
            identity = %identity,
            found,
            current_water_ml = record.current_water_ml,
            daily_goal_ml = record.daily_goal_ml,
            "hydration state loaded"
        );

        self.goal_input = format_ml(record.daily_goal_ml);
        self.drink_amount_input = format_ml(record.drink_amount_ml);
        self.record = record;
        self.identity = identity;
        self.goal_error = None;
        self.drink_amount_error = None;
        self.goal_vs_drink_error = None;
        Ok(())
    }

    /// Reload only if the session's identity differs from the loaded one.
    /// Returns whether a reload happened.
    pub fn sync_identity(&mut self) -> TrackerResult<bool> {
        if self.session.identity() == self.identity {
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    // ── transitions ──────────────────────────────────────────────────

    /// Add one drink, clamped to the goal, and count a sip.
    pub fn drink(&mut self) -> TrackerResult<()> {
        if let Some(blocked) = self.drink_blocker() {
            debug!(reason = %blocked, "drink refused");
            return Err(TrackerError::DrinkBlocked(blocked));
        }

        let goal = self.record.daily_goal_ml;
        self.record.current_water_ml =
            (self.record.current_water_ml + self.record.drink_amount_ml).min(goal);
        self.record.sips_taken = self.record.sips_taken.saturating_add(1);

        debug!(
            current_water_ml = self.record.current_water_ml,
            sips_taken = self.record.sips_taken,
            "drink recorded"
        );
        self.after_mutation()
    }

    /// Keystroke in the goal input.
    pub fn edit_goal(&mut self, text: &str) -> TrackerResult<()> {
        self.goal_input = text.to_string();
        self.commit(Field::Goal, ValidationPass::Live)
    }

    /// Focus left the goal input.
    pub fn blur_goal(&mut self) -> TrackerResult<()> {
        self.commit(Field::Goal, ValidationPass::Blur)
    }

    /// Keystroke in the drink-amount input.
    pub fn edit_drink_amount(&mut self, text: &str) -> TrackerResult<()> {
        self.drink_amount_input = text.to_string();
        self.commit(Field::DrinkAmount, ValidationPass::Live)
    }

    /// Focus left the drink-amount input.
    pub fn blur_drink_amount(&mut self) -> TrackerResult<()> {
        self.commit(Field::DrinkAmount, ValidationPass::Blur)
    }

    /// Zero the progress and sip count. Goal, drink amount and their field
    /// errors are left alone; the goal-vs-amount error is cleared.
    pub fn reset_progress(&mut self) -> TrackerResult<()> {
        self.record.current_water_ml = 0.0;
        self.record.sips_taken = 0;
        self.goal_vs_drink_error = None;
        debug!(identity = %self.identity, "progress reset");
        self.after_mutation()
    }

    /// Merge the committed numbers into the stored collection.
    ///
    /// Fails without touching the profile when nobody is signed in or when
    /// the session has moved on to a different user than the one loaded.
    #[instrument(skip(self))]
    pub fn save(&self) -> TrackerResult<()> {
        let session = self.session.snapshot();
        let Some(user) = session.current_user() else {
            error!("cannot save hydration data, not authenticated");
            return Err(TrackerError::NotAuthenticated);
        };
        if self.identity != Identity::User(user.username.clone()) {
            error!(
                loaded = %self.identity,
                active = %user.username,
                "cannot save hydration data, identity changed since load"
            );
            return Err(TrackerError::IdentityMismatch {
                loaded: self.identity.to_string(),
                active: user.username.clone(),
            });
        }

        let snapshot = HydrationRecord {
            username: user.username.clone(),
            ..self.record.clone()
        };

        let result = record::load_collection(self.store.as_ref()).and_then(|mut records| {
            record::upsert(&mut records, &snapshot);
            record::save_collection(self.store.as_ref(), &records)
        });
        if let Err(err) = result {
            error!(%err, username = %snapshot.username, "failed to save hydration data");
            return Err(err.into());
        }

        info!(
            username = %snapshot.username,
            current_water_ml = snapshot.current_water_ml,
            sips_taken = snapshot.sips_taken,
            "hydration data saved"
        );
        Ok(())
    }

    // ── derived values ───────────────────────────────────────────────

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn record(&self) -> &HydrationRecord {
        &self.record
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn goal_input(&self) -> &str {
        &self.goal_input
    }

    pub fn drink_amount_input(&self) -> &str {
        &self.drink_amount_input
    }

    pub fn field_error(&self, field: Field) -> Option<FieldError> {
        match field {
            Field::Goal => self.goal_error,
            Field::DrinkAmount => self.drink_amount_error,
        }
    }

    pub fn goal_vs_drink_error(&self) -> Option<ValidationError> {
        self.goal_vs_drink_error
    }

    /// All currently active validation errors, field errors first.
    pub fn active_errors(&self) -> Vec<ValidationError> {
        let fields = [
            (Field::Goal, self.goal_error),
            (Field::DrinkAmount, self.drink_amount_error),
        ];
        fields
            .into_iter()
            .filter_map(|(field, error)| error.map(|error| ValidationError::Field { field, error }))
            .chain(self.goal_vs_drink_error)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.goal_error.is_some()
            || self.drink_amount_error.is_some()
            || self.goal_vs_drink_error.is_some()
    }

    pub fn fill_percentage(&self) -> f64 {
        fill_percentage(self.record.current_water_ml, self.record.daily_goal_ml)
    }

    /// Value for a progress bar; identical to the fill percentage.
    pub fn progress_percent(&self) -> f64 {
        self.fill_percentage()
    }

    /// The first reason a drink would be refused, if any.
    pub fn drink_blocker(&self) -> Option<DrinkBlocked> {
        let record = &self.record;
        if record.daily_goal_ml <= 0.0 {
            Some(DrinkBlocked::GoalUnset)
        } else if record.drink_amount_ml <= 0.0 {
            Some(DrinkBlocked::AmountUnset)
        } else if self.has_errors() {
            Some(DrinkBlocked::InvalidInput)
        } else if record.current_water_ml >= record.daily_goal_ml {
            Some(DrinkBlocked::GoalReached)
        } else {
            None
        }
    }

    pub fn can_drink(&self) -> bool {
        self.drink_blocker().is_none()
    }

    /// Inputs are meant to be read-only once any water has been logged.
    /// Advisory: edits are still applied if made.
    pub fn inputs_locked(&self) -> bool {
        self.record.current_water_ml > 0.0
    }

    pub fn view(&self) -> HydrationView {
        HydrationView {
            identity: self.identity.clone(),
            record: self.record.clone(),
            goal_input: self.goal_input.clone(),
            drink_amount_input: self.drink_amount_input.clone(),
            errors: self.active_errors(),
            fill_percentage: self.fill_percentage(),
            can_drink: self.can_drink(),
            inputs_locked: self.inputs_locked(),
        }
    }

    // ── internals ────────────────────────────────────────────────────

    /// Validate the staged text of `field`, commit per the invalid-input
    /// policy, then re-run the goal-vs-amount check.
    fn commit(&mut self, field: Field, pass: ValidationPass) -> TrackerResult<()> {
        let text = match field {
            Field::Goal => &self.goal_input,
            Field::DrinkAmount => &self.drink_amount_input,
        };
        let result = validate_field(text, pass);

        let committed = match result {
            Ok(value) => Some(value),
            Err(_) => match self.config.invalid_input {
                InvalidInputPolicy::ZeroSentinel => Some(0.0),
                InvalidInputPolicy::RetainLastValid => None,
            },
        };
        let error = result.err();

        match field {
            Field::Goal => {
                self.goal_error = error;
                if let Some(value) = committed {
                    self.record.daily_goal_ml = value;
                }
            }
            Field::DrinkAmount => {
                self.drink_amount_error = error;
                if let Some(value) = committed {
                    self.record.drink_amount_ml = value;
                }
            }
        }

        self.goal_vs_drink_error =
            cross_field_error(self.record.daily_goal_ml, self.record.drink_amount_ml);

        debug!(
            ?field,
            ?pass,
            ?error,
            daily_goal_ml = self.record.daily_goal_ml,
            drink_amount_ml = self.record.drink_amount_ml,
            "input committed"
        );
        self.after_mutation()
    }

    fn after_mutation(&self) -> TrackerResult<()> {
        if self.config.save_policy == SavePolicy::WriteThrough && self.session.is_authenticated() {
            self.save()?;
        }
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────
