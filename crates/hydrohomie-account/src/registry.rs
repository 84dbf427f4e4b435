//! The account registry.
//!
//! Holds every registered [`User`] and drives the [`SharedSession`]. Each
//! mutation is written straight through to the profile: the user map under
//! `demoUsers`, the session under `isAuthenticated` and `currentUser`.
//! There is no separate save step.

use std::collections::BTreeMap;
use std::time::Duration;

use hydrohomie_store::{SharedStore, keys, load_json_or_default, save_json};
use tracing::{debug, info, instrument, warn};

use crate::error::AccountResult;
use crate::session::{AccountSession, SharedSession};
use crate::user::User;

/// Why a register or login attempt was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Please enter a username.")]
    EmptyUsername,

    #[error("Please enter your login string.")]
    EmptyLoginString,

    #[error("Username already taken.")]
    DuplicateUser,

    #[error("Invalid username or login string.")]
    InvalidCredentials,
}

/// Result of a register or login attempt, shaped for a banner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
    /// Only set by a successful registration. Shown once, never stored
    /// anywhere the registry API can return it again.
    pub login_string: Option<String>,
    pub error: Option<AuthError>,
}

impl AuthOutcome {
    fn registered(login_string: String) -> Self {
        Self {
            success: true,
            message: "Registration successful!".into(),
            login_string: Some(login_string),
            error: None,
        }
    }

    fn logged_in() -> Self {
        Self {
            success: true,
            message: "Login successful!".into(),
            login_string: None,
            error: None,
        }
    }

    fn rejected(error: AuthError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            login_string: None,
            error: Some(error),
        }
    }
}

/// Registry tuning.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Artificial delay before register/login resolve, so a UI can show a
    /// loading state. Zero disables it.
    ///
    /// Default: **500 ms**.
    pub latency: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(500),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Registered users plus the active session, persisted on every change.
pub struct AccountRegistry {
    store: SharedStore,
    session: SharedSession,
    users: BTreeMap<String, User>,
    config: RegistryConfig,
}

impl AccountRegistry {
    /// Restore the user map and the session from `store`.
    ///
    /// Corrupt entries fall back to "no users" / "signed out".
    pub fn load(store: SharedStore, config: RegistryConfig) -> AccountResult<Self> {
        let users: BTreeMap<String, User> = load_json_or_default(store.as_ref(), keys::DEMO_USERS)?;

        let flagged = store.get(keys::IS_AUTHENTICATED)?.as_deref() == Some("true");
        let stored_user: Option<User> = load_json_or_default(store.as_ref(), keys::CURRENT_USER)?;

        let session = match (flagged, stored_user) {
            (true, Some(user)) => AccountSession::signed_in(user),
            (true, None) => {
                warn!("session flagged as authenticated without a user, signing out");
                AccountSession::signed_out()
            }
            (false, _) => AccountSession::signed_out(),
        };

        info!(
            users = users.len(),
            identity = %session.identity(),
            "account registry loaded"
        );

        let registry = Self {
            store,
            session: SharedSession::new(session),
            users,
            config,
        };
        if flagged && !registry.session.is_authenticated() {
            registry.persist_session()?;
        }
        Ok(registry)
    }

    /// Handle to the session this registry drives.
    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.snapshot().current_user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn is_registered(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Register `username` and hand back its login string.
    ///
    /// Registration does not sign the user in.
    #[instrument(skip(self))]
    pub async fn register(&mut self, username: &str) -> AccountResult<AuthOutcome> {
        self.simulate_latency().await;

        let username = username.trim();
        if username.is_empty() {
            return Ok(AuthOutcome::rejected(AuthError::EmptyUsername));
        }
        if self.users.contains_key(username) {
            debug!(username, "registration rejected, username taken");
            return Ok(AuthOutcome::rejected(AuthError::DuplicateUser));
        }

        let user = User::generate(username)?;
        let login_string = user.login_string.clone();
        self.users.insert(user.username.clone(), user);
        save_json(self.store.as_ref(), keys::DEMO_USERS, &self.users)?;

        info!(username, "user registered");
        Ok(AuthOutcome::registered(login_string))
    }

    /// Sign in when `login_string` exactly matches the stored one.
    #[instrument(skip(self, login_string))]
    pub async fn login(
        &mut self,
        username: &str,
        login_string: &str,
    ) -> AccountResult<AuthOutcome> {
        self.simulate_latency().await;

        let username = username.trim();
        let login_string = login_string.trim();
        if username.is_empty() {
            return Ok(AuthOutcome::rejected(AuthError::EmptyUsername));
        }
        if login_string.is_empty() {
            return Ok(AuthOutcome::rejected(AuthError::EmptyLoginString));
        }

        let Some(user) = self.users.get(username).filter(|u| u.matches(login_string)) else {
            debug!(username, "login rejected");
            return Ok(AuthOutcome::rejected(AuthError::InvalidCredentials));
        };

        self.session.replace(AccountSession::signed_in(user.clone()));
        self.persist_session()?;

        info!(username, "user logged in");
        Ok(AuthOutcome::logged_in())
    }

    /// Clear the session. Hydration progress is not saved here; callers
    /// must save it before calling this.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> AccountResult<()> {
        let previous = self.session.identity();
        self.session.replace(AccountSession::signed_out());
        self.persist_session()?;
        info!(identity = %previous, "user logged out");
        Ok(())
    }

    // ── internals ────────────────────────────────────────────────────

    fn persist_session(&self) -> AccountResult<()> {
        let session = self.session.snapshot();
        let flag = if session.is_authenticated() { "true" } else { "false" };
        self.store.set(keys::IS_AUTHENTICATED, flag)?;
        save_json(self.store.as_ref(), keys::CURRENT_USER, &session.current_user())?;
        Ok(())
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────
