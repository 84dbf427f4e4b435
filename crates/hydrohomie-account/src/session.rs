//! Who is signed in right now.
//!
//! [`AccountSession`] upholds `is_authenticated() ⇒ current_user().is_some()`
//! by construction. [`SharedSession`] is the handle the registry writes and
//! the hydration tracker reads; tests create as many isolated ones as they
//! need.

use std::sync::{Arc, PoisonError, RwLock};

use crate::user::User;

/// Sentinel name used for the unauthenticated identity.
pub const GUEST_USERNAME: &str = "guest";

/// Authentication state mirrored into the profile on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSession {
    current_user: Option<User>,
}

impl AccountSession {
    pub fn signed_out() -> Self {
        Self { current_user: None }
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn identity(&self) -> Identity {
        match &self.current_user {
            Some(user) => Identity::User(user.username.clone()),
            None => Identity::Guest,
        }
    }
}

/// The active identity as seen by per-user state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Guest,
    User(String),
}

impl Identity {
    /// Username for this identity; the guest sentinel when signed out.
    pub fn username(&self) -> &str {
        match self {
            Self::Guest => GUEST_USERNAME,
            Self::User(name) => name,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.username())
    }
}

/// Cloneable handle to one [`AccountSession`].
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<AccountSession>>,
}

impl SharedSession {
    pub fn new(session: AccountSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> AccountSession {
        // Writers replace the whole value, so a poisoned lock still holds a
        // consistent session.
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn identity(&self) -> Identity {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    pub(crate) fn replace(&self, session: AccountSession) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}
