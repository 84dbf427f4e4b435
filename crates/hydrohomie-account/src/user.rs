//! The registered user record.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};

use crate::error::{AccountError, AccountResult};

/// Random bytes behind each login string (43 URL-safe characters).
const LOGIN_STRING_BYTES: usize = 32;

/// A registered user. Immutable once created; keyed by `username`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Case-sensitive, non-empty, unique.
    pub username: String,
    /// Opaque token handed out once at registration.
    pub login_string: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a freshly generated login string.
    pub fn generate(username: impl Into<String>) -> AccountResult<Self> {
        Ok(Self {
            username: username.into(),
            login_string: generate_login_string()?,
            created_at: Utc::now(),
        })
    }

    /// Exact comparison against the stored login string.
    pub fn matches(&self, login_string: &str) -> bool {
        self.login_string == login_string
    }
}

// The login string stays out of logs.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("login_string", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// 32 random bytes, URL-safe base64 without padding.
pub fn generate_login_string() -> AccountResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; LOGIN_STRING_BYTES];
    rng.fill(&mut bytes)
        .map_err(|_| AccountError::TokenGeneration)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_strings_are_url_safe_and_distinct() {
        let a = generate_login_string().unwrap();
        let b = generate_login_string().unwrap();

        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let user = User::generate("alice").unwrap();
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["username"], "alice");
        assert!(json["loginString"].is_string());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn debug_redacts_login_string() {
        let user = User::generate("alice").unwrap();
        let rendered = format!("{user:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains(&user.login_string));
    }

    #[test]
    fn matches_is_exact() {
        let user = User::generate("bob").unwrap();
        assert!(user.matches(&user.login_string.clone()));
        assert!(!user.matches(&format!("{} ", user.login_string)));
        assert!(!user.matches(""));
    }
}
