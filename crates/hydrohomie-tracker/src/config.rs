//! Tracker configuration.
//!
//! [`TrackerConfig`] carries the defaults used for identities without a
//! stored record and the two policy switches. `Default` matches the
//! behavior users already know; builder methods change one field at a time.

use serde::{Deserialize, Serialize};

/// What the committed number becomes while its input text is invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidInputPolicy {
    /// Commit `0` as a "currently invalid" sentinel.
    #[default]
    ZeroSentinel,
    /// Keep the last valid committed value.
    RetainLastValid,
}

/// When hydration progress reaches the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePolicy {
    /// Only on an explicit `save()` call (logout).
    #[default]
    OnRequest,
    /// After every successful mutation while signed in.
    WriteThrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Default: **2000 ml**.
    pub default_goal_ml: f64,
    /// Default: **250 ml**.
    pub default_drink_ml: f64,
    pub invalid_input: InvalidInputPolicy,
    pub save_policy: SavePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            default_goal_ml: 2000.0,
            default_drink_ml: 250.0,
            invalid_input: InvalidInputPolicy::default(),
            save_policy: SavePolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the defaults applied to identities without a stored record.
    /// Non-positive values are ignored.
    pub fn with_defaults(mut self, goal_ml: f64, drink_ml: f64) -> Self {
        if goal_ml.is_finite() && goal_ml > 0.0 {
            self.default_goal_ml = goal_ml;
        }
        if drink_ml.is_finite() && drink_ml > 0.0 {
            self.default_drink_ml = drink_ml;
        }
        self
    }

    pub fn with_invalid_input(mut self, policy: InvalidInputPolicy) -> Self {
        self.invalid_input = policy;
        self
    }

    pub fn with_save_policy(mut self, policy: SavePolicy) -> Self {
        self.save_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.default_goal_ml, 2000.0);
        assert_eq!(config.default_drink_ml, 250.0);
        assert_eq!(config.invalid_input, InvalidInputPolicy::ZeroSentinel);
        assert_eq!(config.save_policy, SavePolicy::OnRequest);
    }

    #[test]
    fn with_defaults_ignores_non_positive() {
        let config = TrackerConfig::new().with_defaults(0.0, 300.0);
        assert_eq!(config.default_goal_ml, 2000.0);
        assert_eq!(config.default_drink_ml, 300.0);
    }

    #[test]
    fn policies_parse_from_snake_case() {
        let policy: InvalidInputPolicy = serde_json::from_str("\"retain_last_valid\"").unwrap();
        assert_eq!(policy, InvalidInputPolicy::RetainLastValid);
        let policy: SavePolicy = serde_json::from_str("\"write_through\"").unwrap();
        assert_eq!(policy, SavePolicy::WriteThrough);
    }
}
