//! Application configuration.
//!
//! Reads `config/default.toml` (or the file given with `--config`) into
//! [`AppConfig`]. Every section and key is optional. Environment variables
//! `HYDROHOMIE_DB` and `HYDROHOMIE_API_URL` win over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use hydrohomie_account::RegistryConfig;
use hydrohomie_encourage::{DEFAULT_BASE_URL, SourceConfig};
use hydrohomie_tracker::{InvalidInputPolicy, SavePolicy, TrackerConfig};

pub const ENV_DB_PATH: &str = "HYDROHOMIE_DB";
pub const ENV_API_URL: &str = "HYDROHOMIE_API_URL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSection,
    pub account: AccountSection,
    pub hydration: HydrationSection,
    pub encouragement: EncouragementSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/hydrohomie.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountSection {
    pub latency_ms: u64,
}

impl Default for AccountSection {
    fn default() -> Self {
        Self { latency_ms: 500 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HydrationSection {
    pub default_goal_ml: f64,
    pub default_drink_ml: f64,
    pub invalid_input: InvalidInputPolicy,
    pub save_policy: SavePolicy,
}

impl Default for HydrationSection {
    fn default() -> Self {
        let tracker = TrackerConfig::default();
        Self {
            default_goal_ml: tracker.default_goal_ml,
            default_drink_ml: tracker.default_drink_ml,
            invalid_input: tracker.invalid_input,
            save_policy: tracker.save_policy,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EncouragementSection {
    pub base_url: String,
    pub ttl_minutes: u64,
    pub timeout_secs: u64,
}

impl Default for EncouragementSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ttl_minutes: 30,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults if the file does not
    /// exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from `lookup` (the process environment in
    /// production). Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(path) = non_empty(ENV_DB_PATH) {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(url) = non_empty(ENV_API_URL) {
            self.encouragement.base_url = url;
        }
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new().with_latency(Duration::from_millis(self.account.latency_ms))
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        let hydration = &self.hydration;
        TrackerConfig::new()
            .with_defaults(hydration.default_goal_ml, hydration.default_drink_ml)
            .with_invalid_input(hydration.invalid_input)
            .with_save_policy(hydration.save_policy)
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::new(self.encouragement.base_url.clone())
            .with_timeout(Duration::from_secs(self.encouragement.timeout_secs))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.encouragement.ttl_minutes.saturating_mul(60))
    }
}
