//! Persisted per-user hydration records.
//!
//! All users share one JSON array under
//! [`keys::ALL_HYDRATION_DATA`](hydrohomie_store::keys::ALL_HYDRATION_DATA).
//! Entries are read leniently, one field at a time: a missing or unreadable
//! number falls back to its default without affecting the rest of the entry
//! or any other entry. Entries belonging to other users, including ones
//! that cannot be read at all, are written back exactly as they were found.
//! Only a value that is not a JSON array counts as corrupt.

use hydrohomie_store::{KeyValueStore, StoreResult, keys, load_json_or_default, save_json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::TrackerConfig;

/// One user's committed hydration numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationRecord {
    pub username: String,
    pub current_water_ml: f64,
    pub daily_goal_ml: f64,
    pub drink_amount_ml: f64,
    pub sips_taken: u32,
}

impl HydrationRecord {
    /// Fresh record: configured goal and drink amount, no progress.
    pub fn with_defaults(username: impl Into<String>, config: &TrackerConfig) -> Self {
        Self {
            username: username.into(),
            current_water_ml: 0.0,
            daily_goal_ml: config.default_goal_ml,
            drink_amount_ml: config.default_drink_ml,
            sips_taken: 0,
        }
    }
}

/// An entry exactly as found in the collection.
///
/// Kept as raw JSON so one malformed entry cannot take the others down with
/// it: each field is read on its own when the entry is resolved, and the
/// entry is written back as it was unless it belongs to the user being
/// saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct StoredRecord(Value);

impl StoredRecord {
    pub(crate) fn username(&self) -> Option<&str> {
        self.0.get("username").and_then(Value::as_str)
    }

    /// Fill in defaults. A goal or drink amount that is missing, unreadable,
    /// zero or negative takes the configured default; progress never goes
    /// below 0.
    pub(crate) fn resolve(&self, config: &TrackerConfig) -> HydrationRecord {
        let positive_or = |field: &str, fallback: f64| {
            self.number(field).filter(|v| *v > 0.0).unwrap_or(fallback)
        };
        HydrationRecord {
            username: self.username().unwrap_or_default().to_string(),
            current_water_ml: self.number("currentWaterMl").unwrap_or(0.0).max(0.0),
            daily_goal_ml: positive_or("dailyGoalMl", config.default_goal_ml),
            drink_amount_ml: positive_or("drinkAmountMl", config.default_drink_ml),
            sips_taken: self
                .number("sipsTaken")
                .filter(|v| *v >= 0.0)
                .map_or(0, |v| v.min(f64::from(u32::MAX)) as u32),
        }
    }

    /// A finite number, or a string holding one. Anything else reads as
    /// absent.
    fn number(&self, field: &str) -> Option<f64> {
        let value = self.0.get(field)?;
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let number = number.filter(|v| v.is_finite());
        if number.is_none() && !value.is_null() {
            debug!(field, %value, "unreadable stored number, using default");
        }
        number
    }

    /// Overwrite the committed numbers, keeping any other fields the entry
    /// carries.
    fn update(&mut self, record: &HydrationRecord) {
        let fields = [
            ("username", Value::from(record.username.clone())),
            ("currentWaterMl", Value::from(record.current_water_ml)),
            ("dailyGoalMl", Value::from(record.daily_goal_ml)),
            ("drinkAmountMl", Value::from(record.drink_amount_ml)),
            ("sipsTaken", Value::from(record.sips_taken)),
        ];
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            for (key, value) in fields {
                map.insert(key.to_string(), value);
            }
        }
    }
}

impl From<&HydrationRecord> for StoredRecord {
    fn from(record: &HydrationRecord) -> Self {
        let mut entry = Self(Value::Object(Map::new()));
        entry.update(record);
        entry
    }
}

pub(crate) fn load_collection(store: &dyn KeyValueStore) -> StoreResult<Vec<StoredRecord>> {
    load_json_or_default(store, keys::ALL_HYDRATION_DATA)
}

pub(crate) fn save_collection(
    store: &dyn KeyValueStore,
    records: &[StoredRecord],
) -> StoreResult<()> {
    save_json(store, keys::ALL_HYDRATION_DATA, records)
}

/// Replace the entry for `record.username`, or append one.
pub(crate) fn upsert(records: &mut Vec<StoredRecord>, record: &HydrationRecord) {
    match records
        .iter_mut()
        .find(|r| r.username() == Some(record.username.as_str()))
    {
        Some(existing) => existing.update(record),
        None => records.push(StoredRecord::from(record)),
    }
}

/// The stored record for `username`, with defaults applied.
pub fn find_record(
    store: &dyn KeyValueStore,
    username: &str,
    config: &TrackerConfig,
) -> StoreResult<Option<HydrationRecord>> {
    Ok(load_collection(store)?
        .iter()
        .find(|r| r.username() == Some(username))
        .map(|r| r.resolve(config)))
}

/// Every stored record in collection order, with defaults applied.
pub fn stored_records(
    store: &dyn KeyValueStore,
    config: &TrackerConfig,
) -> StoreResult<Vec<HydrationRecord>> {
    Ok(load_collection(store)?
        .iter()
        .filter(|r| r.username().is_some())
        .map(|r| r.resolve(config))
        .collect())
}
