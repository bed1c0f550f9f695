//! Persistence adapter.
//!
//! Typed load/save over a string key-value store. Loads fall back to the
//! empty value when a key is absent or unreadable. Saves are fire-and-forget:
//! a failed write is logged and otherwise treated like success.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::database::Database;
use crate::alarm::Alarm;
use crate::challenge::{BigFiveScores, Personality};
use crate::error::{DatabaseError, Result};

/// Logical key names.
pub mod keys {
    pub const ALARMS: &str = "alarms";
    pub const SLEEP_LOCK_ACTIVE: &str = "sleepLockActive";
    pub const PERSONALITY_TYPE: &str = "personalityType";
    pub const BIG_FIVE_SCORES: &str = "bigFiveScores";
    pub const DEACTIVATION_COUNT: &str = "deactivationCount";
    pub const SNOOZE_COUNT: &str = "snoozeCount";
    pub const TOTAL_ALARMS_SET: &str = "totalAlarmsSet";
    pub const ALARMS_COMPLETED: &str = "alarmsCompleted";
}

/// Get/set/remove by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.kv_get(key).map_err(DatabaseError::from)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Ok(self.kv_set(key, value).map_err(DatabaseError::from)?)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        Ok(self.kv_remove(key).map_err(DatabaseError::from)?)
    }
}

/// Volatile store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// The four lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    TotalAlarmsSet,
    AlarmsCompleted,
    SnoozeCount,
    DeactivationCount,
}

impl Counter {
    pub const ALL: [Counter; 4] = [
        Counter::TotalAlarmsSet,
        Counter::AlarmsCompleted,
        Counter::SnoozeCount,
        Counter::DeactivationCount,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Counter::TotalAlarmsSet => keys::TOTAL_ALARMS_SET,
            Counter::AlarmsCompleted => keys::ALARMS_COMPLETED,
            Counter::SnoozeCount => keys::SNOOZE_COUNT,
            Counter::DeactivationCount => keys::DEACTIVATION_COUNT,
        }
    }
}

/// Typed access to the persisted state.
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // ── Loads ────────────────────────────────────────────────────────

    pub fn load_alarms(&self) -> Vec<Alarm> {
        self.load_json(keys::ALARMS).unwrap_or_default()
    }

    pub fn load_lock_state(&self) -> bool {
        self.load_json(keys::SLEEP_LOCK_ACTIVE).unwrap_or(false)
    }

    pub fn load_personality(&self) -> Option<Personality> {
        let raw = self.load_raw(keys::PERSONALITY_TYPE)?;
        match raw.parse() {
            Ok(p) => Some(p),
            Err(err) => {
                tracing::warn!(%err, "ignoring stored personality type");
                None
            }
        }
    }

    pub fn load_scores(&self) -> Option<BigFiveScores> {
        self.load_json(keys::BIG_FIVE_SCORES)
    }

    /// Absent or unparsable counters read as zero.
    pub fn load_counter(&self, counter: Counter) -> u64 {
        self.load_raw(counter.key())
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    // ── Saves ────────────────────────────────────────────────────────

    pub fn save_alarms(&mut self, alarms: &[Alarm]) {
        self.save_json(keys::ALARMS, alarms);
    }

    pub fn save_lock_state(&mut self, active: bool) {
        self.save_json(keys::SLEEP_LOCK_ACTIVE, &active);
    }

    pub fn save_personality(&mut self, personality: Personality) {
        self.save_raw(keys::PERSONALITY_TYPE, personality.as_str());
    }

    pub fn clear_personality(&mut self) {
        if let Err(err) = self.store.remove(keys::PERSONALITY_TYPE) {
            tracing::warn!(%err, "failed to remove personality type");
        }
    }

    pub fn save_scores(&mut self, scores: &BigFiveScores) {
        self.save_json(keys::BIG_FIVE_SCORES, scores);
    }

    pub fn save_counter(&mut self, counter: Counter, value: u64) {
        self.save_raw(counter.key(), &value.to_string());
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, %err, "failed to read key");
                None
            }
        }
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, %err, "ignoring unreadable value");
                None
            }
        }
    }

    fn save_raw(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            tracing::warn!(key, %err, "failed to persist key");
        }
    }

    fn save_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.save_raw(key, &json),
            Err(err) => tracing::warn!(key, %err, "failed to encode value"),
        }
    }
}
