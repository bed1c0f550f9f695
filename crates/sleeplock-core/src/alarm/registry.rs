//! Alarm registry.
//!
//! Holds the ordered list of alarms and the due-scan. The registry knows
//! nothing about counters or the lock; the application layer re-evaluates
//! the lock invariant after each mutation using [`AlarmRegistry::has_armed`].

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::clock::{minute_stamp, AlarmTime};

pub type AlarmId = i64;

/// A single sleep alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: AlarmId,
    pub time: AlarmTime,
    pub label: String,
    pub enabled: bool,
    pub triggered: bool,
    /// Every alarm locks the device.
    #[serde(default = "default_true")]
    pub sleep_mode: bool,
    /// Minute in which this alarm last fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_fired_at: Option<NaiveDateTime>,
}

fn default_true() -> bool {
    true
}

impl Alarm {
    /// Enabled and waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.enabled && !self.triggered
    }

    fn is_due(&self, now: NaiveDateTime) -> bool {
        self.is_armed()
            && self.time == AlarmTime::of(now)
            && self.last_fired_at != Some(minute_stamp(now))
    }
}

/// The set of alarms, in creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_alarms(alarms: Vec<Alarm>) -> Self {
        Self { alarms }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    /// At least one alarm is enabled and not triggered.
    pub fn has_armed(&self) -> bool {
        self.alarms.iter().any(Alarm::is_armed)
    }

    /// Nearest armed alarm and the time left until it fires.
    pub fn next_due(&self, now: NaiveDateTime) -> Option<(&Alarm, Duration)> {
        self.alarms
            .iter()
            .filter(|a| a.is_armed())
            .map(|a| (a, a.time.next_occurrence(now) - now))
            .min_by_key(|(_, left)| *left)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append a new enabled alarm. The id is the creation timestamp in
    /// milliseconds, bumped past the newest existing id when they collide.
    pub fn add(&mut self, time: AlarmTime, label: impl Into<String>, now: NaiveDateTime) -> &Alarm {
        let stamp = now.and_utc().timestamp_millis();
        let newest = self.alarms.iter().map(|a| a.id).max();
        let id = match newest {
            Some(newest) if newest >= stamp => newest + 1,
            _ => stamp,
        };
        self.alarms.push(Alarm {
            id,
            time,
            label: label.into(),
            enabled: true,
            triggered: false,
            sleep_mode: true,
            last_fired_at: None,
        });
        &self.alarms[self.alarms.len() - 1]
    }

    pub fn remove(&mut self, id: AlarmId) -> Option<Alarm> {
        let pos = self.alarms.iter().position(|a| a.id == id)?;
        Some(self.alarms.remove(pos))
    }

    /// Flip `enabled` and clear `triggered`.
    pub fn toggle(&mut self, id: AlarmId) -> Option<&Alarm> {
        let alarm = self.alarms.iter_mut().find(|a| a.id == id)?;
        alarm.enabled = !alarm.enabled;
        alarm.triggered = false;
        Some(alarm)
    }

    /// Move an alarm to `time`, re-enable it and clear `triggered`.
    pub fn snooze(&mut self, id: AlarmId, time: AlarmTime) -> Option<&Alarm> {
        let alarm = self.alarms.iter_mut().find(|a| a.id == id)?;
        alarm.time = time;
        alarm.triggered = false;
        alarm.enabled = true;
        Some(alarm)
    }

    /// Mark every armed alarm whose time equals the current minute as
    /// triggered and return copies of them. Calling this again inside the
    /// same minute returns nothing.
    pub fn scan_due(&mut self, now: NaiveDateTime) -> Vec<Alarm> {
        let stamp = minute_stamp(now);
        self.alarms
            .iter_mut()
            .filter(|a| a.is_due(now))
            .map(|a| {
                a.triggered = true;
                a.last_fired_at = Some(stamp);
                a.clone()
            })
            .collect()
    }

    /// Clear `triggered` on every alarm, not only the one that was dismissed.
    pub fn clear_all_triggered(&mut self) -> usize {
        let mut cleared = 0;
        for alarm in self.alarms.iter_mut().filter(|a| a.triggered) {
            alarm.triggered = false;
            cleared += 1;
        }
        cleared
    }

    /// Remove every alarm. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let n = self.alarms.len();
        self.alarms.clear();
        n
    }
}
