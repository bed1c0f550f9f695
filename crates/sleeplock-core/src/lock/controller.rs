//! Sleep-lock state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Unlocked --engage--> Locked --release(reason)--> Unlocked
//! ```
//!
//! Engaging installs the guard set (input blocking, focus retention,
//! shortcut suppression) in one step; releasing removes it in one step.
//! Engaging an already-engaged lock is a no-op, so repeated arm/disarm
//! cycles never stack guards.
//!
//! The developer override listener is separate from the guard set and is
//! live in both states.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::developer::{DeveloperOverride, DEFAULT_PRESSES, DEFAULT_WINDOW_MS};
use super::focus::{FocusLoss, FocusRetention, DEFAULT_REFOCUS_DELAY_MS};
use super::input::{classify_key, classify_mouse, KeyInput, KeyPhase, MouseInput, Verdict};
use crate::events::{Event, ReleaseReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Unlocked,
    Locked,
}

/// Lock tuning, loaded from the `[lock]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSettings {
    #[serde(default = "default_refocus_delay_ms")]
    pub refocus_delay_ms: i64,
    #[serde(default = "default_override_window_ms")]
    pub override_window_ms: i64,
    #[serde(default = "default_override_presses")]
    pub override_presses: usize,
    /// Request fullscreen when the lock engages.
    #[serde(default = "default_true")]
    pub fullscreen: bool,
}

fn default_refocus_delay_ms() -> i64 {
    DEFAULT_REFOCUS_DELAY_MS
}
fn default_override_window_ms() -> i64 {
    DEFAULT_WINDOW_MS
}
fn default_override_presses() -> usize {
    DEFAULT_PRESSES
}
fn default_true() -> bool {
    true
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            refocus_delay_ms: default_refocus_delay_ms(),
            override_window_ms: default_override_window_ms(),
            override_presses: default_override_presses(),
            fullscreen: true,
        }
    }
}

/// Guards installed while locked. Dropping the set removes all of them.
#[derive(Debug, Clone)]
struct GuardSet {
    installed_at: NaiveDateTime,
    focus: FocusRetention,
}

/// Result of routing a key event through the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub verdict: Verdict,
    /// The developer override sequence completed on this press.
    pub developer_override: bool,
}

#[derive(Debug, Clone)]
pub struct SleepLockController {
    settings: LockSettings,
    state: LockState,
    guards: Option<GuardSet>,
    developer: DeveloperOverride,
    installs: u64,
}

impl Default for SleepLockController {
    fn default() -> Self {
        Self::new(LockSettings::default())
    }
}

impl SleepLockController {
    pub fn new(settings: LockSettings) -> Self {
        let developer =
            DeveloperOverride::new(settings.override_window_ms, settings.override_presses);
        Self {
            settings,
            state: LockState::Unlocked,
            guards: None,
            developer,
            installs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    pub fn guards_installed(&self) -> bool {
        self.guards.is_some()
    }

    /// When the current guard set went in.
    pub fn locked_since(&self) -> Option<NaiveDateTime> {
        self.guards.as_ref().map(|g| g.installed_at)
    }

    /// Number of guard-set installs over the controller's lifetime.
    pub fn install_count(&self) -> u64 {
        self.installs
    }

    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Unlocked -> Locked. Returns `None` if already locked.
    pub fn engage(&mut self, now: NaiveDateTime) -> Option<Event> {
        if self.guards.is_some() {
            return None;
        }
        self.state = LockState::Locked;
        self.guards = Some(GuardSet {
            installed_at: now,
            focus: FocusRetention::new(self.settings.refocus_delay_ms),
        });
        self.installs += 1;
        tracing::info!(installs = self.installs, "sleep lock engaged");
        Some(Event::SleepLockEngaged {
            fullscreen: self.settings.fullscreen,
            at: now,
        })
    }

    /// Locked -> Unlocked. Returns `None` if already unlocked.
    pub fn release(&mut self, reason: ReleaseReason, now: NaiveDateTime) -> Option<Event> {
        if self.state == LockState::Unlocked && self.guards.is_none() {
            return None;
        }
        self.state = LockState::Unlocked;
        self.guards = None;
        tracing::info!(?reason, "sleep lock released");
        Some(Event::SleepLockReleased {
            reason,
            fullscreen: self.settings.fullscreen,
            at: now,
        })
    }

    // ── Input routing ────────────────────────────────────────────────

    /// Route a key event. The developer combo is counted first, whatever
    /// the lock state; the guard set then decides pass or suppress.
    pub fn on_key(&mut self, key: &KeyInput, dialog_open: bool, now: NaiveDateTime) -> KeyOutcome {
        let developer_override =
            key.phase == KeyPhase::Down && key.is_developer_combo() && self.developer.press(now);
        let verdict = if self.guards.is_some() {
            classify_key(key, dialog_open)
        } else {
            Verdict::Allow
        };
        if !verdict.is_allowed() {
            tracing::debug!(key = %key.key, ?verdict, "key suppressed");
        }
        KeyOutcome {
            verdict,
            developer_override,
        }
    }

    pub fn on_mouse(&self, mouse: MouseInput, dialog_open: bool) -> Verdict {
        if self.guards.is_none() {
            return Verdict::Allow;
        }
        let verdict = classify_mouse(mouse, dialog_open);
        if !verdict.is_allowed() {
            tracing::debug!(?mouse, "mouse suppressed");
        }
        verdict
    }

    /// Window blur or page hide. Ignored unless locked.
    pub fn on_focus_lost(&mut self, loss: FocusLoss, now: NaiveDateTime) {
        if let Some(guards) = self.guards.as_mut() {
            guards.focus.lost(loss, now);
        }
    }

    /// Run any refocus attempt that has come due.
    pub fn poll(&mut self, now: NaiveDateTime) -> Option<Event> {
        let refocus = self.guards.as_mut()?.focus.due(now)?;
        Some(Event::RefocusRequested {
            reenter_fullscreen: refocus.reenter_fullscreen && self.settings.fullscreen,
            at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::input::{Modifiers, MouseKind, Target};
    use chrono::{Duration, NaiveDate};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap()
    }

    fn combo() -> KeyInput {
        KeyInput::down(
            "D",
            Modifiers {
                meta: true,
                shift: true,
                ..Default::default()
            },
            Target::Document,
        )
    }

    #[test]
    fn engage_release_cycle() {
        let mut lock = SleepLockController::default();
        assert_eq!(lock.state(), LockState::Unlocked);

        assert!(lock.engage(base()).is_some());
        assert!(lock.is_locked());
        assert!(lock.guards_installed());
        assert_eq!(lock.locked_since(), Some(base()));

        assert!(lock.release(ReleaseReason::AlarmFired, base()).is_some());
        assert_eq!(lock.state(), LockState::Unlocked);
        assert!(!lock.guards_installed());
    }

    #[test]
    fn repeated_engage_does_not_stack_guards() {
        let mut lock = SleepLockController::default();
        assert!(lock.engage(base()).is_some());
        assert!(lock.engage(base()).is_none());
        assert_eq!(lock.install_count(), 1);
        lock.release(ReleaseReason::NoArmedAlarms, base());
        assert!(lock.release(ReleaseReason::NoArmedAlarms, base()).is_none());
        lock.engage(base());
        assert_eq!(lock.install_count(), 2);
    }

    #[test]
    fn input_passes_freely_when_unlocked() {
        let mut lock = SleepLockController::default();
        let key = KeyInput::down("a", Modifiers::default(), Target::Document);
        assert!(lock.on_key(&key, false, base()).verdict.is_allowed());
        let click = MouseInput {
            kind: MouseKind::Click,
            target: Target::Document,
        };
        assert!(lock.on_mouse(click, false).is_allowed());
    }

    #[test]
    fn input_blocked_when_locked() {
        let mut lock = SleepLockController::default();
        lock.engage(base());
        let key = KeyInput::down("a", Modifiers::default(), Target::Document);
        assert!(!lock.on_key(&key, false, base()).verdict.is_allowed());
    }

    #[test]
    fn developer_combo_counts_in_both_states() {
        let mut lock = SleepLockController::default();
        let t = base();
        assert!(!lock.on_key(&combo(), false, t).developer_override);
        assert!(!lock.on_key(&combo(), false, t + Duration::milliseconds(200)).developer_override);
        let outcome = lock.on_key(&combo(), false, t + Duration::milliseconds(400));
        assert!(outcome.developer_override);
        assert!(outcome.verdict.is_allowed());
    }

    #[test]
    fn key_up_does_not_count_as_press() {
        let mut lock = SleepLockController::default();
        let mut up = combo();
        up.phase = KeyPhase::Up;
        for i in 0..5 {
            let at = base() + Duration::milliseconds(i * 10);
            assert!(!lock.on_key(&up, false, at).developer_override);
        }
    }

    #[test]
    fn refocus_only_while_locked() {
        let mut lock = SleepLockController::default();
        let t = base();
        lock.on_focus_lost(FocusLoss::Blur, t);
        assert!(lock.poll(t + Duration::seconds(1)).is_none());

        lock.engage(t);
        lock.on_focus_lost(FocusLoss::Hidden, t);
        match lock.poll(t + Duration::milliseconds(150)) {
            Some(Event::RefocusRequested {
                reenter_fullscreen, ..
            }) => assert!(reenter_fullscreen),
            other => panic!("expected refocus, got {other:?}"),
        }
        assert!(lock.poll(t + Duration::seconds(2)).is_none());
    }

    #[test]
    fn release_cancels_pending_refocus() {
        let mut lock = SleepLockController::default();
        let t = base();
        lock.engage(t);
        lock.on_focus_lost(FocusLoss::Blur, t);
        lock.release(ReleaseReason::Deactivated, t);
        lock.engage(t + Duration::milliseconds(50));
        assert!(lock.poll(t + Duration::seconds(1)).is_none());
    }
}
