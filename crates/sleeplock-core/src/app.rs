//! Application controller.
//!
//! `AlarmApp` owns every piece of mutable state: the alarm registry, the
//! sleep lock, both challenge slots, the personality profile and the
//! counters. Front-ends feed it inbound events and a wall-clock `now`, and
//! apply the returned [`Event`]s to their collaborators. Nothing here reads
//! the system clock.
//!
//! Lock invariant, checked after every registry mutation: outside a ring the
//! lock is held iff some alarm is enabled and not triggered. Firing releases
//! the lock; arming or re-enabling an alarm during the ring engages it again
//! (the ringing dialog stays usable through the guard allow-list).

use chrono::NaiveDateTime;

use crate::alarm::{format_countdown, Alarm, AlarmId, AlarmRegistry, AlarmTime};
use crate::challenge::{
    verify, BigFiveScores, ChallengeBook, ChallengeGenerator, ChallengeSlot, Personality,
};
use crate::error::{ChallengeError, CoreError, Result, ValidationError};
use crate::events::{Event, ReleaseReason};
use crate::lock::{FocusLoss, KeyInput, LockState, MouseInput, SleepLockController, Verdict};
use crate::stats::{AnalyticsReport, Counters};
use crate::storage::{AlarmConfig, Config, Counter, KeyValueStore, Persistence};

/// One inbound event from the front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Periodic scheduler tick.
    Tick,
    Key(KeyInput),
    Mouse(MouseInput),
    FocusLost(FocusLoss),
    QuizSubmitted { selection: Option<String> },
    ReturnToQuiz,
    ArmSubmitted { time: String, answer: String },
    DismissSubmitted { answer: String },
    SnoozePressed,
    DeactivatePressed,
    ToggleAlarm(AlarmId),
    DeleteAlarm(AlarmId),
}

/// Result of [`AlarmApp::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Whether the triggering input may take its default action.
    pub verdict: Verdict,
    pub events: Vec<Event>,
}

pub struct AlarmApp<S: KeyValueStore> {
    store: Persistence<S>,
    settings: AlarmConfig,
    registry: AlarmRegistry,
    lock: SleepLockController,
    challenges: ChallengeBook,
    profile: Option<Personality>,
    scores: Option<BigFiveScores>,
    counters: Counters,
    /// Alarm currently ringing.
    firing: Option<AlarmId>,
    /// False until a profile exists; ticks are ignored meanwhile.
    session_active: bool,
}

impl<S: KeyValueStore> AlarmApp<S> {
    /// Load persisted state. Call [`AlarmApp::boot`] before dispatching.
    pub fn open(store: S, config: &Config) -> Self {
        Self::with_generator(store, config, ChallengeGenerator::new())
    }

    pub fn with_generator(store: S, config: &Config, generator: ChallengeGenerator) -> Self {
        let store = Persistence::new(store);
        let counters = Counters {
            total_alarms_set: store.load_counter(Counter::TotalAlarmsSet),
            alarms_completed: store.load_counter(Counter::AlarmsCompleted),
            snooze_count: store.load_counter(Counter::SnoozeCount),
            deactivation_count: store.load_counter(Counter::DeactivationCount),
        };
        Self {
            registry: AlarmRegistry::from_alarms(store.load_alarms()),
            profile: store.load_personality(),
            scores: store.load_scores(),
            counters,
            store,
            settings: config.alarm.clone(),
            lock: SleepLockController::new(config.lock.clone()),
            challenges: ChallengeBook::new(generator),
            firing: None,
            session_active: false,
        }
    }

    /// Start the session if a profile is stored, otherwise ask for the quiz.
    pub fn boot(&mut self, now: NaiveDateTime) -> Vec<Event> {
        let mut events = Vec::new();
        if self.profile.is_some() {
            self.start_session(now, &mut events);
        } else {
            events.push(Event::QuizRequired);
        }
        events
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn alarms(&self) -> &[Alarm] {
        self.registry.alarms()
    }

    pub fn registry(&self) -> &AlarmRegistry {
        &self.registry
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn lock(&self) -> &SleepLockController {
        &self.lock
    }

    pub fn profile(&self) -> Option<Personality> {
        self.profile
    }

    pub fn scores(&self) -> Option<BigFiveScores> {
        self.scores
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn analytics(&self) -> AnalyticsReport {
        AnalyticsReport::from_counters(self.counters)
    }

    pub fn challenge(&self, slot: ChallengeSlot) -> Option<&'static str> {
        self.challenges.get(slot)
    }

    pub fn firing(&self) -> Option<AlarmId> {
        self.firing
    }

    pub fn session_active(&self) -> bool {
        self.session_active
    }

    pub fn store(&self) -> &S {
        self.store.store()
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Route one inbound event. Recoverable errors become inline-error
    /// events; anything else is logged and reported the same way.
    pub fn dispatch(&mut self, inbound: Inbound, now: NaiveDateTime) -> Dispatch {
        let mut verdict = Verdict::Allow;
        let result = match inbound {
            Inbound::Tick => Ok(self.tick(now)),
            Inbound::Key(key) => {
                let (v, events) = self.key(&key, now);
                verdict = v;
                Ok(events)
            }
            Inbound::Mouse(mouse) => {
                verdict = self.mouse(mouse);
                Ok(Vec::new())
            }
            Inbound::FocusLost(loss) => {
                self.focus_lost(loss, now);
                Ok(Vec::new())
            }
            Inbound::QuizSubmitted { selection } => self.submit_quiz(selection.as_deref(), now),
            Inbound::ReturnToQuiz => Ok(self.return_to_quiz(now)),
            Inbound::ArmSubmitted { time, answer } => self.arm(&time, &answer, now),
            Inbound::DismissSubmitted { answer } => self.dismiss(&answer, now),
            Inbound::SnoozePressed => self.snooze(now),
            Inbound::DeactivatePressed => Ok(self.deactivate(now)),
            Inbound::ToggleAlarm(id) => self.toggle(id, now),
            Inbound::DeleteAlarm(id) => self.remove(id, now),
        };
        let events = result.unwrap_or_else(|err| self.error_events(err));
        Dispatch { verdict, events }
    }

    fn error_events(&self, err: CoreError) -> Vec<Event> {
        if !err.is_recoverable() {
            tracing::error!(%err, "unexpected failure");
            return vec![Event::InlineError {
                slot: None,
                message: err.to_string(),
            }];
        }
        match err {
            CoreError::Challenge(ChallengeError::Mismatch { slot, rotated }) => {
                let mut events = vec![Event::ChallengeRejected {
                    slot,
                    message: ChallengeError::Mismatch { slot, rotated }.to_string(),
                    rotated,
                }];
                if rotated {
                    if let Some(text) = self.challenges.get(slot) {
                        events.push(Event::ChallengeIssued {
                            slot,
                            text: text.to_string(),
                        });
                    }
                }
                events
            }
            CoreError::Challenge(ChallengeError::Missing { slot }) => vec![Event::InlineError {
                slot: Some(slot),
                message: ChallengeError::Missing { slot }.to_string(),
            }],
            CoreError::Validation(err) => vec![Event::InlineError {
                slot: None,
                message: err.to_string(),
            }],
            other => vec![Event::InlineError {
                slot: None,
                message: other.to_string(),
            }],
        }
    }

    // ── Scheduler ────────────────────────────────────────────────────

    /// One scheduler tick: fire due alarms, run a due refocus attempt, and
    /// refresh the countdown (releasing the lock if nothing is armed).
    ///
    /// A refocus attempt is only noticed on a tick, so with a tick interval
    /// longer than `lock.refocus_delay_ms` it runs late. Front-ends that can
    /// lose focus should also call [`AlarmApp::poll_focus`] on a timer of
    /// that delay.
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.session_active {
            return events;
        }

        let fired = self.registry.scan_due(now);
        if !fired.is_empty() {
            self.store.save_alarms(self.registry.alarms());
            for alarm in fired {
                self.fire(alarm, now, &mut events);
            }
        }

        events.extend(self.poll_focus(now));

        if self.lock.is_locked() {
            match self.registry.next_due(now) {
                Some((alarm, left)) => events.push(Event::Countdown {
                    next_alarm: alarm.id,
                    remaining_secs: left.num_seconds(),
                    display: format_countdown(left),
                }),
                None => self.release_lock(ReleaseReason::NoArmedAlarms, now, &mut events),
            }
        }
        events
    }

    /// Run a due refocus attempt, if any. Cheap enough to call often.
    pub fn poll_focus(&mut self, now: NaiveDateTime) -> Vec<Event> {
        self.lock.poll(now).into_iter().collect()
    }

    fn fire(&mut self, alarm: Alarm, now: NaiveDateTime, events: &mut Vec<Event>) {
        tracing::info!(id = alarm.id, time = %alarm.time, "alarm fired");
        self.firing = Some(alarm.id);
        self.release_lock(ReleaseReason::AlarmFired, now, events);
        let challenge = self
            .profile
            .map(|p| self.challenges.rotate(ChallengeSlot::Dismiss, p).to_string());
        events.push(Event::AlarmFired {
            message: format!("Wake up! - {}", alarm.time.display_12h()),
            alarm,
            challenge,
            at: now,
        });
    }

    // ── Input guards ─────────────────────────────────────────────────

    /// Route a key event through the developer override and the lock guards.
    pub fn key(&mut self, key: &KeyInput, now: NaiveDateTime) -> (Verdict, Vec<Event>) {
        let outcome = self.lock.on_key(key, self.firing.is_some(), now);
        let events = if outcome.developer_override {
            self.developer_override(now)
        } else {
            Vec::new()
        };
        (outcome.verdict, events)
    }

    pub fn mouse(&self, mouse: MouseInput) -> Verdict {
        self.lock.on_mouse(mouse, self.firing.is_some())
    }

    pub fn focus_lost(&mut self, loss: FocusLoss, now: NaiveDateTime) {
        self.lock.on_focus_lost(loss, now);
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// Store the quiz answer and start the session.
    pub fn submit_quiz(&mut self, selection: Option<&str>, now: NaiveDateTime) -> Result<Vec<Event>> {
        let selection = selection
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::NoSelection)?;
        let personality: Personality = selection.parse()?;
        let scores = BigFiveScores::for_selection(personality);

        self.profile = Some(personality);
        self.scores = Some(scores);
        self.store.save_personality(personality);
        self.store.save_scores(&scores);
        tracing::info!(%personality, "personality profile stored");

        let mut events = vec![Event::ProfileSet { personality }];
        self.start_session(now, &mut events);
        Ok(events)
    }

    /// Forget the profile and stop the session until the quiz is retaken.
    /// Alarms and counters are kept.
    pub fn return_to_quiz(&mut self, now: NaiveDateTime) -> Vec<Event> {
        let mut events = Vec::new();
        self.profile = None;
        self.store.clear_personality();
        self.challenges.clear_all();
        self.session_active = false;
        self.release_lock(ReleaseReason::SessionReset, now, &mut events);
        events.push(Event::QuizRequired);
        events
    }

    fn start_session(&mut self, now: NaiveDateTime, events: &mut Vec<Event>) {
        self.session_active = true;
        if let Some(profile) = self.profile {
            let text = self.challenges.rotate(ChallengeSlot::Arm, profile);
            events.push(Event::ChallengeIssued {
                slot: ChallengeSlot::Arm,
                text: text.to_string(),
            });
        }
        let restore = self.store.load_lock_state();
        if restore || (self.registry.has_armed() && self.firing.is_none()) {
            self.engage_lock(now, events);
        }
    }

    fn require_profile(&self) -> Result<Personality> {
        match self.profile {
            Some(p) if self.session_active => Ok(p),
            _ => Err(ValidationError::NoProfile.into()),
        }
    }

    // ── Arming ───────────────────────────────────────────────────────

    /// Arm a new alarm. `answer` must equal the arming challenge. On
    /// mismatch the challenge is kept so the same text can be retried.
    pub fn arm(&mut self, time: &str, answer: &str, now: NaiveDateTime) -> Result<Vec<Event>> {
        let profile = self.require_profile()?;
        let time: AlarmTime = time.parse()?;

        match verify(ChallengeSlot::Arm, answer, self.challenges.get(ChallengeSlot::Arm)) {
            Ok(()) => {}
            Err(CoreError::Challenge(ChallengeError::Missing { slot })) => {
                self.challenges.rotate(slot, profile);
                return Err(ChallengeError::Mismatch {
                    slot,
                    rotated: true,
                }
                .into());
            }
            Err(err) => return Err(err),
        }

        let alarm = self
            .registry
            .add(time, self.settings.default_label.clone(), now)
            .clone();
        self.counters.total_alarms_set += 1;
        self.store
            .save_counter(Counter::TotalAlarmsSet, self.counters.total_alarms_set);
        self.store.save_alarms(self.registry.alarms());
        tracing::info!(id = alarm.id, time = %alarm.time, "alarm armed");

        let mut events = vec![Event::AlarmAdded { alarm, at: now }];
        self.engage_lock(now, &mut events);
        if self.lock.is_locked() {
            events.push(Event::Notice {
                message: "Sleep mode activated! Your phone is now locked.".to_string(),
            });
        }
        let text = self.challenges.rotate(ChallengeSlot::Arm, profile);
        events.push(Event::ChallengeIssued {
            slot: ChallengeSlot::Arm,
            text: text.to_string(),
        });
        Ok(events)
    }

    // ── Ringing alarm ────────────────────────────────────────────────

    /// Dismiss the ringing alarm. On mismatch a new aphorism from the same
    /// pool replaces the old one.
    pub fn dismiss(&mut self, answer: &str, now: NaiveDateTime) -> Result<Vec<Event>> {
        let profile = self.require_profile()?;
        match verify(
            ChallengeSlot::Dismiss,
            answer,
            self.challenges.get(ChallengeSlot::Dismiss),
        ) {
            Ok(()) => {}
            Err(CoreError::Challenge(ChallengeError::Mismatch { slot, .. })) => {
                self.challenges.rotate(slot, profile);
                tracing::info!("dismissal rejected, challenge rotated");
                return Err(ChallengeError::Mismatch {
                    slot,
                    rotated: true,
                }
                .into());
            }
            Err(err) => return Err(err),
        }

        let id = self.firing.take();
        self.challenges.clear(ChallengeSlot::Dismiss);
        self.counters.alarms_completed += 1;
        self.store
            .save_counter(Counter::AlarmsCompleted, self.counters.alarms_completed);
        // Resets every triggered alarm, not just the one that rang.
        self.registry.clear_all_triggered();
        self.store.save_alarms(self.registry.alarms());
        tracing::info!(?id, "alarm dismissed");

        let mut events = vec![Event::AlarmDismissed { id, at: now }];
        let text = self.challenges.rotate(ChallengeSlot::Arm, profile);
        events.push(Event::ChallengeIssued {
            slot: ChallengeSlot::Arm,
            text: text.to_string(),
        });
        self.reconcile_lock(now, &mut events);
        Ok(events)
    }

    /// Push the ringing alarm back by the configured snooze length and
    /// re-engage the lock. No challenge required.
    pub fn snooze(&mut self, now: NaiveDateTime) -> Result<Vec<Event>> {
        let id = self.firing.ok_or(ValidationError::NoFiringAlarm)?;
        self.firing = None;
        self.challenges.clear(ChallengeSlot::Dismiss);
        self.counters.snooze_count += 1;
        self.store
            .save_counter(Counter::SnoozeCount, self.counters.snooze_count);

        let minutes = self.settings.snooze_minutes;
        let time = AlarmTime::after(now, minutes);
        let mut events = Vec::new();
        if self.registry.snooze(id, time).is_some() {
            self.store.save_alarms(self.registry.alarms());
            tracing::info!(id, %time, "alarm snoozed");
            events.push(Event::AlarmSnoozed {
                id,
                time,
                minutes,
                at: now,
            });
            self.engage_lock(now, &mut events);
            events.push(Event::Notice {
                message: format!(
                    "Alarm snoozed for {minutes} minutes. New alarm time: {}",
                    time.display_12h()
                ),
            });
        } else {
            tracing::warn!(id, "snoozed alarm no longer exists");
            events.push(Event::AlarmDismissed {
                id: Some(id),
                at: now,
            });
            self.reconcile_lock(now, &mut events);
        }
        Ok(events)
    }

    // ── Escape hatches ───────────────────────────────────────────────

    /// Manual deactivation. Only acts while locked; counts against the user.
    pub fn deactivate(&mut self, now: NaiveDateTime) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.lock.is_locked() {
            return events;
        }
        self.counters.deactivation_count += 1;
        let count = self.counters.deactivation_count;
        self.store.save_counter(Counter::DeactivationCount, count);
        self.release_lock(ReleaseReason::Deactivated, now, &mut events);
        let cleared = self.clear_alarms();
        events.push(Event::Deactivated { count, at: now });
        events.push(Event::AlarmsCleared { count: cleared, at: now });
        events.push(Event::Notice {
            message: format!("Sleep mode deactivated. (Deactivation count: {count})"),
        });
        events
    }

    /// Developer override: release and clear everything, no counters.
    pub fn developer_override(&mut self, now: NaiveDateTime) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.lock.is_locked() {
            events.push(Event::DeveloperOverride {
                released: false,
                cleared: 0,
                at: now,
            });
            events.push(Event::Notice {
                message: "Developer mode: Sleep lock is not active.".to_string(),
            });
            return events;
        }
        tracing::warn!("developer override used");
        self.release_lock(ReleaseReason::DeveloperOverride, now, &mut events);
        let cleared = self.clear_alarms();
        events.push(Event::DeveloperOverride {
            released: true,
            cleared,
            at: now,
        });
        events.push(Event::AlarmsCleared { count: cleared, at: now });
        events.push(Event::Notice {
            message: "Developer mode: Sleep lock deactivated. All alarms cleared.".to_string(),
        });
        events
    }

    fn clear_alarms(&mut self) -> usize {
        let cleared = self.registry.clear_all();
        self.store.save_alarms(self.registry.alarms());
        cleared
    }

    // ── Alarm list ───────────────────────────────────────────────────

    pub fn toggle(&mut self, id: AlarmId, now: NaiveDateTime) -> Result<Vec<Event>> {
        let enabled = self
            .registry
            .toggle(id)
            .map(|a| a.enabled)
            .ok_or(ValidationError::UnknownAlarm { id })?;
        self.store.save_alarms(self.registry.alarms());
        let mut events = vec![Event::AlarmToggled {
            id,
            enabled,
            at: now,
        }];
        if self.registry.has_armed() {
            self.engage_lock(now, &mut events);
        } else {
            self.release_lock(ReleaseReason::NoArmedAlarms, now, &mut events);
        }
        Ok(events)
    }

    pub fn remove(&mut self, id: AlarmId, now: NaiveDateTime) -> Result<Vec<Event>> {
        self.registry
            .remove(id)
            .ok_or(ValidationError::UnknownAlarm { id })?;
        self.store.save_alarms(self.registry.alarms());
        let mut events = vec![Event::AlarmRemoved { id, at: now }];
        if !self.registry.has_armed() {
            self.release_lock(ReleaseReason::NoArmedAlarms, now, &mut events);
        }
        Ok(events)
    }

    // ── Lock plumbing ────────────────────────────────────────────────

    fn engage_lock(&mut self, now: NaiveDateTime, events: &mut Vec<Event>) {
        if let Some(event) = self.lock.engage(now) {
            self.store.save_lock_state(true);
            events.push(event);
        }
    }

    fn release_lock(&mut self, reason: ReleaseReason, now: NaiveDateTime, events: &mut Vec<Event>) {
        if let Some(event) = self.lock.release(reason, now) {
            self.store.save_lock_state(false);
            events.push(event);
        }
    }

    /// Re-establish the lock invariant after a registry mutation.
    fn reconcile_lock(&mut self, now: NaiveDateTime, events: &mut Vec<Event>) {
        if !self.registry.has_armed() {
            self.release_lock(ReleaseReason::NoArmedAlarms, now, events);
        } else if self.firing.is_none() {
            self.engage_lock(now, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, MemoryStore};
    use chrono::{Duration, NaiveDate};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn app() -> AlarmApp<MemoryStore> {
        let mut app = AlarmApp::with_generator(
            MemoryStore::new(),
            &Config::default(),
            ChallengeGenerator::seeded(11),
        );
        app.boot(at(22, 0, 0));
        app.submit_quiz(Some("openness"), at(22, 0, 0)).unwrap();
        app
    }

    fn arm(app: &mut AlarmApp<MemoryStore>, time: &str, now: NaiveDateTime) -> AlarmId {
        let answer = app.challenge(ChallengeSlot::Arm).unwrap();
        let events = app.arm(time, answer, now).unwrap();
        match &events[0] {
            Event::AlarmAdded { alarm, .. } => alarm.id,
            other => panic!("expected AlarmAdded, got {other:?}"),
        }
    }

    #[test]
    fn boot_without_profile_requires_quiz() {
        let mut app = AlarmApp::open(MemoryStore::new(), &Config::default());
        assert_eq!(app.boot(at(22, 0, 0)), vec![Event::QuizRequired]);
        assert!(!app.session_active());
        assert!(app.tick(at(22, 0, 1)).is_empty());
    }

    #[test]
    fn quiz_requires_a_known_selection() {
        let mut app = AlarmApp::open(MemoryStore::new(), &Config::default());
        assert!(matches!(
            app.submit_quiz(None, at(22, 0, 0)),
            Err(CoreError::Validation(ValidationError::NoSelection))
        ));
        assert!(matches!(
            app.submit_quiz(Some("balanced"), at(22, 0, 0)),
            Err(CoreError::Validation(ValidationError::UnknownPersonality(_)))
        ));
        let events = app.submit_quiz(Some("neuroticism"), at(22, 0, 0)).unwrap();
        assert!(events.contains(&Event::ProfileSet {
            personality: Personality::Neuroticism
        }));
        assert_eq!(
            app.scores().unwrap(),
            BigFiveScores::for_selection(Personality::Neuroticism)
        );
        assert!(app.challenge(ChallengeSlot::Arm).is_some());
    }

    #[test]
    fn arming_locks_and_counts() {
        let mut app = app();
        arm(&mut app, "07:00", at(22, 0, 0));
        assert!(app.is_locked());
        assert_eq!(app.counters().total_alarms_set, 1);
        assert_eq!(app.store().raw(keys::SLEEP_LOCK_ACTIVE), Some("true"));
        assert_eq!(app.store().raw(keys::TOTAL_ALARMS_SET), Some("1"));
    }

    #[test]
    fn arm_mismatch_keeps_challenge_and_registry() {
        let mut app = app();
        let before = app.challenge(ChallengeSlot::Arm);
        let err = app.arm("07:00", "wrong text", at(22, 0, 0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Challenge(ChallengeError::Mismatch {
                rotated: false,
                ..
            })
        ));
        assert_eq!(app.challenge(ChallengeSlot::Arm), before);
        assert!(app.alarms().is_empty());
        assert!(!app.is_locked());
    }

    #[test]
    fn arm_validates_time_before_challenge() {
        let mut app = app();
        let answer = app.challenge(ChallengeSlot::Arm).unwrap();
        assert!(matches!(
            app.arm("", answer, at(22, 0, 0)),
            Err(CoreError::Validation(ValidationError::EmptyTime))
        ));
        assert!(matches!(
            app.arm("7pm", answer, at(22, 0, 0)),
            Err(CoreError::Validation(ValidationError::InvalidTime { .. }))
        ));
        assert!(matches!(
            app.arm("07:00", "  ", at(22, 0, 0)),
            Err(CoreError::Validation(ValidationError::EmptyInput(_)))
        ));
        assert_eq!(app.counters().total_alarms_set, 0);
    }

    #[test]
    fn firing_releases_and_issues_dismiss_challenge() {
        let mut app = app();
        let id = arm(&mut app, "07:00", at(22, 0, 0));
        let events = app.tick(at(7, 0, 0) + Duration::days(1));
        assert!(!app.is_locked());
        assert_eq!(app.firing(), Some(id));
        assert!(app.challenge(ChallengeSlot::Dismiss).is_some());
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SleepLockReleased {
                reason: ReleaseReason::AlarmFired,
                ..
            }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AlarmFired { message, .. } if message == "Wake up! - 7:00 AM"
        )));
    }

    #[test]
    fn dismiss_mismatch_rotates_challenge() {
        let mut app = app();
        arm(&mut app, "07:00", at(22, 0, 0));
        let morning = at(7, 0, 0) + Duration::days(1);
        app.tick(morning);

        let mut rotated = false;
        for _ in 0..20 {
            let before = app.challenge(ChallengeSlot::Dismiss).unwrap();
            let result = app.dispatch(
                Inbound::DismissSubmitted {
                    answer: "not it".into(),
                },
                morning,
            );
            assert!(matches!(
                result.events[0],
                Event::ChallengeRejected { rotated: true, .. }
            ));
            assert!(matches!(result.events[1], Event::ChallengeIssued { .. }));
            rotated |= app.challenge(ChallengeSlot::Dismiss).unwrap() != before;
        }
        assert!(rotated, "challenge text never changed");
        assert_eq!(app.counters().alarms_completed, 0);
    }

    #[test]
    fn dismiss_success_clears_triggered_and_relocks() {
        let mut app = app();
        arm(&mut app, "07:00", at(22, 0, 0));
        let morning = at(7, 0, 10) + Duration::days(1);
        app.tick(morning);

        let answer = app.challenge(ChallengeSlot::Dismiss).unwrap();
        let events = app.dismiss(answer, morning).unwrap();
        assert_eq!(app.counters().alarms_completed, 1);
        assert!(app.alarms().iter().all(|a| !a.triggered));
        assert_eq!(app.challenge(ChallengeSlot::Dismiss), None);
        assert_eq!(app.firing(), None);
        assert!(app.is_locked());
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SleepLockEngaged { .. })));
        // Same minute: the dismissed alarm must not ring again.
        assert!(app
            .tick(morning + Duration::seconds(20))
            .iter()
            .all(|e| !matches!(e, Event::AlarmFired { .. })));
    }

    #[test]
    fn missing_dismiss_challenge_is_reported_inline() {
        let mut app = app();
        let result = app.dispatch(
            Inbound::DismissSubmitted {
                answer: "anything".into(),
            },
            at(22, 0, 0),
        );
        assert_eq!(
            result.events,
            vec![Event::InlineError {
                slot: Some(ChallengeSlot::Dismiss),
                message: "Error: No aphorism loaded. Please refresh the page.".into(),
            }]
        );
    }

    #[test]
    fn unrecoverable_errors_surface_without_a_slot() {
        let app = app();
        let events = app.error_events(crate::error::DatabaseError::Locked.into());
        assert!(matches!(
            events.as_slice(),
            [Event::InlineError { slot: None, message }] if message.starts_with("Database error")
        ));
    }

    #[test]
    fn snooze_without_ringing_alarm_is_rejected() {
        let mut app = app();
        assert!(matches!(
            app.snooze(at(22, 0, 0)),
            Err(CoreError::Validation(ValidationError::NoFiringAlarm))
        ));
        assert_eq!(app.counters().snooze_count, 0);
    }

    #[test]
    fn toggle_and_remove_maintain_invariant() {
        let mut app = app();
        let id = arm(&mut app, "07:00", at(22, 0, 0));
        app.toggle(id, at(22, 1, 0)).unwrap();
        assert!(!app.is_locked());
        app.toggle(id, at(22, 2, 0)).unwrap();
        assert!(app.is_locked());
        app.remove(id, at(22, 3, 0)).unwrap();
        assert!(!app.is_locked());
        assert!(matches!(
            app.remove(id, at(22, 3, 0)),
            Err(CoreError::Validation(ValidationError::UnknownAlarm { .. }))
        ));
    }

    #[test]
    fn arming_while_ringing_locks() {
        let mut app = app();
        let first = arm(&mut app, "07:00", at(22, 0, 0));
        let morning = at(7, 0, 5) + Duration::days(1);
        app.tick(morning);
        assert_eq!(app.firing(), Some(first));
        assert!(!app.is_locked());

        let answer = app.challenge(ChallengeSlot::Arm).unwrap();
        let events = app
            .arm("08:00", answer, morning + Duration::seconds(15))
            .unwrap();
        assert!(app.is_locked());
        assert!(app.lock().guards_installed());
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SleepLockEngaged { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Notice { message } if message.contains("now locked")
        )));
        // The ringing alarm can still be dismissed.
        assert_eq!(app.firing(), Some(first));
        let answer = app.challenge(ChallengeSlot::Dismiss).unwrap();
        app.dismiss(answer, morning + Duration::seconds(30)).unwrap();
        assert!(app.is_locked());
    }

    #[test]
    fn toggling_on_while_ringing_locks() {
        let mut app = app();
        let first = arm(&mut app, "07:00", at(22, 0, 0));
        let second = arm(&mut app, "09:00", at(22, 0, 0));
        app.toggle(second, at(22, 1, 0)).unwrap();
        let morning = at(7, 0, 5) + Duration::days(1);
        app.tick(morning);
        assert_eq!(app.firing(), Some(first));
        assert!(!app.is_locked());

        app.toggle(second, morning + Duration::seconds(5)).unwrap();
        assert!(app.is_locked());

        // Removing a ringing alarm while another is armed does not release.
        app.remove(first, morning + Duration::seconds(10)).unwrap();
        assert!(app.is_locked());
        app.remove(second, morning + Duration::seconds(15)).unwrap();
        assert!(!app.is_locked());
    }

    #[test]
    fn refocus_runs_on_its_own_poll() {
        let mut app = app();
        arm(&mut app, "07:00", at(22, 0, 0));
        app.focus_lost(FocusLoss::Blur, at(22, 1, 0));
        assert!(app.poll_focus(at(22, 1, 0)).is_empty());
        let events = app.poll_focus(at(22, 1, 0) + Duration::milliseconds(100));
        assert_eq!(events.len(), 1);
        assert!(app.poll_focus(at(22, 1, 1)).is_empty());
    }

    #[test]
    fn deactivate_is_noop_when_unlocked() {
        let mut app = app();
        assert!(app.deactivate(at(22, 0, 0)).is_empty());
        assert_eq!(app.counters().deactivation_count, 0);
    }

    #[test]
    fn return_to_quiz_tears_down_session() {
        let mut app = app();
        arm(&mut app, "07:00", at(22, 0, 0));
        let events = app.return_to_quiz(at(22, 5, 0));
        assert!(events.contains(&Event::QuizRequired));
        assert!(!app.is_locked());
        assert!(!app.lock().guards_installed());
        assert_eq!(app.profile(), None);
        assert_eq!(app.challenge(ChallengeSlot::Arm), None);
        assert_eq!(app.alarms().len(), 1);
        assert!(app.tick(at(7, 0, 0) + Duration::days(1)).is_empty());

        app.submit_quiz(Some("openness"), at(22, 6, 0)).unwrap();
        assert!(app.is_locked());
        assert_eq!(app.lock().install_count(), 2);
    }

    #[test]
    fn reopening_restores_state_and_lock() {
        let mut app = app();
        arm(&mut app, "07:00", at(22, 0, 0));
        let store = app.store.into_inner();

        let mut reopened = AlarmApp::open(store, &Config::default());
        reopened.boot(at(22, 10, 0));
        assert!(reopened.session_active());
        assert!(reopened.is_locked());
        assert_eq!(reopened.alarms().len(), 1);
        assert_eq!(reopened.counters().total_alarms_set, 1);
    }

    #[test]
    fn countdown_reported_while_locked() {
        let mut app = app();
        let id = arm(&mut app, "07:00", at(22, 0, 0));
        let events = app.tick(at(22, 0, 0));
        assert!(events.contains(&Event::Countdown {
            next_alarm: id,
            remaining_secs: 9 * 3600,
            display: "09:00:00".into(),
        }));
    }

    #[test]
    fn dispatch_routes_input_verdicts() {
        let mut app = app();
        arm(&mut app, "07:00", at(22, 0, 0));
        let typing = crate::lock::KeyInput::down(
            "x",
            crate::lock::Modifiers::default(),
            crate::lock::Target::Document,
        );
        let result = app.dispatch(Inbound::Key(typing), at(22, 1, 0));
        assert!(!result.verdict.is_allowed());
        assert!(result.events.is_empty());
    }
}
