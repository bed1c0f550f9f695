use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::alarm::{Alarm, AlarmId, AlarmTime};
use crate::challenge::{ChallengeSlot, Personality};

/// Why the lock was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    AlarmFired,
    Deactivated,
    DeveloperOverride,
    /// No enabled, untriggered alarm remains.
    NoArmedAlarms,
    /// The user went back to the personality quiz.
    SessionReset,
}

/// Every state change in the system produces an Event.
/// The front-end applies them to its collaborators (see `platform`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SleepLockEngaged {
        fullscreen: bool,
        at: NaiveDateTime,
    },
    SleepLockReleased {
        reason: ReleaseReason,
        fullscreen: bool,
        at: NaiveDateTime,
    },
    /// A delayed attempt to win back focus after blur or hide.
    RefocusRequested {
        reenter_fullscreen: bool,
        at: NaiveDateTime,
    },
    AlarmAdded {
        alarm: Alarm,
        at: NaiveDateTime,
    },
    AlarmRemoved {
        id: AlarmId,
        at: NaiveDateTime,
    },
    AlarmToggled {
        id: AlarmId,
        enabled: bool,
        at: NaiveDateTime,
    },
    AlarmsCleared {
        count: usize,
        at: NaiveDateTime,
    },
    /// An alarm reached its minute. The front-end shows the dialog, starts
    /// the tone and sends a notification.
    AlarmFired {
        alarm: Alarm,
        message: String,
        challenge: Option<String>,
        at: NaiveDateTime,
    },
    AlarmDismissed {
        id: Option<AlarmId>,
        at: NaiveDateTime,
    },
    AlarmSnoozed {
        id: AlarmId,
        time: AlarmTime,
        minutes: u32,
        at: NaiveDateTime,
    },
    ChallengeIssued {
        slot: ChallengeSlot,
        text: String,
    },
    /// Typed aphorism did not match. `rotated` means a new text is showing.
    ChallengeRejected {
        slot: ChallengeSlot,
        message: String,
        rotated: bool,
    },
    /// Attempt rejected before anything changed, or slot unexpectedly empty.
    InlineError {
        slot: Option<ChallengeSlot>,
        message: String,
    },
    Deactivated {
        count: u64,
        at: NaiveDateTime,
    },
    DeveloperOverride {
        released: bool,
        cleared: usize,
        at: NaiveDateTime,
    },
    /// Short-lived toast text.
    Notice {
        message: String,
    },
    ProfileSet {
        personality: Personality,
    },
    /// No profile is stored; the quiz must be shown.
    QuizRequired,
    Countdown {
        next_alarm: AlarmId,
        remaining_secs: i64,
        display: String,
    },
}

impl Event {
    /// Events after which the alarm list must be re-rendered.
    pub fn changes_alarm_list(&self) -> bool {
        matches!(
            self,
            Event::AlarmAdded { .. }
                | Event::AlarmRemoved { .. }
                | Event::AlarmToggled { .. }
                | Event::AlarmsCleared { .. }
                | Event::AlarmFired { .. }
                | Event::AlarmDismissed { .. }
                | Event::AlarmSnoozed { .. }
                | Event::QuizRequired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::Notice {
            message: "hello".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Notice");
        assert_eq!(json["message"], "hello");
    }

    #[test]
    fn release_reason_is_snake_case() {
        let json = serde_json::to_string(&ReleaseReason::DeveloperOverride).unwrap();
        assert_eq!(json, "\"developer_override\"");
    }

    #[test]
    fn list_changing_events() {
        assert!(Event::QuizRequired.changes_alarm_list());
        assert!(!Event::Notice {
            message: String::new()
        }
        .changes_alarm_list());
    }
}
