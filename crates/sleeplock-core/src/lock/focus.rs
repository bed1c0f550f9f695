//! Focus retention while locked.
//!
//! Losing window focus or page visibility schedules a single delayed attempt
//! to take focus back. The attempt is consumed when it runs; nothing
//! reschedules it except another blur or hide.

use chrono::{Duration, NaiveDateTime};

pub const DEFAULT_REFOCUS_DELAY_MS: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusLoss {
    /// Window lost focus.
    Blur,
    /// Page became hidden (tab switch). Also re-enters fullscreen.
    Hidden,
}

/// A due refocus attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refocus {
    pub reenter_fullscreen: bool,
}

#[derive(Debug, Clone)]
pub struct FocusRetention {
    delay: Duration,
    pending: Option<(NaiveDateTime, Refocus)>,
}

impl Default for FocusRetention {
    fn default() -> Self {
        Self::new(DEFAULT_REFOCUS_DELAY_MS)
    }
}

impl FocusRetention {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay: Duration::milliseconds(delay_ms.max(0)),
            pending: None,
        }
    }

    /// Schedule a refocus. A second loss before the first attempt runs keeps
    /// the earlier deadline but upgrades it to re-enter fullscreen if needed.
    pub fn lost(&mut self, loss: FocusLoss, now: NaiveDateTime) {
        let reenter = loss == FocusLoss::Hidden;
        match &mut self.pending {
            Some((_, refocus)) => refocus.reenter_fullscreen |= reenter,
            None => {
                self.pending = Some((
                    now + self.delay,
                    Refocus {
                        reenter_fullscreen: reenter,
                    },
                ))
            }
        }
    }

    /// Take the pending attempt if its deadline has passed.
    pub fn due(&mut self, now: NaiveDateTime) -> Option<Refocus> {
        match self.pending {
            Some((deadline, refocus)) if now >= deadline => {
                self.pending = None;
                Some(refocus)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap()
    }

    #[test]
    fn attempt_runs_once_after_delay() {
        let mut focus = FocusRetention::default();
        let t = base();
        focus.lost(FocusLoss::Blur, t);
        assert_eq!(focus.due(t + Duration::milliseconds(50)), None);
        assert_eq!(
            focus.due(t + Duration::milliseconds(100)),
            Some(Refocus {
                reenter_fullscreen: false
            })
        );
        assert_eq!(focus.due(t + Duration::seconds(5)), None);
    }

    #[test]
    fn repeated_losses_do_not_stack() {
        let mut focus = FocusRetention::default();
        let t = base();
        focus.lost(FocusLoss::Blur, t);
        focus.lost(FocusLoss::Hidden, t + Duration::milliseconds(10));
        let refocus = focus.due(t + Duration::milliseconds(100)).unwrap();
        assert!(refocus.reenter_fullscreen);
        assert!(!focus.is_pending());
    }

    #[test]
    fn cancel_drops_pending_attempt() {
        let mut focus = FocusRetention::default();
        focus.lost(FocusLoss::Hidden, base());
        focus.cancel();
        assert_eq!(focus.due(base() + Duration::seconds(1)), None);
    }
}
