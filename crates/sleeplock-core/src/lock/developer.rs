//! Developer override: a rapid repeat of the unlock combo force-releases
//! the lock without a challenge.

use std::collections::VecDeque;

use chrono::NaiveDateTime;

pub const DEFAULT_WINDOW_MS: i64 = 2_000;
pub const DEFAULT_PRESSES: usize = 3;

/// Rolling window of combo press timestamps.
#[derive(Debug, Clone)]
pub struct DeveloperOverride {
    presses: VecDeque<NaiveDateTime>,
    window_ms: i64,
    required: usize,
}

impl Default for DeveloperOverride {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS, DEFAULT_PRESSES)
    }
}

impl DeveloperOverride {
    pub fn new(window_ms: i64, required: usize) -> Self {
        Self {
            presses: VecDeque::with_capacity(required),
            window_ms,
            required: required.max(1),
        }
    }

    /// Record one press. Returns true when enough presses landed inside the
    /// window; the window is emptied in that case.
    pub fn press(&mut self, now: NaiveDateTime) -> bool {
        self.presses.push_back(now);
        self.prune(now);
        if self.presses.len() >= self.required {
            self.presses.clear();
            return true;
        }
        false
    }

    /// Presses still inside the window as of the last press.
    pub fn pending(&self) -> usize {
        self.presses.len()
    }

    fn prune(&mut self, now: NaiveDateTime) {
        let window = self.window_ms;
        self.presses
            .retain(|t| (now - *t).num_milliseconds() < window);
    }
}
