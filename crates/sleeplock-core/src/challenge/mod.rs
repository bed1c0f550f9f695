//! Personality-matched aphorism challenges.
//!
//! Two independent slots exist: one gates arming a new alarm, the other
//! gates dismissing a ringing alarm. Slots live only in memory.

mod personality;
mod pool;
mod verify;

use serde::{Deserialize, Serialize};

pub use personality::{BigFiveScores, Personality};
pub use pool::{pool_for, ChallengeGenerator};
pub use verify::{matches, verify};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeSlot {
    /// Confirms intent when arming an alarm.
    Arm,
    /// Dismisses a ringing alarm.
    Dismiss,
}

impl ChallengeSlot {
    fn empty_input_message(self) -> &'static str {
        match self {
            ChallengeSlot::Arm => "Please type the aphorism to set the alarm",
            ChallengeSlot::Dismiss => "Please type the aphorism to dismiss",
        }
    }
}

/// Current contents of both challenge slots plus the generator feeding them.
#[derive(Debug, Clone, Default)]
pub struct ChallengeBook {
    generator: ChallengeGenerator,
    arm: Option<&'static str>,
    dismiss: Option<&'static str>,
}

impl ChallengeBook {
    pub fn new(generator: ChallengeGenerator) -> Self {
        Self {
            generator,
            arm: None,
            dismiss: None,
        }
    }

    pub fn get(&self, slot: ChallengeSlot) -> Option<&'static str> {
        match slot {
            ChallengeSlot::Arm => self.arm,
            ChallengeSlot::Dismiss => self.dismiss,
        }
    }

    /// Replace the slot with a fresh pick from `personality`'s pool.
    pub fn rotate(&mut self, slot: ChallengeSlot, personality: Personality) -> &'static str {
        let text = self.generator.generate_for(personality);
        *self.slot_mut(slot) = Some(text);
        text
    }

    pub fn clear(&mut self, slot: ChallengeSlot) {
        *self.slot_mut(slot) = None;
    }

    pub fn clear_all(&mut self) {
        self.arm = None;
        self.dismiss = None;
    }

    fn slot_mut(&mut self, slot: ChallengeSlot) -> &mut Option<&'static str> {
        match slot {
            ChallengeSlot::Arm => &mut self.arm,
            ChallengeSlot::Dismiss => &mut self.dismiss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_independent() {
        let mut book = ChallengeBook::new(ChallengeGenerator::seeded(9));
        let arm = book.rotate(ChallengeSlot::Arm, Personality::Openness);
        assert_eq!(book.get(ChallengeSlot::Arm), Some(arm));
        assert_eq!(book.get(ChallengeSlot::Dismiss), None);

        book.rotate(ChallengeSlot::Dismiss, Personality::Openness);
        book.clear(ChallengeSlot::Dismiss);
        assert_eq!(book.get(ChallengeSlot::Arm), Some(arm));
        assert_eq!(book.get(ChallengeSlot::Dismiss), None);

        book.clear_all();
        assert_eq!(book.get(ChallengeSlot::Arm), None);
    }
}
