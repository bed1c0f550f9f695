//! Typed-aphorism comparison shared by the arming and dismissal paths.

use crate::error::{ChallengeError, CoreError, Result, ValidationError};

use super::ChallengeSlot;

/// Compare typed input against the displayed challenge.
///
/// Input is trimmed; the comparison is otherwise exact (case and
/// punctuation sensitive).
pub fn matches(input: &str, challenge: &str) -> bool {
    input.trim() == challenge
}

/// Validate an attempt against the challenge in `slot`.
///
/// Order of checks: empty slot, empty input, mismatch. The caller decides
/// what happens to the challenge on mismatch.
pub fn verify(slot: ChallengeSlot, input: &str, challenge: Option<&str>) -> Result<()> {
    let challenge = challenge.ok_or(ChallengeError::Missing { slot })?;
    if input.trim().is_empty() {
        return Err(ValidationError::EmptyInput(slot.empty_input_message()).into());
    }
    if matches(input, challenge) {
        Ok(())
    } else {
        Err(CoreError::Challenge(ChallengeError::Mismatch {
            slot,
            rotated: false,
        }))
    }
}
