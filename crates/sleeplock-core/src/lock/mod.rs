mod controller;
mod developer;
mod focus;
mod input;

pub use controller::{KeyOutcome, LockSettings, LockState, SleepLockController};
pub use developer::DeveloperOverride;
pub use focus::{FocusLoss, FocusRetention, Refocus};
pub use input::{
    classify_key, classify_mouse, KeyInput, KeyPhase, Modifiers, MouseInput, MouseKind, Shortcut,
    SuppressReason, Target, Verdict,
};
