//! Input-blocking rules applied while the sleep lock is held.
//!
//! Every keyboard and mouse event is classified before anything else sees
//! it. The allow-list is: the developer unlock combo, anything aimed at the
//! ringing-alarm dialog while it is shown, and the deactivation control.

use serde::{Deserialize, Serialize};

/// What an input event is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Anywhere else on the page.
    Document,
    /// The full-screen lock overlay (countdown, deactivation area).
    LockOverlay,
    /// The manual deactivation button.
    DeactivationControl,
    /// The ringing-alarm dialog body.
    AlarmDialog,
    /// The aphorism field inside the alarm dialog.
    ChallengeInput,
    /// Dismiss or snooze buttons inside the alarm dialog.
    AlarmControl,
    /// The alarm list and the arming form, hidden under the overlay.
    AlarmList,
}

impl Target {
    fn in_alarm_dialog(self) -> bool {
        matches!(
            self,
            Target::AlarmDialog | Target::ChallengeInput | Target::AlarmControl
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

/// A keyboard event as the page sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub phase: KeyPhase,
    /// Key name, e.g. `"a"`, `"D"`, `"Tab"`, `"F5"`.
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub target: Target,
}

impl KeyInput {
    pub fn down(key: impl Into<String>, modifiers: Modifiers, target: Target) -> Self {
        Self {
            phase: KeyPhase::Down,
            key: key.into(),
            modifiers,
            target,
        }
    }

    /// Meta+Shift+D, the developer override combo.
    pub fn is_developer_combo(&self) -> bool {
        self.modifiers.meta && self.modifiers.shift && self.key == "D"
    }

    fn command_held(&self) -> bool {
        self.modifiers.meta || self.modifiers.ctrl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseKind {
    Down,
    Up,
    Click,
    ContextMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseInput {
    pub kind: MouseKind,
    pub target: Target,
}

/// Browser shortcuts preempted while locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shortcut {
    CloseTab,
    NewTab,
    NewWindow,
    SwitchTab,
}

impl Shortcut {
    pub fn detect(key: &KeyInput) -> Option<Shortcut> {
        if !key.command_held() {
            return None;
        }
        match key.key.as_str() {
            "w" => Some(Shortcut::CloseTab),
            "t" => Some(Shortcut::NewTab),
            "n" => Some(Shortcut::NewWindow),
            "Tab" => Some(Shortcut::SwitchTab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SuppressReason {
    Shortcut { shortcut: Shortcut },
    CommandCombo,
    AltCombo,
    ReservedKey,
    Locked,
}

/// Decision for one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum Verdict {
    Allow,
    /// Default action and propagation both suppressed.
    Suppress { why: SuppressReason },
}

impl Verdict {
    pub fn is_allowed(self) -> bool {
        self == Verdict::Allow
    }

    fn suppress(why: SuppressReason) -> Self {
        Verdict::Suppress { why }
    }
}

/// Keys that are never passed through while locked.
const RESERVED_KEYS: &[&str] = &[
    "Tab", "Meta", "Alt", "Control", "Shift", "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8",
    "F9", "F10", "F11", "F12",
];

/// Classify a key event under the lock. `dialog_open` is true while the
/// ringing-alarm dialog is shown.
pub fn classify_key(key: &KeyInput, dialog_open: bool) -> Verdict {
    if key.is_developer_combo() {
        return Verdict::Allow;
    }
    if key.target == Target::DeactivationControl {
        return Verdict::Allow;
    }
    if dialog_open && key.target.in_alarm_dialog() {
        return Verdict::Allow;
    }
    if let Some(shortcut) = Shortcut::detect(key) {
        return Verdict::suppress(SuppressReason::Shortcut { shortcut });
    }
    if key.command_held() {
        return Verdict::suppress(SuppressReason::CommandCombo);
    }
    if key.modifiers.alt {
        return Verdict::suppress(SuppressReason::AltCombo);
    }
    if RESERVED_KEYS.contains(&key.key.as_str()) {
        return Verdict::suppress(SuppressReason::ReservedKey);
    }
    Verdict::suppress(SuppressReason::Locked)
}

/// Classify a mouse event under the lock. Clicks on the overlay itself stay
/// live so the deactivation area keeps working.
pub fn classify_mouse(mouse: MouseInput, dialog_open: bool) -> Verdict {
    match mouse.target {
        Target::DeactivationControl => Verdict::Allow,
        t if dialog_open && t.in_alarm_dialog() => Verdict::Allow,
        Target::LockOverlay if mouse.kind != MouseKind::ContextMenu => Verdict::Allow,
        _ => Verdict::suppress(SuppressReason::Locked),
    }
}
