//! Collaborators the core drives but does not implement.
//!
//! A front-end supplies a renderer, an audio signal, a notifier and a
//! fullscreen surface. [`Platform::apply`] translates [`Event`]s into calls
//! on them. Collaborator failures are logged and never undo core state.

use thiserror::Error;

use crate::alarm::Alarm;
use crate::events::Event;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("not supported on this platform")]
    Unsupported,

    #[error("permission denied")]
    Denied,

    #[error("{0}")]
    Failed(String),
}

/// Draws the alarm list.
pub trait AlarmRenderer {
    fn render(&mut self, alarms: &[Alarm]);
}

/// Continuous alarm tone. `start` and `stop` are idempotent.
pub trait AudioSignal {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

pub trait Notifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), PlatformError>;

    /// Short in-app message. No-op unless the front-end has a toast area.
    fn toast(&mut self, _message: &str) {}
}

pub trait Fullscreen {
    fn enter(&mut self) -> Result<(), PlatformError>;
    fn exit(&mut self) -> Result<(), PlatformError>;

    /// Bring the window back to the foreground.
    fn refocus(&mut self) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// The set of collaborators for one front-end.
pub struct Platform {
    pub renderer: Box<dyn AlarmRenderer>,
    pub audio: Box<dyn AudioSignal>,
    pub notifier: Box<dyn Notifier>,
    pub fullscreen: Box<dyn Fullscreen>,
    pub notifications_enabled: bool,
}

impl Platform {
    /// Apply a batch of events. The list is rendered at most once per batch.
    pub fn apply(&mut self, events: &[Event], alarms: &[Alarm]) {
        let mut rerender = false;
        for event in events {
            rerender |= event.changes_alarm_list();
            match event {
                Event::SleepLockEngaged {
                    fullscreen: true, ..
                } => warn_on(self.fullscreen.enter(), "enter fullscreen"),
                Event::SleepLockReleased {
                    fullscreen: true, ..
                } => warn_on(self.fullscreen.exit(), "exit fullscreen"),
                Event::RefocusRequested {
                    reenter_fullscreen, ..
                } => {
                    warn_on(self.fullscreen.refocus(), "refocus");
                    if *reenter_fullscreen {
                        warn_on(self.fullscreen.enter(), "re-enter fullscreen");
                    }
                }
                Event::AlarmFired { alarm, .. } => {
                    self.audio.start();
                    if self.notifications_enabled {
                        let body = format!("{} - {}", alarm.label, alarm.time.display_12h());
                        warn_on(self.notifier.notify("Alarm!", &body), "notify");
                    }
                }
                Event::AlarmDismissed { .. } | Event::AlarmSnoozed { .. } => self.audio.stop(),
                Event::Notice { message } => self.notifier.toast(message),
                _ => {}
            }
        }
        if rerender {
            self.renderer.render(alarms);
        }
    }
}

fn warn_on(result: Result<(), PlatformError>, action: &str) {
    if let Err(err) = result {
        tracing::warn!(%err, action, "platform call failed");
    }
}
