//! Terminal implementations of the core's platform collaborators.

use std::io::{IsTerminal, Write};

use sleeplock_core::{
    Alarm, AlarmRenderer, AudioSignal, Config, Fullscreen, Notifier, Platform, PlatformError,
};

use crate::commands::alarm::print_list;

pub fn platform(config: &Config) -> Platform {
    Platform {
        renderer: Box::new(ListRenderer),
        audio: Box::new(Bell::new(config.notifications.bell)),
        notifier: Box::new(StderrNotifier),
        fullscreen: Box::new(AltScreen::default()),
        notifications_enabled: config.notifications.enabled,
    }
}

struct ListRenderer;

impl AlarmRenderer for ListRenderer {
    fn render(&mut self, alarms: &[Alarm]) {
        println!();
        print_list(alarms);
    }
}

/// Terminal bell. The run loop calls [`ring`] once per tick while playing.
pub struct Bell {
    enabled: bool,
    playing: bool,
}

impl Bell {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            playing: false,
        }
    }
}

impl AudioSignal for Bell {
    fn start(&mut self) {
        if !self.playing {
            self.playing = true;
            ring(self.enabled);
        }
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

pub fn ring(enabled: bool) {
    if enabled {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<(), PlatformError> {
        let mut err = std::io::stderr();
        writeln!(err, "[{title}] {body}").map_err(|e| PlatformError::Failed(e.to_string()))
    }
}

/// The alternate screen stands in for fullscreen.
#[derive(Default)]
struct AltScreen {
    active: bool,
}

impl AltScreen {
    fn write(&mut self, seq: &[u8]) -> Result<(), PlatformError> {
        let mut out = std::io::stdout();
        if !out.is_terminal() {
            return Err(PlatformError::Unsupported);
        }
        out.write_all(seq)
            .and_then(|()| out.flush())
            .map_err(|e| PlatformError::Failed(e.to_string()))
    }
}

impl Fullscreen for AltScreen {
    fn enter(&mut self) -> Result<(), PlatformError> {
        if self.active {
            return Ok(());
        }
        self.write(b"\x1b[?1049h\x1b[H")?;
        self.active = true;
        Ok(())
    }

    fn exit(&mut self) -> Result<(), PlatformError> {
        if !self.active {
            return Ok(());
        }
        self.write(b"\x1b[?1049l")?;
        self.active = false;
        Ok(())
    }
}

impl Drop for AltScreen {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}
