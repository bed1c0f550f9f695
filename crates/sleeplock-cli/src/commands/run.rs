//! Foreground alarm clock.
//!
//! Ticks the core on a timer and reads commands from stdin:
//! `arm HH:MM` (the next line is the aphorism), `toggle ID`, `remove ID`,
//! `snooze`, `deactivate`, `unlock` (one developer-override press),
//! `list` and `quit`. Any other line while an alarm rings is a dismissal
//! attempt.
//!
//! This session is the only writer while it runs. One-shot `alarm`
//! commands from another shell refuse to edit while locked, but edits made
//! while unlocked are overwritten by this session's next save.

use std::io::Write;
use std::time::Duration;

use sleeplock_core::lock::{KeyInput, Modifiers, Target};
use sleeplock_core::{
    AlarmApp, AlarmId, AlarmTime, ChallengeSlot, Database, Event, Inbound, Platform,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::alarm::print_list;
use super::{alarm_list_reachable, boot, now, open_app, print_challenge, print_events, CliResult};
use crate::terminal;

const LOCKED: &str = "Sleep lock is active. Type `deactivate` to give up.";

pub fn run() -> CliResult {
    let (mut app, config) = open_app()?;
    let booted = boot(&mut app)?;
    let platform = terminal::platform(&config);
    let timers = Timers {
        tick: Duration::from_millis(config.scheduler.tick_interval_ms.max(1)),
        refocus: Duration::from_millis(config.lock.refocus_delay_ms.max(1) as u64),
    };
    let bell = config.notifications.bell;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(app, platform, booted, timers, bell));
    // A pending stdin read would otherwise block shutdown.
    runtime.shutdown_background();
    result
}

struct Timers {
    tick: Duration,
    refocus: Duration,
}

enum Step {
    Continue,
    Quit,
}

struct Session {
    app: AlarmApp<Database>,
    platform: Platform,
    /// Time from `arm HH:MM`, waiting for its aphorism on the next line.
    pending_arm: Option<String>,
}

async fn session(
    app: AlarmApp<Database>,
    platform: Platform,
    booted: Vec<Event>,
    timers: Timers,
    bell: bool,
) -> CliResult {
    tracing::info!(
        tick_ms = timers.tick.as_millis() as u64,
        refocus_ms = timers.refocus.as_millis() as u64,
        "alarm clock running"
    );
    let mut session = Session {
        app,
        platform,
        pending_arm: None,
    };
    session.platform.apply(&booted, session.app.alarms());
    print_list(session.app.alarms());

    let mut ticker = tokio::time::interval(timers.tick);
    // Refocus attempts are due well inside one tick.
    let mut refocus = tokio::time::interval(timers.refocus);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = session.app.tick(now());
                session.show(&events);
                if session.platform.audio.is_playing() {
                    terminal::ring(bell);
                }
            }
            _ = refocus.tick() => {
                let events = session.app.poll_focus(now());
                session.show(&events);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Step::Quit = session.handle_line(line.trim()) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let verdict = session.app.dispatch(Inbound::Key(ctrl("c")), now()).verdict;
                if verdict.is_allowed() {
                    break;
                }
                println!("{LOCKED}");
            }
        }
    }

    session.platform.audio.stop();
    println!();
    Ok(())
}

impl Session {
    fn handle_line(&mut self, line: &str) -> Step {
        if line.is_empty() {
            return Step::Continue;
        }
        if let Some(time) = self.pending_arm.take() {
            self.submit(Inbound::ArmSubmitted {
                time,
                answer: line.to_string(),
            });
            return Step::Continue;
        }

        let (word, arg) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, a)| (w, a.trim()));
        let inbound = match (word, arg) {
            ("quit" | "exit", "") => {
                // Closing the session is the terminal's close-tab shortcut.
                let dispatch = self.app.dispatch(Inbound::Key(ctrl("w")), now());
                self.show(&dispatch.events);
                if dispatch.verdict.is_allowed() {
                    return Step::Quit;
                }
                println!("{LOCKED}");
                return Step::Continue;
            }
            ("list", "") => {
                print_list(self.app.alarms());
                return Step::Continue;
            }
            ("arm", time) => {
                self.begin_arm(time);
                return Step::Continue;
            }
            ("toggle" | "remove", id) => {
                let Some(id) = self.editable(id) else {
                    return Step::Continue;
                };
                if word == "toggle" {
                    Inbound::ToggleAlarm(id)
                } else {
                    Inbound::DeleteAlarm(id)
                }
            }
            ("snooze", "") => Inbound::SnoozePressed,
            ("deactivate", "") => Inbound::DeactivatePressed,
            ("unlock", "") => Inbound::Key(KeyInput::down(
                "D",
                Modifiers {
                    meta: true,
                    shift: true,
                    ..Modifiers::default()
                },
                Target::Document,
            )),
            _ if self.app.firing().is_some() => Inbound::DismissSubmitted {
                answer: line.to_string(),
            },
            _ => {
                println!("unknown command: {line}");
                return Step::Continue;
            }
        };
        self.submit(inbound);
        Step::Continue
    }

    fn begin_arm(&mut self, time: &str) {
        if !alarm_list_reachable(&self.app) {
            println!("{LOCKED}");
            return;
        }
        if let Err(err) = time.parse::<AlarmTime>() {
            eprintln!("{err}");
            return;
        }
        if let Some(text) = self.app.challenge(ChallengeSlot::Arm) {
            print_challenge(ChallengeSlot::Arm, text);
        }
        self.pending_arm = Some(time.to_string());
    }

    /// Parse an alarm id for an edit, refusing while the list is locked.
    fn editable(&self, id: &str) -> Option<AlarmId> {
        if !alarm_list_reachable(&self.app) {
            println!("{LOCKED}");
            return None;
        }
        match id.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                eprintln!("expected an alarm id, got '{id}'");
                None
            }
        }
    }

    fn submit(&mut self, inbound: Inbound) {
        let dispatch = self.app.dispatch(inbound, now());
        self.show(&dispatch.events);
    }

    fn show(&mut self, events: &[Event]) {
        self.platform.apply(events, self.app.alarms());
        print_events(events);
        for event in events {
            if let Event::Countdown { display, .. } = event {
                print!("\rNext alarm in {display} ");
                let _ = std::io::stdout().flush();
            }
        }
    }
}

fn ctrl(key: &str) -> KeyInput {
    KeyInput::down(
        key,
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        },
        Target::Document,
    )
}
