pub mod alarm;
pub mod config;
pub mod profile;
pub mod quiz;
pub mod run;
pub mod stats;

use std::io::BufRead;

use chrono::{Local, NaiveDateTime};
use sleeplock_core::lock::{MouseInput, MouseKind, Target};
use sleeplock_core::{AlarmApp, ChallengeSlot, Config, Database, Event};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Local wall-clock time, the only clock the core ever sees.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Open the database and load persisted state. Does not boot the session.
pub fn open_app() -> CliResult<(AlarmApp<Database>, Config)> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    Ok((AlarmApp::open(db, &config), config))
}

/// Open and boot; fails when no profile exists yet.
pub fn open_session() -> CliResult<(AlarmApp<Database>, Config)> {
    let (mut app, config) = open_app()?;
    boot(&mut app)?;
    Ok((app, config))
}

/// Boot the session, returning the events it produced.
pub fn boot(app: &mut AlarmApp<Database>) -> CliResult<Vec<Event>> {
    let events = app.boot(now());
    if events.contains(&Event::QuizRequired) {
        return Err("no personality profile; run `sleeplock quiz` first".into());
    }
    Ok(events)
}

/// Whether the alarm list and arming form are reachable, i.e. not under
/// the lock overlay.
pub fn alarm_list_reachable(app: &AlarmApp<Database>) -> bool {
    app.mouse(MouseInput {
        kind: MouseKind::Click,
        target: Target::AlarmList,
    })
    .is_allowed()
}

/// Refuse alarm edits while locked. Giving up goes through `deactivate`,
/// which is counted.
pub fn ensure_unlocked(app: &AlarmApp<Database>) -> CliResult {
    if alarm_list_reachable(app) {
        return Ok(());
    }
    Err("sleep lock is active; run `sleeplock run` and type `deactivate` to give up".into())
}

/// Read one trimmed line from stdin. `None` on EOF.
pub fn read_line() -> CliResult<Option<String>> {
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub fn print_challenge(slot: ChallengeSlot, text: &str) {
    match slot {
        ChallengeSlot::Arm => println!("Type this aphorism to set the alarm:"),
        ChallengeSlot::Dismiss => println!("Type this aphorism to dismiss (or `snooze`):"),
    }
    println!("  {text}");
}

/// Print the user-facing part of an event batch.
pub fn print_events(events: &[Event]) {
    for event in events {
        match event {
            Event::AlarmFired {
                message, challenge, ..
            } => {
                println!();
                println!("{message}");
                if let Some(text) = challenge {
                    print_challenge(ChallengeSlot::Dismiss, text);
                }
            }
            Event::ChallengeIssued {
                slot: ChallengeSlot::Dismiss,
                text,
            } => print_challenge(ChallengeSlot::Dismiss, text),
            Event::ChallengeRejected { message, .. } | Event::InlineError { message, .. } => {
                eprintln!("{message}")
            }
            Event::Notice { message } => println!("{message}"),
            Event::AlarmDismissed { .. } => println!("Alarm dismissed. Good morning!"),
            _ => {}
        }
    }
}
