use clap::Subcommand;
use sleeplock_core::{Alarm, AlarmId, AlarmTime, ChallengeSlot};

use super::{
    ensure_unlocked, now, open_app, open_session, print_challenge, print_events, read_line,
    CliResult,
};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Arm a new alarm (engages the sleep lock). Prompts for the aphorism.
    Add {
        /// Wake-up time, HH:MM (24-hour)
        time: String,
    },
    /// List alarms
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete an alarm
    Remove { id: AlarmId },
    /// Enable or disable an alarm
    Toggle { id: AlarmId },
}

pub fn run(action: AlarmAction) -> CliResult {
    match action {
        AlarmAction::Add { time } => add(&time),
        AlarmAction::List { json } => {
            let (app, _) = open_app()?;
            if json {
                println!("{}", serde_json::to_string_pretty(app.alarms())?);
            } else {
                print_list(app.alarms());
            }
            Ok(())
        }
        AlarmAction::Remove { id } => {
            let (mut app, _) = open_session()?;
            ensure_unlocked(&app)?;
            app.remove(id, now())?;
            println!("Alarm {id} removed");
            Ok(())
        }
        AlarmAction::Toggle { id } => {
            let (mut app, _) = open_session()?;
            ensure_unlocked(&app)?;
            app.toggle(id, now())?;
            let state = match app.registry().get(id) {
                Some(a) if a.enabled => "enabled",
                _ => "disabled",
            };
            println!("Alarm {id} {state}");
            Ok(())
        }
    }
}

/// The aphorism is issued and answered in this process, so the user always
/// types the text they were shown.
fn add(time: &str) -> CliResult {
    let (mut app, _) = open_session()?;
    ensure_unlocked(&app)?;
    // Reject a bad time before asking for the aphorism.
    time.parse::<AlarmTime>()?;
    if let Some(text) = app.challenge(ChallengeSlot::Arm) {
        print_challenge(ChallengeSlot::Arm, text);
    }
    let answer = read_line()?.unwrap_or_default();
    let events = app.arm(time, &answer, now())?;
    print_events(&events);
    Ok(())
}

pub fn print_list(alarms: &[Alarm]) {
    if alarms.is_empty() {
        println!("No alarms set.");
        return;
    }
    for alarm in alarms {
        let state = match (alarm.enabled, alarm.triggered) {
            (_, true) => "ringing",
            (true, false) => "on",
            (false, false) => "off",
        };
        println!(
            "  [{}] {} ({})  {}  {state}",
            alarm.id,
            alarm.time,
            alarm.time.display_12h(),
            alarm.label
        );
    }
}
