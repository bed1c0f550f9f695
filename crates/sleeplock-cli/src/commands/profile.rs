//! Personality profile commands.

use clap::Subcommand;
use serde::Serialize;
use sleeplock_core::{BigFiveScores, Personality};

use super::{now, open_app, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the stored personality and trait scores
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Forget the profile; the quiz must be retaken before alarms run
    Reset,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView {
    personality: Option<Personality>,
    big_five_scores: Option<BigFiveScores>,
}

pub fn run(action: ProfileAction) -> CliResult {
    let (mut app, _) = open_app()?;
    match action {
        ProfileAction::Show { json } => {
            let view = ProfileView {
                personality: app.profile(),
                big_five_scores: app.scores(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }
            match view.personality {
                Some(p) => {
                    println!("Personality: {p}");
                    println!("  {}", p.statement());
                }
                None => println!("No profile. Run `sleeplock quiz`."),
            }
        }
        ProfileAction::Reset => {
            app.return_to_quiz(now());
            println!("Profile cleared. Run `sleeplock quiz` to choose again.");
        }
    }
    Ok(())
}
