use clap::Args;
use sleeplock_core::{Personality, ValidationError};

use super::{now, open_app, print_events, read_line, CliResult};

#[derive(Args)]
pub struct QuizArgs {
    /// Skip the prompt (extraversion, conscientiousness, agreeableness,
    /// neuroticism, openness)
    #[arg(long)]
    pub personality: Option<String>,
}

pub fn run(args: QuizArgs) -> CliResult {
    let selection = match args.personality {
        Some(p) => Some(p),
        None => prompt()?,
    };

    let (mut app, _) = open_app()?;
    let events = app.submit_quiz(selection.as_deref(), now())?;
    if let Some(personality) = app.profile() {
        println!("Profile saved: {personality}");
    }
    print_events(&events);
    Ok(())
}

/// Ask for a statement by number or name.
fn prompt() -> CliResult<Option<String>> {
    println!("Which statement best describes you?");
    for (i, p) in Personality::ALL.iter().enumerate() {
        println!("  {}. {}", i + 1, p.statement());
    }
    let Some(answer) = read_line()? else {
        return Err(ValidationError::NoSelection.into());
    };
    let answer = answer.trim();
    let by_number = answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| Personality::ALL.get(i));
    Ok(match by_number {
        Some(p) => Some(p.as_str().to_string()),
        None if answer.is_empty() => None,
        None => Some(answer.to_string()),
    })
}
