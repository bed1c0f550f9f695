use clap::Args;
use sleeplock_core::stats::times;

use super::{open_app, CliResult};

#[derive(Args)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatsArgs) -> CliResult {
    let (app, _) = open_app()?;
    let report = app.analytics();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let c = report.counters;
    println!("Alarms set:       {}", c.total_alarms_set);
    println!("Alarms completed: {}", c.alarms_completed);
    println!("Success rate:     {}%", report.success_rate);
    println!("Snoozed:          {}", times(c.snooze_count));
    println!("Deactivated:      {}", times(c.deactivation_count));
    println!();
    for line in &report.insights {
        println!("- {line}");
    }
    Ok(())
}
