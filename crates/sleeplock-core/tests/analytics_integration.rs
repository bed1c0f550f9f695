//! Integration tests for the analytics report built from app counters.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use sleeplock_core::challenge::ChallengeSlot;
use sleeplock_core::{AlarmApp, ChallengeGenerator, Config, MemoryStore};

fn night(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, day)
        .unwrap()
        .and_hms_opt(22, 0, 0)
        .unwrap()
}

fn arm(app: &mut AlarmApp<MemoryStore>, now: NaiveDateTime) {
    let answer = app.challenge(ChallengeSlot::Arm).unwrap().to_string();
    app.arm("07:00", &answer, now).unwrap();
}

#[test]
fn test_fresh_install_report() {
    let app = AlarmApp::open(MemoryStore::new(), &Config::default());
    let report = app.analytics();
    assert_eq!(report.success_rate, 0);
    assert_eq!(
        report.insights,
        vec![
            "Every journey begins with a single step. Keep setting alarms and working towards your goals.",
            "You've never used deactivation - great self-control!",
            "No snoozes used - you wake up on time!",
        ]
    );
}

#[test]
fn test_mixed_week_report() {
    let mut app = AlarmApp::with_generator(MemoryStore::new(), &Config::default(), ChallengeGenerator::seeded(5));
    app.submit_quiz(Some("agreeableness"), night(1)).unwrap();

    // Night 1: snooze once, then dismiss.
    arm(&mut app, night(1));
    let morning = night(1) + Duration::hours(9);
    app.tick(morning);
    app.snooze(morning).unwrap();
    app.tick(morning + Duration::minutes(5));
    let answer = app.challenge(ChallengeSlot::Dismiss).unwrap().to_string();
    app.dismiss(&answer, morning + Duration::minutes(5)).unwrap();

    // Night 2: give up before bed.
    app.deactivate(night(2));
    arm(&mut app, night(2));
    app.deactivate(night(2) + Duration::minutes(1));

    let c = app.counters();
    assert_eq!(c.total_alarms_set, 2);
    assert_eq!(c.alarms_completed, 1);
    assert_eq!(c.snooze_count, 1);
    assert_eq!(c.deactivation_count, 2);

    let report = app.analytics();
    assert_eq!(report.success_rate, 50);
    assert_eq!(report.insights.len(), 3);
    assert!(report.insights[0].starts_with("Keep trying!"));
    assert!(report.insights[1].contains("2 times"));
    assert!(report.insights[2].contains("1 time."));
}
