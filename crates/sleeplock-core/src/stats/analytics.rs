//! Success rate and insights derived from the lifetime counters.

use serde::{Deserialize, Serialize};

/// The four persisted lifetime counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub total_alarms_set: u64,
    pub alarms_completed: u64,
    pub snooze_count: u64,
    pub deactivation_count: u64,
}

impl Counters {
    /// Completed over set, as a rounded percentage. Zero when nothing was set.
    /// Not clamped: completions can outnumber alarms when one alarm is
    /// dismissed on several days.
    pub fn success_rate(&self) -> u64 {
        if self.total_alarms_set == 0 {
            return 0;
        }
        (self.alarms_completed * 200 + self.total_alarms_set) / (self.total_alarms_set * 2)
    }

    pub fn interruptions(&self) -> u64 {
        self.deactivation_count + self.snooze_count
    }
}

/// `"1 time"`, `"3 times"`.
pub fn times(n: u64) -> String {
    if n == 1 {
        format!("{n} time")
    } else {
        format!("{n} times")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    #[serde(flatten)]
    pub counters: Counters,
    /// Percent, 0..=100 in the common case.
    pub success_rate: u64,
    pub insights: Vec<String>,
}

impl AnalyticsReport {
    pub fn from_counters(counters: Counters) -> Self {
        let success_rate = counters.success_rate();
        Self {
            counters,
            success_rate,
            insights: insights(&counters, success_rate),
        }
    }
}

fn insights(c: &Counters, success_rate: u64) -> Vec<String> {
    let mut out = Vec::with_capacity(4);

    out.push(
        match success_rate {
            80.. => "Excellent! You have great discipline in following through with your alarms.",
            60..=79 => "Good job! You're doing well, but there's room for improvement.",
            40..=59 => "Keep trying! Building good habits takes time and consistency.",
            _ => "Every journey begins with a single step. Keep setting alarms and working towards your goals.",
        }
        .to_string(),
    );

    out.push(match c.deactivation_count {
        0 => "You've never used deactivation - great self-control!".to_string(),
        n @ 1..=3 => format!(
            "You've used deactivation {}. Consider setting alarms you're more committed to.",
            times(n)
        ),
        n => format!(
            "You've used deactivation {n} times. Try setting alarms at times you're more likely to follow through."
        ),
    });

    out.push(match c.snooze_count {
        0 => "No snoozes used - you wake up on time!".to_string(),
        n @ 1..=5 => format!(
            "You've snoozed {}. A few extra minutes of sleep is okay sometimes.",
            times(n)
        ),
        n => format!(
            "You've snoozed {n} times. Consider going to bed earlier or setting alarms you're more ready to wake up for."
        ),
    });

    if c.interruptions() == 0 && success_rate >= 80 {
        out.push("Outstanding! You're a model user of the sleep alarm system.".to_string());
    }

    out
}
