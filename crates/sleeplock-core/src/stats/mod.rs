//! Statistics module for Sleeplock
//!
//! Derives a success rate and plain-language insights from the lifetime
//! counters (alarms set, completed, snoozes, deactivations).

mod analytics;

pub use analytics::{times, AnalyticsReport, Counters};
