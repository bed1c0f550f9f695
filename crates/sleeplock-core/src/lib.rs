//! # Sleeplock Core Library
//!
//! Core logic for Sleeplock, an alarm clock that locks the device until
//! the alarm rings. Front-ends (the `sleeplock` CLI, or any other shell)
//! are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Alarm registry**: HH:MM alarms and the minute-resolution due scan
//! - **Sleep lock**: input guards, focus retention and the developer
//!   override, engaged iff an alarm is armed
//! - **Challenges**: personality-matched aphorisms that must be retyped to
//!   arm or dismiss an alarm
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Stats**: success rate and insights from the lifetime counters
//!
//! Like a timer engine, [`AlarmApp`] never reads the clock. The caller
//! passes `now` into every operation and calls `tick()` periodically.
//!
//! ## Key Components
//!
//! - [`AlarmApp`]: Application controller
//! - [`SleepLockController`]: Lock state machine
//! - [`Platform`]: Collaborators driven by emitted [`Event`]s
//! - [`Database`]: Persistence
//! - [`Config`]: Application configuration management

pub mod alarm;
pub mod app;
pub mod challenge;
pub mod error;
pub mod events;
pub mod lock;
pub mod platform;
pub mod stats;
pub mod storage;

pub use alarm::{Alarm, AlarmId, AlarmRegistry, AlarmTime};
pub use app::{AlarmApp, Dispatch, Inbound};
pub use challenge::{BigFiveScores, ChallengeGenerator, ChallengeSlot, Personality};
pub use error::{ChallengeError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, ReleaseReason};
pub use lock::{LockState, SleepLockController, Verdict};
pub use platform::{AlarmRenderer, AudioSignal, Fullscreen, Notifier, Platform, PlatformError};
pub use stats::{AnalyticsReport, Counters};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
