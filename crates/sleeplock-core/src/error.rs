//! Core error types for sleeplock-core.
//!
//! Validation and challenge errors are recoverable: the application layer
//! turns them into inline messages. Storage and platform failures never
//! interrupt the lock state machine; they are logged where they happen.

use std::path::PathBuf;
use thiserror::Error;

use crate::challenge::ChallengeSlot;

/// Core error type for sleeplock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before any state changed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Typed aphorism rejected, or no aphorism to compare against
    #[error("Challenge error: {0}")]
    Challenge(#[from] ChallengeError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors. Raised before any side effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a wake up time")]
    EmptyTime,

    #[error("Invalid alarm time '{value}': expected HH:MM")]
    InvalidTime { value: String },

    #[error("{0}")]
    EmptyInput(&'static str),

    #[error("Please select a statement that best describes you.")]
    NoSelection,

    #[error("Unknown personality type '{0}'")]
    UnknownPersonality(String),

    #[error("No alarm with id {id}")]
    UnknownAlarm { id: i64 },

    #[error("No alarm is currently ringing")]
    NoFiringAlarm,

    #[error("Take the personality test first")]
    NoProfile,
}

/// Challenge comparison errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    /// Input did not match. `rotated` is true when a new aphorism replaced
    /// the old one and must be typed instead.
    #[error("The aphorism does not match. Please type it exactly as shown.")]
    Mismatch { slot: ChallengeSlot, rotated: bool },

    /// The slot is empty, e.g. after a reload while an alarm was ringing.
    #[error("Error: No aphorism loaded. Please refresh the page.")]
    Missing { slot: ChallengeSlot },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl CoreError {
    /// True for errors the UI recovers from inline (validation, mismatch, missing).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::Validation(_) | CoreError::Challenge(_))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_matches_inline_copy() {
        let err = CoreError::from(ChallengeError::Mismatch {
            slot: ChallengeSlot::Arm,
            rotated: false,
        });
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Challenge error: The aphorism does not match. Please type it exactly as shown."
        );
    }

    #[test]
    fn database_errors_are_not_recoverable() {
        let err = CoreError::from(DatabaseError::Locked);
        assert!(!err.is_recoverable());
    }
}
