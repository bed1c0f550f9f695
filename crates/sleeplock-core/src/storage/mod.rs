mod config;
pub mod database;
mod store;

pub use config::{AlarmConfig, Config, NotificationsConfig, SchedulerConfig};
pub use database::Database;
pub use store::{keys, Counter, KeyValueStore, MemoryStore, Persistence};

use std::path::PathBuf;

/// Returns the data directory.
///
/// `SLEEPLOCK_HOME` wins when set. Otherwise `~/.config/sleeplock[-dev]/`,
/// with `SLEEPLOCK_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = match std::env::var_os("SLEEPLOCK_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SLEEPLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("sleeplock-dev")
            } else {
                base_dir.join("sleeplock")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
