mod config;
pub mod database;
pub mod kv;
pub mod progress;

pub use config::{
    parse_time_of_day, BreathworkConfig, Config, MeditationConfig, RemindersConfig, SessionConfig,
};
pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore};
pub use progress::{date_key, DailyProgress, ProgressTracker, Reflection, UserData};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `GROUNDED_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/grounded[-dev]/`, with `GROUNDED_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("GROUNDED_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GROUNDED_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("grounded-dev")
            } else {
                base_dir.join("grounded")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
