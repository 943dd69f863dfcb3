mod config;
pub mod database;

pub use config::{Config, MonitorConfig, NotificationsConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/duewatch[-dev]/` based on DUEWATCH_ENV.
///
/// Set DUEWATCH_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DUEWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("duewatch-dev")
    } else {
        base_dir.join("duewatch")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
