mod config;
pub mod database;

pub use config::{Config, SessionConfig, XpConfig};
pub use database::{Database, Stats};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/devtrack[-dev]/` based on DEVTRACK_ENV.
///
/// Set DEVTRACK_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DEVTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("devtrack-dev")
    } else {
        base_dir.join("devtrack")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
