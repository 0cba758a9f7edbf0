//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session behavior (idle threshold, conflict policy)
//! - XP rates
//! - Notification preferences
//!
//! Configuration is stored at `~/.config/devtrack/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::session::{ConflictPolicy, SessionEngineConfig};
use crate::xp::XpRates;

/// Session-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minutes without an activity signal before a focus penalty.
    #[serde(default = "default_idle_threshold")]
    pub idle_threshold_min: u32,
    /// What `start_session` does when a session is already active.
    #[serde(default)]
    pub conflict_policy: ConflictPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_threshold_min: default_idle_threshold(),
            conflict_policy: ConflictPolicy::default(),
        }
    }
}

/// XP rate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpConfig {
    #[serde(default = "default_base_xp")]
    pub base: u64,
    #[serde(default = "default_per_minute")]
    pub per_minute: f64,
    #[serde(default = "default_per_streak_day")]
    pub per_streak_day: u64,
    #[serde(default = "default_focus_bonus")]
    pub focus_bonus: u64,
    #[serde(default = "default_focus_threshold")]
    pub focus_bonus_threshold: u8,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            base: default_base_xp(),
            per_minute: default_per_minute(),
            per_streak_day: default_per_streak_day(),
            focus_bonus: default_focus_bonus(),
            focus_bonus_threshold: default_focus_threshold(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/devtrack/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub xp: XpConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_idle_threshold() -> u32 {
    5
}
fn default_base_xp() -> u64 {
    5
}
fn default_per_minute() -> f64 {
    0.5
}
fn default_per_streak_day() -> u64 {
    2
}
fn default_focus_bonus() -> u64 {
    5
}
fn default_focus_threshold() -> u8 {
    8
}
fn default_true() -> bool {
    true
}

impl Config {
    /// Path of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    /// Parse a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()).into())
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn session_engine_config(&self) -> SessionEngineConfig {
        SessionEngineConfig {
            idle_threshold_minutes: self.session.idle_threshold_min,
            conflict_policy: self.session.conflict_policy,
        }
    }

    pub fn xp_rates(&self) -> XpRates {
        XpRates {
            base: self.xp.base,
            per_minute: self.xp.per_minute,
            per_streak_day: self.xp.per_streak_day,
            focus_bonus: self.xp.focus_bonus,
            focus_bonus_threshold: self.xp.focus_bonus_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.session.idle_threshold_min, 5);
        assert_eq!(config.session.conflict_policy, ConflictPolicy::AutoEnd);
        assert_eq!(config.xp.base, 5);
        assert!(config.notifications.enabled);
    }

    #[test]
    fn partial_document_fills_missing_fields() {
        let config = Config::from_toml(
            "[session]\nidle_threshold_min = 10\nconflict_policy = \"reject\"\n",
        )
        .unwrap();
        assert_eq!(config.session.idle_threshold_min, 10);
        assert_eq!(config.session.conflict_policy, ConflictPolicy::Reject);
        assert_eq!(config.xp.per_streak_day, 2);
    }

    #[test]
    fn invalid_toml_fails_with_parse_error() {
        assert!(Config::from_toml("session = [").is_err());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.xp.base = 7;
        let raw = toml::to_string_pretty(&config).unwrap();
        let back = Config::from_toml(&raw).unwrap();
        assert_eq!(back.xp.base, 7);
    }

    #[test]
    fn conversions_carry_values() {
        let mut config = Config::default();
        config.session.idle_threshold_min = 12;
        config.xp.focus_bonus_threshold = 9;
        assert_eq!(config.session_engine_config().idle_threshold_minutes, 12);
        assert_eq!(config.xp_rates().focus_bonus_threshold, 9);
    }
}
