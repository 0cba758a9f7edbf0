use clap::Subcommand;
use devtrack_core::{Config, ConfigError};

use super::parse_enum;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Set a config value (e.g. "session.idle_threshold_min 10")
    Set {
        /// Dotted key, e.g. "xp.base", "session.conflict_policy"
        key: String,
        /// New value
        value: String,
    },
    /// Reset config to defaults
    Reset,
}

fn set_key(config: &mut Config, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    match key {
        "session.idle_threshold_min" => config.session.idle_threshold_min = value.parse()?,
        "session.conflict_policy" => config.session.conflict_policy = parse_enum(value)?,
        "xp.base" => config.xp.base = value.parse()?,
        "xp.per_minute" => config.xp.per_minute = value.parse()?,
        "xp.per_streak_day" => config.xp.per_streak_day = value.parse()?,
        "xp.focus_bonus" => config.xp.focus_bonus = value.parse()?,
        "xp.focus_bonus_threshold" => config.xp.focus_bonus_threshold = value.parse()?,
        "notifications.enabled" => config.notifications.enabled = value.parse()?,
        _ => {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "unknown configuration key".to_string(),
            }
            .into())
        }
    }
    Ok(())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            set_key(&mut config, &key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
