//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default breathwork pattern and round count
//! - Default meditation technique
//! - Daily reminder times
//! - Session clock period
//!
//! Configuration is stored at `~/.config/grounded/config.toml`.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{DEFAULT_BREATHWORK, DEFAULT_BREATHWORK_ROUNDS};

/// Breathwork defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathworkConfig {
    #[serde(default = "default_pattern")]
    pub default_pattern: String,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

/// Meditation defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeditationConfig {
    #[serde(default = "default_technique")]
    pub default_technique: String,
}

/// Daily reminder times, `"HH:MM"` in local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_morning")]
    pub morning: String,
    #[serde(default = "default_midday")]
    pub midday: String,
    #[serde(default = "default_evening")]
    pub evening: String,
}

/// Session clock settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wall-clock milliseconds per session second.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/grounded/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub breathwork: BreathworkConfig,
    #[serde(default)]
    pub meditation: MeditationConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

// Default functions
fn default_pattern() -> String {
    DEFAULT_BREATHWORK.into()
}
fn default_rounds() -> u32 {
    DEFAULT_BREATHWORK_ROUNDS
}
fn default_technique() -> String {
    "dynamic".into()
}
fn default_morning() -> String {
    "07:00".into()
}
fn default_midday() -> String {
    "12:00".into()
}
fn default_evening() -> String {
    "19:00".into()
}
fn default_tick_millis() -> u64 {
    1000
}

impl Default for BreathworkConfig {
    fn default() -> Self {
        Self {
            default_pattern: default_pattern(),
            rounds: default_rounds(),
        }
    }
}

impl Default for MeditationConfig {
    fn default() -> Self {
        Self {
            default_technique: default_technique(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            morning: default_morning(),
            midday: default_midday(),
            evening: default_evening(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

/// Parse an `"HH:MM"` time of day into `(hour, minute)`.
///
/// # Errors
/// Returns an error if `value` is not a valid 24-hour time.
pub fn parse_time_of_day(key: &str, value: &str) -> Result<(u8, u8), ConfigError> {
    let time = NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected HH:MM, got '{value}': {e}"),
    })?;
    // hour < 24 and minute < 60 always fit in u8.
    Ok((time.hour() as u8, time.minute() as u8))
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as number: {e}")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Reject values that parse but make no sense.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.breathwork.rounds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "breathwork.rounds".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.session.tick_millis == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.tick_millis".into(),
                message: "must be positive".into(),
            });
        }
        parse_time_of_day("reminders.morning", &self.reminders.morning)?;
        parse_time_of_day("reminders.midday", &self.reminders.midday)?;
        parse_time_of_day("reminders.evening", &self.reminders.evening)?;
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid; the
    /// config is left unchanged in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("falling back to default config: {e}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[breathwork]\nrounds = 3\n").unwrap();
        assert_eq!(parsed.breathwork.rounds, 3);
        assert_eq!(parsed.breathwork.default_pattern, "morning");
        assert_eq!(parsed.reminders.evening, "19:00");
        assert_eq!(parsed.session.tick_millis, 1000);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("breathwork.rounds").as_deref(), Some("5"));
        assert_eq!(cfg.get("reminders.enabled").as_deref(), Some("false"));
        assert_eq!(cfg.get("reminders.morning").as_deref(), Some("07:00"));
        assert!(cfg.get("reminders").is_none());
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("breathwork.rounds", "8").unwrap();
        cfg.set("reminders.enabled", "true").unwrap();
        cfg.set("breathwork.default_pattern", "box").unwrap();
        assert_eq!(cfg.breathwork.rounds, 8);
        assert!(cfg.reminders.enabled);
        assert_eq!(cfg.breathwork.default_pattern, "box");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("breathwork.speed", "2").unwrap_err();
        assert!(matches!(
            err,
            crate::error::CoreError::Config(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_values_and_keeps_config() {
        let mut cfg = Config::default();
        assert!(cfg.set("reminders.enabled", "sometimes").is_err());
        assert!(cfg.set("breathwork.rounds", "0").is_err());
        assert!(cfg.set("reminders.morning", "25:00").is_err());
        assert!(cfg.set("reminders", "x").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(parse_time_of_day("k", "07:00").unwrap(), (7, 0));
        assert_eq!(parse_time_of_day("k", "19:45").unwrap(), (19, 45));
        assert!(parse_time_of_day("k", "7pm").is_err());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("meditation.default_technique", "kundalini").unwrap();
        changed.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.meditation.default_technique, "kundalini");
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "breathwork = 12").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
