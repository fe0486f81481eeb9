//! TOML-based game configuration.
//!
//! Stores tuning knobs including:
//! - Base earn rate
//! - Wait wall length and bypass price
//! - Boost strength, duration and price
//! - Pet decay and feeding
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Earn-rate configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyConfig {
    /// Spiritual ego per second before any multiplier.
    #[serde(default = "default_base_rate")]
    pub base_rate: f64,
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_session_minutes")]
    pub default_minutes: u64,
}

/// Wait wall (cooldown between sessions).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaitWallConfig {
    #[serde(default = "default_wait_wall_minutes")]
    pub minutes: u64,
    #[serde(default = "default_bypass_karma")]
    pub bypass_karma_cost: u64,
}

/// Temporary boost configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoostConfig {
    #[serde(default = "default_boost_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_boost_minutes")]
    pub minutes: u64,
    #[serde(default = "default_boost_stardust")]
    pub stardust_cost: u64,
}

/// Virtual pet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetConfig {
    #[serde(default = "default_decay_per_hour")]
    pub decay_per_hour: f64,
    #[serde(default = "default_feed_amount")]
    pub feed_amount: f64,
    #[serde(default = "default_feed_stardust")]
    pub feed_stardust_cost: u64,
    #[serde(default = "default_session_mood_bonus")]
    pub session_mood_bonus: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub wait_wall: WaitWallConfig,
    #[serde(default)]
    pub boost: BoostConfig,
    #[serde(default)]
    pub pet: PetConfig,
}

// Default functions
fn default_base_rate() -> f64 {
    1.0
}
fn default_session_minutes() -> u64 {
    10
}
fn default_wait_wall_minutes() -> u64 {
    15
}
fn default_bypass_karma() -> u64 {
    25
}
fn default_boost_multiplier() -> f64 {
    2.0
}
fn default_boost_minutes() -> u64 {
    30
}
fn default_boost_stardust() -> u64 {
    10
}
fn default_decay_per_hour() -> f64 {
    4.0
}
fn default_feed_amount() -> f64 {
    25.0
}
fn default_feed_stardust() -> u64 {
    3
}
fn default_session_mood_bonus() -> f64 {
    5.0
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_rate: default_base_rate(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_session_minutes(),
        }
    }
}

impl Default for WaitWallConfig {
    fn default() -> Self {
        Self {
            minutes: default_wait_wall_minutes(),
            bypass_karma_cost: default_bypass_karma(),
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            multiplier: default_boost_multiplier(),
            minutes: default_boost_minutes(),
            stardust_cost: default_boost_stardust(),
        }
    }
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            decay_per_hour: default_decay_per_hour(),
            feed_amount: default_feed_amount(),
            feed_stardust_cost: default_feed_stardust(),
            session_mood_bonus: default_session_mood_bonus(),
        }
    }
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
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(n) => {
                        if n.is_f64() {
                            let f = value
                                .parse::<f64>()
                                .map_err(|e| invalid(e.to_string()))?;
                            serde_json::Number::from_f64(f)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("'{value}' is not finite")))?
                        } else {
                            let u = value
                                .parse::<u64>()
                                .map_err(|e| invalid(e.to_string()))?;
                            serde_json::Value::Number(u.into())
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
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

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the key's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }

    pub fn wait_wall_ms(&self) -> u64 {
        self.wait_wall.minutes.saturating_mul(60_000)
    }

    pub fn boost_ms(&self) -> u64 {
        self.boost.minutes.saturating_mul(60_000)
    }

    pub fn session_ms(&self) -> u64 {
        self.session.default_minutes.saturating_mul(60_000)
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
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[economy]\nbase_rate = 2.5\n").unwrap();
        assert_eq!(parsed.economy.base_rate, 2.5);
        assert_eq!(parsed.wait_wall.minutes, 15);
        assert_eq!(parsed.pet.feed_stardust_cost, 3);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("wait_wall.minutes").as_deref(), Some("15"));
        assert_eq!(cfg.get("economy.base_rate").as_deref(), Some("1.0"));
        assert!(cfg.get("economy.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_integer_and_float() {
        let mut cfg = Config::default();
        cfg.apply("wait_wall.minutes", "45").unwrap();
        cfg.apply("boost.multiplier", "3.5").unwrap();
        assert_eq!(cfg.wait_wall.minutes, 45);
        assert_eq!(cfg.boost.multiplier, 3.5);
        assert_eq!(cfg.wait_wall_ms(), 45 * 60_000);
    }

    #[test]
    fn apply_float_accepts_integer_literal() {
        let mut cfg = Config::default();
        cfg.apply("economy.base_rate", "2").unwrap();
        assert_eq!(cfg.economy.base_rate, 2.0);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.apply("economy.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.apply("wait_wall.minutes", "soon");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.wait_wall.minutes, 15);
    }
}
