//! TOML-based application configuration.
//!
//! Stores:
//! - Limiter thresholds (ceiling, idle reset, lockout length, debounce)
//! - Page gate (which route activates the limiter)
//!
//! Configuration is stored at `~/.config/scrollgate/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::gate::PageGate;

/// Limiter thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum counted scrolls before lockout.
    #[serde(default = "default_ceiling")]
    pub ceiling: u32,
    #[serde(default = "default_idle_reset_minutes")]
    pub idle_reset_minutes: u64,
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: u64,
    /// Scrolls closer together than this are not counted.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_idle_check_interval_secs")]
    pub idle_check_interval_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/scrollgate/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub limiter: LimiterConfig,
    #[serde(default)]
    pub gate: PageGate,
}

fn default_ceiling() -> u32 {
    150
}
fn default_idle_reset_minutes() -> u64 {
    10
}
fn default_lockout_minutes() -> u64 {
    15
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_idle_check_interval_secs() -> u64 {
    60
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            ceiling: default_ceiling(),
            idle_reset_minutes: default_idle_reset_minutes(),
            lockout_minutes: default_lockout_minutes(),
            debounce_ms: default_debounce_ms(),
            idle_check_interval_secs: default_idle_check_interval_secs(),
        }
    }
}

impl LimiterConfig {
    pub fn idle_reset_ms(&self) -> u64 {
        self.idle_reset_minutes.saturating_mul(60_000)
    }

    pub fn lockout_ms(&self) -> u64 {
        self.lockout_minutes.saturating_mul(60_000)
    }

    /// Reject thresholds that would make the limiter meaningless.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("limiter.{key}"),
            message: message.to_string(),
        };
        if self.ceiling == 0 {
            return Err(invalid("ceiling", "must be at least 1"));
        }
        if self.idle_reset_minutes == 0 {
            return Err(invalid("idle_reset_minutes", "must be at least 1"));
        }
        if self.lockout_minutes == 0 {
            return Err(invalid("lockout_minutes", "must be at least 1"));
        }
        if self.idle_check_interval_secs == 0 {
            return Err(invalid("idle_check_interval_secs", "must be at least 1"));
        }
        Ok(())
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
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as a non-negative integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    // Optional fields serialize as null; empty input clears them.
                    serde_json::Value::Null | serde_json::Value::String(_) if value.is_empty() => {
                        serde_json::Value::Null
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

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults first if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                cfg.limiter.validate()?;
                Ok(cfg)
            }
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
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
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
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.limiter.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Config::apply`] fails or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()
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
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.limiter.ceiling, 150);
        assert_eq!(cfg.limiter.idle_reset_minutes, 10);
        assert_eq!(cfg.limiter.lockout_minutes, 15);
        assert_eq!(cfg.limiter.debounce_ms, 300);
        assert_eq!(cfg.limiter.idle_check_interval_secs, 60);
        assert_eq!(cfg.limiter.idle_reset_ms(), 600_000);
        assert_eq!(cfg.limiter.lockout_ms(), 900_000);
        assert_eq!(cfg.gate.path, "/");
        assert_eq!(cfg.gate.query_marker.as_deref(), Some("sk=h_chr"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[limiter]\nceiling = 20\n").unwrap();
        assert_eq!(parsed.limiter.ceiling, 20);
        assert_eq!(parsed.limiter.lockout_minutes, 15);
        assert_eq!(parsed.gate, PageGate::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("limiter.ceiling").as_deref(), Some("150"));
        assert_eq!(cfg.get("gate.path").as_deref(), Some("/"));
        assert!(cfg.get("limiter.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("limiter.ceiling", "75").unwrap();
        assert_eq!(cfg.limiter.ceiling, 75);
    }

    #[test]
    fn apply_updates_and_clears_optional_string() {
        let mut cfg = Config::default();
        cfg.apply("gate.query_marker", "tab=home").unwrap();
        assert_eq!(cfg.gate.query_marker.as_deref(), Some("tab=home"));
        cfg.apply("gate.query_marker", "").unwrap();
        assert_eq!(cfg.gate.query_marker, None);
        cfg.apply("gate.query_marker", "again=1").unwrap();
        assert_eq!(cfg.gate.query_marker.as_deref(), Some("again=1"));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("limiter.nonexistent", "1").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let err = cfg.apply("limiter.ceiling", "lots").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.limiter.ceiling, 150);
    }

    #[test]
    fn apply_rejects_zero_ceiling() {
        let mut cfg = Config::default();
        assert!(cfg.apply("limiter.ceiling", "0").is_err());
        assert_eq!(cfg.limiter.ceiling, 150);
    }

    #[test]
    fn validate_names_bad_field() {
        let cfg = LimiterConfig {
            lockout_minutes: 0,
            ..LimiterConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "limiter.lockout_minutes"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
