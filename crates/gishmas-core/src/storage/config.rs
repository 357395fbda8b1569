//! TOML-based application configuration.
//!
//! Stores deployment settings:
//! - Application namespace for remote collections
//! - Remote document store and identity provider endpoints
//! - Day grid unlock policy
//! - Quiz timing and default variant
//!
//! Configuration is stored at `~/.config/gishmas/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::flow::UnlockPolicy;
use crate::quiz::QuizVariant;

/// Token value some deployments inject when no token exists.
const UNDEFINED_TOKEN: &str = "undefined";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Namespace segment of every remote collection path.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Remote document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the document store. No remote store when unset.
    #[serde(default)]
    pub base_url: Option<String>,
    /// How often a live subscription re-reads the collection.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Identity provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider. Local-only mode when unset.
    #[serde(default)]
    pub auth_url: Option<String>,
    /// Bootstrap token for an authenticated session.
    #[serde(default)]
    pub initial_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockPolicyKind {
    /// Days unlock one per calendar day from `start_date`.
    Calendar,
    /// A fixed number of days is unlocked.
    Fixed,
}

/// Day grid unlock configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockConfig {
    #[serde(default = "default_unlock_policy")]
    pub policy: UnlockPolicyKind,
    /// Day 1 unlocks on this date.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// Unlocked day count for the fixed policy.
    #[serde(default = "default_fixed_day")]
    pub fixed_day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// How long the pass/fail overlay stays up.
    #[serde(default = "default_result_display_ms")]
    pub result_display_ms: u64,
    #[serde(default)]
    pub default_variant: QuizVariant,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/gishmas/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub unlock: UnlockConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
}

// Default functions
fn default_namespace() -> String {
    "default-app-id".into()
}
fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_request_timeout_ms() -> u64 {
    5000
}
fn default_unlock_policy() -> UnlockPolicyKind {
    UnlockPolicyKind::Calendar
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 18).unwrap_or(NaiveDate::MIN)
}
fn default_fixed_day() -> u32 {
    1
}
fn default_result_display_ms() -> u64 {
    1500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            auth_url: None,
            initial_token: None,
        }
    }
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            policy: default_unlock_policy(),
            start_date: default_start_date(),
            fixed_day: default_fixed_day(),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            result_display_ms: default_result_display_ms(),
            default_variant: QuizVariant::default(),
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
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                // An empty value leaves an unset optional unset.
                serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the default cannot
    /// be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
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
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
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
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Bootstrap token, with `GISHMAS_AUTH_TOKEN` taking precedence.
    /// Empty strings and the literal `"undefined"` count as no token.
    pub fn initial_token(&self) -> Option<String> {
        std::env::var("GISHMAS_AUTH_TOKEN")
            .ok()
            .or_else(|| self.identity.initial_token.clone())
            .filter(|t| !t.trim().is_empty() && t != UNDEFINED_TOKEN)
    }

    pub fn unlock_policy(&self) -> UnlockPolicy {
        match self.unlock.policy {
            UnlockPolicyKind::Calendar => UnlockPolicy::Calendar {
                start_date: self.unlock.start_date,
            },
            UnlockPolicyKind::Fixed => UnlockPolicy::Fixed {
                unlocked_day: self.unlock.fixed_day,
            },
        }
    }

    pub fn result_display(&self) -> Duration {
        Duration::from_millis(self.quiz.result_display_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.store.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.store.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.app.namespace, "default-app-id");
        assert_eq!(parsed.quiz.result_display_ms, 1500);
        assert!(parsed.store.base_url.is_none());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.unlock.policy, UnlockPolicyKind::Calendar);
        assert_eq!(parsed.unlock.start_date, NaiveDate::from_ymd_opt(2025, 12, 18).unwrap());
        assert_eq!(parsed.unlock.fixed_day, 1);
        assert_eq!(parsed.quiz.default_variant, QuizVariant::V1);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [unlock]
            policy = "fixed"
            fixed_day = 3

            [store]
            base_url = "http://127.0.0.1:9000"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.unlock.policy, UnlockPolicyKind::Fixed);
        assert_eq!(parsed.unlock_policy(), UnlockPolicy::Fixed { unlocked_day: 3 });
        assert_eq!(parsed.store.base_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(parsed.store.poll_interval_ms, 2000);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("app.namespace").as_deref(), Some("default-app-id"));
        assert_eq!(cfg.get("quiz.result_display_ms").as_deref(), Some("1500"));
        assert_eq!(cfg.get("unlock.start_date").as_deref(), Some("2025-12-18"));
        assert!(cfg.get("app.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("quiz.result_display_ms", "2500").unwrap();
        cfg.apply("store.base_url", "http://localhost:8080").unwrap();
        cfg.apply("unlock.policy", "fixed").unwrap();
        cfg.apply("quiz.default_variant", "v2").unwrap();
        assert_eq!(cfg.quiz.result_display_ms, 2500);
        assert_eq!(cfg.store.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cfg.unlock.policy, UnlockPolicyKind::Fixed);
        assert_eq!(cfg.quiz.default_variant, QuizVariant::V2);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("app.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.apply("quiz.result_display_ms", "soon").is_err());
        assert!(cfg.apply("unlock.start_date", "tomorrow").is_err());
        assert!(cfg.apply("unlock.policy", "weekly").is_err());
        assert_eq!(cfg.quiz.result_display_ms, 1500);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.app.namespace, "default-app-id");
    }

    #[test]
    fn load_from_reports_parse_failures() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[quiz\nbroken").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::LoadFailed { .. })));
    }

    #[test]
    fn undefined_token_counts_as_absent() {
        let mut cfg = Config::default();
        cfg.identity.initial_token = Some("undefined".into());
        if std::env::var("GISHMAS_AUTH_TOKEN").is_err() {
            assert!(cfg.initial_token().is_none());
            cfg.identity.initial_token = Some("tok-123".into());
            assert_eq!(cfg.initial_token().as_deref(), Some("tok-123"));
        }
    }
}
