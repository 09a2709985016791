//! Shared configuration for the cooplink CLI.
//!
//! TOML profiles, credential resolution (env + plaintext), and
//! translation into the core runtime types (`PollingInterval`,
//! `WebhookConfig`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cooplink_core::{PollingInterval, WebhookConfig};

/// The public Omlet cloud endpoint.
pub const DEFAULT_BASE_URL: &str = "https://x107.omlet.co.uk";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}

/// A named account profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Cloud API base URL; the public endpoint when omitted.
    pub base_url: Option<String>,

    /// API key (plaintext -- prefer the env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Poll interval in seconds. `0` disables polling (webhook-only).
    pub polling_interval: Option<u64>,

    /// Shared webhook token (plaintext -- prefer the env var).
    pub webhook_token: Option<String>,

    /// Environment variable name containing the webhook token.
    pub webhook_token_env: Option<String>,

    /// Webhook debounce window in milliseconds.
    pub webhook_debounce_ms: Option<u64>,

    /// Address the `serve` command binds, e.g. "0.0.0.0:8787".
    pub webhook_bind: Option<String>,

    /// Override request timeout in seconds.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("uk.co", "cooplink", "cooplink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("cooplink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file (tests, `--config` flag).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("COOPLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: profile env var, `COOPLINK_API_KEY`, then
/// plaintext in the config file.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("COOPLINK_API_KEY") {
        return Ok(SecretString::from(val));
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the webhook token, if one is configured anywhere.
pub fn resolve_webhook_token(profile: &Profile) -> Option<SecretString> {
    if let Some(ref env_name) = profile.webhook_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("COOPLINK_WEBHOOK_TOKEN") {
        return Some(SecretString::from(val));
    }

    profile
        .webhook_token
        .as_ref()
        .map(|t| SecretString::from(t.clone()))
}

// ── Translation to core types ───────────────────────────────────────

/// The profile's base URL after validation.
pub fn resolve_base_url(profile: &Profile) -> Result<String, ConfigError> {
    let raw = profile
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.into());
    let _: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    Ok(raw)
}

/// Poll interval setting. `0` means webhook-only operation; the core
/// clamps everything else to its own bounds.
pub fn resolve_polling(profile: &Profile) -> PollingInterval {
    match profile.polling_interval {
        Some(0) => PollingInterval::Disabled,
        Some(secs) => PollingInterval::Every(secs),
        None => PollingInterval::default(),
    }
}

/// Webhook receiver settings for this profile.
pub fn resolve_webhook(profile: &Profile) -> WebhookConfig {
    let defaults = WebhookConfig::default();
    WebhookConfig {
        token: resolve_webhook_token(profile),
        debounce: profile
            .webhook_debounce_ms
            .map_or(defaults.debounce, Duration::from_millis),
    }
}
