//! Configuration loading and resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{MegaverseError, MegaverseResult};

pub const DEFAULT_BASE_URL: &str = "https://challenge.crossmint.io/api";
pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 0.6;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 30.0;

pub const CONFIG_ENV: &str = "MEGAVERSE_CONFIG";
pub const CANDIDATE_ENV: &str = "MEGAVERSE_CANDIDATE_ID";
pub const BASE_URL_ENV: &str = "MEGAVERSE_BASE_URL";

/// Static client configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MegaverseConfig {
    #[serde(alias = "candidateId")]
    pub candidate_id: String,

    #[serde(alias = "baseUrl", default = "default_base_url")]
    pub base_url: String,

    /// Minimum gap between requests, in seconds.
    #[serde(
        alias = "requestDelaySeconds",
        alias = "request_delay_seconds",
        default = "default_request_delay"
    )]
    pub request_delay: f64,

    /// Per-request timeout, in seconds.
    #[serde(alias = "requestTimeoutSeconds", default = "default_request_timeout")]
    pub request_timeout: f64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_delay() -> f64 {
    DEFAULT_REQUEST_DELAY_SECS
}

fn default_request_timeout() -> f64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl MegaverseConfig {
    /// Config with defaults for everything but the candidate id.
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            base_url: default_base_url(),
            request_delay: DEFAULT_REQUEST_DELAY_SECS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> MegaverseResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> MegaverseResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MegaverseError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config {}: {e}", path.display()),
            ))
        })?;

        let mut config: Self = serde_json::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(id) = non_empty_env(CANDIDATE_ENV) {
            self.candidate_id = id;
        }
        if let Some(url) = non_empty_env(BASE_URL_ENV) {
            self.base_url = url;
        }
    }

    pub fn validate(&self) -> MegaverseResult<()> {
        if self.candidate_id.trim().is_empty() {
            return Err(MegaverseError::InvalidConfig(
                "candidate_id must not be empty".into(),
            ));
        }
        if self.base_url.trim_end_matches('/').is_empty() {
            return Err(MegaverseError::InvalidConfig(
                "base_url must not be empty".into(),
            ));
        }
        seconds_to_duration("request_delay", self.request_delay)?;
        let timeout = seconds_to_duration("request_timeout", self.request_timeout)?;
        if timeout.is_zero() {
            return Err(MegaverseError::InvalidConfig(format!(
                "request_timeout must be a positive number of seconds, got {}",
                self.request_timeout
            )));
        }
        Ok(())
    }

    /// Minimum gap between requests. Falls back to the default for a value
    /// that [`validate`](Self::validate) would reject.
    pub fn request_delay(&self) -> Duration {
        seconds_to_duration("request_delay", self.request_delay)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_REQUEST_DELAY_SECS))
    }

    /// Per-request timeout. Falls back to the default for a value that
    /// [`validate`](Self::validate) would reject.
    pub fn request_timeout(&self) -> Duration {
        seconds_to_duration("request_timeout", self.request_timeout)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_REQUEST_TIMEOUT_SECS))
    }
}

fn seconds_to_duration(field: &str, seconds: f64) -> MegaverseResult<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        MegaverseError::InvalidConfig(format!(
            "{field} must be a non-negative number of seconds, got {seconds}: {e}"
        ))
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the config file path: explicit flag, `MEGAVERSE_CONFIG`,
/// `./config.json`, then `~/.megaverse/config.json`.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Some(env_path) = non_empty_env(CONFIG_ENV) {
        return PathBuf::from(env_path);
    }

    let cwd_config = PathBuf::from("config.json");
    if cwd_config.exists() {
        return cwd_config;
    }

    resolve_default_config_path()
}

fn resolve_default_config_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(".megaverse").join("config.json")
}
