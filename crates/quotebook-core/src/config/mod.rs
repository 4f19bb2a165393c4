//! Runtime configuration.
//!
//! `QuotebookConfig` is read from a JSON file and then adjusted by
//! `QUOTEBOOK_*` environment variables. Every field has a default, so a
//! missing file is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sync::DEFAULT_REMOTE_URL;
use crate::util::{is_http_url, normalize_text_option};

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_FETCH_URL: &str = "QUOTEBOOK_FETCH_URL";
pub const ENV_PUSH_URL: &str = "QUOTEBOOK_PUSH_URL";
pub const ENV_SYNC_INTERVAL_SECS: &str = "QUOTEBOOK_SYNC_INTERVAL_SECS";
pub const ENV_DB_PATH: &str = "QUOTEBOOK_DB_PATH";

const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotebookConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub fetch_url: Option<String>,
    /// Falls back to `fetch_url` when unset
    #[serde(default)]
    pub push_url: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

const fn default_sync_interval_secs() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_remote_enabled() -> bool {
    true
}

impl Default for QuotebookConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            remote: RemoteConfig::default(),
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            db_path: None,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: default_remote_enabled(),
            fetch_url: None,
            push_url: None,
        }
    }
}

impl QuotebookConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Apply `QUOTEBOOK_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), String> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides resolved through `lookup`, then re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = normalize_text_option(lookup(ENV_FETCH_URL)) {
            self.remote.fetch_url = Some(url);
        }
        if let Some(url) = normalize_text_option(lookup(ENV_PUSH_URL)) {
            self.remote.push_url = Some(url);
        }
        if let Some(raw) = normalize_text_option(lookup(ENV_SYNC_INTERVAL_SECS)) {
            self.sync_interval_secs = raw
                .parse()
                .map_err(|_| format!("{ENV_SYNC_INTERVAL_SECS} must be a whole number of seconds"))?;
        }
        if let Some(path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }

        self.normalize();
        self.validate()
    }

    pub fn fetch_url(&self) -> &str {
        self.remote.fetch_url.as_deref().unwrap_or(DEFAULT_REMOTE_URL)
    }

    pub fn push_url(&self) -> &str {
        self.remote
            .push_url
            .as_deref()
            .unwrap_or_else(|| self.fetch_url())
    }

    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sync_interval_secs == 0 {
            return Err("sync_interval_secs must be greater than zero".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        for (field, value) in [
            ("remote.fetch_url", &self.remote.fetch_url),
            ("remote.push_url", &self.remote.push_url),
        ] {
            if let Some(url) = value {
                if !is_http_url(url) {
                    return Err(format!("{field} must include http:// or https://"));
                }
            }
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.remote.fetch_url = normalize_url(self.remote.fetch_url.take());
        self.remote.push_url = normalize_url(self.remote.push_url.take());
    }
}

fn normalize_url(value: Option<String>) -> Option<String> {
    normalize_text_option(value).map(|url| url.trim_end_matches('/').to_string())
}
