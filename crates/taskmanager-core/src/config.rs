//! Application configuration management.
//!
//! Configuration lives at `~/.config/taskmanager/config.json` and every field
//! has a default, so a missing file is fine. A handful of environment
//! variables override the file (the binary loads `.env` first).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ClientConfig;
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "taskmanager";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "https://api.taskmanager.com";

/// HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "TASKMANAGER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TASKMANAGER_TIMEOUT_SECS";
pub const ENV_TOKEN_STORAGE: &str = "TASKMANAGER_TOKEN_STORAGE";

/// Where the bearer token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorage {
    #[default]
    Keyring,
    File,
    Memory,
}

impl std::str::FromStr for TokenStorage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" => Ok(TokenStorage::Keyring),
            "file" => Ok(TokenStorage::File),
            "memory" => Ok(TokenStorage::Memory),
            other => bail!("Unknown token storage '{}' (expected keyring, file or memory)", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub token_storage: TokenStorage,
    /// Extra headers sent with every request, e.g. tunnel bypass headers
    pub default_headers: BTreeMap<String, String>,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_storage: TokenStorage::default(),
            default_headers: BTreeMap::new(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults), apply environment overrides and
    /// validate the result.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::from_json(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config file")
    }

    /// Apply overrides from a variable lookup. Takes a closure so tests do not
    /// have to touch the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
        }
        if let Some(storage) = lookup(ENV_TOKEN_STORAGE) {
            self.token_storage = storage.parse()?;
        }
        Ok(())
    }

    pub fn validate(&mut self) -> Result<()> {
        self.api_base_url = normalize_base_url(&self.api_base_url);
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            bail!("API base URL must start with http:// or https://, got '{}'", self.api_base_url);
        }
        if self.request_timeout_secs == 0 {
            bail!("Request timeout must be at least one second");
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            default_headers: self.default_headers.clone(),
        }
    }

    /// Build the token store this config asks for
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_storage {
            TokenStorage::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenStorage::File => Arc::new(FileTokenStore::new(Self::data_dir()?)),
            TokenStorage::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn log_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

/// Trim whitespace and trailing slashes so paths can be appended directly.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
