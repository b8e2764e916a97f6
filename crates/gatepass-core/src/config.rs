//! Application configuration management.
//!
//! This module handles loading the configuration: the auth backend base
//! URL, the login route the guard redirects to, the request timeout and
//! where the token is kept.
//!
//! Configuration is read from `~/.config/gatepass/config.json`; any field
//! can be overridden from the environment (`GATEPASS_*`).

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::api::AuthClient;
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, SessionStore, TokenStore};
use crate::guard::DEFAULT_LOGIN_ROUTE;

/// Application name used for config/data directory paths
const APP_NAME: &str = "gatepass";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BASE_URL: &str = "http://localhost:3000/api/auth";

pub const ENV_BASE_URL: &str = "GATEPASS_BASE_URL";
pub const ENV_LOGIN_ROUTE: &str = "GATEPASS_LOGIN_ROUTE";
pub const ENV_TIMEOUT_SECS: &str = "GATEPASS_TIMEOUT_SECS";
pub const ENV_TOKEN_BACKEND: &str = "GATEPASS_TOKEN_BACKEND";

/// Where the bearer token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for TokenBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(TokenBackend::File),
            "keyring" | "keychain" => Ok(TokenBackend::Keyring),
            "memory" => Ok(TokenBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown token backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub login_route: String,
    pub request_timeout_secs: u64,
    pub token_backend: TokenBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_backend: TokenBackend::default(),
        }
    }
}

impl Config {
    /// Load the config file (defaults if absent), then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            debug!(path = %path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `GATEPASS_*` overrides; `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(route) = lookup(ENV_LOGIN_ROUTE) {
            self.login_route = route;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
        }
        if let Some(backend) = lookup(ENV_TOKEN_BACKEND) {
            self.token_backend = backend.parse()?;
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the file-backed token
    pub fn token_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the configured token backend
    pub fn open_token_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_backend {
            TokenBackend::File => Arc::new(FileTokenStore::new(self.token_dir()?)),
            TokenBackend::Keyring => Arc::new(KeyringTokenStore),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }

    /// Build a session store wired to the configured backend and token store
    pub fn session_store(&self) -> Result<SessionStore> {
        let api = AuthClient::with_timeout(self.base_url.clone(), self.request_timeout())
            .context("Failed to build HTTP client")?;
        Ok(SessionStore::new(api, self.open_token_store()?))
    }
}
