//! Configuration: TOML file plus environment overrides
//!
//! Looked up at `<config_dir>/courier-cli/config.toml` unless a path is
//! given. Every section is optional; a missing default file yields the
//! defaults, a missing `--config` path is an error.
//!
//! ```toml
//! [store]
//! url = "http://127.0.0.1:8090"
//! auth_collection = "users"
//!
//! [auth]
//! username = "admin@example.com"
//!
//! [import.monthly]
//! collection = "performance"
//! null_policy = "passthrough"
//! delivery_prefix = "派件"
//!
//! [import.daily]
//! collection = "daily_performance"
//! null_policy = "zero"
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::import::{DEFAULT_DELIVERY_PREFIX, ImportProfile, NullPolicy};
use crate::records::RecordKind;

pub const ENV_STORE_URL: &str = "COURIER_STORE_URL";
pub const ENV_USERNAME: &str = "COURIER_USERNAME";
pub const ENV_PASSWORD: &str = "COURIER_PASSWORD";
pub const ENV_AUTH_COLLECTION: &str = "COURIER_AUTH_COLLECTION";

const DEFAULT_STORE_URL: &str = "http://127.0.0.1:8090";
const DEFAULT_AUTH_COLLECTION: &str = "users";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
    pub auth_collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
            auth_collection: DEFAULT_AUTH_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    /// Prompted for when absent
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub monthly: KindConfig,
    pub daily: KindConfig,
}

/// Per-kind import settings; unset keys fall back to the kind's defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindConfig {
    pub collection: Option<String>,
    pub null_policy: Option<NullPolicy>,
    /// Monthly only
    pub delivery_prefix: Option<String>,
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("courier-cli")
        .join("config.toml")
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config")
    }

    /// Load from `path` (or the default location), then apply the process
    /// environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::read(path, &default_config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// An explicit path must exist; a missing default file yields the defaults
    fn read(path: Option<&Path>, default_path: &Path) -> Result<Self> {
        let path = match path {
            Some(path) if !path.exists() => {
                anyhow::bail!("Config file does not exist: {}", path.display())
            }
            Some(path) => path,
            None if !default_path.exists() => {
                debug!("No config at {}, using defaults", default_path.display());
                return Ok(Self::default());
            }
            None => default_path,
        };

        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Override file values from environment variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_STORE_URL) {
            self.store.url = url;
        }
        if let Some(collection) = lookup(ENV_AUTH_COLLECTION) {
            self.store.auth_collection = collection;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.auth.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.auth.password = Some(password);
        }
    }

    /// Import settings for a kind, defaults filled in
    pub fn profile(&self, kind: RecordKind) -> ImportProfile {
        let defaults = ImportProfile::for_kind(kind);
        let configured = match kind {
            RecordKind::Monthly => &self.import.monthly,
            RecordKind::Daily => &self.import.daily,
        };

        ImportProfile {
            kind,
            collection: configured.collection.clone().unwrap_or(defaults.collection),
            null_policy: configured.null_policy.unwrap_or(defaults.null_policy),
            delivery_prefix: configured
                .delivery_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_DELIVERY_PREFIX.to_string()),
        }
    }
}
