//! Configuration file handling.
//!
//! The config lives at `<config_dir>/imsg/config.toml`. Every field has a
//! default, so a partial or missing file is fine. Command-line flags
//! override whatever is loaded here.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extract::WINDOW_SIZE;
use crate::pipeline::DEFAULT_DAYS_BACK;
use crate::provider::ProviderSettings;
use crate::source::default_database_path;

/// Provider used when neither the config nor the CLI picks one.
pub const DEFAULT_PROVIDER: &str = "anthropic";

/// Errors raised while reading or writing the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,

    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config TOML at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub source: SourceConfig,
    /// Per-provider overrides keyed by provider name
    pub providers: BTreeMap<String, ProviderConfig>,
}

/// `[analysis]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How many days back to read
    pub days_back: u32,
    /// Provider name, e.g. "anthropic" or "openai"
    pub provider: String,
    /// Most recent messages kept per contact
    pub window_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            provider: DEFAULT_PROVIDER.to_string(),
            window_size: WINDOW_SIZE,
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Messages database; `~` is expanded. Defaults to ~/Library/Messages/chat.db
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

/// `[providers.<name>]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Request timeout; unset means wait indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Default config file location.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("imsg").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolved database path, `None` if no home directory is known.
    pub fn database_path(&self) -> Option<PathBuf> {
        match &self.source.database {
            Some(raw) => Some(expand_tilde(raw)),
            None => default_database_path(),
        }
    }

    /// Settings for `provider`, empty if the file has no section for it.
    pub fn provider_settings(&self, provider: &str) -> ProviderSettings {
        let key = provider.trim().to_ascii_lowercase();
        self.providers
            .get(&key)
            .map(ProviderConfig::to_settings)
            .unwrap_or_default()
    }
}

impl ProviderConfig {
    pub fn to_settings(&self) -> ProviderSettings {
        ProviderSettings {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            max_tokens: self.max_tokens,
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}
