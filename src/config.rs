use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::kanban_board::SyncPolicy;
use crate::logger::LoggerConfig;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/join/";
pub const BASE_URL_ENV: &str = "TASKBOARD_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("base url must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),
}

/// Runtime configuration. Layered as defaults, then the TOML file, then
/// `TASKBOARD_URL`, then command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub sync_policy: SyncPolicy,
    #[serde(rename = "log")]
    pub logger: LoggerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            sync_policy: SyncPolicy::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path` if given, then applies the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml(path, &text)?
            }
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.base_url = url;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }
}
