use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config is missing `{0}`")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(rename = "data", default)]
    pub data_dir: PathBuf,
    #[serde(rename = "tlgrm", default)]
    pub telegram: TelegramConfig,
    pub myshows: CatalogCredentials,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "notify", default)]
    pub recipients: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogCredentials {
    #[serde(rename = "id")]
    pub client_id: String,
    #[serde(rename = "secret")]
    pub client_secret: String,
    pub user: String,
    pub password: String,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let creds = &self.myshows;
        let required = [
            ("myshows.id", &creds.client_id),
            ("myshows.secret", &creds.client_secret),
            ("myshows.user", &creds.user),
            ("myshows.password", &creds.password),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        Ok(())
    }

    /// Checked lazily because only real delivery needs a bot.
    pub fn require_telegram(&self) -> Result<(), ConfigError> {
        if self.telegram.key.trim().is_empty() {
            return Err(ConfigError::Missing("tlgrm.key"));
        }
        if self.telegram.recipients.is_empty() {
            return Err(ConfigError::Missing("tlgrm.notify"));
        }
        Ok(())
    }
}
