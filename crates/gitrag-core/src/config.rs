//! Persisted config (blacklists, sampling, indexing) in the app data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app_data;
use crate::chunks::DEFAULT_CHUNK_SIZE;
use crate::ollama::{DEFAULT_BASE_URL, DEFAULT_EMBED_MODEL};
use crate::sampler::SampleConfig;
use crate::walker::Blacklists;

const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory names skipped at the repository root only.
    pub dir_blacklist: Vec<String>,
    /// File extensions skipped everywhere (case-insensitive).
    pub ext_blacklist: Vec<String>,
    /// Token for cloning private repositories.
    pub git_token: Option<String>,
    pub sample: SampleConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            dir_blacklist: vec![".git".to_string(), ".github".to_string()],
            ext_blacklist: Vec::new(),
            git_token: None,
            sample: SampleConfig::default(),
        }
    }
}

impl IngestConfig {
    pub fn blacklists(&self) -> Blacklists {
        Blacklists::new(self.dir_blacklist.iter().cloned(), &self.ext_blacklist)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    pub ollama_url: String,
    pub embed_model: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            ollama_url: DEFAULT_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.ingest.sample;
        if !(s.ratio > 0.0 && s.ratio.is_finite()) {
            return Err(ConfigError::InvalidSample(format!("ratio must be positive, got {}", s.ratio)));
        }
        if s.min > s.max {
            return Err(ConfigError::InvalidSample(format!(
                "min ({}) is larger than max ({})",
                s.min, s.max
            )));
        }
        Ok(())
    }
}

/// Path of the config file in the app data directory.
pub fn config_path() -> Option<PathBuf> {
    app_data::app_data_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Load config from the app data directory. Returns default config if missing or invalid.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match load_config_from(&path) {
        Ok(config) => config,
        Err(ConfigError::Read(_)) => Config::default(),
        Err(e) => {
            tracing::warn!("ignoring {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Load and validate config from a specific file.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
    let config: Config = toml::from_str(&s).map_err(ConfigError::Parse)?;
    config.validate()?;
    Ok(config)
}

/// Save config to the app data directory.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoDataDir)?;
    save_config_to(config, &path)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    config.validate()?;
    let s = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
    std::fs::write(path, s).map_err(ConfigError::Write)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine app data directory")]
    NoDataDir,
    #[error("failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("failed to write config: {0}")]
    Write(std::io::Error),
    #[error("failed to read config: {0}")]
    Read(std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(toml::de::Error),
    #[error("invalid sample settings: {0}")]
    InvalidSample(String),
}
