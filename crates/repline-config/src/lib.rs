//! # Repline Configuration
//!
//! Configuration sources (in priority order):
//! 1. CLI arguments
//! 2. Environment variables (`REPLINE_HISTORY__BUFFER_SIZE=100`)
//! 3. User config (~/.config/repline/config.toml)
//! 4. Built-in defaults

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the command history file inside the data directory
pub const HISTORY_FILE: &str = "command_history.json";

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("dev", "repline", "Repline")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".repline"))
}

/// Get the data directory (persisted command histories)
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("dev", "repline", "Repline")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".repline"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Command history settings
    pub history: HistoryConfig,
    /// Prompt settings
    pub prompt: PromptConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// REPL flavor started by default
    pub flavor: String,
    /// Print the preamble on startup
    pub show_welcome: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            flavor: "calc".to_string(),
            show_welcome: true,
        }
    }
}

/// Command history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Commands kept per session until `buffer N` stores a size
    pub buffer_size: usize,
    /// Override for the history file location
    pub storage_file: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            buffer_size: 50,
            storage_file: None,
        }
    }
}

/// Prompt settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Replace the flavor's prompt marker
    pub symbol: Option<String>,
}

/// Configuration manager backed by a TOML file
pub struct ConfigManager {
    config: Arc<RwLock<Config>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for the user config file
    pub fn new() -> anyhow::Result<Self> {
        Self::from_path(config_dir().join("config.toml"))
    }

    /// Create a config manager for an explicit config file
    pub fn from_path(config_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let config_path = config_path.into();
        let config = Self::load_from_file(&config_path)?;

        tracing::debug!("Loaded configuration from {}", config_path.display());

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Load configuration from file, merged over defaults and under the environment
    fn load_from_file(path: &Path) -> anyhow::Result<Config> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("REPLINE_").split("__"));

        Ok(figment.extract()?)
    }

    /// Get current configuration
    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Update configuration
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.config.write();
        f(&mut config);
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        let config = self.config.read();
        let content = toml::to_string_pretty(&*config)?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Where command histories are persisted
    pub fn history_path(&self) -> PathBuf {
        self.config
            .read()
            .history
            .storage_file
            .clone()
            .unwrap_or_else(|| data_dir().join(HISTORY_FILE))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
