mod credential;
mod settings;

pub use credential::Credential;
pub use settings::{GlobalSettings, TrackingConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::BaseDirs;

use crate::cli::Cli;
use crate::error::{DeckError, Result};

const CONFIG_DIR: &str = "timebook-deck";
const MAIN_CONFIG_FILE: &str = "config.toml";

/// Shortest poll period accepted from the config file.
const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PluginConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub labels: LabelConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000/api/graphql".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Shown on every key whose task is not the one being tracked
    pub placeholder: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            placeholder: "Not\ntracking".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl PluginConfig {
    /// Loads the config file. An explicit path must exist and parse; the
    /// default location falls back to defaults.
    ///
    /// Also returns a warning for the default location, to be logged once
    /// logging is up.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<String>)> {
        match explicit {
            Some(path) => Ok((Self::load_required(path)?, None)),
            None => Ok(Self::load_default(Self::get_config_dir())),
        }
    }

    fn load_default(config_dir: Option<PathBuf>) -> (Self, Option<String>) {
        let Some(dir) = config_dir else {
            return (
                Self::default(),
                Some("Could not determine config directory, using defaults".to_string()),
            );
        };
        match Self::load_toml_file(&dir.join(MAIN_CONFIG_FILE)) {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(warning) => (Self::default(), Some(format!("{}, using defaults", warning))),
        }
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.api_url {
            self.api.url = url.clone();
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.logging.directory {
            return dir.clone();
        }
        BaseDirs::new()
            .map(|dirs| dirs.data_local_dir().join(CONFIG_DIR).join("logs"))
            .unwrap_or_else(|| std::env::temp_dir().join(CONFIG_DIR))
    }

    fn get_config_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.config_dir().join(CONFIG_DIR))
    }

    fn load_required(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DeckError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DeckError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Reads an optional TOML file. A missing file is `Ok(None)`; a file
    /// that cannot be read or parsed is described in the error.
    fn load_toml_file<T: for<'de> Deserialize<'de>>(
        path: &Path,
    ) -> std::result::Result<Option<T>, String> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }
}
