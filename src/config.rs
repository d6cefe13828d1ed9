//! Project configuration stored in .claude/mob/config.json.
//!
//! Missing files and missing or empty fields fall back to the built-in
//! defaults, so a fresh checkout works without any setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::atomic::write_atomic;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_MODEL: &str = "haiku";
pub const DEFAULT_MAX_TURNS: u32 = 3;

/// Keys accepted by `config set`.
pub const CONFIG_KEYS: &[&str] = &["apiUrl", "teamName", "model", "maxTurns", "skipSummary"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config key: {0}\nAvailable keys: {keys}", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),

    #[error("invalid {key} value: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// mob-relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub api_url: String,
    pub team_name: String,
    pub model: String,
    pub max_turns: u32,
    pub skip_summary: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            team_name: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            skip_summary: false,
        }
    }
}

impl Config {
    /// Whether a dashboard is configured at all.
    pub fn remote_enabled(&self) -> bool {
        !self.api_url.is_empty() && !self.team_name.is_empty()
    }

    /// Apply command-line / environment overrides.
    pub fn with_overrides(mut self, api_url: Option<String>, team: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        if let Some(team) = team.filter(|t| !t.is_empty()) {
            self.team_name = team;
        }
        self
    }

    /// Set a single key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "apiUrl" => self.api_url = value.to_string(),
            "teamName" => self.team_name = value.to_string(),
            "model" => self.model = value.to_string(),
            "maxTurns" => {
                self.max_turns = value
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|turns| *turns > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: "maxTurns",
                        value: value.to_string(),
                    })?;
            }
            "skipSummary" => {
                self.skip_summary = match value.trim() {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: "skipSummary",
                            value: value.to_string(),
                        })
                    }
                }
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    // Empty strings and a zero turn budget mean "not set".
    fn fill_defaults(mut self) -> Self {
        let defaults = Config::default();
        if self.api_url.is_empty() {
            self.api_url = defaults.api_url;
        }
        if self.model.is_empty() {
            self.model = defaults.model;
        }
        if self.max_turns == 0 {
            self.max_turns = defaults.max_turns;
        }
        self
    }
}

/// Reads and writes the project config file.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Read the config, returning defaults when the file does not exist.
    pub fn read(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content =
            std::fs::read_to_string(&self.config_path).map_err(|source| ConfigError::Read {
                path: self.config_path.clone(),
                source,
            })?;

        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: self.config_path.clone(),
                source,
            })?;

        Ok(config.fill_defaults())
    }

    /// Read the config, degrading to defaults on any error.
    pub fn load_or_default(&self) -> Config {
        self.read().unwrap_or_else(|e| {
            warn!("Could not load config, using defaults: {}", e);
            Config::default()
        })
    }

    pub fn write(&self, config: &Config) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.config_path.clone(),
            source,
        };

        let content = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })?;

        write_atomic(&self.config_path, &content).map_err(write_err)?;

        debug!("Config saved to {:?}", self.config_path);
        Ok(())
    }
}
