//! Configuration management for notify-history.
//!
//! Loads config from YAML files in standard locations. Every field has a
//! default, so an empty or missing file is a valid configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackendKind {
    Memory,
    #[default]
    Sqlite,
}

impl HistoryBackendKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub backend: HistoryBackendKind,
    /// Upper bound for the in-memory backend.
    pub capacity: usize,
    /// Overrides the database location under the cache directory.
    pub db_path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackendKind::Sqlite,
            capacity: 100,
            db_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    pub enabled: bool,
    /// How many notifications the "Last N" menu entries cover.
    pub recent_count: usize,
    pub icon: String,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recent_count: 10,
            icon: "preferences-system-notifications".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub program: String,
    pub urgency: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            program: "notify-send".into(),
            urgency: "critical".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistoryConfig,
    pub tray: TrayConfig,
    pub notifier: NotifierConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/notify-history/config.yaml
    /// 3. /etc/notify-history/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::config_dir().map(|c| c.join("notify-history/config.yaml")),
                Some(PathBuf::from("/etc/notify-history/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    fn parse(contents: &str) -> Result<Self, serde_yml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(contents)
    }
}
