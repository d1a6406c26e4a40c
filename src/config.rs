//! Configuration for QuakeSphere.

use crate::core::{WindowError, WindowSpec, DEFAULT_POINTS_BEFORE, DEFAULT_TOTAL_POINTS};
use crate::mark::{
    CatalogMarkProvider, FixedMarkProvider, MarkError, MarkTimeProvider, DEFAULT_MARK_TIME,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 5080;

/// Main configuration for the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recording served by the import endpoint
    pub source_path: PathBuf,

    /// Samples taken before the mark
    pub points_before: usize,

    /// Total samples in a window
    pub total_points: usize,

    /// Port for the HTTP server (0 for random)
    pub port: u16,

    /// Mark time used when no catalogue entry applies
    pub mark_time: f64,

    /// Optional JSON catalogue of per-recording mark times
    pub mark_catalog: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quakesphere");

        Self {
            source_path: data_dir.join("recording.csv"),
            points_before: DEFAULT_POINTS_BEFORE,
            total_points: DEFAULT_TOTAL_POINTS,
            port: DEFAULT_PORT,
            mark_time: DEFAULT_MARK_TIME,
            mark_catalog: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults when absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quakesphere")
            .join("config.json")
    }

    /// Validated window split.
    pub fn window_spec(&self) -> Result<WindowSpec, ConfigError> {
        Ok(WindowSpec::new(self.points_before, self.total_points)?)
    }

    /// Build the mark-time provider described by this configuration.
    pub fn mark_provider(&self) -> Result<Box<dyn MarkTimeProvider>, ConfigError> {
        match &self.mark_catalog {
            Some(path) => Ok(Box::new(
                CatalogMarkProvider::load(path)?.with_fallback(self.mark_time),
            )),
            None => Ok(Box::new(FixedMarkProvider(self.mark_time))),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(serde_json::Error),
    #[error("Invalid window: {0}")]
    Window(#[from] WindowError),
    #[error("Invalid mark catalog: {0}")]
    MarkCatalog(#[from] MarkError),
}
