//! Tracker configuration
//!
//! Stored as JSON, by default at `<config_dir>/videotracker/config.json`.
//! Every field has a default, so partial files are accepted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_tracker_name() -> String {
    "videotracker".to_string()
}

fn default_tracker_version() -> String {
    crate::VERSION.to_string()
}

fn default_heartbeat_interval_secs() -> u64 {
    crate::DEFAULT_HEARTBEAT_SECS
}

fn default_forward_events() -> bool {
    true
}

/// Per-tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Reported as `trackerName`
    #[serde(default = "default_tracker_name")]
    pub tracker_name: String,
    /// Reported as `trackerVersion`
    #[serde(default = "default_tracker_version")]
    pub tracker_version: String,
    /// Reported as `playerName` when the player adapter does not name itself
    #[serde(default)]
    pub player_name: Option<String>,
    /// Heartbeat cadence in seconds (0 disables)
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    /// Hand emitted events to the sink (the observer is notified regardless)
    #[serde(default = "default_forward_events")]
    pub forward_events: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tracker_name: default_tracker_name(),
            tracker_version: default_tracker_version(),
            player_name: None,
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            forward_events: default_forward_events(),
        }
    }
}

impl TrackerConfig {
    /// Config file path: `<config_dir>/videotracker/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("videotracker")
            .join("config.json")
    }

    /// Heartbeat interval in milliseconds, `None` when disabled
    ///
    /// Intervals too large to represent saturate at `i64::MAX`.
    pub fn heartbeat_interval_ms(&self) -> Option<i64> {
        match self.heartbeat_interval_secs {
            0 => None,
            secs => Some(
                i64::try_from(secs)
                    .ok()
                    .and_then(|s| s.checked_mul(1000))
                    .unwrap_or(i64::MAX),
            ),
        }
    }

    /// Load config from `path`, falling back to defaults on any error
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded tracker config");
                config
            }
            Err(ConfigError::Io { .. }) => {
                tracing::info!(path = %path.display(), "No tracker config found, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse tracker config, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from `path`, reporting every failure
    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save config to `path`, creating parent directories if needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(io_err)?;
        tracing::info!(path = %path.display(), "Tracker config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.tracker_name, "videotracker");
        assert_eq!(config.tracker_version, crate::VERSION);
        assert_eq!(config.player_name, None);
        assert_eq!(config.heartbeat_interval_secs, 30);
        assert!(config.forward_events);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let json = r#"{"player_name": "AVPlayer"}"#;
        let config: TrackerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.player_name.as_deref(), Some("AVPlayer"));
        assert_eq!(config.heartbeat_interval_secs, 30);
        assert_eq!(config.tracker_name, "videotracker");
    }

    #[test]
    fn test_heartbeat_interval() {
        let mut config = TrackerConfig::default();
        assert_eq!(config.heartbeat_interval_ms(), Some(30_000));
        config.heartbeat_interval_secs = 0;
        assert_eq!(config.heartbeat_interval_ms(), None);
        config.heartbeat_interval_secs = 1;
        assert_eq!(config.heartbeat_interval_ms(), Some(1000));
    }

    #[test]
    fn test_heartbeat_interval_saturates() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"heartbeat_interval_secs": 10000000000000000}"#).unwrap();
        assert_eq!(config.heartbeat_interval_ms(), Some(i64::MAX));

        let config = TrackerConfig {
            heartbeat_interval_secs: u64::MAX,
            ..Default::default()
        };
        assert_eq!(config.heartbeat_interval_ms(), Some(i64::MAX));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = TrackerConfig {
            tracker_name: "demo".to_string(),
            heartbeat_interval_secs: 10,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = TrackerConfig::try_load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(TrackerConfig::load(&missing), TrackerConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert!(matches!(
            TrackerConfig::try_load(&broken),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(TrackerConfig::load(&broken), TrackerConfig::default());
    }
}
