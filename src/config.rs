//! Engine configuration, loaded from an optional ~/.fretline/engine.yaml.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::playback::PlaybackDriver;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_click_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Engine settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How often a sleeping driver checks for cancellation.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Metronome click length.
    #[serde(default = "default_click_ms")]
    pub click_ms: u64,
    /// Log filter used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            click_ms: default_click_ms(),
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Standard config location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".fretline").join("engine.yaml"))
    }

    /// Load from the standard location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        Self::default_path()
            .filter(|p| p.exists())
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Load from an explicit path, reporting read and parse errors.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn click(&self) -> Duration {
        Duration::from_millis(self.click_ms)
    }

    /// A playback driver using these settings.
    pub fn driver(&self) -> PlaybackDriver {
        PlaybackDriver::with_poll_interval(self.poll_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.click(), Duration::from_millis(100));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: EngineConfig = serde_yaml::from_str("click_ms: 60\n").unwrap();
        assert_eq!(config.click_ms, 60);
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn zero_poll_interval_is_raised() {
        let config = EngineConfig {
            poll_interval_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
        assert_eq!(config.driver().poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_ms: 5\nclick_ms: 40\nlog_level: debug").unwrap();
        let config = EngineConfig::load_from(file.path()).unwrap();
        assert_eq!(config.poll_interval_ms, 5);
        assert_eq!(config.click_ms, 40);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "click_ms: [not, a, number]").unwrap();
        assert!(matches!(
            EngineConfig::load_from(file.path()),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn load_never_panics() {
        let _ = EngineConfig::load();
    }
}
