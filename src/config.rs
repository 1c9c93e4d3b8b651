//! Application configuration
//!
//! Loaded from a TOML file. Every section has defaults so a partial file (or
//! no file at all) yields a usable configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::protocol::ModuleDebug;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub module: ModuleSettings,
    pub debug: ModuleDebug,
    pub logging: LoggingConfig,
}

/// Limits and fixed values applied by the module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSettings {
    /// Smallest stream buffer a client may request, in frames
    pub minimum_stream_buffer_size_frames: i32,
    /// Largest stream buffer a client may request, in bytes
    pub maximum_stream_buffer_size_bytes: i64,
    /// Latency reported for every sink of a patch
    pub latency_ms: i32,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            minimum_stream_buffer_size_frames: MINIMUM_STREAM_BUFFER_SIZE_FRAMES,
            maximum_stream_buffer_size_bytes: MAXIMUM_STREAM_BUFFER_SIZE_BYTES,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    /// Load from the platform config directory, falling back to defaults
    /// when no file exists there
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Write the configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `<config dir>/module.toml` for this application
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "audio-hal", "audio-hal-module")
            .map(|dirs| dirs.config_dir().join("module.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.module.minimum_stream_buffer_size_frames <= 0 {
            return Err(Error::Config(format!(
                "minimum_stream_buffer_size_frames must be positive, got {}",
                self.module.minimum_stream_buffer_size_frames
            )));
        }
        if self.module.maximum_stream_buffer_size_bytes <= 0 {
            return Err(Error::Config(format!(
                "maximum_stream_buffer_size_bytes must be positive, got {}",
                self.module.maximum_stream_buffer_size_bytes
            )));
        }
        if self.module.latency_ms < 0 {
            return Err(Error::Config(format!(
                "latency_ms must not be negative, got {}",
                self.module.latency_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.module.minimum_stream_buffer_size_frames, 16);
        assert_eq!(config.module.maximum_stream_buffer_size_bytes, 1024 * 1024);
        assert_eq!(config.module.latency_ms, 10);
        assert!(!config.debug.simulate_device_connections);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::from_toml(
            r#"
            [debug]
            simulate_device_connections = true

            [module]
            latency_ms = 20
            "#,
        )
        .unwrap();
        assert!(config.debug.simulate_device_connections);
        assert_eq!(config.module.latency_ms, 20);
        assert_eq!(config.module.minimum_stream_buffer_size_frames, 16);
    }

    #[test]
    fn test_rejects_non_positive_minimum() {
        let result = AppConfig::from_toml("[module]\nminimum_stream_buffer_size_frames = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("module.toml");

        let mut config = AppConfig::default();
        config.module.maximum_stream_buffer_size_bytes = 4096;
        config.logging.filter = "debug".into();
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }
}
