//! Application configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use seg_renderer::{AppearanceSettings, CameraConfig, RendererConfig};

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "seg_frontend=debug,seg_renderer=debug";

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Failed to write config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Application configuration, stored as RON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// 3D view appearance
    #[serde(default)]
    pub appearance: AppearanceSettings,
    /// Camera defaults
    #[serde(default)]
    pub camera: CameraConfig,
    /// Tracing filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            appearance: AppearanceSettings::default(),
            camera: CameraConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&content)?)
    }

    /// Load a config file, falling back to defaults when it is missing or broken
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save to a config file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Renderer part of the configuration
    pub fn renderer(&self) -> RendererConfig {
        RendererConfig {
            appearance: self.appearance.clone(),
            camera: self.camera.clone(),
        }
    }
}
