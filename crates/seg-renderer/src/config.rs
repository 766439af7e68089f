//! Renderer configuration structures
//!
//! Appearance and camera settings that can be serialized and loaded from
//! configuration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VIEW_ANGLE_DEGREES;

/// Appearance of one UI element
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ElementAppearance {
    /// Color (RGB)
    pub normal_color: [f32; 3],
    /// Line thickness in pixels
    pub line_thickness: f32,
    /// Dash spacing; 0 draws solid lines
    pub dash_spacing: f32,
}

/// Appearance settings of the 3D view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppearanceSettings {
    /// Crosshair lines
    pub crosshairs_3d: ElementAppearance,
    /// Per-axis color overrides for the crosshair lines
    #[serde(default)]
    pub axis_colors: [Option<[f32; 3]>; 3],
    /// Background (only the color is used)
    pub background_3d: ElementAppearance,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self::dark()
    }
}

impl AppearanceSettings {
    /// Dark theme
    pub fn dark() -> Self {
        Self {
            crosshairs_3d: ElementAppearance {
                normal_color: [0.3, 0.3, 1.0],
                line_thickness: 1.0,
                dash_spacing: 1.0,
            },
            axis_colors: [None; 3],
            background_3d: ElementAppearance {
                normal_color: [0.0, 0.0, 0.0],
                line_thickness: 0.0,
                dash_spacing: 0.0,
            },
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            crosshairs_3d: ElementAppearance {
                normal_color: [0.8, 0.2, 0.2],
                line_thickness: 1.0,
                dash_spacing: 1.0,
            },
            axis_colors: [None; 3],
            background_3d: ElementAppearance {
                normal_color: [0.92, 0.92, 0.94],
                line_thickness: 0.0,
                dash_spacing: 0.0,
            },
        }
    }

    /// Color of the crosshair line along `axis`
    pub fn axis_color(&self, axis: usize) -> [f32; 3] {
        self.axis_colors
            .get(axis)
            .copied()
            .flatten()
            .unwrap_or(self.crosshairs_3d.normal_color)
    }

    /// Background clear color (RGBA)
    pub fn background_color(&self) -> [f32; 4] {
        let [r, g, b] = self.background_3d.normal_color;
        [r, g, b, 1.0]
    }

    /// Serialize to a RON string
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SettingsError::Serialize(e.to_string()))
    }

    /// Parse from a RON string
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        ron::from_str(content).map_err(|e| SettingsError::Deserialize(e.to_string()))
    }

    /// Save settings to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let content = self.to_ron()?;
        std::fs::write(path.as_ref(), content).map_err(|e| SettingsError::Io(e.to_string()))
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| SettingsError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }
}

/// Camera default configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraConfig {
    /// Vertical view angle in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance before the first reset
    pub near_plane: f32,
    /// Far clipping plane distance before the first reset
    pub far_plane: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_VIEW_ANGLE_DEGREES,
            near_plane: 0.1,
            far_plane: 100000.0,
        }
    }
}

/// Complete renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RendererConfig {
    /// Appearance settings
    #[serde(default)]
    pub appearance: AppearanceSettings,
    /// Camera settings
    #[serde(default)]
    pub camera: CameraConfig,
}

/// Settings-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(String),
    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Settings file is malformed
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}
