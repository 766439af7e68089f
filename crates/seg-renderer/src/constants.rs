//! Rendering constants

use glam::Vec3;

/// Number of segments each crosshair line is built from
pub const AXIS_LINE_RESOLUTION: u32 = 10;

/// Stipple pattern of dashed crosshair lines
pub const AXIS_STIPPLE_PATTERN: u16 = 0x9999;

/// Crosshair color before appearance settings are applied
pub const DEFAULT_AXIS_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

/// Crosshair width used when dashes are off
pub const DEFAULT_AXIS_WIDTH: f32 = 4.0;

/// Camera up direction after a reset (superior)
pub const SUPERIOR: Vec3 = Vec3::Z;

/// Default vertical view angle in degrees
pub const DEFAULT_VIEW_ANGLE_DEGREES: f32 = 30.0;
