//! Segmentation Viewer Frontend
//!
//! Drives the 3D view from a document: queued viewer actions, one
//! reconciliation pass and one paint per frame.

pub mod config;
pub mod demo;
pub mod state;

// Re-exports for convenience
pub use config::{AppConfig, ConfigError};
pub use state::{FrameSummary, Viewer, ViewerAction};
