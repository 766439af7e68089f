//! Segmentation Viewer Renderer
//!
//! 3D view of a segmentation: crosshair axes and per-label surfaces over the
//! main image, kept in sync with the document through change notifications.
//!
//! # Architecture
//!
//! - [`scene::Scene`] - Passive scene primitives (three axis actors + mesh actors)
//! - [`camera::Camera`] - Camera state and projection math
//! - [`renderer::SceneRenderer`] - Reconciliation engine driving the scene from the model
//! - [`host::RenderHost`] - Redraw scheduling and frame submission to a [`host::RenderSurface`]
//!
//! # Module Structure
//!
//! ```text
//! seg-renderer/
//! ├── scene/           # Actors, mesh actor collection, bounds
//! ├── renderer/        # SceneRenderer, sync plan, mesh/axis sync, camera controller
//! ├── camera.rs        # Camera
//! ├── config.rs        # Appearance and camera settings
//! ├── host.rs          # RenderHost, Frame, RenderSurface
//! ├── picker.rs        # Ray picking against surfaces
//! ├── vertex.rs        # GPU vertex formats
//! └── gpu.rs           # wgpu surface (feature "gpu")
//! ```

pub mod camera;
pub mod config;
pub mod constants;
pub mod host;
pub mod picker;
pub mod renderer;
pub mod scene;
pub mod vertex;

#[cfg(feature = "gpu")]
pub mod gpu;

pub use camera::{Camera, CameraUniform};
pub use config::{AppearanceSettings, CameraConfig, ElementAppearance, RendererConfig, SettingsError};
pub use host::{
    Frame, HeadlessSurface, RenderError, RenderHost, RenderSurface, SurfaceDraw, SurfaceVertices,
};
pub use picker::{PickResult, pick};
pub use renderer::{CameraController, MeshSync, SceneRenderer, SyncPlan, ViewSync};
pub use scene::{Actor, ActorGeometry, Aabb, LineGeometry, MeshActorCollection, Scene, Stipple, SurfaceBinding};
pub use vertex::ColorVertex;

#[cfg(feature = "gpu")]
pub use gpu::GpuSurface;
