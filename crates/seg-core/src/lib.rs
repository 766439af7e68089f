//! Segmentation Viewer Core
//!
//! Document model and the collaborator contracts consumed by the 3D view:
//! image geometry, cursor, color labels, per-label surface meshes and the
//! change notification channel.

pub mod constants;
pub mod document;
pub mod event;
pub mod image;
pub mod label;
pub mod mesh;
pub mod model;

pub use document::{Document, ModelError, SharedDocument};
pub use event::{ChangeQueue, ChangeSet, ModelEvent};
pub use image::ImageInfo;
pub use label::{ColorLabel, ColorLabelTable, LabelId};
pub use mesh::{LabelMesh, LabelSurface, SurfaceGeometry, SurfaceHandle};
pub use model::{
    ChangeSource, CursorSource, ImageGeometry, LabelTable, MeshProvider, SceneModel, SharedModel,
};
