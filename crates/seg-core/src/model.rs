//! Contracts between the document and the 3D view
//!
//! The view only reads through these traits; it never mutates the model.

use std::sync::Arc;

use glam::{Mat4, UVec3, Vec3};
use parking_lot::RwLock;

use crate::event::ChangeQueue;
use crate::label::{ColorLabel, LabelId};
use crate::mesh::SurfaceHandle;

/// Source of per-label surfaces
pub trait MeshProvider {
    /// Number of surfaces currently reported
    fn surface_count(&self) -> usize;

    /// Geometry of the surface at `index`
    fn surface(&self, index: usize) -> Option<SurfaceHandle>;

    /// Label the surface at `index` was extracted for
    fn surface_label(&self, index: usize) -> Option<LabelId>;
}

/// Label appearance lookup
pub trait LabelTable {
    /// Appearance of a label; unknown ids get [`ColorLabel::default`]
    fn color_label(&self, id: LabelId) -> ColorLabel;
}

/// Geometry of the main image
pub trait ImageGeometry {
    /// Whether a main image is loaded. All other methods are meaningless otherwise.
    fn is_loaded(&self) -> bool;

    /// Voxel extent
    fn size(&self) -> UVec3;

    /// Physical voxel spacing
    fn spacing(&self) -> Vec3;

    /// Voxel-to-world matrix
    fn world_matrix(&self) -> Mat4;

    /// Map a (continuous) voxel coordinate to world space
    fn voxel_to_world(&self, voxel: Vec3) -> Vec3 {
        self.world_matrix().transform_point3(voxel)
    }

    /// Map a world point to a continuous voxel coordinate
    fn world_to_voxel(&self, world: Vec3) -> Vec3 {
        self.world_matrix().inverse().transform_point3(world)
    }

    /// Physical size of the volume
    fn physical_extent(&self) -> Vec3 {
        self.size().as_vec3() * self.spacing()
    }
}

/// Source of the crosshair position
pub trait CursorSource {
    /// Cursor position as a voxel index
    fn cursor_position(&self) -> UVec3;
}

/// Models that broadcast their changes to subscribed queues
pub trait ChangeSource {
    /// Start delivering change events to `queue`
    fn subscribe(&mut self, queue: ChangeQueue);

    /// Stop delivering change events to `queue`
    fn unsubscribe(&mut self, queue: &ChangeQueue);
}

/// Everything the 3D view reads from the application
pub trait SceneModel:
    MeshProvider + LabelTable + ImageGeometry + CursorSource + ChangeSource + Send + Sync
{
}

impl<T> SceneModel for T where
    T: MeshProvider + LabelTable + ImageGeometry + CursorSource + ChangeSource + Send + Sync
{
}

/// Shared, application-owned model as seen by the view
pub type SharedModel = Arc<RwLock<dyn SceneModel>>;
