//! In-memory segmentation document

use std::sync::Arc;

use glam::{IVec3, Mat4, UVec3, Vec3};
use parking_lot::RwLock;

use crate::event::{ChangeQueue, ModelEvent};
use crate::image::ImageInfo;
use crate::label::{ColorLabel, ColorLabelTable, LabelId};
use crate::mesh::{LabelMesh, SurfaceHandle};
use crate::model::{ChangeSource, CursorSource, ImageGeometry, LabelTable, MeshProvider};

/// Document-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("No image loaded")]
    NoImage,
    #[error("Cursor {cursor} outside image of size {size}")]
    CursorOutOfBounds { cursor: UVec3, size: UVec3 },
    #[error("Unknown label {0}")]
    UnknownLabel(LabelId),
}

/// Document shared between the application and its views
pub type SharedDocument = Arc<RwLock<Document>>;

/// Segmentation document: main image, cursor, label table and label mesh.
///
/// Every mutator broadcasts the matching [`ModelEvent`] to all subscribed
/// queues, and only when something actually changed.
#[derive(Debug, Default)]
pub struct Document {
    image: Option<ImageInfo>,
    cursor: UVec3,
    labels: ColorLabelTable,
    mesh: LabelMesh,
    subscribers: Vec<ChangeQueue>,
}

impl Document {
    /// Create a document without image, with the default label table
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the document for sharing with views
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(RwLock::new(self))
    }

    fn notify(&self, event: ModelEvent) {
        tracing::trace!("Document event {:?} -> {} subscribers", event, self.subscribers.len());
        for queue in &self.subscribers {
            queue.push(event);
        }
    }

    // ============== Image ==============

    /// Currently loaded image
    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    /// Load a main image. The cursor moves to the center of the volume.
    pub fn load_image(&mut self, image: ImageInfo) {
        tracing::info!(
            "Loading image: size={}, spacing={}, origin={}",
            image.size,
            image.spacing,
            image.origin
        );
        self.image = Some(image);
        self.cursor = image.center_voxel();
        self.notify(ModelEvent::GeometryChanged);
        self.notify(ModelEvent::CursorMoved);
    }

    /// Unload the main image. Surfaces belong to the image and are dropped too.
    pub fn unload_image(&mut self) {
        if self.image.take().is_none() {
            return;
        }
        tracing::info!("Unloading image");
        self.cursor = UVec3::ZERO;
        self.notify(ModelEvent::GeometryChanged);
        if !self.mesh.is_empty() {
            self.mesh.clear();
            self.notify(ModelEvent::MeshContentChanged);
        }
    }

    // ============== Cursor ==============

    /// Current cursor voxel
    pub fn cursor(&self) -> UVec3 {
        self.cursor
    }

    /// Move the cursor to a voxel inside the image
    pub fn set_cursor(&mut self, cursor: UVec3) -> Result<(), ModelError> {
        let image = self.image.as_ref().ok_or(ModelError::NoImage)?;
        if !image.contains_voxel(cursor) {
            return Err(ModelError::CursorOutOfBounds {
                cursor,
                size: image.size,
            });
        }
        if cursor != self.cursor {
            self.cursor = cursor;
            self.notify(ModelEvent::CursorMoved);
        }
        Ok(())
    }

    /// Move the cursor by a voxel offset, stopping at the image boundary
    pub fn step_cursor(&mut self, delta: IVec3) -> Result<UVec3, ModelError> {
        let image = self.image.as_ref().ok_or(ModelError::NoImage)?;
        let target = (self.cursor.as_ivec3() + delta).as_vec3();
        let cursor = image.clamp_voxel(target);
        self.set_cursor(cursor)?;
        Ok(cursor)
    }

    // ============== Labels ==============

    /// Label table
    pub fn labels(&self) -> &ColorLabelTable {
        &self.labels
    }

    /// Define or replace a label
    pub fn set_label(&mut self, id: LabelId, label: ColorLabel) {
        if self.labels.insert(id, label) != Some(label) {
            self.notify(ModelEvent::LabelAppearanceChanged);
        }
    }

    /// Edit an existing label in place
    pub fn update_label(
        &mut self,
        id: LabelId,
        edit: impl FnOnce(&mut ColorLabel),
    ) -> Result<(), ModelError> {
        let label = self.labels.get_mut(id).ok_or(ModelError::UnknownLabel(id))?;
        let before = *label;
        edit(label);
        if *label != before {
            self.notify(ModelEvent::LabelAppearanceChanged);
        }
        Ok(())
    }

    /// Show or hide a label's surface in the 3D view
    pub fn set_label_visible_in_3d(&mut self, id: LabelId, visible: bool) -> Result<(), ModelError> {
        self.update_label(id, |label| label.visible_in_3d = visible)
    }

    /// Change a label's opacity
    pub fn set_label_alpha(&mut self, id: LabelId, alpha: u8) -> Result<(), ModelError> {
        self.update_label(id, |label| label.alpha = alpha)
    }

    /// Change a label's color
    pub fn set_label_color(&mut self, id: LabelId, rgb: [u8; 3]) -> Result<(), ModelError> {
        self.update_label(id, |label| label.rgb = rgb)
    }

    // ============== Mesh ==============

    /// Label mesh
    pub fn mesh(&self) -> &LabelMesh {
        &self.mesh
    }

    /// Replace the label mesh
    pub fn set_mesh(&mut self, mesh: LabelMesh) {
        tracing::debug!("Mesh replaced: {} surfaces", mesh.len());
        self.mesh = mesh;
        self.notify(ModelEvent::MeshContentChanged);
    }

    /// Edit the mesh in place (e.g. after regenerating surfaces with the same labels)
    pub fn modify_mesh(&mut self, edit: impl FnOnce(&mut LabelMesh)) {
        edit(&mut self.mesh);
        self.notify(ModelEvent::MeshModelModified);
    }

    /// Remove all surfaces
    pub fn clear_mesh(&mut self) {
        if !self.mesh.is_empty() {
            self.mesh.clear();
            self.notify(ModelEvent::MeshContentChanged);
        }
    }

    /// Number of subscribed queues
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl MeshProvider for Document {
    fn surface_count(&self) -> usize {
        self.mesh.surface_count()
    }

    fn surface(&self, index: usize) -> Option<SurfaceHandle> {
        self.mesh.surface(index)
    }

    fn surface_label(&self, index: usize) -> Option<LabelId> {
        self.mesh.surface_label(index)
    }
}

impl LabelTable for Document {
    fn color_label(&self, id: LabelId) -> ColorLabel {
        self.labels.color_label(id)
    }
}

impl ImageGeometry for Document {
    fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    fn size(&self) -> UVec3 {
        self.image.map_or(UVec3::ZERO, |i| i.size)
    }

    fn spacing(&self) -> Vec3 {
        self.image.map_or(Vec3::ONE, |i| i.spacing)
    }

    fn world_matrix(&self) -> Mat4 {
        self.image.map_or(Mat4::IDENTITY, |i| i.world_matrix())
    }
}

impl CursorSource for Document {
    fn cursor_position(&self) -> UVec3 {
        self.cursor
    }
}

impl ChangeSource for Document {
    fn subscribe(&mut self, queue: ChangeQueue) {
        if !self.subscribers.iter().any(|q| q.same_queue(&queue)) {
            self.subscribers.push(queue);
        }
    }

    fn unsubscribe(&mut self, queue: &ChangeQueue) {
        self.subscribers.retain(|q| !q.same_queue(queue));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SurfaceGeometry;

    fn subscribed() -> (Document, ChangeQueue) {
        let mut doc = Document::new();
        let queue = ChangeQueue::new();
        doc.subscribe(queue.clone());
        (doc, queue)
    }

    fn image_100() -> ImageInfo {
        ImageInfo::new(UVec3::splat(100), Vec3::ONE).unwrap()
    }

    #[test]
    fn test_load_image_centers_cursor() {
        let (mut doc, queue) = subscribed();
        doc.load_image(image_100());
        assert_eq!(doc.cursor(), UVec3::splat(50));
        let changes = queue.take();
        assert!(changes.geometry_changed && changes.cursor_moved);
    }

    #[test]
    fn test_set_cursor_requires_image() {
        let (mut doc, queue) = subscribed();
        assert_eq!(doc.set_cursor(UVec3::ONE), Err(ModelError::NoImage));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_set_cursor_bounds_and_dedup() {
        let (mut doc, queue) = subscribed();
        doc.load_image(image_100());
        queue.take();

        assert!(matches!(
            doc.set_cursor(UVec3::new(100, 0, 0)),
            Err(ModelError::CursorOutOfBounds { .. })
        ));
        doc.set_cursor(UVec3::splat(50)).unwrap();
        assert!(queue.is_empty());

        doc.set_cursor(UVec3::new(10, 20, 30)).unwrap();
        assert!(queue.take().cursor_moved);
    }

    #[test]
    fn test_step_cursor_clamps() {
        let (mut doc, _queue) = subscribed();
        doc.load_image(image_100());
        let cursor = doc.step_cursor(IVec3::new(-80, 60, 0)).unwrap();
        assert_eq!(cursor, UVec3::new(0, 99, 50));
    }

    #[test]
    fn test_label_edits_notify_only_on_change() {
        let (mut doc, queue) = subscribed();
        doc.set_label_visible_in_3d(1, true).unwrap();
        assert!(queue.is_empty());

        doc.set_label_visible_in_3d(1, false).unwrap();
        assert!(queue.take().label_appearance_changed);

        assert_eq!(doc.set_label_alpha(99, 10), Err(ModelError::UnknownLabel(99)));
    }

    #[test]
    fn test_mesh_events() {
        let (mut doc, queue) = subscribed();
        doc.set_mesh([(1, SurfaceGeometry::cuboid(Vec3::ZERO, Vec3::ONE))].into_iter().collect());
        assert!(queue.take().mesh_content_changed);

        doc.modify_mesh(|mesh| mesh.clear());
        let changes = queue.take();
        assert!(changes.mesh_model_modified && !changes.mesh_content_changed);
    }

    #[test]
    fn test_unsubscribe() {
        let (mut doc, queue) = subscribed();
        doc.subscribe(queue.clone());
        assert_eq!(doc.subscriber_count(), 1);
        doc.unsubscribe(&queue);
        doc.load_image(image_100());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_unload_drops_mesh() {
        let (mut doc, queue) = subscribed();
        doc.load_image(image_100());
        doc.set_mesh([(1, SurfaceGeometry::cuboid(Vec3::ZERO, Vec3::ONE))].into_iter().collect());
        queue.take();

        doc.unload_image();
        let changes = queue.take();
        assert!(changes.geometry_changed && changes.mesh_content_changed);
        assert!(!doc.is_loaded());
        assert_eq!(doc.surface_count(), 0);
    }
}
