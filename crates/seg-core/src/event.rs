//! Change notifications from the document to its views
//!
//! Every mutation of the document emits one [`ModelEvent`]. Views do not
//! react to events one by one: each subscriber owns a [`ChangeQueue`] that
//! folds events into a [`ChangeSet`], and the view drains the whole set once
//! per update cycle.

use std::sync::Arc;

use parking_lot::Mutex;

/// Category of a document change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelEvent {
    /// Main image loaded, unloaded or resized
    GeometryChanged,
    /// Cursor moved to another voxel
    CursorMoved,
    /// Color, opacity or 3D visibility of a label changed
    LabelAppearanceChanged,
    /// Surfaces were added, removed or replaced
    MeshContentChanged,
    /// The mesh object itself was modified (regenerated in place)
    MeshModelModified,
}

/// Distinct change categories accumulated since the last update cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub geometry_changed: bool,
    pub cursor_moved: bool,
    pub label_appearance_changed: bool,
    pub mesh_content_changed: bool,
    pub mesh_model_modified: bool,
}

impl ChangeSet {
    /// An empty change set
    pub const fn new() -> Self {
        Self {
            geometry_changed: false,
            cursor_moved: false,
            label_appearance_changed: false,
            mesh_content_changed: false,
            mesh_model_modified: false,
        }
    }

    fn flag_mut(&mut self, event: ModelEvent) -> &mut bool {
        match event {
            ModelEvent::GeometryChanged => &mut self.geometry_changed,
            ModelEvent::CursorMoved => &mut self.cursor_moved,
            ModelEvent::LabelAppearanceChanged => &mut self.label_appearance_changed,
            ModelEvent::MeshContentChanged => &mut self.mesh_content_changed,
            ModelEvent::MeshModelModified => &mut self.mesh_model_modified,
        }
    }

    /// Record an event
    pub fn insert(&mut self, event: ModelEvent) {
        *self.flag_mut(event) = true;
    }

    /// Check if an event category is pending
    pub fn contains(&self, event: ModelEvent) -> bool {
        match event {
            ModelEvent::GeometryChanged => self.geometry_changed,
            ModelEvent::CursorMoved => self.cursor_moved,
            ModelEvent::LabelAppearanceChanged => self.label_appearance_changed,
            ModelEvent::MeshContentChanged => self.mesh_content_changed,
            ModelEvent::MeshModelModified => self.mesh_model_modified,
        }
    }

    /// Fold another set into this one
    pub fn merge(&mut self, other: ChangeSet) {
        self.geometry_changed |= other.geometry_changed;
        self.cursor_moved |= other.cursor_moved;
        self.label_appearance_changed |= other.label_appearance_changed;
        self.mesh_content_changed |= other.mesh_content_changed;
        self.mesh_model_modified |= other.mesh_model_modified;
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        *self == Self::new()
    }

    /// Forget all pending changes
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Extend<ModelEvent> for ChangeSet {
    fn extend<I: IntoIterator<Item = ModelEvent>>(&mut self, iter: I) {
        for event in iter {
            self.insert(event);
        }
    }
}

impl FromIterator<ModelEvent> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ModelEvent>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Pending changes of one subscriber.
///
/// This is the only object shared between the thread producing changes and
/// the thread running the view: producers insert under the lock, the view
/// drains and clears in one locked step.
#[derive(Debug, Clone, Default)]
pub struct ChangeQueue {
    pending: Arc<Mutex<ChangeSet>>,
}

impl ChangeQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn push(&self, event: ModelEvent) {
        self.pending.lock().insert(event);
    }

    /// Drain all pending changes
    pub fn take(&self) -> ChangeSet {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Copy of the pending changes, without draining
    pub fn peek(&self) -> ChangeSet {
        *self.pending.lock()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Check if two handles refer to the same queue
    pub fn same_queue(&self, other: &ChangeQueue) -> bool {
        Arc::ptr_eq(&self.pending, &other.pending)
    }
}
