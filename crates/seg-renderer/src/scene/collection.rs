//! Mesh actor collection.

use seg_core::LabelId;

use super::Actor;

/// Ordered surface actors, in the mesh object's surface order.
///
/// The revision counter plays the role of a modification timestamp: it is
/// bumped by every structural pass, including one that leaves the collection
/// empty, so stale geometry is dropped by the next redraw.
#[derive(Debug, Clone, Default)]
pub struct MeshActorCollection {
    actors: Vec<Actor>,
    revision: u64,
}

impl MeshActorCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an actor.
    pub fn push(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// Remove the actor at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Actor> {
        (index < self.actors.len()).then(|| self.actors.remove(index))
    }

    /// Remove every actor of a label, returning how many were removed.
    pub fn remove_label(&mut self, label: LabelId) -> usize {
        let before = self.actors.len();
        self.actors.retain(|a| a.label() != Some(label));
        before - self.actors.len()
    }

    /// Remove all actors.
    pub fn clear(&mut self) {
        self.actors.clear();
    }

    /// Record a structural modification.
    pub fn mark_modified(&mut self) {
        self.revision += 1;
    }

    /// Number of structural modifications so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Actor at `index`.
    pub fn get(&self, index: usize) -> Option<&Actor> {
        self.actors.get(index)
    }

    /// Mutable actor at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Actor> {
        self.actors.get_mut(index)
    }

    /// First actor of a label.
    pub fn find_label(&self, label: LabelId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.label() == Some(label))
    }

    /// Iterate actors in order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    /// Iterate actors mutably in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    /// Labels in order.
    pub fn labels(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.actors.iter().filter_map(Actor::label)
    }

    /// Number of actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Check if there are no actors.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
