//! Scene primitives.
//!
//! A passive container: three crosshair actors and the mesh actor collection.
//! It holds no invariants of its own; the renderer keeps it consistent.

mod actor;
mod bounds;
mod collection;

pub use actor::{Actor, ActorGeometry, LineGeometry, Stipple, SurfaceBinding};
pub use bounds::Aabb;
pub use collection::MeshActorCollection;

/// The 3D scene.
#[derive(Debug, Clone)]
pub struct Scene {
    axes: [Actor; 3],
    meshes: MeshActorCollection,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene with hidden crosshair axes and no surfaces.
    pub fn new() -> Self {
        Self {
            axes: [Actor::axis(), Actor::axis(), Actor::axis()],
            meshes: MeshActorCollection::new(),
        }
    }

    /// Crosshair actors, indexed by spatial axis.
    pub fn axes(&self) -> &[Actor; 3] {
        &self.axes
    }

    /// Mutable crosshair actors.
    pub fn axes_mut(&mut self) -> &mut [Actor; 3] {
        &mut self.axes
    }

    /// Surface actors.
    pub fn meshes(&self) -> &MeshActorCollection {
        &self.meshes
    }

    /// Mutable surface actors.
    pub fn meshes_mut(&mut self) -> &mut MeshActorCollection {
        &mut self.meshes
    }

    /// All actors: axes first, then surfaces in order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.axes.iter().chain(self.meshes.iter())
    }
}
