//! Per-label surface meshes

use std::sync::Arc;

use glam::Vec3;
use uuid::Uuid;

use crate::label::LabelId;
use crate::model::MeshProvider;

/// Triangulated surface of one label, in world coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGeometry {
    pub id: Uuid,
    /// Vertex positions
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices (3 per triangle)
    pub indices: Vec<u32>,
}

/// Shared handle to surface geometry; the mesh object owns it, actors only reference it
pub type SurfaceHandle = Arc<SurfaceGeometry>;

impl SurfaceGeometry {
    /// Create a surface from vertex and index arrays
    pub fn new(vertices: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vertices,
            indices,
        }
    }

    /// Axis-aligned box surface between two corners (12 triangles)
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let vertices = (0..8)
            .map(|i| {
                [
                    if i & 1 == 0 { min.x } else { max.x },
                    if i & 2 == 0 { min.y } else { max.y },
                    if i & 4 == 0 { min.z } else { max.z },
                ]
            })
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -Z
            4, 5, 6, 5, 7, 6, // +Z
            0, 1, 4, 1, 5, 4, // -Y
            2, 6, 3, 3, 6, 7, // +Y
            0, 4, 2, 2, 4, 6, // -X
            1, 3, 5, 3, 7, 5, // +X
        ];

        Self::new(vertices, indices)
    }

    /// Number of complete triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex positions, skipping out-of-range indices
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([Vec3::from(*a), Vec3::from(*b), Vec3::from(*c)])
        })
    }

    /// Bounding box (min, max); `None` for a surface without vertices
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.vertices.iter().map(|v| Vec3::from(*v));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

/// One surface of the mesh object together with the label it was extracted for
#[derive(Debug, Clone)]
pub struct LabelSurface {
    pub label: LabelId,
    pub geometry: SurfaceHandle,
}

/// Mesh object: the list of label surfaces, in generation order
#[derive(Debug, Clone, Default)]
pub struct LabelMesh {
    surfaces: Vec<LabelSurface>,
}

impl LabelMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a surface for a label
    pub fn push(&mut self, label: LabelId, geometry: SurfaceGeometry) -> SurfaceHandle {
        let geometry = Arc::new(geometry);
        self.surfaces.push(LabelSurface {
            label,
            geometry: geometry.clone(),
        });
        geometry
    }

    /// Remove all surfaces of a label, returning how many were removed
    pub fn remove_label(&mut self, label: LabelId) -> usize {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| s.label != label);
        before - self.surfaces.len()
    }

    /// Remove all surfaces
    pub fn clear(&mut self) {
        self.surfaces.clear();
    }

    /// Surfaces in generation order
    pub fn surfaces(&self) -> &[LabelSurface] {
        &self.surfaces
    }

    /// Labels in generation order
    pub fn labels(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.surfaces.iter().map(|s| s.label)
    }

    /// Number of surfaces
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Check if the mesh has no surfaces
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl FromIterator<(LabelId, SurfaceGeometry)> for LabelMesh {
    fn from_iter<I: IntoIterator<Item = (LabelId, SurfaceGeometry)>>(iter: I) -> Self {
        let mut mesh = Self::new();
        for (label, geometry) in iter {
            mesh.push(label, geometry);
        }
        mesh
    }
}

impl MeshProvider for LabelMesh {
    fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    fn surface(&self, index: usize) -> Option<SurfaceHandle> {
        self.surfaces.get(index).map(|s| s.geometry.clone())
    }

    fn surface_label(&self, index: usize) -> Option<LabelId> {
        self.surfaces.get(index).map(|s| s.label)
    }
}
