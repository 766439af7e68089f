//! Image geometry of the main (segmented) image

use glam::{Mat4, UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::document::ModelError;

/// Voxel grid description of a loaded image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Number of voxels along each axis
    pub size: UVec3,
    /// Physical voxel spacing (mm)
    pub spacing: Vec3,
    /// World position of voxel (0, 0, 0)
    pub origin: Vec3,
}

impl ImageInfo {
    /// Create image info with origin at zero.
    ///
    /// Fails if any dimension is empty or any spacing is not a positive finite number.
    pub fn new(size: UVec3, spacing: Vec3) -> Result<Self, ModelError> {
        if size.min_element() == 0 {
            return Err(ModelError::InvalidImage(format!("empty size {size}")));
        }
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(ModelError::InvalidImage(format!("bad spacing {spacing}")));
        }
        Ok(Self {
            size,
            spacing,
            origin: Vec3::ZERO,
        })
    }

    /// Builder-style origin override
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Voxel-to-world matrix (scale by spacing, then translate to origin)
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.origin) * Mat4::from_scale(self.spacing)
    }

    /// Physical extent of the volume (size * spacing)
    pub fn physical_extent(&self) -> Vec3 {
        self.size.as_vec3() * self.spacing
    }

    /// Voxel at the middle of the volume
    pub fn center_voxel(&self) -> UVec3 {
        self.size / 2
    }

    /// Check if a voxel index lies inside the volume
    pub fn contains_voxel(&self, voxel: UVec3) -> bool {
        voxel.cmplt(self.size).all()
    }

    /// Clamp a continuous voxel coordinate to the nearest valid voxel index
    pub fn clamp_voxel(&self, voxel: Vec3) -> UVec3 {
        let max = (self.size - UVec3::ONE).as_vec3();
        voxel.round().clamp(Vec3::ZERO, max).as_uvec3()
    }
}
