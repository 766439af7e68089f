//! Synthetic segmentation for the scripted session

use glam::{IVec3, UVec3, Vec2, Vec3};

use seg_core::{ImageInfo, LabelMesh, ModelError, SurfaceGeometry};

use crate::state::ViewerAction;

/// A 64 x 64 x 48 image with anisotropic voxels.
pub fn synthetic_image() -> Result<ImageInfo, ModelError> {
    Ok(ImageInfo::new(UVec3::new(64, 64, 48), Vec3::new(1.0, 1.0, 1.5))?
        .with_origin(Vec3::new(-32.0, -32.0, 0.0)))
}

/// Three labeled blocks placed inside [`synthetic_image`], in world space.
pub fn synthetic_mesh() -> LabelMesh {
    [
        (
            1,
            SurfaceGeometry::cuboid(Vec3::new(-20.0, -10.0, 10.0), Vec3::new(-5.0, 10.0, 40.0)),
        ),
        (
            2,
            SurfaceGeometry::cuboid(Vec3::new(5.0, -10.0, 10.0), Vec3::new(20.0, 10.0, 40.0)),
        ),
        (
            3,
            SurfaceGeometry::cuboid(Vec3::new(-8.0, -25.0, 50.0), Vec3::new(8.0, -15.0, 60.0)),
        ),
    ]
    .into_iter()
    .collect()
}

/// Scripted session, one batch of actions per frame.
pub fn scripted_session(image: ImageInfo) -> Vec<Vec<ViewerAction>> {
    vec![
        vec![
            ViewerAction::Resize {
                width: 800,
                height: 600,
            },
            ViewerAction::LoadImage(image),
            ViewerAction::ReplaceMesh(synthetic_mesh()),
        ],
        vec![ViewerAction::SetCursor(UVec3::new(10, 40, 20))],
        vec![
            ViewerAction::StepCursor(IVec3::new(1, 0, 0)),
            ViewerAction::StepCursor(IVec3::new(0, -2, 0)),
        ],
        vec![ViewerAction::SetLabelVisibleIn3d {
            label: 2,
            visible: false,
        }],
        vec![ViewerAction::SetLabelAlpha {
            label: 1,
            alpha: 128,
        }],
        vec![
            ViewerAction::SetLabelVisibleIn3d {
                label: 2,
                visible: true,
            },
            ViewerAction::SetLabelColor {
                label: 3,
                rgb: [255, 128, 0],
            },
        ],
        vec![ViewerAction::ResetView],
        vec![ViewerAction::PickAt(Vec2::new(400.0, 300.0))],
        vec![],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_inside_image() {
        let image = synthetic_image().unwrap();
        let world = image.world_matrix();
        let max = world.transform_point3(image.size.as_vec3());
        let min = world.transform_point3(Vec3::ZERO);

        for surface in synthetic_mesh().surfaces() {
            let (lo, hi) = surface.geometry.bounds().unwrap();
            assert!(lo.cmpge(min).all() && hi.cmple(max).all());
        }
    }
}
