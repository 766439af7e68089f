//! Picking in the 3D view
//!
//! Casts a ray from a screen position through the camera and finds the
//! nearest visible label surface it hits. The hit is reported in world
//! space and as an image voxel, so a click on a surface can move the cursor.

use glam::{UVec3, Vec2, Vec3};

use seg_core::{ImageGeometry, LabelId};

use crate::camera::Camera;
use crate::scene::Scene;

/// Surface hit under a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// Hit point in world coordinates.
    pub world: Vec3,
    /// Image voxel containing the hit, clamped to the image.
    pub voxel: UVec3,
    /// Label of the surface that was hit.
    pub label: LabelId,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// Ray-triangle intersection (Möller-Trumbore).
///
/// # Returns
///
/// * `Some(t)` - Ray parameter of the hit; the point is `origin + t * dir`.
/// * `None` - The ray misses the triangle, is parallel to it, or the hit
///   lies behind the origin.
pub fn ray_triangle_intersection(origin: Vec3, dir: Vec3, triangle: [Vec3; 3]) -> Option<f32> {
    let [v0, v1, v2] = triangle;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p = dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > 1e-6).then_some(t)
}

/// Pick the nearest drawn surface under a screen position.
///
/// `screen` is in pixels with the origin at the top-left of a viewport of
/// size `viewport`. Returns `None` without an image, for an empty viewport,
/// or when nothing is hit.
pub fn pick<G>(
    camera: &Camera,
    screen: Vec2,
    viewport: Vec2,
    scene: &Scene,
    geometry: &G,
) -> Option<PickResult>
where
    G: ImageGeometry + ?Sized,
{
    if !geometry.is_loaded() || viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }

    let (origin, dir) = camera.screen_to_ray(screen.x, screen.y, viewport.x, viewport.y);

    let mut nearest: Option<(f32, LabelId)> = None;
    for actor in scene.meshes().iter().filter(|a| a.is_drawn()) {
        let Some(binding) = actor.surface_binding() else {
            continue;
        };
        for triangle in binding.geometry.triangles() {
            let triangle = triangle.map(|v| actor.transform.transform_point3(v));
            let Some(t) = ray_triangle_intersection(origin, dir, triangle) else {
                continue;
            };
            if nearest.is_none_or(|(best, _)| t < best) {
                nearest = Some((t, binding.label));
            }
        }
    }

    let (distance, label) = nearest?;
    let world = origin + dir * distance;
    let max_voxel = (geometry.size().max(UVec3::ONE) - UVec3::ONE).as_vec3();
    let voxel = geometry
        .world_to_voxel(world)
        .round()
        .clamp(Vec3::ZERO, max_voxel)
        .as_uvec3();

    tracing::debug!("Picked label {} at {} (voxel {})", label, world, voxel);
    Some(PickResult {
        world,
        voxel,
        label,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use seg_core::{Document, ImageInfo, SurfaceGeometry};

    use super::*;
    use crate::config::CameraConfig;
    use crate::renderer::CameraController;
    use crate::scene::Actor;

    fn setup() -> (Document, Scene, Camera) {
        let mut doc = Document::new();
        doc.load_image(ImageInfo::new(UVec3::splat(100), Vec3::ONE).unwrap());

        let mut scene = Scene::new();
        let cube = SurfaceGeometry::cuboid(Vec3::splat(40.0), Vec3::splat(60.0));
        scene.meshes_mut().push(Actor::surface(3, Arc::new(cube)));

        let mut controller = CameraController::new(&CameraConfig::default(), 1.0);
        controller.reset(Vec3::splat(50.0), Vec3::splat(100.0));
        (doc, scene, controller.camera().clone())
    }

    #[test]
    fn test_ray_triangle() {
        let triangle = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let hit = ray_triangle_intersection(Vec3::new(0.25, 0.25, 1.0), Vec3::NEG_Z, triangle);
        assert!((hit.unwrap() - 1.0).abs() < 1e-6);

        assert!(ray_triangle_intersection(Vec3::new(2.0, 2.0, 1.0), Vec3::NEG_Z, triangle).is_none());
        assert!(ray_triangle_intersection(Vec3::new(0.25, 0.25, 1.0), Vec3::Z, triangle).is_none());
    }

    #[test]
    fn test_pick_center_hits_front_face() {
        let (doc, scene, camera) = setup();
        let viewport = Vec2::new(200.0, 200.0);

        let result = pick(&camera, viewport / 2.0, viewport, &scene, &doc).unwrap();
        assert_eq!(result.label, 3);
        assert_eq!(result.voxel, UVec3::new(40, 50, 50));
        assert!((result.world.x - 40.0).abs() < 1e-2);
    }

    #[test]
    fn test_pick_miss() {
        let (doc, scene, camera) = setup();
        let viewport = Vec2::new(200.0, 200.0);
        assert!(pick(&camera, Vec2::new(1.0, 1.0), viewport, &scene, &doc).is_none());
    }

    #[test]
    fn test_pick_ignores_hidden_surfaces() {
        let (doc, mut scene, camera) = setup();
        scene.meshes_mut().get_mut(0).unwrap().opacity = 0.0;
        let viewport = Vec2::new(200.0, 200.0);
        assert!(pick(&camera, viewport / 2.0, viewport, &scene, &doc).is_none());
    }

    #[test]
    fn test_pick_requires_image() {
        let (_, scene, camera) = setup();
        let viewport = Vec2::new(200.0, 200.0);
        assert!(pick(&camera, viewport / 2.0, viewport, &scene, &Document::new()).is_none());
    }
}
