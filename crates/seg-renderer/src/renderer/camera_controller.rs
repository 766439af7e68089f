//! Camera placement relative to the cursor and image.

use glam::Vec3;

use crate::camera::Camera;
use crate::config::CameraConfig;
use crate::constants::SUPERIOR;
use crate::scene::Aabb;

/// Places the camera from cursor and image geometry.
pub struct CameraController {
    camera: Camera,
}

impl CameraController {
    /// Create a controller with a configured camera.
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            camera: Camera::from_config(config, aspect),
        }
    }

    /// Get a reference to the camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Get a mutable reference to the camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Full reset: look at the cursor from the low end of the first axis,
    /// superior up, framing a box of the image's physical size centered on
    /// the cursor.
    pub fn reset(&mut self, cursor_world: Vec3, image_extent: Vec3) {
        let bounds = Aabb::centered(cursor_world, image_extent);

        self.camera.focal_point = cursor_world;
        self.camera.position = Vec3::new(bounds.min.x, cursor_world.y, cursor_world.z);
        self.camera.up = SUPERIOR;
        self.camera.fit_bounds(bounds);

        tracing::debug!(
            "Camera reset: focal={}, position={}, bounds={:?}",
            self.camera.focal_point,
            self.camera.position,
            bounds
        );
    }

    /// Move only the focal point; position, up and view volume are kept.
    pub fn retarget(&mut self, cursor_world: Vec3) {
        self.camera.focal_point = cursor_world;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_centers_cursor() {
        let mut controller = CameraController::new(&CameraConfig::default(), 1.0);
        controller.reset(Vec3::splat(50.0), Vec3::splat(100.0));

        let camera = controller.camera();
        assert_eq!(camera.focal_point, Vec3::splat(50.0));
        assert_eq!(
            camera.view_bounds,
            Some(Aabb::new(Vec3::ZERO, Vec3::splat(100.0)))
        );
        assert_eq!(camera.up, Vec3::Z);
        // Looking down the first axis from its low end
        assert_eq!(camera.position.y, 50.0);
        assert_eq!(camera.position.z, 50.0);
        assert!(camera.position.x < 0.0);
    }

    #[test]
    fn test_retarget_only_moves_focal_point() {
        let mut controller = CameraController::new(&CameraConfig::default(), 1.0);
        controller.reset(Vec3::splat(50.0), Vec3::splat(100.0));
        let before = controller.camera().clone();

        controller.retarget(Vec3::new(10.0, 20.0, 30.0));
        controller.retarget(Vec3::new(11.0, 21.0, 31.0));

        let after = controller.camera();
        assert_eq!(after.focal_point, Vec3::new(11.0, 21.0, 31.0));
        assert_eq!(after.position, before.position);
        assert_eq!(after.up, before.up);
        assert_eq!(after.view_bounds, before.view_bounds);
    }
}
