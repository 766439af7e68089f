//! Scene camera

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::config::CameraConfig;
use crate::scene::Aabb;

/// Camera uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    /// Projection * view
    pub view_proj: [[f32; 4]; 4],
    /// World-to-view matrix
    pub view: [[f32; 4]; 4],
    /// Projection matrix
    pub proj: [[f32; 4]; 4],
    /// Camera position (w = 1)
    pub eye: [f32; 4],
}

/// Perspective camera looking at a focal point
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,
    /// Point the camera looks at
    pub focal_point: Vec3,
    /// View up direction
    pub up: Vec3,
    /// Volume the camera was last fitted to
    pub view_bounds: Option<Aabb>,
    /// Vertical view angle (radians)
    pub fov: f32,
    /// Viewport width / height
    pub aspect: f32,
    /// Near clipping distance
    pub near: f32,
    /// Far clipping distance
    pub far: f32,
}

impl Camera {
    /// Create a camera at +Z looking at the origin
    pub fn new(aspect: f32) -> Self {
        Self::from_config(&CameraConfig::default(), aspect)
    }

    /// Create a camera with configured projection parameters
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::Z,
            focal_point: Vec3::ZERO,
            up: Vec3::Y,
            view_bounds: None,
            fov: config.fov_degrees.clamp(1.0, 179.0).to_radians(),
            aspect,
            near: config.near_plane.max(0.001),
            far: config.far_plane.max(config.near_plane + 1.0),
        }
    }

    /// Update aspect ratio
    pub fn update_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Set field of view in degrees
    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov = fov_degrees.clamp(1.0, 179.0).to_radians();
    }

    /// Get field of view in degrees
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Distance between eye and focal point
    pub fn distance(&self) -> f32 {
        self.position.distance(self.focal_point)
    }

    /// Unit vector from the eye toward the focal point
    pub fn direction(&self) -> Vec3 {
        (self.focal_point - self.position)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    /// Fit the camera to a box, keeping the current view direction.
    ///
    /// The focal point moves to the box center and the eye backs off along
    /// the view direction until the bounding sphere fills the view angle.
    /// Clipping planes are set to enclose the sphere.
    pub fn fit_bounds(&mut self, bounds: Aabb) {
        let center = bounds.center();
        let mut radius = bounds.radius();
        if radius <= f32::EPSILON {
            radius = 0.5;
        }

        let direction = self.direction();
        if self.up.cross(direction).length_squared() < 1e-6 {
            // Up parallel to the view direction: rotate it out of the way
            self.up = Vec3::new(-self.up.z, self.up.x, self.up.y);
        }

        let distance = radius / (self.fov * 0.5).sin();
        self.focal_point = center;
        self.position = center - direction * distance;
        self.near = ((distance - radius) * 0.99).max(distance * 0.001);
        self.far = (distance + radius) * 1.01;
        self.view_bounds = Some(bounds);
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.focal_point, self.up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get camera uniform data
    pub fn uniform(&self) -> CameraUniform {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        let view_proj = proj * view;

        CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            eye: self.position.extend(1.0).to_array(),
        }
    }

    /// Convert screen coordinates (pixels, origin top-left) to a world ray
    pub fn screen_to_ray(
        &self,
        screen_x: f32,
        screen_y: f32,
        screen_width: f32,
        screen_height: f32,
    ) -> (Vec3, Vec3) {
        let ndc_x = (2.0 * screen_x / screen_width) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_y / screen_height);

        let inv_view_proj = (self.projection_matrix() * self.view_matrix()).inverse();
        let unproject = |ndc_z: f32| {
            let p = inv_view_proj * Vec4::new(ndc_x, ndc_y, ndc_z, 1.0);
            p.truncate() / p.w
        };

        // wgpu depth range is [0, 1]
        let near_world = unproject(0.0);
        let far_world = unproject(1.0);

        (near_world, (far_world - near_world).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bounds_keeps_direction() {
        let mut camera = Camera::new(1.0);
        camera.position = Vec3::new(-1.0, 0.0, 0.0);
        camera.focal_point = Vec3::ZERO;
        camera.up = Vec3::Z;

        let bounds = Aabb::centered(Vec3::splat(10.0), Vec3::splat(4.0));
        camera.fit_bounds(bounds);

        assert_eq!(camera.focal_point, Vec3::splat(10.0));
        assert!((camera.direction() - Vec3::X).length() < 1e-5);
        assert!(camera.distance() > bounds.radius());
        assert!(camera.near < camera.distance() - bounds.radius());
        assert!(camera.far > camera.distance() + bounds.radius());
    }

    #[test]
    fn test_fit_bounds_fixes_parallel_up() {
        let mut camera = Camera::new(1.0);
        camera.up = Vec3::Z;
        camera.fit_bounds(Aabb::centered(Vec3::ZERO, Vec3::ONE));
        assert!(camera.up.cross(camera.direction()).length() > 0.5);
    }

    #[test]
    fn test_center_ray_hits_focal_point() {
        let mut camera = Camera::new(2.0);
        camera.position = Vec3::new(0.0, -10.0, 0.0);
        camera.up = Vec3::Z;
        camera.fit_bounds(Aabb::centered(Vec3::ZERO, Vec3::splat(2.0)));

        let (origin, direction) = camera.screen_to_ray(100.0, 50.0, 200.0, 100.0);
        let to_focal = (camera.focal_point - origin).normalize();
        assert!((direction - to_focal).length() < 1e-4);
    }
}
