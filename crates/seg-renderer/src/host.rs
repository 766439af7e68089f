//! Render host: redraw scheduling and frame submission.
//!
//! The host owns the appearance settings and a [`RenderSurface`]. The
//! renderer marks redraws as needed; [`RenderHost::paint`] turns the scene
//! into a [`Frame`] and presents it, at most once per request.

use glam::Mat4;

use seg_core::{LabelId, SurfaceHandle};

use crate::camera::{Camera, CameraUniform};
use crate::config::AppearanceSettings;
use crate::scene::Scene;
use crate::vertex::ColorVertex;

/// Errors reported by render surfaces.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The output surface is gone and must be recreated.
    #[error("Render surface lost")]
    SurfaceLost,
    /// The backend ran out of memory.
    #[error("Out of memory")]
    OutOfMemory,
    /// Any other backend failure.
    #[error("Render error: {0}")]
    Other(String),
}

/// One surface actor as submitted for drawing.
#[derive(Debug, Clone)]
pub struct SurfaceDraw {
    /// Label the surface belongs to.
    pub label: LabelId,
    /// Shared triangle geometry.
    pub geometry: SurfaceHandle,
    /// Model-to-world transform.
    pub transform: Mat4,
    /// RGBA color.
    pub color: [f32; 4],
}

/// Triangle list vertices of all visible surfaces.
#[derive(Debug, Clone, Default)]
pub struct SurfaceVertices {
    /// Fully opaque surfaces.
    pub opaque: Vec<ColorVertex>,
    /// Surfaces with opacity below 1.
    pub translucent: Vec<ColorVertex>,
}

/// Everything a surface needs to draw the 3D view once.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Clear color.
    pub background: [f32; 4],
    /// Camera matrices.
    pub camera: CameraUniform,
    /// Crosshair line list in world space (two vertices per piece).
    pub lines: Vec<ColorVertex>,
    /// Requested crosshair width in pixels (widest drawn axis).
    ///
    /// Advisory: backends without wide-line support draw 1 pixel lines.
    pub line_width: f32,
    /// Visible surfaces.
    pub surfaces: Vec<SurfaceDraw>,
}

impl Frame {
    /// Collect the drawn actors of a scene.
    pub fn build(scene: &Scene, camera: &Camera, appearance: &AppearanceSettings) -> Self {
        let mut lines = Vec::new();
        let mut line_width: f32 = 0.0;
        for actor in scene.axes().iter().filter(|a| a.is_drawn()) {
            let Some(line) = actor.line() else {
                continue;
            };
            line_width = line_width.max(line.width);
            let color = actor.rgba();
            for (a, b) in line.segments() {
                lines.push(ColorVertex::new(actor.transform.transform_point3(a), color));
                lines.push(ColorVertex::new(actor.transform.transform_point3(b), color));
            }
        }

        let surfaces = scene
            .meshes()
            .iter()
            .filter(|a| a.is_drawn())
            .filter_map(|actor| {
                let binding = actor.surface_binding()?;
                Some(SurfaceDraw {
                    label: binding.label,
                    geometry: binding.geometry.clone(),
                    transform: actor.transform,
                    color: actor.rgba(),
                })
            })
            .collect();

        Self {
            background: appearance.background_color(),
            camera: camera.uniform(),
            lines,
            line_width,
            surfaces,
        }
    }

    /// Surface triangles expanded to world-space vertices, split by opacity.
    ///
    /// Opaque surfaces are drawn first with depth writes; translucent ones
    /// blend over them afterwards.
    pub fn surface_vertices(&self) -> SurfaceVertices {
        let mut batches = SurfaceVertices::default();
        for draw in &self.surfaces {
            let target = if draw.color[3] >= 1.0 {
                &mut batches.opaque
            } else {
                &mut batches.translucent
            };
            target.extend(draw.geometry.triangles().flat_map(|triangle| {
                triangle.map(|p| ColorVertex::new(draw.transform.transform_point3(p), draw.color))
            }));
        }
        batches
    }

    /// Total triangle count over all surfaces.
    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.geometry.triangle_count()).sum()
    }
}

/// Output target of the 3D view.
pub trait RenderSurface: Send {
    /// Draw a frame.
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError>;

    /// Viewport size changed.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Surface that draws nothing; keeps the frame count and size.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    presented: u64,
    size: (u32, u32),
}

impl HeadlessSurface {
    /// Create a headless surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            presented: 0,
            size: (width, height),
        }
    }

    /// Number of frames presented.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Current size.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl RenderSurface for HeadlessSurface {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.presented += 1;
        tracing::trace!(
            "Headless frame {}: {} line vertices, {} surfaces",
            self.presented,
            frame.lines.len(),
            frame.surfaces.len()
        );
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }
}

/// Owns the output surface and decides when to repaint.
pub struct RenderHost {
    appearance: AppearanceSettings,
    surface: Box<dyn RenderSurface>,
    redraw_requested: bool,
    redraw_requests: u64,
    paint_count: u64,
    last_frame: Option<Frame>,
}

impl RenderHost {
    /// Create a host drawing to the given surface.
    pub fn new(surface: Box<dyn RenderSurface>, appearance: AppearanceSettings) -> Self {
        Self {
            appearance,
            surface,
            redraw_requested: false,
            redraw_requests: 0,
            paint_count: 0,
            last_frame: None,
        }
    }

    /// Create a host with a [`HeadlessSurface`].
    pub fn headless(appearance: AppearanceSettings) -> Self {
        Self::new(Box::new(HeadlessSurface::new(1, 1)), appearance)
    }

    /// Current appearance settings.
    pub fn appearance(&self) -> &AppearanceSettings {
        &self.appearance
    }

    /// Replace the appearance settings and schedule a redraw.
    pub fn set_appearance(&mut self, appearance: AppearanceSettings) {
        self.appearance = appearance;
        self.request_redraw();
    }

    /// Schedule a repaint. Requests before the next paint coalesce.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
        self.redraw_requests += 1;
    }

    /// Check if a repaint is pending.
    pub fn needs_redraw(&self) -> bool {
        self.redraw_requested
    }

    /// Total redraw requests so far.
    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests
    }

    /// Paint if a redraw was requested.
    ///
    /// Returns whether a frame was presented. A failed present keeps the
    /// request pending so the next call retries.
    pub fn paint(&mut self, scene: &Scene, camera: &Camera) -> Result<bool, RenderError> {
        if !self.redraw_requested {
            return Ok(false);
        }

        let frame = Frame::build(scene, camera, &self.appearance);
        self.surface.present(&frame)?;

        self.redraw_requested = false;
        self.paint_count += 1;
        self.last_frame = Some(frame);
        Ok(true)
    }

    /// Frames presented so far.
    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }

    /// Last presented frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Forward a viewport resize to the surface and schedule a redraw.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use glam::Vec3;
    use seg_core::SurfaceGeometry;

    use super::*;
    use crate::scene::Actor;

    struct FailingSurface;

    impl RenderSurface for FailingSurface {
        fn present(&mut self, _frame: &Frame) -> Result<(), RenderError> {
            Err(RenderError::SurfaceLost)
        }
    }

    struct CountingSurface(Arc<AtomicU64>);

    impl RenderSurface for CountingSurface {
        fn present(&mut self, _frame: &Frame) -> Result<(), RenderError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn scene_with_surface() -> Scene {
        let mut scene = Scene::new();
        let geometry = Arc::new(SurfaceGeometry::cuboid(Vec3::ZERO, Vec3::ONE));
        scene.meshes_mut().push(Actor::surface(1, geometry.clone()));
        let mut hidden = Actor::surface(2, geometry);
        hidden.opacity = 0.0;
        scene.meshes_mut().push(hidden);
        scene
    }

    #[test]
    fn test_frame_skips_hidden_actors() {
        let scene = scene_with_surface();
        let frame = Frame::build(&scene, &Camera::new(1.0), &AppearanceSettings::dark());

        // Axes start hidden
        assert!(frame.lines.is_empty());
        assert_eq!(frame.surfaces.len(), 1);
        assert_eq!(frame.surfaces[0].label, 1);
        assert_eq!(frame.triangle_count(), 12);
        assert_eq!(frame.background, AppearanceSettings::dark().background_color());
    }

    #[test]
    fn test_frame_transforms_lines() {
        let mut scene = Scene::new();
        let axis = &mut scene.axes_mut()[0];
        axis.visible = true;
        axis.transform = Mat4::from_scale(Vec3::splat(2.0));
        let line = axis.line_mut().unwrap();
        line.p2 = Vec3::new(10.0, 0.0, 0.0);
        let pieces = line.resolution as usize;

        let frame = Frame::build(&scene, &Camera::new(1.0), &AppearanceSettings::dark());
        assert_eq!(frame.lines.len(), 2 * pieces);
        assert_eq!(frame.lines.last().unwrap().position, [20.0, 0.0, 0.0]);
    }

    #[test]
    fn test_frame_carries_line_width() {
        let mut scene = Scene::new();
        for (i, axis) in scene.axes_mut().iter_mut().enumerate() {
            axis.visible = true;
            let line = axis.line_mut().unwrap();
            line.p2 = Vec3::X;
            line.width = 1.0 + i as f32;
        }
        scene.axes_mut()[2].visible = false;

        let frame = Frame::build(&scene, &Camera::new(1.0), &AppearanceSettings::dark());
        assert_eq!(frame.line_width, 2.0);

        let empty = Frame::build(&Scene::new(), &Camera::new(1.0), &AppearanceSettings::dark());
        assert_eq!(empty.line_width, 0.0);
    }

    #[test]
    fn test_surface_vertices_split_by_opacity() {
        let mut scene = Scene::new();
        let geometry = Arc::new(SurfaceGeometry::cuboid(Vec3::ZERO, Vec3::ONE));
        let mut translucent = Actor::surface(1, geometry.clone());
        translucent.opacity = 0.5;
        scene.meshes_mut().push(translucent);
        let mut opaque = Actor::surface(2, geometry);
        opaque.transform = Mat4::from_translation(Vec3::splat(10.0));
        scene.meshes_mut().push(opaque);

        let frame = Frame::build(&scene, &Camera::new(1.0), &AppearanceSettings::dark());
        let batches = frame.surface_vertices();

        assert_eq!(batches.opaque.len(), 36);
        assert_eq!(batches.translucent.len(), 36);
        assert!(batches.opaque.iter().all(|v| v.color[3] == 1.0));
        assert!(batches.translucent.iter().all(|v| v.color[3] == 0.5));
        // Transforms are applied on expansion
        assert!(batches.opaque.iter().all(|v| v.position[0] >= 10.0));
    }

    #[test]
    fn test_paint_once_per_request() {
        let presented = Arc::new(AtomicU64::new(0));
        let mut host = RenderHost::new(
            Box::new(CountingSurface(presented.clone())),
            AppearanceSettings::dark(),
        );
        let scene = Scene::new();
        let camera = Camera::new(1.0);

        assert!(!host.paint(&scene, &camera).unwrap());
        host.request_redraw();
        host.request_redraw();
        assert!(host.paint(&scene, &camera).unwrap());
        assert!(!host.paint(&scene, &camera).unwrap());

        assert_eq!(presented.load(Ordering::SeqCst), 1);
        assert_eq!(host.paint_count(), 1);
        assert_eq!(host.redraw_requests(), 2);
        assert!(host.last_frame().is_some());
    }

    #[test]
    fn test_failed_paint_stays_pending() {
        let mut host = RenderHost::new(Box::new(FailingSurface), AppearanceSettings::dark());
        host.request_redraw();

        let result = host.paint(&Scene::new(), &Camera::new(1.0));
        assert_eq!(result, Err(RenderError::SurfaceLost));
        assert!(host.needs_redraw());
        assert_eq!(host.paint_count(), 0);
    }
}
