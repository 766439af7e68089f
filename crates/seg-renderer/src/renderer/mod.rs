//! Scene reconciliation.
//!
//! This module provides the [`SceneRenderer`], which keeps the 3D scene and
//! camera consistent with the application model.
//!
//! # Architecture
//!
//! The renderer is composed of a few focused pieces:
//! - [`SyncPlan`]: Maps pending changes to the work of one pass
//! - [`rebuild_mesh_actors`] / [`update_mesh_appearance`]: Mesh actor sync
//! - [`update_axis_lines`]: Crosshair placement
//! - [`CameraController`]: Camera reset and retargeting
//!
//! The model pushes [`ModelEvent`](seg_core::ModelEvent)s into the
//! renderer's [`ChangeQueue`] from any thread. [`SceneRenderer::on_update`]
//! runs on the render thread, drains the queue and applies the plan.

mod axis_sync;
mod camera_controller;
mod mesh_sync;
mod plan;

pub use axis_sync::update_axis_lines;
pub use camera_controller::CameraController;
pub use mesh_sync::{rebuild_mesh_actors, update_mesh_appearance};
pub use plan::{MeshSync, SyncPlan, ViewSync};

use glam::Vec2;

use seg_core::{ChangeQueue, ChangeSet, SceneModel, SharedModel};

use crate::camera::Camera;
use crate::config::{AppearanceSettings, RendererConfig};
use crate::host::{RenderError, RenderHost};
use crate::picker::{PickResult, pick};
use crate::scene::Scene;

/// Keeps the scene and camera in sync with a shared model and paints it.
pub struct SceneRenderer {
    model: Option<SharedModel>,
    changes: ChangeQueue,
    scene: Scene,
    camera: CameraController,
    host: RenderHost,
    viewport: Vec2,
}

impl SceneRenderer {
    /// Create a renderer without a model.
    pub fn new(host: RenderHost, config: &RendererConfig) -> Self {
        Self {
            model: None,
            changes: ChangeQueue::new(),
            scene: Scene::new(),
            camera: CameraController::new(&config.camera, 1.0),
            host,
            viewport: Vec2::ONE,
        }
    }

    /// Create a renderer drawing to a headless surface.
    pub fn headless(config: &RendererConfig) -> Self {
        Self::new(RenderHost::headless(config.appearance.clone()), config)
    }

    // ============== Model binding ==============

    /// Bind a model, replacing any previous one.
    ///
    /// Unsubscribes from the previous model, subscribes to the new one and
    /// runs a full pass (mesh rebuild, axes and camera reset). Changes still
    /// queued from the previous model are discarded.
    pub fn set_model(&mut self, model: SharedModel) {
        self.detach_model();

        model.write().subscribe(self.changes.clone());
        self.model = Some(model.clone());
        tracing::info!("Model bound to 3D view");

        let guard = model.read();
        self.changes.take();
        self.apply(&*guard, SyncPlan::FULL);
    }

    /// Unbind the current model. The scene keeps its last state.
    pub fn detach_model(&mut self) {
        if let Some(old) = self.model.take() {
            old.write().unsubscribe(&self.changes);
            tracing::debug!("Model detached from 3D view");
        }
    }

    /// Check if a model is bound.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    // ============== Reconciliation ==============

    /// Resolve all changes queued since the last pass.
    ///
    /// The queue is drained while holding the model's read lock. Producers
    /// notify under the write lock, so the drained changes always describe
    /// the model state the pass reads.
    ///
    /// Returns the plan that was applied; [`SyncPlan::IDLE`] when nothing was
    /// pending, in which case nothing is touched and no redraw is requested.
    pub fn on_update(&mut self) -> SyncPlan {
        let Some(model) = self.model.clone() else {
            self.changes.take();
            return SyncPlan::IDLE;
        };
        let guard = model.read();

        let changes = self.changes.take();
        let plan = SyncPlan::from_changes(&changes);
        if plan.is_idle() {
            return plan;
        }
        tracing::trace!("Pending changes: {:?}", changes);
        self.apply(&*guard, plan);
        plan
    }

    fn apply(&mut self, model: &dyn SceneModel, plan: SyncPlan) {
        match plan.mesh {
            MeshSync::None => {}
            MeshSync::Rebuild => {
                rebuild_mesh_actors(self.scene.meshes_mut(), model, model);
            }
            MeshSync::Appearance => {
                update_mesh_appearance(self.scene.meshes_mut(), model, model);
            }
        }

        if model.is_loaded() {
            match plan.view {
                ViewSync::None => {}
                ViewSync::Reset => {
                    update_axis_lines(self.scene.axes_mut(), model, self.host.appearance());
                    self.reset_camera(model);
                }
                ViewSync::Retarget => {
                    update_axis_lines(self.scene.axes_mut(), model, self.host.appearance());
                    let cursor = model.voxel_to_world(model.cursor_position().as_vec3());
                    self.camera.retarget(cursor);
                }
            }
        }

        tracing::debug!(
            "Sync pass: mesh={:?}, view={:?}, actors={}",
            plan.mesh,
            plan.view,
            self.scene.meshes().len()
        );
        self.host.request_redraw();
    }

    fn reset_camera(&mut self, model: &dyn SceneModel) {
        let cursor = model.voxel_to_world(model.cursor_position().as_vec3());
        self.camera.reset(cursor, model.physical_extent());
    }

    /// Reset the camera to the default view around the cursor.
    ///
    /// Does nothing without an image.
    pub fn reset_view(&mut self) {
        let Some(model) = self.model.clone() else {
            return;
        };
        let model = model.read();
        if !model.is_loaded() {
            return;
        }
        self.reset_camera(&*model);
        self.host.request_redraw();
    }

    /// Apply new appearance settings to the crosshairs and background.
    pub fn set_appearance(&mut self, appearance: AppearanceSettings) {
        self.host.set_appearance(appearance);
        if let Some(model) = self.model.clone() {
            let model = model.read();
            update_axis_lines(self.scene.axes_mut(), &*model, self.host.appearance());
        }
    }

    // ============== Output ==============

    /// Viewport size changed.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.camera
            .camera_mut()
            .update_aspect(width as f32 / height as f32);
        self.host.resize(width, height);
    }

    /// Paint if a redraw is pending. Returns whether a frame was presented.
    pub fn paint(&mut self) -> Result<bool, RenderError> {
        let painted = self.host.paint(&self.scene, self.camera.camera());
        if let Err(err) = &painted {
            tracing::warn!("Paint failed: {}", err);
        }
        painted
    }

    /// Surface under a pixel of the viewport.
    pub fn pick(&self, screen: Vec2) -> Option<PickResult> {
        let model = self.model.as_ref()?.read();
        pick(self.camera.camera(), screen, self.viewport, &self.scene, &*model)
    }

    // ============== Accessors ==============

    /// Get the scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get the camera.
    pub fn camera(&self) -> &Camera {
        self.camera.camera()
    }

    /// Get the render host.
    pub fn host(&self) -> &RenderHost {
        &self.host
    }

    /// Get the render host mutably.
    pub fn host_mut(&mut self) -> &mut RenderHost {
        &mut self.host
    }

    /// Changes queued for the next pass, without draining them.
    pub fn pending_changes(&self) -> ChangeSet {
        self.changes.peek()
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        self.detach_model();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::{UVec3, Vec3};
    use seg_core::{ColorLabel, Document, ImageInfo, LabelMesh, SharedDocument, SurfaceGeometry};

    use super::*;
    use crate::scene::{Aabb, Actor};

    fn image_100() -> ImageInfo {
        ImageInfo::new(UVec3::splat(100), Vec3::ONE).unwrap()
    }

    fn two_surface_mesh() -> LabelMesh {
        [
            (1, SurfaceGeometry::cuboid(Vec3::splat(10.0), Vec3::splat(20.0))),
            (2, SurfaceGeometry::cuboid(Vec3::splat(30.0), Vec3::splat(40.0))),
        ]
        .into_iter()
        .collect()
    }

    fn bound(doc: &SharedDocument) -> SceneRenderer {
        let mut renderer = SceneRenderer::headless(&RendererConfig::default());
        let model: SharedModel = doc.clone();
        renderer.set_model(model);
        renderer
    }

    fn loaded() -> (SharedDocument, SceneRenderer) {
        let doc = Document::new().into_shared();
        doc.write().load_image(image_100());
        doc.write().set_mesh(two_surface_mesh());
        let mut renderer = bound(&doc);
        renderer.paint().unwrap();
        (doc, renderer)
    }

    fn mesh_actors(renderer: &SceneRenderer) -> Vec<Actor> {
        renderer.scene().meshes().iter().cloned().collect()
    }

    #[test]
    fn test_set_model_runs_full_pass() {
        let (doc, renderer) = loaded();

        assert_eq!(doc.read().subscriber_count(), 1);
        assert_eq!(renderer.scene().meshes().len(), 2);
        assert!(renderer.scene().axes().iter().all(|a| a.visible));
        assert_eq!(renderer.camera().focal_point, Vec3::splat(50.0));
        assert_eq!(renderer.host().paint_count(), 1);
        assert!(renderer.pending_changes().is_empty());
    }

    #[test]
    fn test_idle_pass_is_noop() {
        let (_doc, mut renderer) = loaded();
        let actors = mesh_actors(&renderer);
        let camera = renderer.camera().clone();
        let revision = renderer.scene().meshes().revision();
        let requests = renderer.host().redraw_requests();

        assert!(renderer.on_update().is_idle());
        assert_eq!(mesh_actors(&renderer), actors);
        assert_eq!(renderer.camera(), &camera);
        assert_eq!(renderer.scene().meshes().revision(), revision);
        assert_eq!(renderer.host().redraw_requests(), requests);
        assert!(!renderer.paint().unwrap());
    }

    #[test]
    fn test_pass_is_idempotent() {
        let (doc, mut renderer) = loaded();
        doc.write().set_cursor(UVec3::new(20, 30, 40)).unwrap();

        renderer.on_update();
        let axes = renderer.scene().axes().clone();
        let camera = renderer.camera().clone();

        assert!(renderer.on_update().is_idle());
        assert_eq!(renderer.scene().axes(), &axes);
        assert_eq!(renderer.camera(), &camera);
    }

    #[test]
    fn test_structural_change_matches_mesh() {
        let (doc, mut renderer) = loaded();

        doc.write().modify_mesh(|mesh| {
            mesh.push(3, SurfaceGeometry::cuboid(Vec3::ZERO, Vec3::ONE));
        });
        assert_eq!(renderer.on_update().mesh, MeshSync::Rebuild);
        assert_eq!(
            renderer.scene().meshes().labels().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let revision = renderer.scene().meshes().revision();
        doc.write().clear_mesh();
        renderer.on_update();
        assert!(renderer.scene().meshes().is_empty());
        assert!(renderer.scene().meshes().revision() > revision);
    }

    #[test]
    fn test_appearance_change_keeps_geometry() {
        let (doc, mut renderer) = loaded();
        let before = mesh_actors(&renderer);
        let camera = renderer.camera().clone();

        doc.write().set_label_color(1, [0, 255, 0]).unwrap();
        assert_eq!(
            renderer.on_update(),
            SyncPlan {
                mesh: MeshSync::Appearance,
                view: ViewSync::None,
            }
        );

        let after = mesh_actors(&renderer);
        assert_eq!(after.len(), before.len());
        for (a, b) in after.iter().zip(&before) {
            assert_eq!(a.geometry, b.geometry);
            assert_eq!(a.transform, b.transform);
        }
        assert_eq!(after[0].color, [0.0, 1.0, 0.0]);
        assert_eq!(after[1], before[1]);
        assert_eq!(renderer.camera(), &camera);
    }

    #[test]
    fn test_camera_reset_on_geometry_change() {
        let doc = Document::new().into_shared();
        let mut renderer = bound(&doc);
        doc.write().load_image(image_100());

        assert_eq!(renderer.on_update(), SyncPlan::FULL);
        let camera = renderer.camera();
        assert_eq!(camera.focal_point, Vec3::splat(50.0));
        assert_eq!(
            camera.view_bounds,
            Some(Aabb::new(Vec3::ZERO, Vec3::splat(100.0)))
        );
        assert_eq!(camera.up, Vec3::Z);
        assert!((camera.direction() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_cursor_moves_retarget_only() {
        let (doc, mut renderer) = loaded();
        let before = renderer.camera().clone();

        doc.write().set_cursor(UVec3::new(10, 20, 30)).unwrap();
        assert_eq!(renderer.on_update().view, ViewSync::Retarget);
        doc.write().set_cursor(UVec3::new(11, 21, 31)).unwrap();
        renderer.on_update();

        let camera = renderer.camera();
        assert_eq!(camera.focal_point, Vec3::new(11.0, 21.0, 31.0));
        assert_eq!(camera.position, before.position);
        assert_eq!(camera.up, before.up);
        assert_eq!(camera.view_bounds, before.view_bounds);

        let z_axis = renderer.scene().axes()[2].line().unwrap();
        assert_eq!(z_axis.p1, Vec3::new(11.0, 21.0, 0.0));
    }

    #[test]
    fn test_visibility_toggle_only_changes_opacity() {
        let (doc, mut renderer) = loaded();
        let before = mesh_actors(&renderer);
        let revision = renderer.scene().meshes().revision();

        doc.write().set_label_visible_in_3d(1, false).unwrap();
        renderer.on_update();
        let hidden = mesh_actors(&renderer);
        assert_eq!(hidden[0].opacity, 0.0);
        assert_eq!(hidden[0].color, before[0].color);
        assert_eq!(hidden[0].geometry, before[0].geometry);
        assert_eq!(renderer.scene().meshes().revision(), revision);

        doc.write().set_label_visible_in_3d(1, true).unwrap();
        renderer.on_update();
        assert_eq!(mesh_actors(&renderer), before);
    }

    #[test]
    fn test_unload_keeps_axes_and_camera() {
        let (doc, mut renderer) = loaded();
        doc.write().set_cursor(UVec3::new(20, 30, 40)).unwrap();
        renderer.on_update();
        let axes = renderer.scene().axes().clone();
        let camera = renderer.camera().clone();

        doc.write().unload_image();
        assert!(renderer.pending_changes().geometry_changed);
        assert_eq!(renderer.on_update(), SyncPlan::FULL);

        assert!(renderer.scene().meshes().is_empty());
        assert_eq!(renderer.scene().axes(), &axes);
        assert_eq!(renderer.camera(), &camera);
    }

    #[test]
    fn test_drain_waits_for_writer() {
        use std::sync::mpsc;
        use std::time::Duration;

        let (doc, mut renderer) = loaded();
        let (locked_tx, locked_rx) = mpsc::channel();
        let writer = Arc::clone(&doc);

        let handle = std::thread::spawn(move || {
            let mut doc = writer.write();
            doc.set_label_color(1, [0, 255, 0]).unwrap();
            locked_tx.send(()).unwrap();
            // Give the render thread time to block on the model lock
            std::thread::sleep(Duration::from_millis(50));
            doc.set_mesh(
                [(4, SurfaceGeometry::cuboid(Vec3::ZERO, Vec3::ONE))]
                    .into_iter()
                    .collect(),
            );
        });

        locked_rx.recv().unwrap();
        let plan = renderer.on_update();
        handle.join().unwrap();

        assert_eq!(plan.mesh, MeshSync::Rebuild);
        assert_eq!(
            renderer.scene().meshes().labels().collect::<Vec<_>>(),
            vec![4]
        );
        assert!(renderer.on_update().is_idle());
    }

    #[test]
    fn test_no_image_skips_view() {
        let doc = Document::new().into_shared();
        doc.write().set_mesh(two_surface_mesh());
        let renderer = bound(&doc);

        // Mesh work still runs; axes and camera stay at their defaults
        assert_eq!(renderer.scene().meshes().len(), 2);
        assert!(renderer.scene().axes().iter().all(|a| !a.visible));
        assert_eq!(renderer.camera().view_bounds, None);
    }

    #[test]
    fn test_reset_view_without_image() {
        let doc = Document::new().into_shared();
        let mut renderer = bound(&doc);
        renderer.paint().unwrap();
        let camera = renderer.camera().clone();

        renderer.reset_view();
        assert_eq!(renderer.camera(), &camera);
        assert!(!renderer.host().needs_redraw());
    }

    #[test]
    fn test_reset_view_restores_camera() {
        let (doc, mut renderer) = loaded();
        let initial = renderer.camera().clone();

        doc.write().set_cursor(UVec3::new(10, 10, 10)).unwrap();
        renderer.on_update();
        renderer.paint().unwrap();
        renderer.reset_view();

        let camera = renderer.camera();
        assert_eq!(camera.focal_point, Vec3::splat(10.0));
        assert_eq!(camera.up, initial.up);
        assert!((camera.distance() - initial.distance()).abs() < 1e-3);
        assert!(renderer.host().needs_redraw());
    }

    #[test]
    fn test_hidden_label_shown_with_alpha() {
        let doc = Document::new().into_shared();
        doc.write().load_image(image_100());
        doc.write()
            .set_label(2, ColorLabel::new([0, 0, 255]).with_visible_in_3d(false));
        doc.write().set_mesh(two_surface_mesh());
        let mut renderer = bound(&doc);

        // Rebuild ignores the 3D flag; an appearance pass applies it
        assert_eq!(mesh_actors(&renderer)[1].opacity, 1.0);
        doc.write().set_label_alpha(2, 200).unwrap();
        renderer.on_update();
        assert_eq!(mesh_actors(&renderer)[1].opacity, 0.0);

        doc.write()
            .update_label(2, |label| {
                label.visible_in_3d = true;
                label.alpha = 128;
            })
            .unwrap();
        assert_eq!(renderer.on_update().mesh, MeshSync::Appearance);

        let actors = mesh_actors(&renderer);
        assert_eq!(actors[1].opacity, 128.0 / 255.0);
        assert_eq!(actors[1].color, [0.0, 0.0, 1.0]);
        assert_eq!(actors[0].opacity, 1.0);
    }

    #[test]
    fn test_rebind_moves_subscription() {
        let (first, mut renderer) = loaded();
        let second = Document::new().into_shared();
        second.write().load_image(ImageInfo::new(UVec3::splat(10), Vec3::ONE).unwrap());

        first.write().set_cursor(UVec3::new(1, 1, 1)).unwrap();
        let model: SharedModel = second.clone();
        renderer.set_model(model);

        assert_eq!(first.read().subscriber_count(), 0);
        assert_eq!(second.read().subscriber_count(), 1);
        assert!(renderer.scene().meshes().is_empty());
        assert_eq!(renderer.camera().focal_point, Vec3::splat(5.0));

        first.write().set_cursor(UVec3::new(2, 2, 2)).unwrap();
        assert!(renderer.on_update().is_idle());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let doc = Document::new().into_shared();
        drop(bound(&doc));
        assert_eq!(doc.read().subscriber_count(), 0);
    }

    #[test]
    fn test_events_from_other_thread() {
        let (doc, mut renderer) = loaded();
        let writer = Arc::clone(&doc);
        std::thread::spawn(move || {
            writer.write().set_cursor(UVec3::new(5, 6, 7)).unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(renderer.on_update().view, ViewSync::Retarget);
        assert_eq!(renderer.camera().focal_point, Vec3::new(5.0, 6.0, 7.0));
    }

    #[test]
    fn test_resize_and_pick() {
        let (_doc, mut renderer) = loaded();
        renderer.resize(200, 200);
        renderer.reset_view();

        // Nothing sits on the line of sight through the cursor
        assert!(renderer.pick(Vec2::new(100.0, 100.0)).is_none());
        assert!(renderer.host().needs_redraw());
        assert!(renderer.paint().unwrap());
    }
}
