//! Viewer state module

use glam::{IVec3, UVec3, Vec2};

use seg_core::{
    Document, ImageInfo, LabelId, LabelMesh, ModelError, SharedDocument, SharedModel,
};
use seg_renderer::{
    AppearanceSettings, PickResult, RenderError, RenderHost, SceneRenderer, SyncPlan,
};

use crate::config::AppConfig;

/// Actions that can be performed on the viewer
#[derive(Debug, Clone)]
pub enum ViewerAction {
    // Image actions
    /// Load a main image
    LoadImage(ImageInfo),
    /// Unload the main image
    UnloadImage,

    // Cursor actions
    /// Move the cursor to a voxel
    SetCursor(UVec3),
    /// Move the cursor by a voxel offset
    StepCursor(IVec3),
    /// Move the cursor to the surface under a viewport pixel
    PickAt(Vec2),

    // Label actions
    /// Show or hide a label in the 3D view
    SetLabelVisibleIn3d { label: LabelId, visible: bool },
    /// Change a label's opacity
    SetLabelAlpha { label: LabelId, alpha: u8 },
    /// Change a label's color
    SetLabelColor { label: LabelId, rgb: [u8; 3] },

    // Mesh actions
    /// Replace the label mesh
    ReplaceMesh(LabelMesh),
    /// Drop the surfaces of one label
    RemoveLabelSurfaces(LabelId),

    // View actions
    /// Reset the 3D camera
    ResetView,
    /// Viewport size changed
    Resize { width: u32, height: u32 },
    /// Replace appearance settings
    SetAppearance(AppearanceSettings),
}

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    /// Actions applied
    pub actions: usize,
    /// Actions that failed
    pub failed_actions: usize,
    /// Reconciliation plan that ran
    pub plan: SyncPlan,
    /// Whether a frame was presented
    pub painted: bool,
}

/// Document plus its 3D view
pub struct Viewer {
    document: SharedDocument,
    renderer: SceneRenderer,
    pending_actions: Vec<ViewerAction>,
    frame_count: u64,
    last_pick: Option<PickResult>,
    /// Passes run while applying actions in the current frame
    action_plan: SyncPlan,
}

impl Viewer {
    /// Create a viewer with an empty document and a headless view
    pub fn new(config: &AppConfig) -> Self {
        Self::with_host(RenderHost::headless(config.appearance.clone()), config)
    }

    /// Create a viewer drawing through the given host
    pub fn with_host(host: RenderHost, config: &AppConfig) -> Self {
        let document = Document::new().into_shared();
        let mut renderer = SceneRenderer::new(host, &config.renderer());
        let model: SharedModel = document.clone();
        renderer.set_model(model);

        Self {
            document,
            renderer,
            pending_actions: Vec::new(),
            frame_count: 0,
            last_pick: None,
            action_plan: SyncPlan::IDLE,
        }
    }

    /// Shared document
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// 3D view
    pub fn renderer(&self) -> &SceneRenderer {
        &self.renderer
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Result of the last pick action
    pub fn last_pick(&self) -> Option<PickResult> {
        self.last_pick
    }

    /// Queue an action
    pub fn queue_action(&mut self, action: ViewerAction) {
        self.pending_actions.push(action);
    }

    /// Take pending actions
    pub fn take_pending_actions(&mut self) -> Vec<ViewerAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Run one frame: apply queued actions, reconcile the view and paint.
    ///
    /// Failed actions are logged and skipped; only paint errors are returned.
    pub fn frame(&mut self) -> Result<FrameSummary, RenderError> {
        let actions = self.take_pending_actions();
        let count = actions.len();
        let mut failed_actions = 0;

        for action in actions {
            if let Err(e) = self.apply_action(action) {
                tracing::warn!("Action failed: {}", e);
                failed_actions += 1;
            }
        }

        let plan = std::mem::replace(&mut self.action_plan, SyncPlan::IDLE)
            .merge(self.renderer.on_update());
        let painted = self.renderer.paint()?;
        self.frame_count += 1;

        Ok(FrameSummary {
            actions: count,
            failed_actions,
            plan,
            painted,
        })
    }

    fn apply_action(&mut self, action: ViewerAction) -> Result<(), ModelError> {
        tracing::debug!("Applying {:?}", ActionName(&action));
        match action {
            ViewerAction::LoadImage(image) => self.document.write().load_image(image),
            ViewerAction::UnloadImage => self.document.write().unload_image(),
            ViewerAction::SetCursor(voxel) => self.document.write().set_cursor(voxel)?,
            ViewerAction::StepCursor(delta) => {
                self.document.write().step_cursor(delta)?;
            }
            ViewerAction::PickAt(screen) => {
                // The view must reflect the document before casting rays into it
                self.action_plan = self.action_plan.merge(self.renderer.on_update());
                self.last_pick = self.renderer.pick(screen);
                if let Some(hit) = self.last_pick {
                    tracing::info!("Picked label {} at voxel {}", hit.label, hit.voxel);
                    self.document.write().set_cursor(hit.voxel)?;
                }
            }
            ViewerAction::SetLabelVisibleIn3d { label, visible } => {
                self.document.write().set_label_visible_in_3d(label, visible)?
            }
            ViewerAction::SetLabelAlpha { label, alpha } => {
                self.document.write().set_label_alpha(label, alpha)?
            }
            ViewerAction::SetLabelColor { label, rgb } => {
                self.document.write().set_label_color(label, rgb)?
            }
            ViewerAction::ReplaceMesh(mesh) => self.document.write().set_mesh(mesh),
            ViewerAction::RemoveLabelSurfaces(label) => {
                self.document.write().modify_mesh(|mesh| {
                    mesh.remove_label(label);
                });
            }
            ViewerAction::ResetView => self.renderer.reset_view(),
            ViewerAction::Resize { width, height } => self.renderer.resize(width, height),
            ViewerAction::SetAppearance(appearance) => self.renderer.set_appearance(appearance),
        }
        Ok(())
    }
}

/// Short debug name of an action (mesh payloads are large)
struct ActionName<'a>(&'a ViewerAction);

impl std::fmt::Debug for ActionName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            ViewerAction::ReplaceMesh(mesh) => write!(f, "ReplaceMesh({} surfaces)", mesh.len()),
            other => write!(f, "{:?}", other),
        }
    }
}
