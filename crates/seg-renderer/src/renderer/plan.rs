//! Sync plan: which synchronizers a batch of changes requires.

use seg_core::ChangeSet;

/// Mesh work for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSync {
    /// Mesh actors are up to date.
    None,
    /// Recreate all mesh actors.
    Rebuild,
    /// Refresh color/opacity of existing actors.
    Appearance,
}

/// Crosshair and camera work for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSync {
    /// Axes and camera are up to date.
    None,
    /// Rebuild axes and reset the camera.
    Reset,
    /// Move axes and retarget the camera focal point.
    Retarget,
}

/// Work to do in one reconciliation pass. Mesh work always runs before view work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPlan {
    /// Mesh work.
    pub mesh: MeshSync,
    /// Axis and camera work.
    pub view: ViewSync,
}

impl SyncPlan {
    /// Nothing to do.
    pub const IDLE: SyncPlan = SyncPlan {
        mesh: MeshSync::None,
        view: ViewSync::None,
    };

    /// Everything, used when a model is bound.
    pub const FULL: SyncPlan = SyncPlan {
        mesh: MeshSync::Rebuild,
        view: ViewSync::Reset,
    };

    /// Derive the plan from pending changes.
    ///
    /// | pending                                         | mesh         | view       |
    /// |-------------------------------------------------|--------------|------------|
    /// | mesh content, mesh model or geometry changed    | `Rebuild`    |            |
    /// | otherwise label appearance changed              | `Appearance` |            |
    /// | geometry changed                                |              | `Reset`    |
    /// | otherwise cursor moved                          |              | `Retarget` |
    pub fn from_changes(changes: &ChangeSet) -> Self {
        let mesh = if changes.mesh_content_changed
            || changes.mesh_model_modified
            || changes.geometry_changed
        {
            MeshSync::Rebuild
        } else if changes.label_appearance_changed {
            MeshSync::Appearance
        } else {
            MeshSync::None
        };

        let view = if changes.geometry_changed {
            ViewSync::Reset
        } else if changes.cursor_moved {
            ViewSync::Retarget
        } else {
            ViewSync::None
        };

        Self { mesh, view }
    }

    /// Combine the work of two passes: the stronger action wins per part.
    pub fn merge(self, other: SyncPlan) -> SyncPlan {
        let mesh = match (self.mesh, other.mesh) {
            (MeshSync::Rebuild, _) | (_, MeshSync::Rebuild) => MeshSync::Rebuild,
            (MeshSync::Appearance, _) | (_, MeshSync::Appearance) => MeshSync::Appearance,
            _ => MeshSync::None,
        };
        let view = match (self.view, other.view) {
            (ViewSync::Reset, _) | (_, ViewSync::Reset) => ViewSync::Reset,
            (ViewSync::Retarget, _) | (_, ViewSync::Retarget) => ViewSync::Retarget,
            _ => ViewSync::None,
        };
        SyncPlan { mesh, view }
    }

    /// Check if the plan does nothing.
    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }
}
