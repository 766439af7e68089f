//! Mesh actor synchronization.

use seg_core::{LabelTable, MeshProvider};

use crate::scene::{Actor, MeshActorCollection};

/// Recreate all mesh actors from the mesh object.
///
/// Actors get the label color and alpha; the label's 3D visibility flag is
/// not consulted here (only [`update_mesh_appearance`] hides labels). The
/// collection is marked modified even if the mesh is now empty.
///
/// Returns the number of actors created.
pub fn rebuild_mesh_actors<M, L>(
    collection: &mut MeshActorCollection,
    mesh: &M,
    labels: &L,
) -> usize
where
    M: MeshProvider + ?Sized,
    L: LabelTable + ?Sized,
{
    collection.clear();
    collection.mark_modified();

    for index in 0..mesh.surface_count() {
        let (Some(geometry), Some(label)) = (mesh.surface(index), mesh.surface_label(index))
        else {
            tracing::warn!("Mesh surface {} vanished during rebuild", index);
            continue;
        };

        let color_label = labels.color_label(label);
        let mut actor = Actor::surface(label, geometry);
        actor.set_appearance(color_label.color(), color_label.opacity());
        collection.push(actor);
    }

    tracing::debug!("Rebuilt {} mesh actors", collection.len());
    collection.len()
}

/// Refresh color and opacity of existing mesh actors from the label table.
///
/// Labels hidden in 3D get opacity 0; the actors themselves stay in place.
/// The actors must match the mesh surfaces one-to-one (same count, same
/// label per index). A mismatch means a structural change was missed; it
/// trips a debug assertion, and release builds log it and leave the actors
/// untouched.
///
/// Returns whether the actors were updated.
pub fn update_mesh_appearance<M, L>(
    collection: &mut MeshActorCollection,
    mesh: &M,
    labels: &L,
) -> bool
where
    M: MeshProvider + ?Sized,
    L: LabelTable + ?Sized,
{
    let in_sync = collection.len() == mesh.surface_count()
        && collection
            .iter()
            .enumerate()
            .all(|(index, actor)| actor.label() == mesh.surface_label(index));

    debug_assert!(in_sync, "mesh actors out of sync with mesh surfaces");
    if !in_sync {
        tracing::error!(
            "Mesh actors out of sync ({} actors, {} surfaces); skipping appearance update",
            collection.len(),
            mesh.surface_count()
        );
        return false;
    }

    for actor in collection.iter_mut() {
        let Some(label) = actor.label() else {
            continue;
        };
        let color_label = labels.color_label(label);
        let opacity = if color_label.visible_in_3d {
            color_label.opacity()
        } else {
            0.0
        };
        actor.set_appearance(color_label.color(), opacity);
    }
    true
}
