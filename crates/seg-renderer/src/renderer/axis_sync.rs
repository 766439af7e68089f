//! Crosshair axis lines.

use seg_core::{CursorSource, ImageGeometry};

use crate::config::AppearanceSettings;
use crate::constants::{AXIS_STIPPLE_PATTERN, DEFAULT_AXIS_WIDTH};
use crate::scene::{Actor, Stipple};

/// Place the three crosshair lines through the cursor.
///
/// Line `i` spans the whole image along axis `i` (voxel space) and carries
/// the image's voxel-to-world matrix as its transform. Does nothing and
/// returns `false` without an image.
pub fn update_axis_lines<M>(
    axes: &mut [Actor; 3],
    model: &M,
    appearance: &AppearanceSettings,
) -> bool
where
    M: ImageGeometry + CursorSource + ?Sized,
{
    if !model.is_loaded() {
        return false;
    }

    let cursor = model.cursor_position().as_vec3();
    let dims = model.size().as_vec3();
    let transform = model.world_matrix();
    let element = &appearance.crosshairs_3d;

    for (i, actor) in axes.iter_mut().enumerate() {
        actor.transform = transform;
        actor.set_appearance(appearance.axis_color(i), 1.0);
        actor.visible = true;

        let Some(line) = actor.line_mut() else {
            continue;
        };

        let (mut p1, mut p2) = (cursor, cursor);
        p1[i] = 0.0;
        p2[i] = dims[i];
        line.p1 = p1;
        line.p2 = p2;

        if element.dash_spacing > 0.0 {
            line.stipple = Some(Stipple {
                pattern: AXIS_STIPPLE_PATTERN,
                repeat: element.dash_spacing as u32,
            });
            line.width = element.line_thickness;
        } else {
            line.stipple = None;
            line.width = DEFAULT_AXIS_WIDTH;
        }
    }
    true
}
