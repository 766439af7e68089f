//! Global constants for seg-core

use crate::label::LabelId;

/// The clear label. Voxels with this label are background and never get a surface.
pub const CLEAR_LABEL: LabelId = 0;

/// Colors of the labels created by [`crate::ColorLabelTable::with_defaults`] (RGB)
pub const DEFAULT_LABEL_COLORS: [[u8; 3]; 6] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
    [255, 255, 0],
    [0, 255, 255],
    [255, 0, 255],
];

/// Appearance reported for labels missing from the table (RGB, alpha)
pub const UNDEFINED_LABEL_RGBA: [u8; 4] = [128, 128, 128, 255];
