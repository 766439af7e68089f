//! Segmentation labels and their appearance

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{CLEAR_LABEL, DEFAULT_LABEL_COLORS, UNDEFINED_LABEL_RGBA};
use crate::model::LabelTable;

/// Identifier of a segmentation class
pub type LabelId = u16;

/// Display properties of one segmentation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorLabel {
    /// Label color (RGB, 0-255)
    pub rgb: [u8; 3],
    /// Label opacity (0-255)
    pub alpha: u8,
    /// Whether the label's surface is shown in the 3D view
    pub visible_in_3d: bool,
}

impl ColorLabel {
    /// Create an opaque label that is visible in 3D
    pub const fn new(rgb: [u8; 3]) -> Self {
        Self {
            rgb,
            alpha: 255,
            visible_in_3d: true,
        }
    }

    /// Builder-style alpha override
    pub const fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }

    /// Builder-style 3D visibility override
    pub const fn with_visible_in_3d(mut self, visible: bool) -> Self {
        self.visible_in_3d = visible;
        self
    }

    /// Color normalized to [0, 1]
    pub fn color(&self) -> [f32; 3] {
        self.rgb.map(|c| c as f32 / 255.0)
    }

    /// Opacity normalized to [0, 1], ignoring 3D visibility
    pub fn opacity(&self) -> f32 {
        self.alpha as f32 / 255.0
    }
}

impl Default for ColorLabel {
    fn default() -> Self {
        let [r, g, b, a] = UNDEFINED_LABEL_RGBA;
        Self::new([r, g, b]).with_alpha(a)
    }
}

/// Table of label appearances keyed by label id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorLabelTable {
    labels: BTreeMap<LabelId, ColorLabel>,
}

impl Default for ColorLabelTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ColorLabelTable {
    /// Create a table holding only the (transparent) clear label
    pub fn new() -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(
            CLEAR_LABEL,
            ColorLabel::new([0, 0, 0])
                .with_alpha(0)
                .with_visible_in_3d(false),
        );
        Self { labels }
    }

    /// Create a table with the clear label and six primary-colored labels (ids 1..=6)
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (i, rgb) in DEFAULT_LABEL_COLORS.iter().enumerate() {
            table.insert(i as LabelId + 1, ColorLabel::new(*rgb));
        }
        table
    }

    /// Insert or replace a label, returning the previous appearance
    pub fn insert(&mut self, id: LabelId, label: ColorLabel) -> Option<ColorLabel> {
        self.labels.insert(id, label)
    }

    /// Remove a label
    pub fn remove(&mut self, id: LabelId) -> Option<ColorLabel> {
        self.labels.remove(&id)
    }

    /// Get a label by id
    pub fn get(&self, id: LabelId) -> Option<&ColorLabel> {
        self.labels.get(&id)
    }

    /// Get a mutable label by id
    pub fn get_mut(&mut self, id: LabelId) -> Option<&mut ColorLabel> {
        self.labels.get_mut(&id)
    }

    /// Check if a label is defined
    pub fn contains(&self, id: LabelId) -> bool {
        self.labels.contains_key(&id)
    }

    /// Iterate labels in id order
    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &ColorLabel)> {
        self.labels.iter().map(|(id, label)| (*id, label))
    }

    /// Number of defined labels, including the clear label
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl LabelTable for ColorLabelTable {
    fn color_label(&self, id: LabelId) -> ColorLabel {
        self.labels.get(&id).copied().unwrap_or_default()
    }
}
