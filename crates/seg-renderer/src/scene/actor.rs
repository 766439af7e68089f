//! Scene actors.
//!
//! Lines and surfaces share one actor type carrying the common render state;
//! only the geometry differs and lives in [`ActorGeometry`].

use std::sync::Arc;

use glam::{Mat4, Vec3};

use seg_core::{LabelId, SurfaceHandle};

use crate::constants::{AXIS_LINE_RESOLUTION, DEFAULT_AXIS_COLOR, DEFAULT_AXIS_WIDTH};

/// Line stipple: each bit of `pattern` covers `repeat` consecutive line pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stipple {
    /// 16-bit on/off pattern, least significant bit first.
    pub pattern: u16,
    /// Number of pieces each bit spans.
    pub repeat: u32,
}

impl Stipple {
    /// Whether piece `index` of a stippled line is drawn.
    pub fn is_on(&self, index: u32) -> bool {
        let bit = (index / self.repeat.max(1)) % 16;
        self.pattern & (1 << bit) != 0
    }
}

/// Geometry of a crosshair line, in voxel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    /// Start point.
    pub p1: Vec3,
    /// End point.
    pub p2: Vec3,
    /// Line width in pixels.
    pub width: f32,
    /// Dash pattern; `None` draws a solid line.
    pub stipple: Option<Stipple>,
    /// Number of pieces the line is built from.
    pub resolution: u32,
}

impl Default for LineGeometry {
    fn default() -> Self {
        Self {
            p1: Vec3::ZERO,
            p2: Vec3::ZERO,
            width: DEFAULT_AXIS_WIDTH,
            stipple: None,
            resolution: AXIS_LINE_RESOLUTION,
        }
    }
}

impl LineGeometry {
    /// Pieces of the line that are drawn, as (start, end) pairs.
    ///
    /// Solid lines yield `resolution` pieces. Stippled lines are cut into at
    /// least 16 pieces so every pattern bit maps to a piece, and the pieces
    /// whose bit is off are dropped.
    pub fn segments(&self) -> Vec<(Vec3, Vec3)> {
        if self.p1 == self.p2 {
            return Vec::new();
        }

        let pieces = match self.stipple {
            Some(_) => self.resolution.max(16),
            None => self.resolution.max(1),
        };

        (0..pieces)
            .filter(|&i| self.stipple.is_none_or(|s| s.is_on(i)))
            .map(|i| {
                let t0 = i as f32 / pieces as f32;
                let t1 = (i + 1) as f32 / pieces as f32;
                (self.p1.lerp(self.p2, t0), self.p1.lerp(self.p2, t1))
            })
            .collect()
    }
}

/// A surface actor's reference into the mesh object.
#[derive(Debug, Clone)]
pub struct SurfaceBinding {
    /// Label the surface belongs to.
    pub label: LabelId,
    /// Geometry owned by the mesh object.
    pub geometry: SurfaceHandle,
}

impl PartialEq for SurfaceBinding {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && Arc::ptr_eq(&self.geometry, &other.geometry)
    }
}

/// Type-specific actor geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum ActorGeometry {
    /// Crosshair line.
    Axis(LineGeometry),
    /// Label surface.
    Surface(SurfaceBinding),
}

/// A renderable object.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Model-to-world transform.
    pub transform: Mat4,
    /// Color (RGB, 0-1).
    pub color: [f32; 3],
    /// Opacity (0-1).
    pub opacity: f32,
    /// Visibility flag.
    pub visible: bool,
    /// Geometry.
    pub geometry: ActorGeometry,
}

impl Actor {
    /// Create a crosshair actor. It stays hidden until its endpoints are set.
    pub fn axis() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            color: DEFAULT_AXIS_COLOR,
            opacity: 1.0,
            visible: false,
            geometry: ActorGeometry::Axis(LineGeometry::default()),
        }
    }

    /// Create a surface actor (identity transform: surfaces are already in world space).
    pub fn surface(label: LabelId, geometry: SurfaceHandle) -> Self {
        Self {
            transform: Mat4::IDENTITY,
            color: [1.0; 3],
            opacity: 1.0,
            visible: true,
            geometry: ActorGeometry::Surface(SurfaceBinding { label, geometry }),
        }
    }

    /// Line geometry, for axis actors.
    pub fn line(&self) -> Option<&LineGeometry> {
        match &self.geometry {
            ActorGeometry::Axis(line) => Some(line),
            ActorGeometry::Surface(_) => None,
        }
    }

    /// Mutable line geometry, for axis actors.
    pub fn line_mut(&mut self) -> Option<&mut LineGeometry> {
        match &mut self.geometry {
            ActorGeometry::Axis(line) => Some(line),
            ActorGeometry::Surface(_) => None,
        }
    }

    /// Surface binding, for surface actors.
    pub fn surface_binding(&self) -> Option<&SurfaceBinding> {
        match &self.geometry {
            ActorGeometry::Surface(binding) => Some(binding),
            ActorGeometry::Axis(_) => None,
        }
    }

    /// Label of a surface actor.
    pub fn label(&self) -> Option<LabelId> {
        self.surface_binding().map(|b| b.label)
    }

    /// Set color and opacity together.
    pub fn set_appearance(&mut self, color: [f32; 3], opacity: f32) {
        self.color = color;
        self.opacity = opacity;
    }

    /// RGBA color.
    pub fn rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.color;
        [r, g, b, self.opacity]
    }

    /// Whether the actor contributes anything to a frame.
    pub fn is_drawn(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}
