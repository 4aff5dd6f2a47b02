use serde::{Deserialize, Serialize};

use crate::entity::WorldPos;

/// World units per canvas span.
pub const WORLD_SCALE: f64 = 3750.0;

/// Anchor shift applied to pulse origins so the 75px ring sprite, drawn from
/// its top-left corner, lands on the target.
pub const PULSE_ANCHOR: WorldOffset = WorldOffset {
    dx: -145.0,
    dz: 145.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPos {
    pub x: f64,
    pub y: f64,
}

impl CanvasPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: CanvasPos) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Fixed world-space shift applied before projection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldOffset {
    pub dx: f64,
    pub dz: f64,
}

/// Maps world `{x, z}` onto a canvas of fixed pixel size. World origin lands
/// on the canvas center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub width: f64,
    pub height: f64,
}

impl Projector {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> CanvasPos {
        CanvasPos::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn world_to_canvas(&self, pos: WorldPos) -> CanvasPos {
        let (w, h) = (self.width, self.height);
        let mut x = pos.x / WORLD_SCALE * w + w / 2.0;
        let mut y = pos.z / WORLD_SCALE * h + h / 2.0;

        // rotate 180 degrees
        x = w - x;
        y = h - y;

        // flip horizontally
        x = w - x;

        CanvasPos { x, y }
    }

    pub fn world_to_canvas_offset(&self, pos: WorldPos, offset: WorldOffset) -> CanvasPos {
        self.world_to_canvas(WorldPos {
            x: pos.x + offset.dx,
            y: pos.y,
            z: pos.z + offset.dz,
        })
    }

    /// Inverse of [`Projector::world_to_canvas`], returning world `(x, z)`.
    pub fn canvas_to_world(&self, pos: CanvasPos) -> (f64, f64) {
        let (w, h) = (self.width, self.height);
        if w == 0.0 || h == 0.0 {
            return (0.0, 0.0);
        }
        let center = self.center();
        let x = (pos.x - center.x) / w * WORLD_SCALE;
        let z = (center.y - pos.y) / h * WORLD_SCALE;
        (x, z)
    }
}
