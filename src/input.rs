//! Input commands for a single tick
//!
//! The input collaborator reports held state only; press edges are detected
//! here so a press fires once even when a frame runs several substeps.

use glam::Vec2;

use crate::unit_direction;

/// Held keys for one tick (arrows and WASD already merged by the caller)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Special action key (jump)
    pub action: bool,
}

impl TickInput {
    /// Only the right key held
    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    /// Per-axis direction in {-1, 0, 1}, normalized so diagonals aren't faster.
    /// Y points down, so `up` is negative.
    pub fn direction(&self) -> Vec2 {
        let mut x = 0.0;
        let mut y = 0.0;
        if self.left {
            x = -1.0;
        }
        if self.right {
            x = 1.0;
        }
        if self.up {
            y = -1.0;
        }
        if self.down {
            y = 1.0;
        }
        unit_direction(x, y)
    }
}

/// Rising-edge detector for a held button
#[derive(Debug, Clone, Copy, Default)]
pub struct PressLatch {
    was_down: bool,
}

impl PressLatch {
    /// True only on the tick the button goes from up to down
    pub fn just_pressed(&mut self, down: bool) -> bool {
        let pressed = down && !self.was_down;
        self.was_down = down;
        pressed
    }
}
