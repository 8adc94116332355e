//! Kinetic Puzzle - a 2D physics puzzle game core
//!
//! Core modules:
//! - `sim`: Simulation (entities, player actor, scripted platforms, level state machine)
//! - `physics`: Rigid-body backend seam and the rapier2d implementation
//! - `level`: Level/entity spec data model and the built-in level catalog
//! - `game`: Top-level run controller (menu, fixed-step frame driver)
//! - `settings`: Data-driven tuning

pub mod error;
pub mod game;
pub mod input;
pub mod level;
pub mod physics;
pub mod progress;
pub mod settings;
pub mod sim;

pub use error::{ConfigurationError, SimError};
pub use game::{Game, Screen};
pub use input::TickInput;
pub use progress::Progress;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the puzzles were tuned at)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions (pixels, Y grows downward)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;
    /// How far below the playfield the player may fall before the level resets
    pub const FALL_MARGIN: f32 = 100.0;
    /// Boundary wall thickness
    pub const WALL_THICKNESS: f32 = 20.0;

    /// Gravity at difficulty factor 1.0 (pixels/s²)
    pub const BASE_GRAVITY: f32 = 981.0;
    /// Difficulty factor gained per level
    pub const DIFFICULTY_STEP: f32 = 0.2;
    /// Number of levels in a run
    pub const TOTAL_LEVELS: u32 = 10;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 25.0;
    pub const PLAYER_MAX_SPEED: f32 = 600.0;
    pub const PLAYER_MOVE_FORCE: f32 = 4000.0;
    pub const PLAYER_JUMP_IMPULSE: f32 = 1500.0;

    /// Goal defaults
    pub const GOAL_SIZE: f32 = 50.0;
    /// Cosmetic celebration window after touching the goal (seconds)
    pub const CELEBRATION_WINDOW: f32 = 0.5;
    /// Delay between touching the goal and completing the level (seconds)
    pub const COMPLETION_DELAY: f32 = 1.5;
    /// Completion delay used when the celebration asset is missing (seconds)
    pub const FALLBACK_COMPLETION_DELAY: f32 = 1.0;

    /// Asset key of the celebration particle texture
    pub const CELEBRATION_ASSET: &str = "particle";
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit direction from per-axis inputs in {-1, 0, 1}; zero stays zero
#[inline]
pub fn unit_direction(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y).normalize_or_zero()
}

/// Rescale `vel` so its length never exceeds `max_speed`
#[inline]
pub fn clamp_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    let speed = (vel.x * vel.x + vel.y * vel.y).sqrt();
    if speed > max_speed && speed > 0.0 {
        let ratio = max_speed / speed;
        Vec2::new(vel.x * ratio, vel.y * ratio)
    } else {
        vel
    }
}
