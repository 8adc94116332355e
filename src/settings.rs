//! Game settings and tuning
//!
//! Loaded from JSON; every field falls back to its default when absent.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Player ball tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub radius: f32,
    /// Hard speed cap (pixels/s)
    pub max_speed: f32,
    /// Force applied along the input direction each tick
    pub move_force: f32,
    /// Upward impulse on the action key
    pub jump_impulse: f32,
    /// 0xRRGGBB
    pub tint: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            radius: PLAYER_RADIUS,
            max_speed: PLAYER_MAX_SPEED,
            move_force: PLAYER_MOVE_FORCE,
            jump_impulse: PLAYER_JUMP_IMPULSE,
            tint: 0x00aaff,
        }
    }
}

/// Timings of the goal sequence (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalSettings {
    pub size: f32,
    pub celebration_window: f32,
    pub completion_delay: f32,
    /// Used instead of `completion_delay` when the celebration asset is missing
    pub fallback_delay: f32,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            size: GOAL_SIZE,
            celebration_window: CELEBRATION_WINDOW,
            completion_delay: COMPLETION_DELAY,
            fallback_delay: FALLBACK_COMPLETION_DELAY,
        }
    }
}

/// Game settings/tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub playfield_width: f32,
    pub playfield_height: f32,
    /// Distance below the playfield at which the level resets
    pub fall_margin: f32,
    pub wall_thickness: f32,

    // === Difficulty ===
    /// Gravity at difficulty factor 1.0 (pixels/s²)
    pub base_gravity: f32,
    /// Difficulty factor gained per level
    pub difficulty_step: f32,
    pub total_levels: u32,

    // === Timing ===
    pub sim_dt: f32,
    pub max_substeps: u32,

    pub player: PlayerSettings,
    pub goal: GoalSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            fall_margin: FALL_MARGIN,
            wall_thickness: WALL_THICKNESS,

            base_gravity: BASE_GRAVITY,
            difficulty_step: DIFFICULTY_STEP,
            total_levels: TOTAL_LEVELS,

            sim_dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,

            player: PlayerSettings::default(),
            goal: GoalSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Difficulty multiplier for a level (1-based)
    pub fn difficulty_factor(&self, level: u32) -> f32 {
        1.0 + level as f32 * self.difficulty_step
    }

    /// Gravity vector for a level; Y-down, so it points along +Y
    pub fn gravity_for_level(&self, level: u32) -> Vec2 {
        Vec2::new(0.0, self.base_gravity * self.difficulty_factor(level))
    }

    /// Vertical position past which the player counts as fallen out
    pub fn fall_threshold(&self) -> f32 {
        self.playfield_height + self.fall_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json_str(r#"{ "total_levels": 3, "player": { "max_speed": 100.0 } }"#)
                .unwrap();
        assert_eq!(settings.total_levels, 3);
        assert_eq!(settings.player.max_speed, 100.0);
        assert_eq!(settings.player.radius, PLAYER_RADIUS);
        assert_eq!(settings.playfield_width, PLAYFIELD_WIDTH);
    }

    #[test]
    fn test_gravity_increases_with_level() {
        let settings = Settings::default();
        let mut last = 0.0;
        for level in 1..=settings.total_levels {
            let g = settings.gravity_for_level(level).y;
            assert!(g > last);
            last = g;
        }
        assert!((settings.difficulty_factor(1) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            Settings::from_json_str("{ not json"),
            Err(SimError::Json(_))
        ));
    }
}
