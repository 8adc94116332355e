//! Top-level run controller
//!
//! Owns the level controller, tracks which screen is showing and turns
//! variable frame times into fixed simulation ticks.

use crate::error::SimError;
use crate::input::TickInput;
use crate::physics::{RapierBackend, RigidBodyBackend};
use crate::settings::Settings;
use crate::sim::{AssetCatalog, LevelController, LevelEvent, LevelPhase};

/// Longest frame fed to the accumulator (seconds)
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Level select
    Menu,
    Playing,
    /// Every level done
    RunComplete,
}

pub struct Game<B: RigidBodyBackend = RapierBackend> {
    level: LevelController<B>,
    screen: Screen,
    accumulator: f32,
}

impl Game<RapierBackend> {
    pub fn new(settings: Settings, assets: AssetCatalog) -> Result<Self, SimError> {
        Ok(Self::with_controller(LevelController::with_builtin_levels(
            settings, assets,
        )?))
    }
}

impl<B: RigidBodyBackend> Game<B> {
    pub fn with_controller(level: LevelController<B>) -> Self {
        Self {
            level,
            screen: Screen::Menu,
            accumulator: 0.0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn level(&self) -> &LevelController<B> {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut LevelController<B> {
        &mut self.level
    }

    /// Start level `number` from the menu. Locked levels are refused and
    /// leave the screen unchanged; returns whether the level started.
    pub fn start_level(&mut self, number: u32) -> Result<bool, SimError> {
        if !self.level.progress().is_unlocked(number) {
            log::warn!("Level {number} is locked");
            return Ok(false);
        }
        self.level.start_level(number)?;
        self.screen = Screen::Playing;
        self.accumulator = 0.0;
        Ok(true)
    }

    pub fn reset_current(&mut self) -> Result<(), SimError> {
        if self.screen != Screen::Playing {
            return Ok(());
        }
        self.accumulator = 0.0;
        self.level.reset_level()
    }

    pub fn return_to_menu(&mut self) {
        self.level.unload();
        self.screen = Screen::Menu;
        self.accumulator = 0.0;
    }

    /// Wipe progress and go back to the menu
    pub fn restart_run(&mut self) {
        self.level.restart_run();
        self.screen = Screen::Menu;
        self.accumulator = 0.0;
    }

    /// Run as many fixed ticks as `frame_dt` covers, capped at
    /// `max_substeps` per frame.
    pub fn frame(&mut self, frame_dt: f32, input: &TickInput) -> Result<Vec<LevelEvent>, SimError> {
        let mut events = Vec::new();
        if self.screen != Screen::Playing || frame_dt <= 0.0 {
            return Ok(events);
        }

        let sim_dt = self.level.settings().sim_dt;
        let max_substeps = self.level.settings().max_substeps;
        self.accumulator += frame_dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= sim_dt && substeps < max_substeps {
            events.extend(self.level.tick(sim_dt, input)?);
            self.accumulator -= sim_dt;
            substeps += 1;
        }
        if substeps == max_substeps && self.accumulator >= sim_dt {
            log::debug!("Frame fell behind, dropping {:.3}s", self.accumulator);
            self.accumulator = 0.0;
        }

        if self.level.phase() == LevelPhase::RunComplete {
            self.screen = Screen::RunComplete;
            self.accumulator = 0.0;
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(Settings::default(), AssetCatalog::new()).unwrap()
    }

    #[test]
    fn test_locked_level_is_refused() {
        let mut game = game();
        assert!(!game.start_level(2).unwrap());
        assert_eq!(game.screen(), Screen::Menu);
        assert_eq!(game.level().entity_count(), 0);

        assert!(game.start_level(1).unwrap());
        assert_eq!(game.screen(), Screen::Playing);
    }

    #[test]
    fn test_frame_runs_fixed_substeps() {
        let mut game = game();
        game.start_level(1).unwrap();
        game.frame(3.5 / 60.0, &TickInput::default()).unwrap();
        assert!((game.level().elapsed() - 3.0 / 60.0).abs() < 1e-5);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut game = game();
        game.start_level(1).unwrap();
        game.frame(5.0, &TickInput::default()).unwrap();
        let max = 8.0 / 60.0;
        assert!(game.level().elapsed() <= max + 1e-5);
    }

    #[test]
    fn test_menu_does_not_tick() {
        let mut game = game();
        game.start_level(1).unwrap();
        game.return_to_menu();
        assert!(game.frame(1.0, &TickInput::right()).unwrap().is_empty());
        assert_eq!(game.level().entity_count(), 0);
    }

    #[test]
    fn test_restart_run_clears_progress() {
        let mut game = game();
        game.start_level(1).unwrap();
        game.level_mut().complete_level().unwrap();
        assert_eq!(game.level().progress().levels_completed(), 1);

        game.restart_run();
        assert_eq!(game.screen(), Screen::Menu);
        assert_eq!(game.level().progress().levels_completed(), 0);
        assert!(!game.start_level(2).unwrap());
    }
}
