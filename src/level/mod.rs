//! Levels
//!
//! `spec` holds the authored data model; `LevelCatalog` is the ordered set of
//! levels a run plays through, loaded from JSON.

pub mod spec;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use spec::{
    EntityKind, EntityOptions, EntitySpec, GOAL_LABEL, LevelSpec, MovementSpec, PLAYER_LABEL,
    ShapeKind,
};

use crate::error::SimError;

/// Hint shown for levels without one of their own
pub const DEFAULT_HINT: &str = "Good luck!";

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

/// Levels in play order (level 1 is index 0)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<LevelSpec>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelSpec>) -> Self {
        Self { levels }
    }

    /// The ten levels shipped with the game
    pub fn builtin() -> Result<Self, SimError> {
        Self::from_json_str(BUILTIN_LEVELS)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} levels from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level `number` (1-based). Numbers outside the catalog get the
    /// player-and-goal default level.
    pub fn level(&self, number: u32) -> LevelSpec {
        self.authored(number)
            .cloned()
            .unwrap_or_else(LevelSpec::default_level)
    }

    pub fn hint(&self, number: u32) -> &str {
        self.authored(number)
            .and_then(|level| level.hint.as_deref())
            .unwrap_or(DEFAULT_HINT)
    }

    fn authored(&self, number: u32) -> Option<&LevelSpec> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.levels.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_are_valid() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 10);
        for number in 1..=10 {
            catalog.level(number).validate().unwrap();
        }
        assert_eq!(
            catalog.hint(1),
            "Use the arrow keys or WASD to move. Reach the green goal!"
        );
    }

    #[test]
    fn test_load_reads_a_level_pack() {
        let path = std::env::temp_dir().join(format!("kinetic-levels-{}.json", std::process::id()));
        std::fs::write(&path, BUILTIN_LEVELS).unwrap();
        let catalog = LevelCatalog::load(&path);
        std::fs::remove_file(&path).unwrap();

        let catalog = catalog.unwrap();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.hint(1), LevelCatalog::builtin().unwrap().hint(1));

        let missing = LevelCatalog::load(std::env::temp_dir().join("kinetic-no-such-pack.json"));
        assert!(matches!(missing, Err(SimError::Io(_))));
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.hint(11), DEFAULT_HINT);
        assert_eq!(catalog.hint(0), DEFAULT_HINT);
        assert_eq!(catalog.level(42), LevelSpec::default_level());
    }

    #[test]
    fn test_level_three_platform_is_tilted() {
        let catalog = LevelCatalog::builtin().unwrap();
        let tilted = catalog
            .level(3)
            .objects
            .iter()
            .filter(|o| o.options.angle == Some(20.0))
            .count();
        assert_eq!(tilted, 1);
    }

    #[test]
    fn test_level_nine_has_scripted_movers() {
        let catalog = LevelCatalog::builtin().unwrap();
        let movers = catalog
            .level(9)
            .objects
            .iter()
            .filter(|o| o.options.movement.is_some())
            .count();
        assert_eq!(movers, 3);
    }
}
