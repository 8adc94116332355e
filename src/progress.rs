//! Run progress
//!
//! In-memory for the lifetime of the process; a restart wipes it.

use serde::{Deserialize, Serialize};

/// Where a completed level leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Load this level next
    Next(u32),
    /// The final level is done
    RunComplete,
}

/// Current level plus the high-water mark of completed levels.
///
/// `complete` and `restart` are the only mutators of run state. They are
/// called from the tick thread and are not reentrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    current_level: u32,
    levels_completed: u32,
    total_levels: u32,
}

impl Progress {
    pub fn new(total_levels: u32) -> Self {
        Self {
            current_level: 1,
            levels_completed: 0,
            total_levels,
        }
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn levels_completed(&self) -> u32 {
        self.levels_completed
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    /// Select the level being played (menu choice)
    pub fn select(&mut self, level: u32) {
        self.current_level = level;
    }

    /// Record the current level as done and move on
    pub fn complete(&mut self) -> Advance {
        self.levels_completed = self
            .levels_completed
            .max(self.current_level)
            .min(self.total_levels);
        self.current_level += 1;
        log::info!(
            "Progress: {} of {} levels completed",
            self.levels_completed,
            self.total_levels
        );
        if self.current_level > self.total_levels {
            Advance::RunComplete
        } else {
            Advance::Next(self.current_level)
        }
    }

    /// Back to level 1 with nothing completed
    pub fn restart(&mut self) {
        self.current_level = 1;
        self.levels_completed = 0;
    }

    pub fn is_completed(&self, level: u32) -> bool {
        level <= self.levels_completed
    }

    /// Completed levels and the one right after the high-water mark
    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.total_levels && level <= self.levels_completed + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_raises_high_water_mark() {
        let mut progress = Progress::new(10);
        assert_eq!(progress.complete(), Advance::Next(2));
        assert_eq!(progress.levels_completed(), 1);
        assert_eq!(progress.current_level(), 2);
    }

    #[test]
    fn test_replaying_an_earlier_level_keeps_the_mark() {
        let mut progress = Progress::new(10);
        progress.select(3);
        progress.complete();
        progress.select(1);
        assert_eq!(progress.complete(), Advance::Next(2));
        assert_eq!(progress.levels_completed(), 3);
    }

    #[test]
    fn test_final_level_ends_run() {
        let mut progress = Progress::new(2);
        progress.complete();
        assert_eq!(progress.complete(), Advance::RunComplete);
        assert_eq!(progress.current_level(), 3);
    }

    #[test]
    fn test_mark_never_exceeds_run_length() {
        let mut progress = Progress::new(10);
        progress.select(11);
        assert_eq!(progress.complete(), Advance::RunComplete);
        assert_eq!(progress.levels_completed(), 10);
        assert!(!progress.is_unlocked(11));
    }

    #[test]
    fn test_unlocking() {
        let mut progress = Progress::new(10);
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));
        progress.complete();
        assert!(progress.is_completed(1));
        assert!(progress.is_unlocked(2));
        assert!(!progress.is_unlocked(3));
        assert!(!progress.is_unlocked(0));

        progress.restart();
        assert_eq!(progress.current_level(), 1);
        assert!(!progress.is_completed(1));
    }
}
