//! The player-controlled ball
//!
//! Composes a `PhysicsEntity` with input-driven forces, a hard speed clamp
//! and the one-shot `Moving -> ReachedGoal` transition.

use glam::Vec2;

use super::entity::PhysicsEntity;
use super::timers::{Deferred, TimerQueue};
use super::visual::AssetCatalog;
use crate::clamp_speed;
use crate::consts::CELEBRATION_ASSET;
use crate::error::SimError;
use crate::input::{PressLatch, TickInput};
use crate::physics::RigidBodyBackend;
use crate::settings::{GoalSettings, PlayerSettings};

/// Goal progress of the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    Moving,
    ReachedGoal,
}

#[derive(Debug)]
pub struct Actor {
    entity: PhysicsEntity,
    max_speed: f32,
    move_force: f32,
    jump_impulse: f32,
    goal: GoalSettings,
    /// Recomputed from input every tick
    move_direction: Vec2,
    state: ActorState,
    celebrating: bool,
    action: PressLatch,
}

impl Actor {
    pub fn new(entity: PhysicsEntity, player: &PlayerSettings, goal: &GoalSettings) -> Self {
        Self {
            entity,
            max_speed: player.max_speed,
            move_force: player.move_force,
            jump_impulse: player.jump_impulse,
            goal: goal.clone(),
            move_direction: Vec2::ZERO,
            state: ActorState::Moving,
            celebrating: false,
            action: PressLatch::default(),
        }
    }

    /// Override tuning from level options
    pub fn with_limits(mut self, max_speed: Option<f32>, move_force: Option<f32>) -> Self {
        if let Some(max_speed) = max_speed {
            self.max_speed = max_speed;
        }
        if let Some(move_force) = move_force {
            self.move_force = move_force;
        }
        self
    }

    pub fn entity(&self) -> &PhysicsEntity {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut PhysicsEntity {
        &mut self.entity
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn has_reached_goal(&self) -> bool {
        self.state == ActorState::ReachedGoal
    }

    /// Inside the cosmetic window after touching the goal
    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn move_direction(&self) -> Vec2 {
        self.move_direction
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Pre-step: push input intent into the body
    pub fn apply_input<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        input: &TickInput,
    ) -> Result<(), SimError> {
        self.move_direction = input.direction();

        if self.move_direction != Vec2::ZERO {
            self.entity
                .apply_force(backend, self.move_direction * self.move_force)?;
        }

        if self.action.just_pressed(input.action) {
            self.special_action(backend)?;
        }
        Ok(())
    }

    /// One-shot jump
    fn special_action<B: RigidBodyBackend + ?Sized>(&mut self, backend: &mut B) -> Result<(), SimError> {
        log::debug!("Player jump");
        self.entity
            .apply_impulse(backend, Vec2::new(0.0, -self.jump_impulse))
    }

    /// Post-step: rescale velocity so speed never exceeds `max_speed`.
    /// Returns the speed before clamping.
    pub fn clamp_velocity<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
    ) -> Result<f32, SimError> {
        let Some(velocity) = self.entity.velocity(backend) else {
            let err = SimError::BackendUnavailable {
                entity: self.entity.id(),
                operation: "clamp_velocity",
            };
            log::warn!("{err}");
            return Err(err);
        };
        let speed = velocity.length();
        if speed > self.max_speed {
            self.entity
                .set_velocity(backend, clamp_speed(velocity, self.max_speed))?;
        }
        Ok(speed)
    }

    /// First call flips to `ReachedGoal` and schedules the celebration and
    /// the level completion; later calls do nothing. Returns whether this
    /// call made the transition.
    pub fn reached_goal(&mut self, timers: &mut TimerQueue<Deferred>, assets: &AssetCatalog) -> bool {
        if self.has_reached_goal() {
            return false;
        }
        self.state = ActorState::ReachedGoal;

        match assets.texture_size(CELEBRATION_ASSET) {
            Ok(_) => {
                self.celebrating = true;
                timers.schedule(self.goal.celebration_window, Deferred::EndCelebration);
                timers.schedule(self.goal.completion_delay, Deferred::CompleteLevel);
            }
            Err(err) => {
                log::warn!("{err}; skipping celebration");
                timers.schedule(self.goal.fallback_delay, Deferred::CompleteLevel);
            }
        }
        true
    }

    pub fn end_celebration(&mut self) {
        self.celebrating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{MaterialSpec, RapierBackend, ShapeSpec};
    use crate::sim::EntityId;
    use crate::sim::entity::EntityDesc;
    use proptest::prelude::*;

    fn spawn(backend: &mut RapierBackend) -> Actor {
        let desc = EntityDesc::new(
            "player",
            Vec2::new(100.0, 100.0),
            ShapeSpec::Circle { radius: 25.0 },
            MaterialSpec {
                air_friction: 0.0,
                ..MaterialSpec::player()
            },
        );
        let entity = PhysicsEntity::create(backend, EntityId(1), desc, &AssetCatalog::new()).unwrap();
        Actor::new(entity, &PlayerSettings::default(), &GoalSettings::default())
    }

    fn celebration_assets() -> AssetCatalog {
        let mut assets = AssetCatalog::new();
        assets.insert(CELEBRATION_ASSET, Vec2::splat(8.0));
        assets
    }

    #[test]
    fn test_clamp_on_destroyed_body_is_recoverable() {
        let mut backend = RapierBackend::default();
        let mut actor = spawn(&mut backend);
        actor.entity_mut().destroy(&mut backend);

        let err = actor.clamp_velocity(&mut backend).unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(
            err,
            SimError::BackendUnavailable {
                operation: "clamp_velocity",
                ..
            }
        ));
    }

    #[test]
    fn test_reached_goal_completes_once() {
        let mut backend = RapierBackend::default();
        let mut actor = spawn(&mut backend);
        let mut timers = TimerQueue::new();
        let assets = celebration_assets();

        assert!(actor.reached_goal(&mut timers, &assets));
        assert!(!actor.reached_goal(&mut timers, &assets));
        assert!(actor.is_celebrating());

        let fired = timers.advance(10.0);
        let completions = fired
            .iter()
            .filter(|e| **e == Deferred::CompleteLevel)
            .count();
        assert_eq!(completions, 1);
        assert_eq!(actor.state(), ActorState::ReachedGoal);
    }

    #[test]
    fn test_missing_asset_still_completes_after_fallback() {
        let mut backend = RapierBackend::default();
        let mut actor = spawn(&mut backend);
        let mut timers = TimerQueue::new();

        assert!(actor.reached_goal(&mut timers, &AssetCatalog::new()));
        assert!(!actor.is_celebrating());
        assert!(timers.advance(0.9).is_empty());
        assert_eq!(timers.advance(0.2), vec![Deferred::CompleteLevel]);
    }

    #[test]
    fn test_jump_fires_once_per_press() {
        let mut backend = RapierBackend::default();
        let mut actor = spawn(&mut backend);
        let held = TickInput {
            action: true,
            ..Default::default()
        };

        actor.apply_input(&mut backend, &held).unwrap();
        backend.step(1.0 / 60.0);
        let after_first = actor.entity().velocity(&backend).unwrap();
        assert!(after_first.y < 0.0, "jump should push up");

        actor.apply_input(&mut backend, &held).unwrap();
        backend.step(1.0 / 60.0);
        let after_second = actor.entity().velocity(&backend).unwrap();
        assert!((after_second.y - after_first.y).abs() < 1e-3);
    }

    #[test]
    fn test_move_force_follows_input() {
        let mut backend = RapierBackend::default();
        let mut actor = spawn(&mut backend);
        actor.apply_input(&mut backend, &TickInput::right()).unwrap();
        assert_eq!(actor.move_direction(), Vec2::X);
        backend.step(1.0 / 60.0);
        assert!(actor.entity().velocity(&backend).unwrap().x > 0.0);
    }

    proptest! {
        #[test]
        fn prop_clamped_speed_never_exceeds_max(vx in -5000.0f32..5000.0, vy in -5000.0f32..5000.0) {
            let mut backend = RapierBackend::default();
            let mut actor = spawn(&mut backend);
            actor.entity_mut().set_velocity(&mut backend, Vec2::new(vx, vy)).unwrap();
            actor.clamp_velocity(&mut backend).unwrap();
            let speed = actor.entity().velocity(&backend).unwrap().length();
            prop_assert!(speed <= actor.max_speed() * (1.0 + 1e-5), "{speed}");
        }
    }
}
