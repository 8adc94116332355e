//! Level lifecycle and the goal/completion state machine
//!
//! `Loading -> Active -> Completed -> (Reset -> Loading | Advance -> Loading(next))`
//!
//! One tick runs in a fixed order:
//! 1. Player input forces
//! 2. Kinematic scripts (direct pose writes)
//! 3. Physics step
//! 4. Collision-begin events
//! 5. Velocity clamp and fall-out check
//! 6. Deferred events, level timer, visual resync

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;

use super::EntityId;
use super::actor::Actor;
use super::entity::{EntityDesc, PhysicsEntity};
use super::kinematic::KinematicScript;
use super::timers::{Deferred, TimerQueue};
use super::visual::{AssetCatalog, Visual, VisualStyle};
use crate::error::{ConfigurationError, SimError};
use crate::input::TickInput;
use crate::level::{EntityKind, GOAL_LABEL, LevelCatalog, LevelSpec, PLAYER_LABEL};
use crate::physics::{BodyHandle, MaterialSpec, RapierBackend, RigidBodyBackend, ShapeSpec};
use crate::progress::{Advance, Progress};
use crate::settings::Settings;

const BOUNDARY_TINT: u32 = 0x999999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// Nothing simulating: before the first load, after a failed load or a teardown
    Loading,
    Active,
    /// Goal reached; waiting for the deferred completion
    Completed,
    /// Final level done
    RunComplete,
}

/// Lifecycle notifications for the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    Loaded(u32),
    GoalReached(u32),
    Completed(u32),
    Reset(u32),
    RunComplete,
}

pub struct LevelController<B: RigidBodyBackend = RapierBackend> {
    backend: B,
    settings: Settings,
    catalog: LevelCatalog,
    assets: AssetCatalog,
    progress: Progress,

    phase: LevelPhase,
    level_number: u32,
    /// Spec of the loaded level, kept for resets
    spec: Option<LevelSpec>,

    actor: Option<Actor>,
    /// Everything but the player, in creation order
    entities: BTreeMap<EntityId, PhysicsEntity>,
    scripts: Vec<KinematicScript>,
    /// Reverse lookup from collision events
    body_index: HashMap<BodyHandle, EntityId>,
    goal: Option<EntityId>,
    next_id: u32,

    timers: TimerQueue<Deferred>,
    /// Seconds spent in `Active` on this level
    elapsed: f32,
    events: Vec<LevelEvent>,
}

impl LevelController<RapierBackend> {
    /// Rapier backend plus the built-in level catalog
    pub fn with_builtin_levels(settings: Settings, assets: AssetCatalog) -> Result<Self, SimError> {
        Ok(Self::new(
            RapierBackend::default(),
            settings,
            LevelCatalog::builtin()?,
            assets,
        ))
    }
}

impl<B: RigidBodyBackend> LevelController<B> {
    pub fn new(backend: B, settings: Settings, catalog: LevelCatalog, assets: AssetCatalog) -> Self {
        let progress = Progress::new(settings.total_levels);
        Self {
            backend,
            settings,
            catalog,
            assets,
            progress,
            phase: LevelPhase::Loading,
            level_number: 1,
            spec: None,
            actor: None,
            entities: BTreeMap::new(),
            scripts: Vec::new(),
            body_index: HashMap::new(),
            goal: None,
            next_id: 0,
            timers: TimerQueue::new(),
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    // === Lifecycle ===

    /// Load level `number` (1-based, at most the run length) from the catalog
    pub fn start_level(&mut self, number: u32) -> Result<(), SimError> {
        if number == 0 || number > self.progress.total_levels() {
            return Err(ConfigurationError::UnknownLevel(number).into());
        }
        let spec = self.catalog.level(number);
        self.load_level(number, spec)
    }

    /// Replace the current entity set with `spec`.
    ///
    /// All-or-nothing: on error nothing from `spec` stays in the backend,
    /// the controller remains in `Loading` and the level number and progress
    /// keep pointing at the last level that loaded.
    pub fn load_level(&mut self, number: u32, spec: LevelSpec) -> Result<(), SimError> {
        self.teardown();

        if let Err(err) = spec.validate() {
            log::warn!("Level {number} rejected: {err}");
            return Err(err.into());
        }

        let gravity = self.settings.gravity_for_level(number);
        self.backend.set_gravity(gravity);

        if let Err(err) = self.build(&spec) {
            log::warn!("Level {number} failed to build: {err}");
            self.teardown();
            return Err(err);
        }

        self.level_number = number;
        self.progress.select(number);
        log::info!(
            "Level {number} loaded: {} entities, gravity {:.0}",
            self.entity_count(),
            gravity.y
        );
        self.spec = Some(spec);
        self.phase = LevelPhase::Active;
        self.events.push(LevelEvent::Loaded(number));
        Ok(())
    }

    /// Rebuild the current level from scratch
    pub fn reset_level(&mut self) -> Result<(), SimError> {
        let Some(spec) = self.spec.clone() else {
            log::debug!("Reset with no level loaded");
            return Ok(());
        };
        let number = self.level_number;
        log::info!("Resetting level {number}");
        self.load_level(number, spec)?;
        self.events.push(LevelEvent::Reset(number));
        Ok(())
    }

    /// Record the level as done and load the next one, or finish the run.
    ///
    /// Mutates `Progress`; must only be called from the tick thread and is
    /// not reentrant.
    pub fn complete_level(&mut self) -> Result<(), SimError> {
        if !matches!(self.phase, LevelPhase::Active | LevelPhase::Completed) {
            log::debug!("Ignoring completion while {:?}", self.phase);
            return Ok(());
        }
        let completed = self.level_number;
        self.timers.cancel_all();
        self.events.push(LevelEvent::Completed(completed));
        log::info!("Level {completed} complete in {:.1}s", self.elapsed);

        match self.progress.complete() {
            Advance::Next(next) => self.start_level(next),
            Advance::RunComplete => {
                self.teardown();
                self.spec = None;
                self.phase = LevelPhase::RunComplete;
                self.events.push(LevelEvent::RunComplete);
                log::info!("Run complete");
                Ok(())
            }
        }
    }

    /// Back to level 1 with no completions. Nothing is loaded afterwards.
    ///
    /// Same threading rule as `complete_level`.
    pub fn restart_run(&mut self) {
        self.teardown();
        self.spec = None;
        self.progress.restart();
        self.level_number = self.progress.current_level();
        log::info!("Run restarted");
    }

    /// Destroy every entity and cancel pending deferred events
    pub fn unload(&mut self) {
        self.teardown();
        self.spec = None;
    }

    fn teardown(&mut self) {
        let cancelled = self.timers.cancel_all();
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} pending events");
        }
        if let Some(mut actor) = self.actor.take() {
            actor.entity_mut().destroy(&mut self.backend);
        }
        for (_, mut entity) in std::mem::take(&mut self.entities) {
            entity.destroy(&mut self.backend);
        }
        self.scripts.clear();
        self.body_index.clear();
        self.goal = None;
        self.elapsed = 0.0;
        self.phase = LevelPhase::Loading;
    }

    fn build(&mut self, spec: &LevelSpec) -> Result<(), SimError> {
        for desc in self.boundaries() {
            let entity = self.create_entity(desc)?;
            self.entities.insert(entity.id(), entity);
        }

        for object in &spec.objects {
            let mut desc = object.to_desc(&self.settings);
            let motion = object.scripted_motion();
            if let Some(profile) = &motion {
                // Start where the script puts phase 0
                desc.position = object.position() + profile.offset(0.0);
            }

            let entity = self.create_entity(desc)?;
            let id = entity.id();
            match object.kind {
                EntityKind::Player => {
                    let actor = Actor::new(entity, &self.settings.player, &self.settings.goal)
                        .with_limits(object.options.max_speed, object.options.move_force);
                    self.actor = Some(actor);
                }
                kind => {
                    if kind == EntityKind::Goal {
                        self.goal = Some(id);
                    }
                    self.entities.insert(id, entity);
                }
            }
            if let Some(profile) = motion {
                self.scripts
                    .push(KinematicScript::new(id, profile, object.position()));
            }
        }
        Ok(())
    }

    fn create_entity(&mut self, desc: EntityDesc) -> Result<PhysicsEntity, SimError> {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        let entity = PhysicsEntity::create(&mut self.backend, id, desc, &self.assets)?;
        if let Some(body) = entity.body() {
            self.body_index.insert(body, id);
        }
        Ok(entity)
    }

    /// Floor and side walls just outside the playfield
    fn boundaries(&self) -> [EntityDesc; 3] {
        let w = self.settings.playfield_width;
        let h = self.settings.playfield_height;
        let t = self.settings.wall_thickness;
        let style = VisualStyle {
            tint: BOUNDARY_TINT,
            ..VisualStyle::default()
        };
        let wall = |label: &str, position: Vec2, width: f32, height: f32| {
            EntityDesc::new(
                label,
                position,
                ShapeSpec::Rectangle { width, height },
                MaterialSpec::boundary(),
            )
            .with_style(style.clone())
        };
        [
            wall("floor", Vec2::new(w / 2.0, h - t / 2.0), w, t),
            wall("wall", Vec2::new(-t / 2.0, h / 2.0), t, h),
            wall("wall", Vec2::new(w + t / 2.0, h / 2.0), t, h),
        ]
    }

    // === Simulation ===

    /// Advance one tick and return the lifecycle events it produced.
    /// Non-positive `dt` is a paused clock: nothing moves.
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> Result<Vec<LevelEvent>, SimError> {
        if dt <= 0.0 || !matches!(self.phase, LevelPhase::Active | LevelPhase::Completed) {
            return Ok(std::mem::take(&mut self.events));
        }

        // 1. Input; the ball stays controllable while the completion is pending
        if let Some(actor) = self.actor.as_mut() {
            recover(actor.apply_input(&mut self.backend, input));
        }

        // 2. Kinematic scripts
        for script in &mut self.scripts {
            if let Some(entity) = self.entities.get_mut(&script.entity()) {
                recover(script.drive(entity, &mut self.backend, dt));
            }
        }

        // 3. Step, 4. collisions
        let contacts = self.backend.step(dt);
        for contact in contacts.iter().filter(|c| c.started) {
            self.on_collision_begin(contact.body_a, contact.body_b);
        }

        // 5. Clamp and bounds
        if let Some(actor) = self.actor.as_mut() {
            recover(actor.clamp_velocity(&mut self.backend));
        }
        if self.player_fell_out() {
            log::info!("Player fell out of level {}", self.level_number);
            self.reset_level()?;
            return Ok(std::mem::take(&mut self.events));
        }

        // 6. Deferred events, timer, visuals
        let mut advanced = false;
        for event in self.timers.advance(dt) {
            match event {
                Deferred::EndCelebration => {
                    if let Some(actor) = self.actor.as_mut() {
                        actor.end_celebration();
                    }
                }
                Deferred::CompleteLevel => {
                    self.complete_level()?;
                    advanced = true;
                    // The old level is gone; its remaining events went with it
                    break;
                }
            }
        }
        if self.phase == LevelPhase::Active && !advanced {
            self.elapsed += dt;
        }
        self.sync_visuals();

        Ok(std::mem::take(&mut self.events))
    }

    /// Goal detection for one collision-begin event. Returns whether this
    /// contact completed the level.
    pub fn on_collision_begin(&mut self, body_a: BodyHandle, body_b: BodyHandle) -> bool {
        if self.phase != LevelPhase::Active {
            return false;
        }
        let goal_contact = match (self.label_of(body_a), self.label_of(body_b)) {
            (Some(a), Some(b)) => {
                (a == PLAYER_LABEL && b == GOAL_LABEL) || (a == GOAL_LABEL && b == PLAYER_LABEL)
            }
            _ => false,
        };
        if !goal_contact {
            return false;
        }

        log::debug!("Player reached goal on level {}", self.level_number);
        self.phase = LevelPhase::Completed;
        if let Some(actor) = self.actor.as_mut() {
            actor.reached_goal(&mut self.timers, &self.assets);
        }
        self.events.push(LevelEvent::GoalReached(self.level_number));
        true
    }

    /// Copy body poses into visuals
    pub fn sync_visuals(&mut self) {
        if let Some(actor) = self.actor.as_mut() {
            actor.entity_mut().sync_visual(&self.backend);
        }
        for entity in self.entities.values_mut() {
            entity.sync_visual(&self.backend);
        }
    }

    fn player_fell_out(&self) -> bool {
        self.player_position()
            .is_some_and(|pos| pos.y > self.settings.fall_threshold())
    }

    fn label_of(&self, body: BodyHandle) -> Option<&str> {
        let id = *self.body_index.get(&body)?;
        match &self.actor {
            Some(actor) if actor.entity().id() == id => Some(actor.entity().label()),
            _ => self.entities.get(&id).map(PhysicsEntity::label),
        }
    }

    // === Accessors ===

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    /// Seconds spent playing the current level
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_completed(&self) -> bool {
        self.phase == LevelPhase::Completed
    }

    pub fn hint(&self) -> &str {
        self.catalog.hint(self.level_number)
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Live entities including boundaries and the player
    pub fn entity_count(&self) -> usize {
        self.entities.len() + usize::from(self.actor.is_some())
    }

    pub fn entity(&self, id: EntityId) -> Option<&PhysicsEntity> {
        match &self.actor {
            Some(actor) if actor.entity().id() == id => Some(actor.entity()),
            _ => self.entities.get(&id),
        }
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn player_position(&self) -> Option<Vec2> {
        let actor = self.actor.as_ref()?;
        actor.entity().pose(&self.backend).map(|p| p.position)
    }

    pub fn player_body(&self) -> Option<BodyHandle> {
        self.actor.as_ref()?.entity().body()
    }

    pub fn goal_body(&self) -> Option<BodyHandle> {
        self.entities.get(&self.goal?)?.body()
    }

    pub fn scripts(&self) -> &[KinematicScript] {
        &self.scripts
    }

    /// Deferred events still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Visuals for the renderer, in entity order with the player last
    pub fn visuals(&self) -> impl Iterator<Item = &Visual> {
        self.entities
            .values()
            .chain(self.actor.as_ref().map(Actor::entity))
            .filter_map(PhysicsEntity::visual)
    }
}

impl<B: RigidBodyBackend> Drop for LevelController<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Recoverable errors were already logged where they happened
fn recover<T>(result: Result<T, SimError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_recoverable() => None,
        Err(err) => {
            log::error!("{err}");
            None
        }
    }
}
