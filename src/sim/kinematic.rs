//! Scripted motion for platforms and obstacles
//!
//! A `KinematicScript` owns a motion profile, an anchor (the spawn position)
//! and an accumulated phase. Each tick the phase advances by
//! `angular_speed * dt` and the body is placed at `anchor + offset(phase)`
//! by direct pose assignment, never through forces.
//!
//! The phase is accumulated in `f64` and wrapped to one period before the
//! `f32` offset is taken, so long sessions keep the same step resolution.

use std::f64::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::EntityId;
use super::entity::PhysicsEntity;
use crate::error::SimError;
use crate::physics::RigidBodyBackend;
use crate::polar_to_cartesian;

/// Axis of a linear oscillation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn unit(self) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::X,
            Axis::Vertical => Vec2::Y,
        }
    }
}

/// Periodic path around an anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionProfile {
    /// Sinusoidal back-and-forth through the anchor
    Linear {
        axis: Axis,
        amplitude: f32,
        angular_speed: f32,
    },
    /// Constant-rate orbit at `radius`
    Circular { radius: f32, angular_speed: f32 },
}

impl MotionProfile {
    pub fn angular_speed(&self) -> f32 {
        match *self {
            MotionProfile::Linear { angular_speed, .. }
            | MotionProfile::Circular { angular_speed, .. } => angular_speed,
        }
    }

    /// Displacement from the anchor at `phase`
    pub fn offset(&self, phase: f32) -> Vec2 {
        match *self {
            MotionProfile::Linear {
                axis, amplitude, ..
            } => axis.unit() * (amplitude * phase.sin()),
            MotionProfile::Circular { radius, .. } => polar_to_cartesian(radius, phase),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KinematicScript {
    entity: EntityId,
    profile: MotionProfile,
    anchor: Vec2,
    /// Radians, grows with simulated time
    phase: f64,
}

impl KinematicScript {
    pub fn new(entity: EntityId, profile: MotionProfile, anchor: Vec2) -> Self {
        Self {
            entity,
            profile,
            anchor,
            phase: 0.0,
        }
    }

    /// Entity this script drives
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Target position for the current phase
    pub fn position(&self) -> Vec2 {
        self.anchor + self.profile.offset(self.phase.rem_euclid(TAU) as f32)
    }

    /// Advance the phase and return the new target. A paused clock
    /// (`dt <= 0`) leaves the phase alone; there is no catch-up later.
    pub fn advance(&mut self, dt: f32) -> Vec2 {
        if dt > 0.0 {
            self.phase += f64::from(self.profile.angular_speed()) * f64::from(dt);
        }
        self.position()
    }

    /// Advance and teleport the entity's body to the new target
    pub fn drive<B: RigidBodyBackend + ?Sized>(
        &mut self,
        entity: &mut PhysicsEntity,
        backend: &mut B,
        dt: f32,
    ) -> Result<Vec2, SimError> {
        let target = self.advance(dt);
        entity.set_pose(backend, target, None)?;
        Ok(target)
    }
}
