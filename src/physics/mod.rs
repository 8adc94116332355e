//! Rigid-body backend
//!
//! The simulation talks to physics only through [`RigidBodyBackend`]:
//! - Bodies are addressed by opaque [`BodyHandle`]s
//! - `step` resolves collisions and returns the begin/end events it produced,
//!   so nothing is ever called back from inside the engine
//! - Mutators return `false` when the handle no longer names a live body

pub mod rapier;
pub mod shape;

use std::fmt;

use glam::Vec2;

pub use rapier::RapierBackend;
pub use shape::{MaterialSpec, ShapeSpec};

use crate::error::SimError;

/// Opaque identifier of a body inside a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// How the backend integrates a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Moved by forces, impulses and gravity
    Dynamic,
    /// Never moves on its own
    Static,
    /// Moved only by direct pose assignment, still pushes dynamic bodies
    Kinematic,
}

/// Position and rotation (radians) of a body
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    pub rotation: f32,
}

/// Everything needed to build one body
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub rotation: f32,
    pub shape: ShapeSpec,
    pub material: MaterialSpec,
}

impl BodyDesc {
    /// Body kind implied by the material (static materials stay static)
    pub fn new(position: Vec2, shape: ShapeSpec, material: MaterialSpec) -> Self {
        let kind = if material.is_static {
            BodyKind::Static
        } else {
            BodyKind::Dynamic
        };
        Self {
            kind,
            position,
            rotation: 0.0,
            shape,
            material,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }
}

/// A collision begin/end between two bodies, emitted by `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// `true` when the contact just started, `false` when it ended
    pub started: bool,
}

/// Physics engine seam consumed by the simulation
pub trait RigidBodyBackend {
    /// Build a body (and its collider) from a description
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, SimError>;

    /// Remove a body; returns `false` if it was already gone
    fn destroy_body(&mut self, handle: BodyHandle) -> bool;

    /// Whether `handle` names a live body
    fn contains(&self, handle: BodyHandle) -> bool;

    fn pose(&self, handle: BodyHandle) -> Option<Pose>;

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Teleport a body; kinematic bodies reach the position on the next step
    fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> bool;

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool;

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) -> bool;

    /// Apply `force` at world `point` for the next step only
    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2) -> bool;

    /// Instantaneous change of momentum
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> bool;

    /// Switch a body between static and dynamic
    fn set_static(&mut self, handle: BodyHandle, is_static: bool) -> bool;

    fn set_gravity(&mut self, gravity: Vec2);

    fn gravity(&self) -> Vec2;

    /// Advance the simulation and drain the collision events it produced
    fn step(&mut self, dt: f32) -> Vec<CollisionEvent>;

    fn body_count(&self) -> usize;
}
