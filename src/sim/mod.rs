//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only; the frame driver feeds `SIM_DT` ticks
//! - Stable iteration order (entities keyed by ID, created in level order)
//! - Collision events are consumed after the step, never from inside it
//! - No rendering or platform dependencies

pub mod actor;
pub mod controller;
pub mod entity;
pub mod kinematic;
pub mod timers;
pub mod visual;

use std::fmt;

pub use actor::{Actor, ActorState};
pub use controller::{LevelController, LevelEvent, LevelPhase};
pub use entity::{EntityDesc, PhysicsEntity};
pub use kinematic::{Axis, KinematicScript, MotionProfile};
pub use timers::{Deferred, TimerId, TimerQueue};
pub use visual::{AssetCatalog, Visual, VisualHandle, VisualKind, VisualStyle};

/// Stable entity identifier, unique within a level instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
