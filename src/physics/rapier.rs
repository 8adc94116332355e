//! rapier2d implementation of the rigid-body backend
//!
//! Units are pixels and seconds with Y pointing down. Forces added through
//! `apply_force` only last for the next step, matching the impulse-per-tick
//! feel the puzzles were tuned against.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::Vec2;
use rapier2d::prelude::*;

use super::{BodyDesc, BodyHandle, BodyKind, Pose, RigidBodyBackend, ShapeSpec};
use crate::error::{ConfigurationError, SimError};

/// Air friction is expressed per 60 Hz tick; rapier damping is per second
const AIR_FRICTION_RATE: f32 = 60.0;

fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_na(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Collider for a shape, `None` when rapier cannot build it (degenerate hull)
fn collider_builder(shape: &ShapeSpec, chamfer: Option<f32>) -> Option<ColliderBuilder> {
    let chamfer = chamfer.filter(|c| c.is_finite() && *c > 0.0);
    match shape {
        ShapeSpec::Circle { radius } => Some(ColliderBuilder::ball(*radius)),
        ShapeSpec::Rectangle { width, height } => {
            let (hx, hy) = (width / 2.0, height / 2.0);
            match chamfer {
                Some(r) => {
                    let r = r.min(hx * 0.5).min(hy * 0.5);
                    Some(ColliderBuilder::round_cuboid(hx - r, hy - r, r))
                }
                None => Some(ColliderBuilder::cuboid(hx, hy)),
            }
        }
        ShapeSpec::Polygon { vertices } => {
            let points: Vec<Point<Real>> = ShapeSpec::centered_vertices(vertices)
                .iter()
                .map(|v| point![v.x, v.y])
                .collect();
            match chamfer {
                Some(r) => ColliderBuilder::round_convex_hull(&points, r),
                None => ColliderBuilder::convex_hull(&points),
            }
        }
    }
}

fn invalid_shape(desc: &BodyDesc, reason: String) -> ConfigurationError {
    ConfigurationError::InvalidShape {
        label: format!("{:?} body at {}", desc.kind, desc.position),
        reason,
    }
}

// ---------------------------------------------------------------------------
// Event collection (filled synchronously while the pipeline steps)
// ---------------------------------------------------------------------------

struct DirectEventCollector {
    collisions: Mutex<Vec<rapier2d::geometry::CollisionEvent>>,
}

impl DirectEventCollector {
    fn new() -> Self {
        Self {
            collisions: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<rapier2d::geometry::CollisionEvent>> {
        self.collisions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drain(&self) -> Vec<rapier2d::geometry::CollisionEvent> {
        std::mem::take(&mut *self.lock())
    }
}

impl EventHandler for DirectEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: rapier2d::geometry::CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

// ---------------------------------------------------------------------------
// RapierBackend
// ---------------------------------------------------------------------------

/// All the rapier2d sets and pipelines behind one handle-based API
pub struct RapierBackend {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    event_collector: DirectEventCollector,
    /// Our handles -> rapier handles; the reverse direction lives in `user_data`
    handles: HashMap<BodyHandle, RigidBodyHandle>,
    next_handle: u64,
}

impl RapierBackend {
    /// Create an empty world. Y-down: positive `gravity.y` pulls toward the floor.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            event_collector: DirectEventCollector::new(),
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        let rb = *self.handles.get(&handle)?;
        self.bodies.get(rb)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let rb = *self.handles.get(&handle)?;
        self.bodies.get_mut(rb)
    }

    fn collider_owner(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let parent = self.colliders.get(collider)?.parent()?;
        let body = self.bodies.get(parent)?;
        Some(BodyHandle(body.user_data as u64))
    }
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl RigidBodyBackend for RapierBackend {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, SimError> {
        desc.shape
            .validate()
            .map_err(|reason| invalid_shape(desc, reason))?;
        let material = &desc.material;
        let collider = collider_builder(&desc.shape, material.chamfer)
            .ok_or_else(|| invalid_shape(desc, "degenerate collider".to_string()))?
            .sensor(material.is_sensor)
            .friction(material.friction)
            .restitution(material.restitution)
            .density(material.density)
            .collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(material.collision_category),
                Group::from_bits_truncate(material.collision_mask),
            ))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();

        let body_type = match desc.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
        };

        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;

        let rb = RigidBodyBuilder::new(body_type)
            .translation(to_na(desc.position))
            .rotation(desc.rotation)
            .linear_damping(material.air_friction * AIR_FRICTION_RATE)
            .user_data(handle.0 as u128)
            .build();
        let rb_handle = self.bodies.insert(rb);
        self.colliders
            .insert_with_parent(collider, rb_handle, &mut self.bodies);
        self.handles.insert(handle, rb_handle);

        Ok(handle)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let Some(rb_handle) = self.handles.remove(&handle) else {
            return false;
        };
        self.bodies
            .remove(
                rb_handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    fn pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.body(handle).map(|rb| Pose {
            position: from_na(rb.translation()),
            rotation: rb.rotation().angle(),
        })
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|rb| from_na(rb.linvel()))
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> bool {
        let Some(rb) = self.body_mut(handle) else {
            return false;
        };
        if rb.is_kinematic() {
            rb.set_next_kinematic_translation(to_na(position));
        } else {
            rb.set_translation(to_na(position), true);
        }
        true
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        let Some(rb) = self.body_mut(handle) else {
            return false;
        };
        rb.set_linvel(to_na(velocity), true);
        true
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, angular_velocity: f32) -> bool {
        let Some(rb) = self.body_mut(handle) else {
            return false;
        };
        rb.set_angvel(angular_velocity, true);
        true
    }

    fn apply_force(&mut self, handle: BodyHandle, point: Vec2, force: Vec2) -> bool {
        let Some(rb) = self.body_mut(handle) else {
            return false;
        };
        rb.add_force_at_point(to_na(force), point![point.x, point.y], true);
        true
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> bool {
        let Some(rb) = self.body_mut(handle) else {
            return false;
        };
        rb.apply_impulse(to_na(impulse), true);
        true
    }

    fn set_static(&mut self, handle: BodyHandle, is_static: bool) -> bool {
        let Some(rb) = self.body_mut(handle) else {
            return false;
        };
        let body_type = if is_static {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        rb.set_body_type(body_type, true);
        true
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_na(gravity);
    }

    fn gravity(&self) -> Vec2 {
        from_na(&self.gravity)
    }

    fn step(&mut self, dt: f32) -> Vec<super::CollisionEvent> {
        if dt <= 0.0 {
            return Vec::new();
        }
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &self.event_collector,
        );

        // Forces are one-tick
        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
        }

        self.event_collector
            .drain()
            .into_iter()
            .filter_map(|event| {
                let (c1, c2, started) = match event {
                    rapier2d::geometry::CollisionEvent::Started(c1, c2, _) => (c1, c2, true),
                    rapier2d::geometry::CollisionEvent::Stopped(c1, c2, _) => (c1, c2, false),
                };
                // Events for colliders removed this step have no owner left
                Some(super::CollisionEvent {
                    body_a: self.collider_owner(c1)?,
                    body_b: self.collider_owner(c2)?,
                    started,
                })
            })
            .collect()
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }
}
