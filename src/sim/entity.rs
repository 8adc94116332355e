//! PhysicsEntity: one rigid body paired with one visual
//!
//! Body and visual are created together and destroyed together. Mutators on a
//! destroyed entity are no-ops that report `SimError::BackendUnavailable`.

use glam::Vec2;

use super::EntityId;
use super::visual::{AssetCatalog, Visual, VisualHandle, VisualStyle};
use crate::error::{ConfigurationError, SimError};
use crate::physics::{BodyDesc, BodyHandle, BodyKind, MaterialSpec, Pose, RigidBodyBackend, ShapeSpec};

/// Declarative description of an entity
#[derive(Debug, Clone)]
pub struct EntityDesc {
    pub label: String,
    pub position: Vec2,
    /// Radians
    pub rotation: f32,
    pub shape: ShapeSpec,
    pub material: MaterialSpec,
    pub style: VisualStyle,
    /// Driven by direct pose writes instead of forces
    pub kinematic: bool,
}

impl EntityDesc {
    pub fn new(label: impl Into<String>, position: Vec2, shape: ShapeSpec, material: MaterialSpec) -> Self {
        Self {
            label: label.into(),
            position,
            rotation: 0.0,
            shape,
            material,
            style: VisualStyle::default(),
            kinematic: false,
        }
    }

    pub fn with_style(mut self, style: VisualStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    fn body_desc(&self) -> BodyDesc {
        let desc = BodyDesc::new(self.position, self.shape.clone(), self.material)
            .with_rotation(self.rotation);
        if self.kinematic {
            desc.with_kind(BodyKind::Kinematic)
        } else {
            desc
        }
    }
}

#[derive(Debug)]
pub struct PhysicsEntity {
    id: EntityId,
    label: String,
    shape: ShapeSpec,
    material: MaterialSpec,
    spawn: Vec2,
    /// `None` once destroyed; body and visual can't outlive each other
    parts: Option<(BodyHandle, Visual)>,
}

impl PhysicsEntity {
    /// Build the body and its visual
    pub fn create<B: RigidBodyBackend + ?Sized>(
        backend: &mut B,
        id: EntityId,
        desc: EntityDesc,
        assets: &AssetCatalog,
    ) -> Result<Self, SimError> {
        desc.shape
            .validate()
            .map_err(|reason| ConfigurationError::InvalidShape {
                label: desc.label.clone(),
                reason,
            })?;

        let body = backend.create_body(&desc.body_desc())?;
        let mut visual = Visual::build(VisualHandle(id.0), &desc.shape, &desc.style, assets);
        visual.sync(Pose {
            position: desc.position,
            rotation: desc.rotation,
        });

        Ok(Self {
            id,
            label: desc.label,
            shape: desc.shape,
            material: desc.material,
            spawn: desc.position,
            parts: Some((body, visual)),
        })
    }

    /// Remove body and visual in one step. Returns `false` if already destroyed.
    pub fn destroy<B: RigidBodyBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        match self.parts.take() {
            Some((body, _visual)) => {
                backend.destroy_body(body);
                true
            }
            None => false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn shape(&self) -> &ShapeSpec {
        &self.shape
    }

    pub fn material(&self) -> &MaterialSpec {
        &self.material
    }

    /// Position the entity was created at
    pub fn spawn_position(&self) -> Vec2 {
        self.spawn
    }

    pub fn is_live(&self) -> bool {
        self.parts.is_some()
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.parts.as_ref().map(|(body, _)| *body)
    }

    pub fn visual(&self) -> Option<&Visual> {
        self.parts.as_ref().map(|(_, visual)| visual)
    }

    /// Tint/alpha access; pose always comes from the body
    pub fn visual_mut(&mut self) -> Option<&mut Visual> {
        self.parts.as_mut().map(|(_, visual)| visual)
    }

    pub fn pose<B: RigidBodyBackend + ?Sized>(&self, backend: &B) -> Option<Pose> {
        backend.pose(self.body()?)
    }

    pub fn velocity<B: RigidBodyBackend + ?Sized>(&self, backend: &B) -> Option<Vec2> {
        backend.velocity(self.body()?)
    }

    /// Teleport, optionally replacing the linear velocity
    pub fn set_pose<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        position: Vec2,
        velocity: Option<Vec2>,
    ) -> Result<(), SimError> {
        let body = self.live_body(backend, "set_pose")?;
        backend.set_position(body, position);
        if let Some(velocity) = velocity {
            backend.set_velocity(body, velocity);
        }
        Ok(())
    }

    pub fn set_velocity<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        velocity: Vec2,
    ) -> Result<(), SimError> {
        let body = self.live_body(backend, "set_velocity")?;
        backend.set_velocity(body, velocity);
        Ok(())
    }

    pub fn set_angular_velocity<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        angular_velocity: f32,
    ) -> Result<(), SimError> {
        let body = self.live_body(backend, "set_angular_velocity")?;
        backend.set_angular_velocity(body, angular_velocity);
        Ok(())
    }

    /// Force through the body's center for the next step
    pub fn apply_force<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        force: Vec2,
    ) -> Result<(), SimError> {
        let body = self.live_body(backend, "apply_force")?;
        let center = backend.pose(body).map(|p| p.position).unwrap_or(self.spawn);
        backend.apply_force(body, center, force);
        Ok(())
    }

    pub fn apply_impulse<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        impulse: Vec2,
    ) -> Result<(), SimError> {
        let body = self.live_body(backend, "apply_impulse")?;
        backend.apply_impulse(body, impulse);
        Ok(())
    }

    pub fn set_static<B: RigidBodyBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        is_static: bool,
    ) -> Result<(), SimError> {
        let body = self.live_body(backend, "set_static")?;
        backend.set_static(body, is_static);
        Ok(())
    }

    /// Copy the body pose into the visual (once per rendered frame)
    pub fn sync_visual<B: RigidBodyBackend + ?Sized>(&mut self, backend: &B) {
        if let Some((body, visual)) = self.parts.as_mut() {
            if let Some(pose) = backend.pose(*body) {
                visual.sync(pose);
            }
        }
    }

    fn live_body<B: RigidBodyBackend + ?Sized>(
        &self,
        backend: &B,
        operation: &'static str,
    ) -> Result<BodyHandle, SimError> {
        match self.body() {
            Some(body) if backend.contains(body) => Ok(body),
            _ => {
                let err = SimError::BackendUnavailable {
                    entity: self.id,
                    operation,
                };
                log::warn!("{err}");
                Err(err)
            }
        }
    }
}
