//! Level data model
//!
//! Levels are authored as JSON: an ordered list of entity entries, each with a
//! type tag, a spawn position and optional per-type options.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::physics::{MaterialSpec, ShapeSpec};
use crate::settings::Settings;
use crate::sim::entity::EntityDesc;
use crate::sim::kinematic::{Axis, MotionProfile};
use crate::sim::visual::VisualStyle;

/// Labels the level controller matches collisions on
pub const PLAYER_LABEL: &str = "player";
pub const GOAL_LABEL: &str = "goal";

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Player,
    Goal,
    Platform,
    Block,
    Gap,
    Lever,
    Weight,
    Seesaw,
    Pivot,
    Domino,
    Ball,
    MovingPlatform,
    Obstacle,
    /// Anything else is a plain physics prop
    #[serde(other)]
    Prop,
}

impl EntityKind {
    pub fn default_label(self) -> &'static str {
        match self {
            EntityKind::Player => PLAYER_LABEL,
            EntityKind::Goal => GOAL_LABEL,
            EntityKind::Platform => "platform",
            EntityKind::Block => "block",
            EntityKind::Gap => "gap",
            EntityKind::Lever => "lever",
            EntityKind::Weight => "weight",
            EntityKind::Seesaw => "seesaw",
            EntityKind::Pivot => "pivot",
            EntityKind::Domino => "domino",
            EntityKind::Ball => "ball",
            EntityKind::MovingPlatform => "movingPlatform",
            EntityKind::Obstacle => "obstacle",
            EntityKind::Prop => "physicsObject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Polygon,
}

/// Scripted movement as authored. `speed` is in radians per second; linear
/// motion covers `distance` end to end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MovementSpec {
    Horizontal { distance: f32, speed: f32 },
    Vertical { distance: f32, speed: f32 },
    Circular { radius: f32, speed: f32 },
}

impl MovementSpec {
    pub fn profile(&self) -> MotionProfile {
        match *self {
            MovementSpec::Horizontal { distance, speed } => MotionProfile::Linear {
                axis: Axis::Horizontal,
                amplitude: distance / 2.0,
                angular_speed: speed,
            },
            MovementSpec::Vertical { distance, speed } => MotionProfile::Linear {
                axis: Axis::Vertical,
                amplitude: distance / 2.0,
                angular_speed: speed,
            },
            MovementSpec::Circular { radius, speed } => MotionProfile::Circular {
                radius,
                angular_speed: speed,
            },
        }
    }
}

/// Optional overrides on an entity entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityOptions {
    pub shape: Option<ShapeKind>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub radius: Option<f32>,
    pub vertices: Option<Vec<[f32; 2]>>,
    pub color: Option<u32>,
    pub alpha: Option<f32>,
    pub texture: Option<String>,
    pub is_static: Option<bool>,
    pub is_sensor: Option<bool>,
    pub friction: Option<f32>,
    pub friction_air: Option<f32>,
    pub restitution: Option<f32>,
    pub density: Option<f32>,
    pub collision_category: Option<u32>,
    pub collides_with: Option<u32>,
    pub chamfer: Option<f32>,
    /// Degrees
    pub angle: Option<f32>,
    pub label: Option<String>,
    pub movement: Option<MovementSpec>,
    pub max_speed: Option<f32>,
    pub move_force: Option<f32>,
}

impl EntityOptions {
    /// Shape from options; unspecified dimensions come from `base`
    pub fn shape(&self, base: &ShapeSpec) -> ShapeSpec {
        let base_size = base.size();
        let base_radius = match base {
            ShapeSpec::Circle { radius } => *radius,
            _ => 25.0,
        };
        let kind = self.shape.unwrap_or(match base {
            ShapeSpec::Circle { .. } => ShapeKind::Circle,
            ShapeSpec::Rectangle { .. } => ShapeKind::Rectangle,
            ShapeSpec::Polygon { .. } => ShapeKind::Polygon,
        });
        match kind {
            ShapeKind::Circle => ShapeSpec::Circle {
                radius: self.radius.unwrap_or(base_radius),
            },
            ShapeKind::Rectangle => ShapeSpec::Rectangle {
                width: self.width.unwrap_or(base_size.x),
                height: self.height.unwrap_or(base_size.y),
            },
            ShapeKind::Polygon => ShapeSpec::Polygon {
                vertices: self
                    .vertices
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|[x, y]| Vec2::new(*x, *y))
                    .collect(),
            },
        }
    }

    pub fn material(&self, base: MaterialSpec) -> MaterialSpec {
        MaterialSpec {
            is_static: self.is_static.unwrap_or(base.is_static),
            is_sensor: self.is_sensor.unwrap_or(base.is_sensor),
            friction: self.friction.unwrap_or(base.friction),
            air_friction: self.friction_air.unwrap_or(base.air_friction),
            restitution: self.restitution.unwrap_or(base.restitution),
            density: self.density.unwrap_or(base.density),
            collision_category: self.collision_category.unwrap_or(base.collision_category),
            collision_mask: self.collides_with.unwrap_or(base.collision_mask),
            chamfer: self.chamfer.or(base.chamfer),
        }
    }

    pub fn style(&self, base: VisualStyle) -> VisualStyle {
        VisualStyle {
            tint: self.color.unwrap_or(base.tint),
            alpha: self.alpha.unwrap_or(base.alpha),
            texture: self.texture.clone().or(base.texture),
        }
    }
}

/// One entry of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub options: EntityOptions,
}

impl EntitySpec {
    pub fn new(kind: EntityKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            options: EntityOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EntityOptions) -> Self {
        self.options = options;
        self
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Motion profile of a scripted entity; the player is never scripted
    pub fn scripted_motion(&self) -> Option<MotionProfile> {
        match self.kind {
            EntityKind::Player => None,
            _ => self.options.movement.as_ref().map(MovementSpec::profile),
        }
    }

    /// Entity description with per-kind defaults and option overrides applied
    pub fn to_desc(&self, settings: &Settings) -> EntityDesc {
        let (shape, material, style) = match self.kind {
            EntityKind::Player => (
                ShapeSpec::Circle {
                    radius: settings.player.radius,
                },
                MaterialSpec::player(),
                VisualStyle {
                    tint: settings.player.tint,
                    ..VisualStyle::default()
                },
            ),
            EntityKind::Goal => (
                ShapeSpec::Rectangle {
                    width: settings.goal.size,
                    height: settings.goal.size,
                },
                MaterialSpec::goal(),
                VisualStyle {
                    tint: 0x00ff00,
                    ..VisualStyle::default()
                },
            ),
            _ => (
                ShapeSpec::Rectangle {
                    width: 50.0,
                    height: 50.0,
                },
                MaterialSpec::default(),
                VisualStyle::default(),
            ),
        };

        let label = match self.kind {
            // Collision matching depends on these two labels
            EntityKind::Player | EntityKind::Goal => self.kind.default_label().to_string(),
            kind => self
                .options
                .label
                .clone()
                .unwrap_or_else(|| kind.default_label().to_string()),
        };

        EntityDesc::new(
            label,
            self.position(),
            self.options.shape(&shape),
            self.options.material(material),
        )
        .with_style(self.options.style(style))
        .with_rotation(self.options.angle.unwrap_or(0.0).to_radians())
        .kinematic(self.scripted_motion().is_some())
    }
}

/// An ordered list of entity entries plus its hint line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    #[serde(default)]
    pub hint: Option<String>,
    pub objects: Vec<EntitySpec>,
}

impl LevelSpec {
    pub fn new(objects: Vec<EntitySpec>) -> Self {
        Self {
            hint: None,
            objects,
        }
    }

    /// Player and goal only
    pub fn default_level() -> Self {
        Self::new(vec![
            EntitySpec::new(EntityKind::Player, 100.0, 500.0),
            EntitySpec::new(EntityKind::Goal, 700.0, 500.0),
        ])
    }

    /// Exactly one player and one goal
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let count = |kind| self.objects.iter().filter(|o| o.kind == kind).count();
        match count(EntityKind::Player) {
            0 => return Err(ConfigurationError::MissingPlayer),
            1 => {}
            n => return Err(ConfigurationError::DuplicatePlayer(n)),
        }
        match count(EntityKind::Goal) {
            0 => Err(ConfigurationError::MissingGoal),
            1 => Ok(()),
            n => Err(ConfigurationError::DuplicateGoal(n)),
        }
    }
}
