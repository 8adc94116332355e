//! Declarative shape and material descriptions
//!
//! Both are immutable once an entity has been created from them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision shape of a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    Circle { radius: f32 },
    Rectangle { width: f32, height: f32 },
    /// Convex polygon; vertices are offsets from the entity position and get
    /// recentred on their centroid
    Polygon { vertices: Vec<Vec2> },
}

impl ShapeSpec {
    /// Check dimensions are usable for body construction
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ShapeSpec::Circle { radius } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(format!("circle radius must be positive, got {radius}"));
                }
            }
            ShapeSpec::Rectangle { width, height } => {
                if !(width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0) {
                    return Err(format!(
                        "rectangle size must be positive, got {width}x{height}"
                    ));
                }
            }
            ShapeSpec::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(format!(
                        "polygon needs at least 3 vertices, got {}",
                        vertices.len()
                    ));
                }
                if vertices.iter().any(|v| !v.is_finite()) {
                    return Err("polygon vertex is not finite".to_string());
                }
            }
        }
        Ok(())
    }

    /// Axis-aligned size of the unrotated shape
    pub fn size(&self) -> Vec2 {
        match self {
            ShapeSpec::Circle { radius } => Vec2::splat(radius * 2.0),
            ShapeSpec::Rectangle { width, height } => Vec2::new(*width, *height),
            ShapeSpec::Polygon { vertices } => {
                let (min, max) = vertices.iter().fold(
                    (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
                    |(min, max), v| (min.min(*v), max.max(*v)),
                );
                if vertices.is_empty() { Vec2::ZERO } else { max - min }
            }
        }
    }

    /// Polygon vertices shifted so their centroid sits at the origin
    pub fn centered_vertices(vertices: &[Vec2]) -> Vec<Vec2> {
        if vertices.is_empty() {
            return Vec::new();
        }
        let centroid = vertices.iter().copied().sum::<Vec2>() / vertices.len() as f32;
        vertices.iter().map(|v| *v - centroid).collect()
    }
}

/// How a body responds to and takes part in collisions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub is_static: bool,
    pub is_sensor: bool,
    pub friction: f32,
    /// Fraction of velocity lost per 60 Hz tick to air drag
    pub air_friction: f32,
    pub restitution: f32,
    /// Mass per square pixel
    pub density: f32,
    pub collision_category: u32,
    pub collision_mask: u32,
    /// Corner rounding radius (rectangles and polygons)
    pub chamfer: Option<f32>,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            is_static: false,
            is_sensor: false,
            friction: 0.1,
            air_friction: 0.01,
            restitution: 0.8,
            density: 0.001,
            collision_category: 1,
            collision_mask: u32::MAX,
            chamfer: None,
        }
    }
}

impl MaterialSpec {
    /// Player ball material
    pub fn player() -> Self {
        Self {
            friction: 0.05,
            air_friction: 0.01,
            restitution: 0.7,
            density: 0.002,
            collision_category: 2,
            ..Self::default()
        }
    }

    /// Static sensor used for the goal zone
    pub fn goal() -> Self {
        Self {
            is_static: true,
            is_sensor: true,
            ..Self::default()
        }
    }

    /// Floor and walls
    pub fn boundary() -> Self {
        Self {
            is_static: true,
            ..Self::default()
        }
    }

    /// Whether two materials are allowed to collide
    pub fn collides_with(&self, other: &MaterialSpec) -> bool {
        (self.collision_category & other.collision_mask) != 0
            && (other.collision_category & self.collision_mask) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_validation() {
        assert!(ShapeSpec::Circle { radius: 10.0 }.validate().is_ok());
        assert!(ShapeSpec::Circle { radius: 0.0 }.validate().is_err());
        assert!(
            ShapeSpec::Rectangle {
                width: 10.0,
                height: -1.0
            }
            .validate()
            .is_err()
        );
        let two_points = ShapeSpec::Polygon {
            vertices: vec![Vec2::ZERO, Vec2::X],
        };
        assert!(two_points.validate().is_err());
    }

    #[test]
    fn test_polygon_recentred_on_centroid() {
        let verts = [Vec2::new(0.0, 0.0), Vec2::new(30.0, 0.0), Vec2::new(0.0, 30.0)];
        let centered = ShapeSpec::centered_vertices(&verts);
        let sum: Vec2 = centered.iter().copied().sum();
        assert!(sum.length() < 1e-4);
        assert!((centered[1] - centered[0] - Vec2::new(30.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_collision_filter() {
        let player = MaterialSpec::player();
        let mut ghost = MaterialSpec::default();
        ghost.collision_mask = 1;
        assert!(player.collides_with(&MaterialSpec::default()));
        // ghost only accepts category 1, player is category 2
        assert!(!player.collides_with(&ghost));
    }
}
