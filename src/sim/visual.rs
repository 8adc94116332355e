//! Visual handles read by the renderer
//!
//! A visual has no pose of its own: `sync` copies the body pose once per
//! rendered frame. Only tint and alpha may change independently.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::physics::{Pose, ShapeSpec};

/// Opaque visual identifier handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u32);

/// Look of an entity, as authored in level data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualStyle {
    /// 0xRRGGBB
    pub tint: u32,
    pub alpha: f32,
    /// Texture key; `None` draws the collision shape
    pub texture: Option<String>,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            tint: 0xffffff,
            alpha: 1.0,
            texture: None,
        }
    }
}

/// Textures the renderer has loaded, with their pixel size
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    textures: HashMap<String, Vec2>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded texture
    pub fn insert(&mut self, key: impl Into<String>, size: Vec2) {
        self.textures.insert(key.into(), size);
    }

    pub fn texture_size(&self, key: &str) -> Result<Vec2, SimError> {
        self.textures
            .get(key)
            .copied()
            .ok_or_else(|| SimError::AssetMissing(key.to_string()))
    }
}

/// What the renderer draws
#[derive(Debug, Clone, PartialEq)]
pub enum VisualKind {
    /// Filled collision shape
    Primitive(ShapeSpec),
    /// Texture scaled to the entity size
    Sprite { texture: String, scale: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub handle: VisualHandle,
    pub kind: VisualKind,
    pub tint: u32,
    pub alpha: f32,
    pose: Pose,
}

impl Visual {
    /// Build a visual for `shape`. A missing texture falls back to the
    /// primitive shape.
    pub fn build(
        handle: VisualHandle,
        shape: &ShapeSpec,
        style: &VisualStyle,
        assets: &AssetCatalog,
    ) -> Self {
        let kind = match &style.texture {
            Some(key) => match assets.texture_size(key) {
                Ok(tex_size) => Self::sprite_kind(key, shape.size(), tex_size),
                Err(err) => {
                    log::warn!("{err}; drawing primitive shape instead");
                    VisualKind::Primitive(shape.clone())
                }
            },
            None => VisualKind::Primitive(shape.clone()),
        };
        Self {
            handle,
            kind,
            tint: style.tint,
            alpha: style.alpha,
            pose: Pose::default(),
        }
    }

    fn sprite_kind(key: &str, entity_size: Vec2, tex_size: Vec2) -> VisualKind {
        let scale = Vec2::new(
            if tex_size.x > 0.0 { entity_size.x / tex_size.x } else { 1.0 },
            if tex_size.y > 0.0 { entity_size.y / tex_size.y } else { 1.0 },
        );
        VisualKind::Sprite {
            texture: key.to_string(),
            scale,
        }
    }

    /// Copy the body pose
    pub fn sync(&mut self, pose: Pose) {
        self.pose = pose;
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn set_tint(&mut self, tint: u32) {
        self.tint = tint;
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_scaled_to_entity() {
        let mut assets = AssetCatalog::new();
        assets.insert("crate", Vec2::new(25.0, 100.0));
        let style = VisualStyle {
            texture: Some("crate".to_string()),
            ..VisualStyle::default()
        };
        let shape = ShapeSpec::Rectangle {
            width: 50.0,
            height: 50.0,
        };
        let visual = Visual::build(VisualHandle(1), &shape, &style, &assets);
        match visual.kind {
            VisualKind::Sprite { scale, .. } => assert_eq!(scale, Vec2::new(2.0, 0.5)),
            other => panic!("expected sprite, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_texture_falls_back_to_primitive() {
        let style = VisualStyle {
            texture: Some("nope".to_string()),
            ..VisualStyle::default()
        };
        let shape = ShapeSpec::Circle { radius: 5.0 };
        let visual = Visual::build(VisualHandle(1), &shape, &style, &AssetCatalog::new());
        assert_eq!(visual.kind, VisualKind::Primitive(shape));
    }
}
