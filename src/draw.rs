//! Draw-call boundary
//!
//! The simulation never touches a GPU; each frame it fills a [`DrawList`]
//! with sprite and line requests that the host renderer resolves against
//! its own textures. Only relative order is a contract: entities first,
//! then grid lines, then particles (particles additively blended).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Every texture the renderer must be able to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sprite {
    Player,
    Seeker,
    Wanderer,
    Bullet,
    BlackHole,
    CompanionShip,
    CompanionEgg,
    LineParticle,
    Glow,
}

impl Sprite {
    /// Sprite extents in pixels; collision radii and screen clamping
    /// derive from these
    pub fn extents(self) -> Vec2 {
        match self {
            Sprite::Player => Vec2::new(40.0, 40.0),
            Sprite::Seeker => Vec2::new(40.0, 40.0),
            Sprite::Wanderer => Vec2::new(40.0, 40.0),
            Sprite::Bullet => Vec2::new(16.0, 16.0),
            Sprite::BlackHole => Vec2::new(50.0, 50.0),
            Sprite::CompanionShip => Vec2::new(30.0, 30.0),
            Sprite::CompanionEgg => Vec2::new(20.0, 20.0),
            Sprite::LineParticle => Vec2::new(12.0, 4.0),
            Sprite::Glow => Vec2::new(32.0, 32.0),
        }
    }
}

/// One sprite submission (origin is the rotation/draw pivot)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpriteCall {
    pub sprite: Sprite,
    pub position: Vec2,
    pub tint: Color,
    pub rotation: f32,
    pub origin: Vec2,
    pub scale: Vec2,
}

/// One line-segment submission (used by the grid)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineCall {
    pub start: Vec2,
    pub end: Vec2,
    pub color: Color,
    pub thickness: f32,
}

/// Per-frame accumulation of draw requests
#[derive(Debug, Default)]
pub struct DrawList {
    pub sprites: Vec<SpriteCall>,
    pub lines: Vec<LineCall>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.lines.clear();
    }

    /// Centered sprite at uniform scale 1
    pub fn sprite(&mut self, sprite: Sprite, position: Vec2, tint: Color, rotation: f32) {
        self.sprite_scaled(sprite, position, tint, rotation, Vec2::ONE);
    }

    pub fn sprite_scaled(
        &mut self,
        sprite: Sprite,
        position: Vec2,
        tint: Color,
        rotation: f32,
        scale: Vec2,
    ) {
        self.sprites.push(SpriteCall {
            sprite,
            position,
            tint,
            rotation,
            origin: sprite.extents() / 2.0,
            scale,
        });
    }

    pub fn line(&mut self, start: Vec2, end: Vec2, color: Color, thickness: f32) {
        self.lines.push(LineCall {
            start,
            end,
            color,
            thickness,
        });
    }
}
