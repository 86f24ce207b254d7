//! Entity types
//!
//! One flat `Entity` struct with a kind tag carrying per-kind state.
//! The player ship is not stored in the entity vector: collision rules
//! reference it explicitly, so the world owns it as a dedicated field.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::consts::*;
use crate::draw::Sprite;
use crate::to_angle;

pub type EntityId = u32;

/// Long-lived movement state of an enemy, resumed once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyBehavior {
    /// Accelerate toward the player's current position
    Seek,
    /// Random-walk heading, resampled every few frames
    Wander { heading: f32, frames_until_turn: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Enemy {
        behavior: EnemyBehavior,
        /// Spawn grace window; the enemy cannot hurt the player until this
        /// reaches zero
        frames_until_active: u32,
        reward: u32,
    },
    Bullet {
        bounces_left: u32,
        /// Set on first bounce and never reverts: friendly fire
        can_hit_player: bool,
    },
    BlackHole {
        hitpoints: i32,
        spray_angle: f32,
    },
    CompanionEgg,
    CompanionShip {
        /// Attachment slot on the player; None once detached
        slot: Option<usize>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub orientation: f32,
    pub radius: f32,
    pub sprite: Sprite,
    pub color: Color,
    /// Destroyed; reaped at end of frame, ignored by all checks until then
    pub expired: bool,
}

impl Entity {
    fn new(kind: EntityKind, sprite: Sprite, position: Vec2, radius: f32) -> Self {
        Self {
            id: 0, // assigned by the world on add
            kind,
            position,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            radius,
            sprite,
            color: Color::WHITE,
            expired: false,
        }
    }

    pub fn seeker(position: Vec2) -> Self {
        let mut e = Self::new(
            EntityKind::Enemy {
                behavior: EnemyBehavior::Seek,
                frames_until_active: ENEMY_GRACE_FRAMES,
                reward: SEEKER_REWARD,
            },
            Sprite::Seeker,
            position,
            Sprite::Seeker.extents().x / 2.0,
        );
        e.color = Color::TRANSPARENT_WHITE;
        e
    }

    /// Wanderer heading is fixed at spawn; the behavior perturbs it as it runs
    pub fn wanderer(position: Vec2, heading: f32) -> Self {
        let mut e = Self::new(
            EntityKind::Enemy {
                behavior: EnemyBehavior::Wander {
                    heading,
                    frames_until_turn: 0,
                },
                frames_until_active: ENEMY_GRACE_FRAMES,
                reward: WANDERER_REWARD,
            },
            Sprite::Wanderer,
            position,
            Sprite::Wanderer.extents().x / 2.0,
        );
        e.color = Color::TRANSPARENT_WHITE;
        e
    }

    pub fn bullet(position: Vec2, velocity: Vec2) -> Self {
        let mut e = Self::new(
            EntityKind::Bullet {
                bounces_left: BULLET_BOUNCES,
                can_hit_player: false,
            },
            Sprite::Bullet,
            position,
            BULLET_RADIUS,
        );
        e.velocity = velocity;
        e.orientation = to_angle(velocity);
        e
    }

    pub fn black_hole(position: Vec2) -> Self {
        Self::new(
            EntityKind::BlackHole {
                hitpoints: BLACK_HOLE_HITPOINTS,
                spray_angle: 0.0,
            },
            Sprite::BlackHole,
            position,
            Sprite::BlackHole.extents().x / 2.0,
        )
    }

    pub fn companion_egg(position: Vec2) -> Self {
        Self::new(EntityKind::CompanionEgg, Sprite::CompanionEgg, position, 5.0)
    }

    pub fn companion(position: Vec2, slot: usize) -> Self {
        assert!(slot < MAX_COMPANIONS, "unsupported attachment slot {slot}");
        let mut e = Self::new(
            EntityKind::CompanionShip { slot: Some(slot) },
            Sprite::CompanionShip,
            position,
            5.0,
        );
        e.color = Color::rgb(20.0 / 255.0, 1.0, 0.0);
        e.orientation = COMPANION_SLOT_ANGLES[slot];
        e
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy { .. })
    }

    pub fn is_bullet(&self) -> bool {
        matches!(self.kind, EntityKind::Bullet { .. })
    }

    pub fn is_black_hole(&self) -> bool {
        matches!(self.kind, EntityKind::BlackHole { .. })
    }

    /// Active enemies are past their spawn grace window. Non-enemies count
    /// as active.
    pub fn is_active(&self) -> bool {
        match self.kind {
            EntityKind::Enemy {
                frames_until_active,
                ..
            } => frames_until_active == 0,
            _ => true,
        }
    }
}

/// The player's ship. Singly instanced per game, owned by the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerShip {
    pub position: Vec2,
    pub velocity: Vec2,
    pub orientation: f32,
    pub radius: f32,
    pub frames_until_respawn: u32,
    pub cooldown_remaining: u32,
    /// Companion entity ids per attachment slot
    pub companion_slots: [Option<EntityId>; MAX_COMPANIONS],
}

impl PlayerShip {
    pub fn new(screen_size: Vec2) -> Self {
        Self {
            position: screen_size / 2.0,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            radius: PLAYER_RADIUS,
            frames_until_respawn: 0,
            cooldown_remaining: 0,
            companion_slots: [None; MAX_COMPANIONS],
        }
    }

    pub fn is_dead(&self) -> bool {
        self.frames_until_respawn > 0
    }

    /// First free attachment slot, if any
    pub fn free_slot(&self) -> Option<usize> {
        self.companion_slots.iter().position(|s| s.is_none())
    }

    /// Record a companion in the given slot. The slot must exist and be free.
    pub fn attach(&mut self, slot: usize, id: EntityId) {
        assert!(slot < MAX_COMPANIONS, "unsupported attachment slot {slot}");
        assert!(
            self.companion_slots[slot].is_none(),
            "attachment slot {slot} already taken"
        );
        self.companion_slots[slot] = Some(id);
    }

    /// Release a slot. Detaching an unattached slot is a programming error.
    pub fn detach(&mut self, slot: usize) {
        assert!(slot < MAX_COMPANIONS, "unsupported attachment slot {slot}");
        assert!(
            self.companion_slots[slot].is_some(),
            "detach of unattached slot {slot}"
        );
        self.companion_slots[slot] = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_spawns_inactive_and_transparent() {
        let e = Entity::seeker(Vec2::new(100.0, 100.0));
        assert!(!e.is_active());
        assert_eq!(e.color.a, 0.0);
    }

    #[test]
    fn test_bullet_oriented_along_velocity() {
        let b = Entity::bullet(Vec2::ZERO, Vec2::new(0.0, 11.0));
        assert!((b.orientation - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_slot_bookkeeping() {
        let mut p = PlayerShip::new(Vec2::new(1280.0, 720.0));
        assert_eq!(p.free_slot(), Some(0));
        p.attach(0, 7);
        assert_eq!(p.free_slot(), Some(1));
        p.detach(0);
        assert_eq!(p.free_slot(), Some(0));
    }

    #[test]
    #[should_panic(expected = "detach of unattached")]
    fn test_detach_unattached_panics() {
        let mut p = PlayerShip::new(Vec2::new(1280.0, 720.0));
        p.detach(2);
    }

    #[test]
    #[should_panic(expected = "unsupported attachment slot")]
    fn test_attach_out_of_range_panics() {
        let mut p = PlayerShip::new(Vec2::new(1280.0, 720.0));
        p.attach(MAX_COMPANIONS, 1);
    }
}
