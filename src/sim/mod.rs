//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies
//! - Fixed per-frame phase order: collisions, behaviors, commit of queued
//!   additions, prune of expired entities, spawner, status, particles, grid
//!
//! Entities queued during a frame never take part in that frame's
//! collision pass.

pub mod behavior;
pub mod collision;
pub mod entity;
pub mod game;
pub mod grid;
pub mod particle;
pub mod spawner;
pub mod status;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use collision::is_colliding;
pub use entity::{Entity, EntityKind, EnemyBehavior, PlayerShip};
pub use game::{Game, InputSnapshot};
pub use grid::Grid;
pub use particle::{Particle, ParticleEnv, ParticleKind, ParticlePool, ParticleState};
pub use spawner::EnemySpawner;
pub use status::{KillReward, PlayerStatus};
pub use world::EntityWorld;

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::events::SoundRequest;

/// Per-frame mutable context handed down through the collision and
/// behavior passes. Behaviors never reach into each other's storage;
/// everything they may touch besides their own entity goes through here.
pub struct FrameFx<'a> {
    pub particles: &'a mut ParticlePool,
    pub grid: &'a mut Grid,
    pub status: &'a mut PlayerStatus,
    pub rng: &'a mut Pcg32,
    pub sounds: &'a mut Vec<SoundRequest>,
    pub screen_size: Vec2,
    /// Elapsed real time this frame, seconds
    pub dt: f32,
    /// Accumulated in-game time, seconds (pauses excluded by the host)
    pub time_secs: f64,
    pub god_mode: bool,
    /// Set when the player dies; applied by the game after the entity pass
    pub reset_spawner: bool,
}
