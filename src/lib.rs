//! Neon Arena - simulation core for a twin-stick arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, grid physics, particles)
//! - `color`: RGBA color helpers for tints
//! - `draw`: Draw-call boundary consumed by the host renderer
//! - `events`: Fire-and-forget sound requests consumed by the host mixer
//! - `highscore`: Persisted high score (single integer on disk)
//!
//! The crate is headless: it consumes an input snapshot, an elapsed-time
//! value and a screen size each frame, and emits draw lists and sound
//! requests as plain data.

pub mod color;
pub mod draw;
pub mod events;
pub mod highscore;
pub mod sim;

pub use color::Color;
pub use draw::{DrawList, Sprite};
pub use sim::{Game, InputSnapshot};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Default screen size (the host supplies the real one each frame)
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Player ship
    pub const PLAYER_SPEED: f32 = 8.0; // px per frame
    pub const PLAYER_RADIUS: f32 = 10.0; // hurtbox kept small on purpose
    pub const FIRE_COOLDOWN_FRAMES: u32 = 6;
    pub const RESPAWN_FRAMES: u32 = 90;
    /// Longer pause after the final life so the game-over text can be read
    pub const GAME_OVER_RESPAWN_FRAMES: u32 = 300;
    pub const SHIP_EXPLOSION_PARTICLES: usize = 1200;

    /// Bullets
    pub const BULLET_SPEED: f32 = 11.0; // px per frame
    pub const BULLET_RADIUS: f32 = 8.0;
    pub const BULLET_FORWARD_OFFSET: f32 = 25.0;
    pub const BULLET_SIDE_OFFSET: f32 = 8.0;
    /// Max deviation of one spread sample (two are summed for a bell-ish curve)
    pub const BULLET_MAX_SPREAD: f32 = 0.04; // radians
    pub const BULLET_BOUNCES: u32 = 1;
    pub const BULLET_EXPLOSION_PARTICLES: usize = 30;

    /// Enemies
    pub const ENEMY_GRACE_FRAMES: u32 = 60;
    pub const ENEMY_FRICTION: f32 = 0.8;
    pub const ENEMY_EXPLOSION_PARTICLES: usize = 60;
    pub const SEEKER_ACCEL: f32 = 1.0;
    pub const SEEKER_REWARD: u32 = 3;
    pub const WANDERER_SPEED: f32 = 0.4;
    pub const WANDERER_REWARD: u32 = 1;
    pub const WANDER_TURN_PERIOD: u32 = 6; // frames between heading resamples
    pub const WANDER_MAX_TURN: f32 = 0.1; // radians

    /// Black holes
    pub const BLACK_HOLE_HITPOINTS: i32 = 10;
    pub const BLACK_HOLE_PULL_RADIUS: f32 = 250.0;
    pub const BLACK_HOLE_BULLET_REPEL: f32 = 0.3;
    pub const BLACK_HOLE_SPRAY_PARTICLES: usize = 30;
    /// The spray toggles on and off every quarter second
    pub const BLACK_HOLE_SPRAY_DUTY_MS: u64 = 250;
    pub const BLACK_HOLE_SPRAY_PERIOD: f32 = 0.8; // seconds per revolution

    /// Companions
    pub const MAX_COMPANIONS: usize = 4;
    /// Anchor angle around the player per attachment slot, in radians
    pub const COMPANION_SLOT_ANGLES: [f32; MAX_COMPANIONS] =
        [25.0 * DEG, -25.0 * DEG, 50.0 * DEG, -50.0 * DEG];
    pub const COMPANION_OFFSET: f32 = 50.0;
    pub const COMPANION_MAX_SPEED: f32 = 800.0; // px per second
    pub const COMPANION_BULLET_FORWARD_OFFSET: f32 = 35.0;
    /// Extra collision tolerance so egg pickup is forgiving
    pub const EGG_PICKUP_EXTRA_RADIUS: f32 = 40.0;

    const DEG: f32 = std::f32::consts::PI / 180.0;

    /// Scoring
    pub const START_LIVES: u32 = 4;
    pub const MAX_MULTIPLIER: u32 = 20;
    pub const MULTIPLIER_EXPIRY_SECS: f32 = 0.8;
    pub const EXTRA_LIFE_SCORE: u32 = 2000;
    pub const COMPANION_EGG_SCORE: u32 = 500;
    /// Consolation score when every companion slot is already taken
    pub const FULL_SLOTS_BONUS: u32 = 5;

    /// Spawner
    pub const INITIAL_INVERSE_SPAWN_CHANCE: f32 = 60.0;
    pub const MIN_INVERSE_SPAWN_CHANCE: f32 = 20.0;
    pub const SPAWN_RAMP_PER_FRAME: f32 = 0.005;
    pub const INVERSE_BLACK_HOLE_SPAWN_CHANCE: u32 = 600;
    pub const MAX_BLACK_HOLES: usize = 2;

    /// Particles
    pub const PARTICLE_CAPACITY: usize = 1024 * 20;

    /// Grid physics. Integration uses elapsed seconds, so every coefficient
    /// calibrated per-frame at 60 Hz is pre-scaled by 60.
    pub const GRID_MAX_POINTS: usize = 1600;
    pub const GRID_ANCHOR_PERIOD: usize = 3;
    pub const GRID_BASE_DAMPING: f32 = 0.98;
    pub const GRID_STIFFNESS: f32 = 60.0 * 0.28;
    pub const GRID_SPRING_DAMPING: f32 = 60.0 * 0.06;
    pub const GRID_ANCHOR_STIFFNESS: f32 = 10.0 * 60.0 * 0.002;
    pub const GRID_ANCHOR_DAMPING: f32 = 60.0 * 0.02;
    pub const GRID_ANCHOR_LINE_THICKNESS: f32 = 3.0;
    pub const GRID_LINE_THICKNESS: f32 = 1.0;
}

/// Angle of a vector in radians (atan2 convention)
#[inline]
pub fn to_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Build a vector from an angle and a magnitude
#[inline]
pub fn from_polar(angle: f32, magnitude: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * magnitude
}

/// Copy of `v` scaled to the given magnitude; zero stays zero
#[inline]
pub fn scale_to(v: Vec2, magnitude: f32) -> Vec2 {
    v.normalize_or_zero() * magnitude
}

/// Move `from` toward `to` by at most `max_distance`
pub fn move_towards(from: Vec2, to: Vec2, max_distance: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_distance || dist < f32::EPSILON {
        to
    } else {
        from + delta / dist * max_distance
    }
}

/// Wrap an angle to [-π, π)
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Catmull-Rom interpolation through p1..p2 with outer control points p0, p3
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Uniform float in [min, max]
#[inline]
pub fn rand_float<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    rng.random_range(min..=max)
}

/// Random-direction vector with length in [min_len, max_len]
pub fn rand_vector<R: Rng>(rng: &mut R, min_len: f32, max_len: f32) -> Vec2 {
    let angle = rand_float(rng, 0.0, std::f32::consts::TAU);
    from_polar(angle, rand_float(rng, min_len, max_len))
}
