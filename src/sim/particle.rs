//! Particle pool and the shared motion rule
//!
//! Particles are pure decoration: nothing in the simulation reads them
//! back. The pool is bounded; at capacity new requests are silently
//! dropped, which under load sheds the newest (least established)
//! effects first. The motion rule is a plain function pointer so a host
//! can swap in its own, but every stock effect uses [`particle_step`].

use glam::Vec2;

use crate::color::Color;
use crate::consts::PARTICLE_CAPACITY;
use crate::draw::{DrawList, Sprite};
use crate::to_angle;

/// Behavioral class, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    #[default]
    None,
    /// Faster velocity decay; used for enemy debris and exhaust
    Enemyish,
    /// Position-hashed decay jitter; used for bullet debris
    Bulletish,
    /// Skips black hole attraction entirely (the holes' own sprays)
    GravityImmune,
}

/// Mutable per-particle state the motion rule owns
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleState {
    pub velocity: Vec2,
    pub kind: ParticleKind,
    /// Extra stretch applied on top of the speed-based stretch
    pub length_multiplier: f32,
}

impl ParticleState {
    pub fn new(velocity: Vec2, kind: ParticleKind, length_multiplier: f32) -> Self {
        Self {
            velocity,
            kind,
            length_multiplier,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub sprite: Sprite,
    pub position: Vec2,
    pub orientation: f32,
    pub scale: Vec2,
    pub color: Color,
    pub duration: f32,
    /// Counts down from 1 to 0 over `duration` frames
    pub percent_life: f32,
    pub state: ParticleState,
}

/// Read-only world context for the motion rule
pub struct ParticleEnv<'a> {
    pub screen_size: Vec2,
    pub black_holes: &'a [Vec2],
}

pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Motion rule applied to every live particle each frame
    pub update_rule: fn(&mut Particle, &ParticleEnv),
}

impl ParticlePool {
    pub fn new() -> Self {
        Self {
            particles: Vec::with_capacity(PARTICLE_CAPACITY),
            update_rule: particle_step,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawn one particle; a no-op when the pool is at capacity
    pub fn create(
        &mut self,
        sprite: Sprite,
        position: Vec2,
        color: Color,
        duration: f32,
        scale: Vec2,
        state: ParticleState,
    ) {
        if self.particles.len() >= PARTICLE_CAPACITY {
            return;
        }
        self.particles.push(Particle {
            sprite,
            position,
            orientation: 0.0,
            scale,
            color,
            duration,
            percent_life: 1.0,
            state,
        });
    }

    /// Age every particle one frame and run the motion rule; expired
    /// particles are swap-removed (draw order between particles is not
    /// meaningful, they blend additively).
    pub fn update(&mut self, env: &ParticleEnv) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.percent_life -= 1.0 / p.duration;
            if p.percent_life <= 0.0 {
                self.particles.swap_remove(i);
                continue;
            }
            (self.update_rule)(p, env);
            i += 1;
        }
    }

    pub fn draw(&self, out: &mut DrawList) {
        for p in &self.particles {
            out.sprite_scaled(p.sprite, p.position, p.color, p.orientation, p.scale);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Stock motion rule: drift, fade against both remaining life and speed,
/// stretch with speed, bounce off screen edges, swirl into black holes,
/// and decay per the particle's kind.
pub fn particle_step(p: &mut Particle, env: &ParticleEnv) {
    let mut vel = p.state.velocity;
    p.position += vel;
    if vel != Vec2::ZERO {
        p.orientation = to_angle(vel);
    }

    let speed = vel.length();
    let alpha = 1.0f32.min((p.percent_life * 2.0).min(speed));
    let alpha = alpha * alpha;
    p.color.a = alpha;
    p.scale.x = p.state.length_multiplier * (0.2 * speed + 0.1).min(1.0).min(alpha);

    // Reflect at the screen edges
    let pos = p.position;
    if pos.x < 0.0 {
        vel.x = vel.x.abs();
    } else if pos.x > env.screen_size.x {
        vel.x = -vel.x.abs();
    }
    if pos.y < 0.0 {
        vel.y = vel.y.abs();
    } else if pos.y > env.screen_size.y {
        vel.y = -vel.y.abs();
    }

    if p.state.kind != ParticleKind::GravityImmune {
        for &hole in env.black_holes {
            let d_pos = hole - pos;
            let distance = d_pos.length();
            if distance < f32::EPSILON {
                continue;
            }
            let n = d_pos / distance;
            // Radial pull, bounded at close range
            vel += 10_000.0 * n / (distance * distance + 10_000.0);
            // Tangential swirl near the hole
            if distance < 400.0 {
                vel += 45.0 * Vec2::new(n.y, -n.x) / (distance + 100.0);
            }
        }
    }

    if vel.x.abs() + vel.y.abs() < 1e-10 {
        vel = Vec2::ZERO;
    } else {
        vel *= match p.state.kind {
            ParticleKind::Enemyish | ParticleKind::Bulletish | ParticleKind::GravityImmune => 0.94,
            // Ship debris slows down more slowly for a longer-lived burst
            ParticleKind::None => 0.96,
        };
    }
    p.state.velocity = vel;
}
