//! Difficulty-ramped enemy and black hole spawning

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::events::{SoundKind, SoundRequest};
use crate::rand_float;
use crate::sim::entity::Entity;
use crate::sim::world::EntityWorld;
use crate::sim::FrameFx;

/// Hard cap on simultaneous entities; past this, spawning pauses
const MAX_ENTITIES: usize = 200;
/// Minimum spawn distance from the player, squared
const SAFE_DISTANCE_SQ: f32 = 250.0 * 250.0;

/// Per-frame chance of spawning each enemy kind is
/// `1 / inverse_spawn_chance`, ramping toward the minimum as a session
/// goes on. Player death resets the ramp.
pub struct EnemySpawner {
    inverse_spawn_chance: f32,
}

impl EnemySpawner {
    pub fn new() -> Self {
        Self {
            inverse_spawn_chance: INITIAL_INVERSE_SPAWN_CHANCE,
        }
    }

    pub fn reset(&mut self) {
        self.inverse_spawn_chance = INITIAL_INVERSE_SPAWN_CHANCE;
    }

    pub fn update(&mut self, world: &mut EntityWorld, fx: &mut FrameFx) {
        // Nothing ramps or spawns while the player is dead; respawn
        // would otherwise land on a fresh enemy
        if world.player.is_dead() {
            return;
        }

        if world.len() < MAX_ENTITIES {
            let chance = self.inverse_spawn_chance as u32;

            if fx.rng.random_range(0..chance) == 0 {
                let pos = Self::spawn_position(world, fx);
                world.add(Entity::seeker(pos));
                fx.sounds
                    .push(SoundRequest::new(SoundKind::Spawn, 0.4, 0.0, 0.0));
            }
            if fx.rng.random_range(0..chance) == 0 {
                let pos = Self::spawn_position(world, fx);
                let heading = rand_float(fx.rng, 0.0, std::f32::consts::TAU);
                world.add(Entity::wanderer(pos, heading));
                fx.sounds
                    .push(SoundRequest::new(SoundKind::Spawn, 0.4, 0.0, 0.0));
            }
            if world.black_hole_count() < MAX_BLACK_HOLES
                && fx.rng.random_range(0..INVERSE_BLACK_HOLE_SPAWN_CHANCE) == 0
            {
                let pos = Self::spawn_position(world, fx);
                world.add(Entity::black_hole(pos));
            }
        }

        if self.inverse_spawn_chance > MIN_INVERSE_SPAWN_CHANCE {
            self.inverse_spawn_chance -= SPAWN_RAMP_PER_FRAME;
        }
    }

    /// Uniform screen position rejected until outside the player's
    /// safety bubble
    fn spawn_position(world: &EntityWorld, fx: &mut FrameFx) -> Vec2 {
        loop {
            let pos = Vec2::new(
                rand_float(fx.rng, 0.0, fx.screen_size.x),
                rand_float(fx.rng, 0.0, fx.screen_size.y),
            );
            if pos.distance_squared(world.player.position) >= SAFE_DISTANCE_SQ {
                return pos;
            }
        }
    }
}

impl Default for EnemySpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::TestCtx;

    #[test]
    fn test_spawns_accumulate_over_time() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        let mut spawner = EnemySpawner::new();

        // Ten simulated seconds at the initial 1/60 rate
        for _ in 0..600 {
            let mut fx = ctx.fx();
            spawner.update(&mut world, &mut fx);
        }
        assert!(!world.is_empty());
    }

    #[test]
    fn test_no_spawns_while_player_dead() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        world.player.frames_until_respawn = 90;
        let mut spawner = EnemySpawner::new();

        for _ in 0..600 {
            let mut fx = ctx.fx();
            spawner.update(&mut world, &mut fx);
        }
        assert!(world.is_empty());
    }

    #[test]
    fn test_ramp_is_floored_and_reset_restores_it() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        // Fill to the entity cap so the ramp advances without spawns
        for _ in 0..MAX_ENTITIES {
            world.add(Entity::seeker(Vec2::new(1000.0, 500.0)));
        }
        let mut spawner = EnemySpawner::new();

        let frames = ((INITIAL_INVERSE_SPAWN_CHANCE - MIN_INVERSE_SPAWN_CHANCE)
            / SPAWN_RAMP_PER_FRAME) as usize
            + 100;
        for _ in 0..frames {
            let mut fx = ctx.fx();
            spawner.update(&mut world, &mut fx);
        }
        assert!(spawner.inverse_spawn_chance >= MIN_INVERSE_SPAWN_CHANCE - SPAWN_RAMP_PER_FRAME);
        assert!(spawner.inverse_spawn_chance < MIN_INVERSE_SPAWN_CHANCE + 1.0);

        spawner.reset();
        assert_eq!(spawner.inverse_spawn_chance, INITIAL_INVERSE_SPAWN_CHANCE);
    }

    #[test]
    fn test_ramp_freezes_while_player_dead() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        world.player.frames_until_respawn = 1;
        let mut spawner = EnemySpawner::new();

        for _ in 0..600 {
            world.player.frames_until_respawn = 1;
            let mut fx = ctx.fx();
            spawner.update(&mut world, &mut fx);
        }
        assert_eq!(spawner.inverse_spawn_chance, INITIAL_INVERSE_SPAWN_CHANCE);
    }

    #[test]
    fn test_spawn_position_respects_safety_bubble() {
        let mut ctx = TestCtx::new();
        let world = EntityWorld::new(ctx.screen_size);
        for _ in 0..100 {
            let mut fx = ctx.fx();
            let pos = EnemySpawner::spawn_position(&world, &mut fx);
            assert!(pos.distance_squared(world.player.position) >= SAFE_DISTANCE_SQ);
        }
    }
}
