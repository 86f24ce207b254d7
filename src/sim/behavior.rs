//! Per-kind entity update rules and destruction effects
//!
//! Multi-frame behaviors (wander headings, spray cadence, respawn
//! countdowns) are explicit state on the entity, resumed by one step
//! call per frame. Nothing here blocks or suspends.

use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::color::Color;
use crate::consts::*;
use crate::draw::Sprite;
use crate::events::{SoundKind, SoundRequest};
use crate::sim::entity::{EnemyBehavior, Entity, EntityKind};
use crate::sim::game::InputSnapshot;
use crate::sim::particle::{ParticleKind, ParticleState};
use crate::sim::world::EntityWorld;
use crate::sim::FrameFx;
use crate::{from_polar, rand_float, rand_vector, scale_to, to_angle, wrap_angle};

/// Dispatch one live entity's per-frame behavior
pub(crate) fn step_entity(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    match world.entities[i].kind {
        EntityKind::Enemy { .. } => step_enemy(world, i, fx),
        EntityKind::Bullet { .. } => step_bullet(world, i, fx),
        EntityKind::BlackHole { .. } => step_black_hole(world, i, fx),
        EntityKind::CompanionShip { .. } => step_companion(world, i, fx),
        EntityKind::CompanionEgg => {} // passive pickup
    }
}

// --- Player ---

pub(crate) fn step_player(world: &mut EntityWorld, input: &InputSnapshot, fx: &mut FrameFx) {
    if world.player.is_dead() {
        world.player.frames_until_respawn -= 1;
        if world.player.frames_until_respawn == 0 {
            // Punch the grid away from the respawn point
            fx.grid.apply_directed_force(
                60.0 * 5000.0 * Vec3::NEG_Z,
                world.player.position.extend(0.0),
                50.0,
            );
            if fx.status.is_game_over() {
                // New run: fresh status, centered ship, empty arena
                fx.status.reset();
                world.player.position = fx.screen_size / 2.0;
                fx.particles.clear();
            }
        }
        return;
    }

    // Movement. The input vector is already clamped to unit length.
    world.player.velocity = PLAYER_SPEED * input.move_dir;
    world.player.position += world.player.velocity;
    let half = Sprite::Player.extents() / 2.0;
    world.player.position = world
        .player
        .position
        .clamp(half, fx.screen_size - half);
    if world.player.velocity != Vec2::ZERO {
        world.player.orientation = to_angle(world.player.velocity);
    }

    // Fire
    if world.player.cooldown_remaining > 0 {
        world.player.cooldown_remaining -= 1;
    }
    if input.aim_dir != Vec2::ZERO && world.player.cooldown_remaining == 0 {
        world.player.cooldown_remaining = FIRE_COOLDOWN_FRAMES;

        let aim_angle = to_angle(input.aim_dir);
        // Two uniform samples summed: denser around the center
        let spread = rand_float(fx.rng, -BULLET_MAX_SPREAD, BULLET_MAX_SPREAD)
            + rand_float(fx.rng, -BULLET_MAX_SPREAD, BULLET_MAX_SPREAD);
        let bullet_velocity = from_polar(aim_angle + spread, BULLET_SPEED);

        // Twin turrets offset orthogonally to the (non-deviated) aim
        let rot = Vec2::from_angle(aim_angle);
        let player_pos = world.player.position;
        for side in [-1.0, 1.0] {
            let offset = rot.rotate(Vec2::new(
                BULLET_FORWARD_OFFSET,
                side * BULLET_SIDE_OFFSET,
            ));
            world.add(Entity::bullet(player_pos + offset, bullet_velocity));
        }

        // Attached companions fire in sync, without the spread
        let companion_positions: Vec<Vec2> = world
            .player
            .companion_slots
            .iter()
            .flatten()
            .filter_map(|&id| world.find_by_id(id))
            .map(|i| world.entities[i].position)
            .collect();
        for pos in companion_positions {
            world.add(Entity::bullet(
                pos + from_polar(aim_angle, COMPANION_BULLET_FORWARD_OFFSET),
                from_polar(aim_angle, BULLET_SPEED),
            ));
        }

        fx.sounds.push(SoundRequest::new(
            SoundKind::Shot,
            0.2,
            rand_float(fx.rng, -0.2, 0.2),
            0.0,
        ));
    }

    make_exhaust_fire(world, fx);
}

/// Engine exhaust: one straight jet and two side jets whose offset
/// oscillates over time
fn make_exhaust_fire(world: &mut EntityWorld, fx: &mut FrameFx) {
    let player = &world.player;
    if player.velocity.length_squared() <= 0.1 {
        return;
    }

    let side_color = Color::rgb(200.0 / 255.0, 38.0 / 255.0, 9.0 / 255.0);
    let mid_color = Color::rgb(1.0, 187.0 / 255.0, 30.0 / 255.0);
    let alpha = 0.7;
    let lifetime = 60.0;
    let scale = Vec2::new(0.5, 1.0);

    let backward = -from_polar(player.orientation, 1.0);
    let base_vel = 3.0 * backward;
    let sway = 0.6 * Vec2::new(base_vel.y, -base_vel.x) * (fx.time_secs * 10.0).sin() as f32;
    let spawn_pos = player.position + 25.0 * backward;

    let mid_vel = base_vel + rand_vector(fx.rng, 0.0, 1.0);
    let left_vel = base_vel + sway;
    let right_vel = base_vel - sway;

    for (vel, glow_color) in [
        (mid_vel, mid_color),
        (left_vel, side_color),
        (right_vel, side_color),
    ] {
        // Enemy-ish so the exhaust decays fast but still swirls into holes
        let state = ParticleState::new(vel, ParticleKind::Enemyish, 1.0);
        fx.particles.create(
            Sprite::LineParticle,
            spawn_pos,
            Color::WHITE.faded(alpha),
            lifetime,
            scale,
            state,
        );
        fx.particles.create(
            Sprite::Glow,
            spawn_pos,
            glow_color.faded(alpha),
            lifetime,
            scale,
            state,
        );
    }
}

/// Kill the player: explosion feedback, life loss, companion destruction,
/// screen clearance, grid shockwave. God mode makes the ship immune, but
/// not its companions.
pub(crate) fn kill_player(world: &mut EntityWorld, fx: &mut FrameFx) {
    if fx.god_mode || world.player.is_dead() {
        return;
    }

    let pos = world.player.position;
    ship_explosion(fx, pos);
    fx.sounds.push(SoundRequest::new(
        SoundKind::Explosion,
        0.5,
        rand_float(fx.rng, -0.2, 0.2),
        0.0,
    ));

    fx.reset_spawner = true;
    fx.status.lose_life();
    world.player.frames_until_respawn = if fx.status.is_game_over() {
        GAME_OVER_RESPAWN_FRAMES
    } else {
        RESPAWN_FRAMES
    };

    // The ship takes its escorts with it
    for slot in 0..MAX_COMPANIONS {
        if let Some(id) = world.player.companion_slots[slot] {
            if let Some(ci) = world.find_by_id(id) {
                kill_companion(world, ci, fx);
            } else {
                world.player.detach(slot);
            }
        }
    }

    world.clear_hostiles(fx);

    // Slight z offset gives the shockwave a 3D look
    fx.grid
        .apply_explosive_force(60.0 * 5000.0, pos.extend(-1.0), 150.0, 1.0);
}

// --- Enemies ---

fn step_enemy(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let player_pos = world.player.position;
    let screen = fx.screen_size;
    let e = &mut world.entities[i];

    let EntityKind::Enemy {
        ref mut behavior,
        ref mut frames_until_active,
        ..
    } = e.kind
    else {
        return;
    };

    if *frames_until_active > 0 {
        *frames_until_active -= 1;
        // Fade in from transparent white over the grace window
        let t = *frames_until_active as f32 / ENEMY_GRACE_FRAMES as f32;
        e.color = Color::lerp(Color::WHITE, Color::TRANSPARENT_WHITE, t);
    } else {
        match behavior {
            EnemyBehavior::Seek => {
                e.velocity += scale_to(player_pos - e.position, SEEKER_ACCEL);
                if e.velocity != Vec2::ZERO {
                    e.orientation = to_angle(e.velocity);
                }
            }
            EnemyBehavior::Wander {
                heading,
                frames_until_turn,
            } => {
                if *frames_until_turn == 0 {
                    *heading = wrap_angle(
                        *heading + rand_float(fx.rng, -WANDER_MAX_TURN, WANDER_MAX_TURN),
                    );
                    *frames_until_turn = WANDER_TURN_PERIOD;
                }
                *frames_until_turn -= 1;

                e.velocity = from_polar(*heading, WANDERER_SPEED);
                e.orientation -= 0.05; // cosmetic spin

                // Steer back toward the center when touching a screen edge
                let half = e.sprite.extents() / 2.0;
                let pos = e.position;
                if pos.x < half.x
                    || pos.x > screen.x - half.x
                    || pos.y < half.y
                    || pos.y > screen.y - half.y
                {
                    *heading = to_angle(screen / 2.0 - pos)
                        + rand_float(fx.rng, -FRAC_PI_2, FRAC_PI_2);
                }
            }
        }
    }

    // Movement, screen clamp, friction. Under constant acceleration the
    // friction yields a terminal velocity of accel * f / (1 - f).
    e.position += e.velocity;
    let half = e.sprite.extents() / 2.0;
    e.position = e.position.clamp(half, screen - half);
    e.velocity *= ENEMY_FRICTION;
}

/// Scored destruction (player bullet or black hole)
pub(crate) fn enemy_was_shot(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let e = &mut world.entities[i];
    let (pos, reward) = match e.kind {
        EntityKind::Enemy { reward, .. } => (e.position, reward),
        _ => return,
    };
    e.expired = true;

    let kill = fx.status.add_kill(reward);
    if kill.spawn_egg {
        world.add(Entity::companion_egg(pos));
    }

    enemy_explosion(fx, pos);
    fx.sounds.push(SoundRequest::new(
        SoundKind::Explosion,
        0.5,
        rand_float(fx.rng, -0.2, 0.2),
        0.0,
    ));
}

/// Silent-score clearance on player death; explosion feedback only
pub(crate) fn clear_enemy_with_explosion(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let e = &mut world.entities[i];
    e.expired = true;
    let pos = e.position;
    enemy_explosion(fx, pos);
    fx.sounds.push(SoundRequest::new(
        SoundKind::Explosion,
        0.5,
        rand_float(fx.rng, -0.2, 0.2),
        0.0,
    ));
}

// --- Bullets ---

fn step_bullet(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let screen = fx.screen_size;
    let e = &mut world.entities[i];
    e.position += e.velocity;

    let half = e.sprite.extents() / 2.0;
    // Dead zone: the bullet has fully left the screen on an axis it is
    // still moving away on
    let hit_vertical_wall = (e.position.x < -half.x && e.velocity.x < 0.0)
        || (e.position.x > screen.x + half.x && e.velocity.x > 0.0);
    let hit_horizontal_wall = (e.position.y < -half.y && e.velocity.y < 0.0)
        || (e.position.y > screen.y + half.y && e.velocity.y > 0.0);

    if hit_vertical_wall || hit_horizontal_wall {
        let EntityKind::Bullet {
            ref mut bounces_left,
            ref mut can_hit_player,
        } = e.kind
        else {
            return;
        };

        if *bounces_left == 0 {
            e.expired = true;
            let pos = e.position;
            bullet_explosion(fx, pos);
            return;
        }

        *bounces_left -= 1;
        // From here on this is friendly fire; re-tint so the player can tell
        *can_hit_player = true;
        e.color = Color::rgb(1.0, 0.35, 0.35);
        if hit_vertical_wall {
            e.velocity.x = -e.velocity.x;
        }
        if hit_horizontal_wall {
            e.velocity.y = -e.velocity.y;
        }
        e.orientation = to_angle(e.velocity);
    }

    // Bullets continuously shove the grid outward
    let (pos, speed) = (e.position, e.velocity.length());
    fx.grid
        .apply_explosive_force(150.0 * speed, pos.extend(0.0), 80.0, 0.6);
}

// --- Black holes ---

fn step_black_hole(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let hole_pos = world.entities[i].position;

    // Attract everything nearby; repel bullets; ignore enemies still in
    // their grace window
    for j in 0..world.entities.len() {
        if j == i {
            continue;
        }
        let e = &mut world.entities[j];
        if e.expired || (e.is_enemy() && !e.is_active()) {
            continue;
        }
        let delta = hole_pos - e.position;
        let dist = delta.length();
        if dist >= BLACK_HOLE_PULL_RADIUS {
            continue;
        }
        if e.is_bullet() {
            e.velocity += scale_to(-delta, BLACK_HOLE_BULLET_REPEL);
        } else {
            let pull = 2.0 * (1.0 - dist / BLACK_HOLE_PULL_RADIUS);
            e.velocity += scale_to(delta, pull);
        }
    }

    // The ship is pulled too
    if !world.player.is_dead() {
        let delta = hole_pos - world.player.position;
        let dist = delta.length();
        if dist < BLACK_HOLE_PULL_RADIUS {
            let pull = 2.0 * (1.0 - dist / BLACK_HOLE_PULL_RADIUS);
            world.player.position += scale_to(delta, pull);
        }
    }

    // Tangential spray, toggling on and off every quarter second
    let duty_on = ((fx.time_secs * 1000.0) as u64 / BLACK_HOLE_SPRAY_DUTY_MS) % 2 == 0;
    let mut spray_angle = match world.entities[i].kind {
        EntityKind::BlackHole { spray_angle, .. } => spray_angle,
        _ => return,
    };
    if duty_on {
        spray_angle -= TAU * fx.dt / BLACK_HOLE_SPRAY_PERIOD;
        if let EntityKind::BlackHole {
            spray_angle: ref mut a,
            ..
        } = world.entities[i].kind
        {
            *a = spray_angle;
        }

        let normal = from_polar(spray_angle, 1.0);
        let spawn_pos = hole_pos + 2.0 * normal + rand_vector(fx.rng, 4.0, 8.0);
        let vel = rand_float(fx.rng, 12.0, 15.0) * Vec2::new(normal.y, -normal.x);
        fx.particles.create(
            Sprite::LineParticle,
            spawn_pos,
            Color::hsv(5.0, 0.5, 0.8), // light purple
            190.0,
            Vec2::splat(1.5),
            ParticleState::new(vel, ParticleKind::Enemyish, 1.0),
        );
    }

    // The sheet is sucked in continuously, pulsing with the spray angle
    fx.grid.apply_implosive_force(
        60.0 * ((spray_angle / 2.0).sin() * 10.0 + 20.0),
        hole_pos.extend(0.0),
        200.0,
    );
}

/// One hit from a player bullet: radial particle burst, hitpoint loss,
/// expiry at zero
pub(crate) fn black_hole_was_shot(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let pos = world.entities[i].position;
    let EntityKind::BlackHole {
        ref mut hitpoints, ..
    } = world.entities[i].kind
    else {
        return;
    };
    *hitpoints -= 1;
    let dead = *hitpoints <= 0;
    if dead {
        world.entities[i].expired = true;
    }

    let hue = ((3.0 * fx.time_secs) % 6.0) as f32;
    let color = Color::hsv(hue, 0.25, 1.0);
    // Random start offset so consecutive bursts do not reuse the same rays
    let start_offset = rand_float(fx.rng, 0.0, TAU / BLACK_HOLE_SPRAY_PARTICLES as f32);
    for k in 0..BLACK_HOLE_SPRAY_PARTICLES {
        let angle = TAU * k as f32 / BLACK_HOLE_SPRAY_PARTICLES as f32 + start_offset;
        let vel = from_polar(angle, rand_float(fx.rng, 8.0, 16.0));
        fx.particles.create(
            Sprite::LineParticle,
            pos,
            color,
            190.0,
            Vec2::splat(1.5),
            ParticleState::new(vel, ParticleKind::GravityImmune, 1.0),
        );
    }
}

/// Force-destroy a black hole regardless of remaining hitpoints
pub(crate) fn kill_black_hole(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    if let EntityKind::BlackHole {
        ref mut hitpoints, ..
    } = world.entities[i].kind
    {
        *hitpoints = 1;
    }
    black_hole_was_shot(world, i, fx);
}

// --- Companions ---

fn step_companion(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let player_pos = world.player.position;
    let player_dead = world.player.is_dead();
    let e = &mut world.entities[i];

    let EntityKind::CompanionShip { slot: Some(slot) } = e.kind else {
        return; // detached companions drift inert
    };
    if player_dead {
        return;
    }

    let angle = COMPANION_SLOT_ANGLES[slot];
    let target = player_pos + from_polar(angle, COMPANION_OFFSET);
    e.position = crate::move_towards(e.position, target, COMPANION_MAX_SPEED * fx.dt);
    e.orientation = angle;
}

pub(crate) fn kill_companion(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let e = &mut world.entities[i];
    if e.expired {
        return;
    }
    e.expired = true;
    let pos = e.position;
    if let EntityKind::CompanionShip { slot: Some(slot) } = e.kind {
        world.player.detach(slot);
    }

    ship_explosion(fx, pos);
    fx.grid
        .apply_explosive_force(60.0 * 500.0, pos.extend(-80.0), 150.0, 1.0);
}

/// Friendly-fire destruction of an egg (pickup path expires it silently)
pub(crate) fn kill_egg(world: &mut EntityWorld, i: usize, fx: &mut FrameFx) {
    let e = &mut world.entities[i];
    if e.expired {
        return;
    }
    e.expired = true;
    let pos = e.position;
    ship_explosion(fx, pos);
}

/// Egg pickup: attach a companion in the first free slot, or fall back
/// to a consolation score when the escort is full
pub(crate) fn try_attach_companion(world: &mut EntityWorld, fx: &mut FrameFx) {
    match world.player.free_slot() {
        Some(slot) => {
            let id = world.add(Entity::companion(world.player.position, slot));
            world.player.attach(slot, id);
        }
        None => fx.status.add_full_slots_bonus(),
    }
}

// --- Shared explosion effects ---

/// Big yellow-white burst used for the ship, companions and eggs
fn ship_explosion(fx: &mut FrameFx, pos: Vec2) {
    let yellow = Color::rgb(0.8, 0.8, 0.4);
    for _ in 0..SHIP_EXPLOSION_PARTICLES {
        let speed = 18.0 * (1.0 - 1.0 / rand_float(fx.rng, 1.0, 10.0));
        let color = Color::lerp(Color::WHITE, yellow, rand_float(fx.rng, 0.0, 1.0));
        let state = ParticleState::new(
            rand_vector(fx.rng, speed, speed),
            ParticleKind::None,
            1.0,
        );
        fx.particles
            .create(Sprite::LineParticle, pos, color, 190.0, Vec2::splat(1.5), state);
    }
}

/// Two-hue burst for enemy deaths
fn enemy_explosion(fx: &mut FrameFx, pos: Vec2) {
    let hue1 = rand_float(fx.rng, 0.0, 6.0);
    let hue2 = (hue1 + rand_float(fx.rng, 0.0, 2.0)) % 6.0;
    let color1 = Color::hsv(hue1, 0.5, 1.0);
    let color2 = Color::hsv(hue2, 0.5, 1.0);

    for _ in 0..ENEMY_EXPLOSION_PARTICLES {
        let speed = 18.0 * (1.0 - 1.0 / rand_float(fx.rng, 1.0, 10.0));
        let color = Color::lerp(color1, color2, rand_float(fx.rng, 0.0, 1.0));
        let state = ParticleState::new(
            rand_vector(fx.rng, speed, speed),
            ParticleKind::Enemyish,
            1.0,
        );
        fx.particles
            .create(Sprite::LineParticle, pos, color, 190.0, Vec2::splat(1.5), state);
    }
}

/// Small burst when a bullet exhausts its bounce budget
fn bullet_explosion(fx: &mut FrameFx, pos: Vec2) {
    for _ in 0..BULLET_EXPLOSION_PARTICLES {
        let state = ParticleState::new(
            rand_vector(fx.rng, 0.0, 9.0),
            ParticleKind::Bulletish,
            1.0,
        );
        fx.particles
            .create(Sprite::LineParticle, pos, Color::LIGHT_BLUE, 50.0, Vec2::ONE, state);
    }
}
