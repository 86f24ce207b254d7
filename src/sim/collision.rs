//! Collision detection and resolution
//!
//! All tests are squared-distance circle overlaps; the resolution order
//! below is deterministic and part of the gameplay contract. Everything
//! is evaluated against positions as of the start of the frame, before
//! any behavior has run.

use crate::consts::*;
use crate::sim::behavior;
use crate::sim::entity::{Entity, EntityKind, PlayerShip};
use crate::sim::world::EntityWorld;
use crate::sim::FrameFx;

/// Two entities collide iff neither is expired and their centers are
/// closer than the sum of their collision radii plus `extra_radius`.
/// A positive extra radius makes the pair easier to collide.
pub fn is_colliding(a: &Entity, b: &Entity, extra_radius: f32) -> bool {
    let radius_sum = a.radius + b.radius + extra_radius;
    !a.expired
        && !b.expired
        && a.position.distance_squared(b.position) < radius_sum * radius_sum
}

/// Same test against the player ship; a dead (respawning) ship is absent
/// from the arena and collides with nothing.
pub fn is_colliding_player(player: &PlayerShip, e: &Entity, extra_radius: f32) -> bool {
    let radius_sum = player.radius + e.radius + extra_radius;
    !player.is_dead()
        && !e.expired
        && player.position.distance_squared(e.position) < radius_sum * radius_sum
}

/// Run the full pairwise resolution pass, in order:
/// 1. enemy-enemy soft repulsion
/// 2. bullet vs player/egg/companion (friendly fire, post-bounce bullets only)
/// 3. bullet vs enemy (scored; a final simultaneous shot still counts)
/// 4. black hole vs enemy (hole survives)
/// 5. black hole vs bullet
/// 6. black hole vs player (skipped if the hole died earlier this pass)
/// 7. enemy vs player (active enemies only)
/// 8. egg pickup
pub(crate) fn resolve(world: &mut EntityWorld, fx: &mut FrameFx) {
    let enemies = world.enemies.clone();
    let bullets = world.bullets.clone();
    let black_holes = world.black_holes.clone();
    let eggs = world.eggs.clone();
    let companions = world.companions.clone();

    // 1. Soft repulsion between overlapping enemies, applied to both.
    // Triangle iteration avoids redundant and self checks.
    for a in 0..enemies.len() {
        for b in (a + 1)..enemies.len() {
            let (ia, ib) = (enemies[a], enemies[b]);
            if is_colliding(&world.entities[ia], &world.entities[ib], 0.0) {
                let delta = world.entities[ia].position - world.entities[ib].position;
                let push = 10.0 * delta / (delta.length_squared() + 1.0);
                world.entities[ia].velocity += push;
                world.entities[ib].velocity -= push;
            }
        }
    }

    // 2 + 3. Bullets. Only bounced bullets are hostile to the player side.
    for &bi in &bullets {
        let hostile = matches!(
            world.entities[bi].kind,
            EntityKind::Bullet {
                can_hit_player: true,
                ..
            }
        );

        if hostile {
            if is_colliding_player(&world.player, &world.entities[bi], 0.0) {
                world.entities[bi].expired = true;
                behavior::kill_player(world, fx);
            }
            for &ei in &eggs {
                if is_colliding(&world.entities[ei], &world.entities[bi], 0.0) {
                    world.entities[bi].expired = true;
                    behavior::kill_egg(world, ei, fx);
                }
            }
            for &ci in &companions {
                if is_colliding(&world.entities[ci], &world.entities[bi], 0.0) {
                    world.entities[bi].expired = true;
                    behavior::kill_companion(world, ci, fx);
                }
            }
        }

        // Any bullet destroys enemies, scored. Runs even for a bullet that
        // just expired against the player? No: is_colliding rechecks the
        // expiry flag, so a spent bullet stops here.
        for &ei in &enemies {
            if is_colliding(&world.entities[ei], &world.entities[bi], 0.0) {
                world.entities[bi].expired = true;
                behavior::enemy_was_shot(world, ei, fx);
            }
        }
    }

    // 4 - 6. Black holes.
    for &hi in &black_holes {
        for &ei in &enemies {
            if is_colliding(&world.entities[hi], &world.entities[ei], 0.0) {
                // The hole is not consumed by eating an enemy
                behavior::enemy_was_shot(world, ei, fx);
            }
        }

        for &bi in &bullets {
            if is_colliding(&world.entities[hi], &world.entities[bi], 0.0) {
                world.entities[bi].expired = true;
                behavior::black_hole_was_shot(world, hi, fx);
            }
        }

        // The expiry recheck matters here: if a bullet destroyed this hole
        // a moment ago, it must not also kill the player.
        if is_colliding_player(&world.player, &world.entities[hi], 0.0) {
            behavior::kill_player(world, fx);
            break;
        }
    }

    // 7. Only active enemies can kill; freshly spawned ones stay shootable,
    // to the player's advantage.
    for &ei in &enemies {
        if world.entities[ei].is_active()
            && is_colliding_player(&world.player, &world.entities[ei], 0.0)
        {
            behavior::kill_player(world, fx);
            break;
        }
    }

    // 8. Egg pickup, with an extra tolerance radius since the ship's
    // hurtbox is deliberately small.
    for &ei in &eggs {
        if is_colliding_player(&world.player, &world.entities[ei], EGG_PICKUP_EXTRA_RADIUS) {
            // Hatch silently, then try to attach a companion
            world.entities[ei].expired = true;
            behavior::try_attach_companion(world, fx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::TestCtx;
    use glam::Vec2;
    use proptest::prelude::*;

    #[test]
    fn test_is_colliding_false_when_expired() {
        let a = Entity::seeker(Vec2::new(0.0, 0.0));
        let mut b = Entity::seeker(Vec2::new(1.0, 0.0));
        assert!(is_colliding(&a, &b, 0.0));
        b.expired = true;
        assert!(!is_colliding(&a, &b, 0.0));
    }

    #[test]
    fn test_extra_radius_widens_the_test() {
        let a = Entity::companion_egg(Vec2::new(0.0, 0.0));
        let b = Entity::companion_egg(Vec2::new(30.0, 0.0));
        assert!(!is_colliding(&a, &b, 0.0));
        assert!(is_colliding(&a, &b, EGG_PICKUP_EXTRA_RADIUS));
    }

    #[test]
    fn test_overlapping_enemies_repel() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        world.player.position = Vec2::new(1000.0, 600.0); // out of the way
        world.add(Entity::seeker(Vec2::new(100.0, 100.0)));
        world.add(Entity::seeker(Vec2::new(110.0, 100.0)));

        let mut fx = ctx.fx();
        world.update(&Default::default(), &mut fx);

        // Both received a repulsion delta pointing away from the other
        assert!(world.entities[0].velocity.x < 0.0);
        assert!(world.entities[1].velocity.x > 0.0);
    }

    #[test]
    fn test_bullet_kills_enemy_and_itself() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        world.player.position = Vec2::new(1000.0, 600.0);
        world.add(Entity::seeker(Vec2::new(100.0, 100.0)));
        world.add(Entity::bullet(Vec2::new(100.0, 100.0), Vec2::ZERO));

        let mut fx = ctx.fx();
        world.update(&Default::default(), &mut fx);

        assert!(world.entities.is_empty());
        assert_eq!(ctx.status.score(), SEEKER_REWARD);
    }

    #[test]
    fn test_fresh_bullet_cannot_hit_player() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        world.add(Entity::bullet(world.player.position, Vec2::ZERO));

        let mut fx = ctx.fx();
        resolve(&mut world, &mut fx);
        assert!(!world.player.is_dead());
    }

    #[test]
    fn test_bounced_bullet_kills_player() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        let mut bullet = Entity::bullet(world.player.position, Vec2::ZERO);
        if let EntityKind::Bullet {
            ref mut can_hit_player,
            ..
        } = bullet.kind
        {
            *can_hit_player = true;
        }
        world.add(bullet);

        world.update(&Default::default(), &mut ctx.fx());
        assert!(world.player.is_dead());
        assert_eq!(ctx.status.lives(), START_LIVES - 1);
    }

    #[test]
    fn test_destroyed_hole_spares_player_same_pass() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        let mut hole = Entity::black_hole(world.player.position);
        // One hitpoint left; the colliding bullet in the same pass kills it
        if let EntityKind::BlackHole {
            ref mut hitpoints, ..
        } = hole.kind
        {
            *hitpoints = 1;
        }
        world.add(hole);
        world.add(Entity::bullet(world.player.position, Vec2::ZERO));

        world.update(&Default::default(), &mut ctx.fx());
        assert!(!world.player.is_dead());
    }

    #[test]
    fn test_live_hole_kills_player() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        world.add(Entity::black_hole(world.player.position));

        world.update(&Default::default(), &mut ctx.fx());
        assert!(world.player.is_dead());
    }

    #[test]
    fn test_inactive_enemy_cannot_kill_player() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        world.add(Entity::seeker(world.player.position));

        let mut fx = ctx.fx();
        resolve(&mut world, &mut fx);
        assert!(!world.player.is_dead());
    }

    #[test]
    fn test_active_enemy_kills_player() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        let mut enemy = Entity::seeker(world.player.position);
        if let EntityKind::Enemy {
            ref mut frames_until_active,
            ..
        } = enemy.kind
        {
            *frames_until_active = 0;
        }
        world.add(enemy);

        world.update(&Default::default(), &mut ctx.fx());
        assert!(world.player.is_dead());
    }

    #[test]
    fn test_egg_pickup_attaches_companion() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        // 30 px away: outside the plain radii, inside the pickup tolerance
        world.add(Entity::companion_egg(
            world.player.position + Vec2::new(30.0, 0.0),
        ));

        world.update(&Default::default(), &mut ctx.fx());
        assert!(world.player.companion_slots[0].is_some());
        assert_eq!(world.companions.len(), 1);
        assert!(world.eggs.is_empty());
    }

    #[test]
    fn test_egg_pickup_with_full_slots_scores_instead() {
        let mut ctx = TestCtx::new();
        let mut world = EntityWorld::new(ctx.screen_size);
        for slot in 0..MAX_COMPANIONS {
            let id = world.add(Entity::companion(world.player.position, slot));
            world.player.attach(slot, id);
        }
        world.add(Entity::companion_egg(world.player.position));

        world.update(&Default::default(), &mut ctx.fx());
        assert_eq!(world.companions.len(), MAX_COMPANIONS);
        assert_eq!(ctx.status.score(), FULL_SLOTS_BONUS);
    }

    proptest! {
        /// Symmetry: swapping the operands never changes the verdict
        #[test]
        fn prop_collision_symmetric(
            ax in -2000.0f32..2000.0, ay in -2000.0f32..2000.0,
            bx in -2000.0f32..2000.0, by in -2000.0f32..2000.0,
            extra in 0.0f32..100.0,
        ) {
            let a = Entity::seeker(Vec2::new(ax, ay));
            let b = Entity::wanderer(Vec2::new(bx, by), 0.0);
            prop_assert_eq!(is_colliding(&a, &b, extra), is_colliding(&b, &a, extra));
        }

        /// An expired operand always yields false, regardless of distance
        #[test]
        fn prop_expired_never_collides(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
        ) {
            let mut a = Entity::seeker(Vec2::new(ax, ay));
            let b = Entity::seeker(Vec2::new(ax, ay));
            a.expired = true;
            prop_assert!(!is_colliding(&a, &b, 0.0));
            prop_assert!(!is_colliding(&b, &a, 0.0));
        }
    }
}
