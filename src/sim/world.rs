//! Entity lifecycle and the per-frame pass order
//!
//! The world exclusively owns the canonical entity set. Additions made
//! while the update pass is iterating are queued into a side buffer and
//! committed only after the pass, so a spawned entity never sees the
//! collision checks of the frame it was created in. Per-kind index lists
//! are non-owning views rebuilt by a single classification step each
//! frame; they avoid repeated kind dispatch in the collision code.

use glam::Vec2;

use super::behavior;
use super::collision;
use super::entity::{Entity, EntityId, EntityKind, PlayerShip};
use super::game::InputSnapshot;
use super::FrameFx;

pub struct EntityWorld {
    pub player: PlayerShip,
    pub(crate) entities: Vec<Entity>,
    /// Side buffer for additions requested mid-iteration
    pending: Vec<Entity>,
    updating: bool,
    next_id: EntityId,

    // Per-kind views, valid for one frame
    pub(crate) enemies: Vec<usize>,
    pub(crate) bullets: Vec<usize>,
    pub(crate) black_holes: Vec<usize>,
    pub(crate) eggs: Vec<usize>,
    pub(crate) companions: Vec<usize>,
}

impl EntityWorld {
    pub fn new(screen_size: Vec2) -> Self {
        Self {
            player: PlayerShip::new(screen_size),
            entities: Vec::new(),
            pending: Vec::new(),
            updating: false,
            next_id: 1,
            enemies: Vec::new(),
            bullets: Vec::new(),
            black_holes: Vec::new(),
            eggs: Vec::new(),
            companions: Vec::new(),
        }
    }

    /// Insert an entity, assigning its id. Mid-update the entity is queued
    /// and becomes live only after the current pass commits.
    pub fn add(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.id = id;
        if self.updating {
            self.pending.push(entity);
        } else {
            self.entities.push(entity);
            self.rebuild_views();
        }
        id
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn find_by_id(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// One frame of the entity layer: collisions against start-of-frame
    /// positions, then behaviors, then commit of queued additions, then
    /// prune of expired entities.
    pub fn update(&mut self, input: &InputSnapshot, fx: &mut FrameFx) {
        self.rebuild_views();
        self.updating = true;

        collision::resolve(self, fx);

        behavior::step_player(self, input, fx);
        for i in 0..self.entities.len() {
            if !self.entities[i].expired {
                behavior::step_entity(self, i, fx);
            }
        }

        self.updating = false;
        self.entities.append(&mut self.pending);
        self.entities.retain(|e| !e.expired);
        self.rebuild_views();
    }

    fn rebuild_views(&mut self) {
        self.enemies.clear();
        self.bullets.clear();
        self.black_holes.clear();
        self.eggs.clear();
        self.companions.clear();
        for (i, e) in self.entities.iter().enumerate() {
            match e.kind {
                EntityKind::Enemy { .. } => self.enemies.push(i),
                EntityKind::Bullet { .. } => self.bullets.push(i),
                EntityKind::BlackHole { .. } => self.black_holes.push(i),
                EntityKind::CompanionEgg => self.eggs.push(i),
                EntityKind::CompanionShip { .. } => self.companions.push(i),
            }
        }
    }

    /// Indices of live entities within `radius` of `position`, all kinds.
    /// Naive scan; entity counts stay in the low hundreds.
    pub fn get_nearby(&self, position: Vec2, radius: f32) -> Vec<usize> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                !e.expired && e.position.distance_squared(position) < radius * radius
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn black_hole_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::BlackHole { .. }) && !e.expired)
            .count()
    }

    /// Positions of live black holes, for the particle attractor pass
    pub fn black_hole_positions(&self) -> Vec<Vec2> {
        self.entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::BlackHole { .. }) && !e.expired)
            .map(|e| e.position)
            .collect()
    }

    /// Force-expire every enemy, black hole and bullet, with explosion
    /// feedback but no scoring. Used on player death to give the player
    /// room to come back.
    pub fn clear_hostiles(&mut self, fx: &mut FrameFx) {
        for i in 0..self.entities.len() {
            if self.entities[i].expired {
                continue;
            }
            match self.entities[i].kind {
                EntityKind::Enemy { .. } => behavior::clear_enemy_with_explosion(self, i, fx),
                EntityKind::BlackHole { .. } => behavior::kill_black_hole(self, i, fx),
                EntityKind::Bullet { .. } => self.entities[i].expired = true,
                _ => {}
            }
        }
    }
}
