//! Top-level game state and the fixed per-frame phase order

use std::path::PathBuf;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::draw::DrawList;
use crate::events::SoundRequest;
use crate::highscore;
use crate::sim::grid::Grid;
use crate::sim::particle::{ParticleEnv, ParticlePool};
use crate::sim::spawner::EnemySpawner;
use crate::sim::status::PlayerStatus;
use crate::sim::world::EntityWorld;
use crate::sim::FrameFx;
use crate::Sprite;

/// One frame of player intent, sampled by the host. Both sticks are
/// direction vectors; zero aim means hold fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub move_dir: Vec2,
    pub aim_dir: Vec2,
}

impl InputSnapshot {
    /// Clamps the movement stick to unit length; aim only needs a direction
    pub fn new(move_dir: Vec2, aim_dir: Vec2) -> Self {
        Self {
            move_dir: move_dir.clamp_length_max(1.0),
            aim_dir,
        }
    }
}

/// The whole simulation. The host calls [`Game::update`] once per fixed
/// 60 Hz tick and [`Game::draw`] whenever it wants a frame; everything
/// else is plumbing around those two.
pub struct Game {
    pub world: EntityWorld,
    pub grid: Grid,
    pub particles: ParticlePool,
    pub status: PlayerStatus,
    pub spawner: EnemySpawner,
    /// Sounds requested this frame; the host drains them after update
    pub sounds: Vec<SoundRequest>,
    pub god_mode: bool,
    rng: Pcg32,
    screen_size: Vec2,
    time_secs: f64,
    highscore_path: Option<PathBuf>,
}

impl Game {
    pub fn new(seed: u64, screen_size: Vec2) -> Self {
        Self {
            world: EntityWorld::new(screen_size),
            grid: Grid::new(screen_size),
            particles: ParticlePool::new(),
            status: PlayerStatus::new(0),
            spawner: EnemySpawner::new(),
            sounds: Vec::new(),
            god_mode: false,
            rng: Pcg32::seed_from_u64(seed),
            screen_size,
            time_secs: 0.0,
            highscore_path: None,
        }
    }

    /// Like [`Game::new`], but backed by a high score file that is read
    /// now and rewritten whenever a run beats it
    pub fn with_highscore_file(seed: u64, screen_size: Vec2, path: PathBuf) -> Self {
        let mut game = Self::new(seed, screen_size);
        game.status = PlayerStatus::new(highscore::load(&path));
        game.highscore_path = Some(path);
        game
    }

    /// Advance the simulation one tick. Phase order is fixed: entity
    /// pass (collisions, behaviors, commit, prune), spawner, status,
    /// particles, grid.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32, screen_size: Vec2) {
        self.screen_size = screen_size;
        self.time_secs += dt as f64;
        self.sounds.clear();

        let mut fx = FrameFx {
            particles: &mut self.particles,
            grid: &mut self.grid,
            status: &mut self.status,
            rng: &mut self.rng,
            sounds: &mut self.sounds,
            screen_size,
            dt,
            time_secs: self.time_secs,
            god_mode: self.god_mode,
            reset_spawner: false,
        };

        self.world.update(input, &mut fx);
        if fx.reset_spawner {
            self.spawner.reset();
        }
        self.spawner.update(&mut self.world, &mut fx);

        self.status.update(dt);
        let black_holes = self.world.black_hole_positions();
        self.particles.update(&ParticleEnv {
            screen_size,
            black_holes: &black_holes,
        });
        self.grid.update(dt);

        if self.status.take_high_score_dirty() {
            if let Some(path) = &self.highscore_path {
                highscore::save(path, self.status.high_score());
            }
        }
    }

    /// Emit this frame's draw calls: entities, then grid, then particles
    pub fn draw(&self, out: &mut DrawList) {
        for e in self.world.entities() {
            // Black holes pulse slowly to read as alive
            let scale = if e.is_black_hole() {
                Vec2::splat(1.0 + 0.1 * (self.time_secs * 10.0).sin() as f32)
            } else {
                Vec2::ONE
            };
            out.sprite_scaled(e.sprite, e.position, e.color, e.orientation, scale);
        }

        if !self.world.player.is_dead() {
            out.sprite(
                Sprite::Player,
                self.world.player.position,
                crate::color::Color::WHITE,
                self.world.player.orientation,
            );
        }

        self.grid.draw(out);
        self.particles.draw(out);
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }

    pub fn time_secs(&self) -> f64 {
        self.time_secs
    }

    /// Hand this frame's sound requests to the host mixer
    pub fn take_sounds(&mut self) -> Vec<SoundRequest> {
        std::mem::take(&mut self.sounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entity::Entity;

    const DT: f32 = 1.0 / 60.0;
    const SCREEN: Vec2 = Vec2::new(1280.0, 720.0);

    fn run_frames(game: &mut Game, input: &InputSnapshot, frames: usize) {
        let _ = env_logger::builder().is_test(true).try_init();
        for _ in 0..frames {
            game.update(input, DT, SCREEN);
        }
    }

    #[test]
    fn test_input_snapshot_clamps_movement() {
        let input = InputSnapshot::new(Vec2::new(3.0, 4.0), Vec2::new(10.0, 0.0));
        assert!((input.move_dir.length() - 1.0).abs() < 1e-5);
        assert_eq!(input.aim_dir, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_idle_session_smoke() {
        let mut game = Game::new(1, SCREEN);
        run_frames(&mut game, &InputSnapshot::default(), 300);
        assert!((game.time_secs() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_session() {
        let input = InputSnapshot::new(Vec2::new(0.4, 0.2), Vec2::X);
        let mut a = Game::new(42, SCREEN);
        let mut b = Game::new(42, SCREEN);
        run_frames(&mut a, &input, 240);
        run_frames(&mut b, &input, 240);

        assert_eq!(a.status.score(), b.status.score());
        assert_eq!(a.world.len(), b.world.len());
        for (ea, eb) in a.world.entities().iter().zip(b.world.entities()) {
            assert_eq!(ea.position, eb.position);
            assert_eq!(ea.velocity, eb.velocity);
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Game::new(1, SCREEN);
        let mut b = Game::new(2, SCREEN);
        // Immortal player so neither world gets cleared mid-comparison
        a.god_mode = true;
        b.god_mode = true;
        run_frames(&mut a, &InputSnapshot::default(), 600);
        run_frames(&mut b, &InputSnapshot::default(), 600);

        let same = a.world.len() == b.world.len()
            && a.world
                .entities()
                .iter()
                .zip(b.world.entities())
                .all(|(ea, eb)| ea.position == eb.position);
        assert!(!same);
    }

    #[test]
    fn test_player_respawns_after_countdown() {
        let mut game = Game::new(3, SCREEN);
        game.world
            .add(Entity::black_hole(game.world.player.position));

        game.update(&InputSnapshot::default(), DT, SCREEN);
        assert!(game.world.player.is_dead());
        assert_eq!(game.status.lives(), START_LIVES - 1);
        // The lethal hole went down with the ship
        assert_eq!(game.world.black_hole_count(), 0);

        run_frames(&mut game, &InputSnapshot::default(), RESPAWN_FRAMES as usize);
        assert!(!game.world.player.is_dead());
    }

    #[test]
    fn test_game_over_resets_run_but_keeps_high_score() {
        let mut game = Game::new(3, SCREEN);
        game.status.add_kill(100);
        while game.status.lives() > 1 {
            game.status.lose_life();
        }
        game.world
            .add(Entity::black_hole(game.world.player.position));

        game.update(&InputSnapshot::default(), DT, SCREEN);
        assert!(game.status.is_game_over());

        run_frames(
            &mut game,
            &InputSnapshot::default(),
            GAME_OVER_RESPAWN_FRAMES as usize,
        );
        assert!(!game.status.is_game_over());
        assert_eq!(game.status.score(), 0);
        assert_eq!(game.status.lives(), START_LIVES);
        assert_eq!(game.status.high_score(), 100);
    }

    #[test]
    fn test_high_score_written_through_file() {
        let path = std::env::temp_dir().join(format!(
            "neon-arena-hs-{}-{}.txt",
            std::process::id(),
            line!()
        ));
        let _ = std::fs::remove_file(&path);

        let mut game = Game::with_highscore_file(3, SCREEN, path.clone());
        game.status.add_kill(123);
        while game.status.lives() > 0 {
            game.status.lose_life();
        }
        game.update(&InputSnapshot::default(), DT, SCREEN);

        assert_eq!(crate::highscore::load(&path), 123);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_dead_player_not_drawn() {
        let mut game = Game::new(3, SCREEN);
        game.world
            .add(Entity::black_hole(game.world.player.position));
        game.update(&InputSnapshot::default(), DT, SCREEN);
        assert!(game.world.player.is_dead());

        let mut out = DrawList::new();
        game.draw(&mut out);
        assert!(out
            .sprites
            .iter()
            .all(|s| s.sprite != Sprite::Player));
    }

    #[test]
    fn test_firing_emits_sound_and_bullets() {
        let mut game = Game::new(3, SCREEN);
        let input = InputSnapshot::new(Vec2::ZERO, Vec2::X);
        game.update(&input, DT, SCREEN);

        assert_eq!(game.world.bullets.len(), 2);
        assert!(!game.take_sounds().is_empty());
        assert!(game.sounds.is_empty());
    }

    #[test]
    fn test_black_holes_pulse_in_draw() {
        let mut game = Game::new(3, SCREEN);
        game.world.add(Entity::black_hole(Vec2::new(100.0, 100.0)));
        // Advance so sin(10t) is clearly nonzero; the hole must survive,
        // keep the player far away
        game.world.player.position = Vec2::new(1200.0, 700.0);
        for _ in 0..10 {
            game.update(&InputSnapshot::default(), DT, SCREEN);
            game.world.player.position = Vec2::new(1200.0, 700.0);
        }

        let mut out = DrawList::new();
        game.draw(&mut out);
        let hole = out
            .sprites
            .iter()
            .find(|s| s.sprite == Sprite::BlackHole)
            .unwrap();
        assert!((hole.scale.x - 1.0).abs() > 1e-3);
    }
}
