//! Shared fixtures for simulation tests

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::events::SoundRequest;
use crate::sim::grid::Grid;
use crate::sim::particle::ParticlePool;
use crate::sim::status::PlayerStatus;
use crate::sim::FrameFx;

/// Owns everything a `FrameFx` borrows, so a test can build one world and
/// drive it frame by frame while still inspecting particles, status and
/// sounds between frames.
pub(crate) struct TestCtx {
    pub particles: ParticlePool,
    pub grid: Grid,
    pub status: PlayerStatus,
    pub rng: Pcg32,
    pub sounds: Vec<SoundRequest>,
    pub screen_size: Vec2,
    pub god_mode: bool,
    pub time_secs: f64,
}

impl TestCtx {
    pub fn new() -> Self {
        let screen_size = Vec2::new(1280.0, 720.0);
        Self {
            particles: ParticlePool::new(),
            grid: Grid::new(screen_size),
            status: PlayerStatus::new(0),
            rng: Pcg32::seed_from_u64(7),
            sounds: Vec::new(),
            screen_size,
            god_mode: false,
            time_secs: 0.0,
        }
    }

    /// Fresh per-frame context at a fixed 60 Hz step
    pub fn fx(&mut self) -> FrameFx<'_> {
        FrameFx {
            particles: &mut self.particles,
            grid: &mut self.grid,
            status: &mut self.status,
            rng: &mut self.rng,
            sounds: &mut self.sounds,
            screen_size: self.screen_size,
            dt: 1.0 / 60.0,
            time_secs: self.time_secs,
            god_mode: self.god_mode,
            reset_spawner: false,
        }
    }
}

/// One-shot helper for tests that only need a context for a single call
pub(crate) fn test_fx(f: impl FnOnce(&mut FrameFx)) {
    let mut ctx = TestCtx::new();
    let mut fx = ctx.fx();
    f(&mut fx);
}
