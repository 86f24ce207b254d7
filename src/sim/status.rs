//! Lives, score, kill multiplier and the reward thresholds
//!
//! Scoring never reaches into the entity layer; kill handlers report a
//! reward and get back what the kill earned beyond points. All
//! accumulators are plain integers so a session is exactly reproducible.

use log::info;

use crate::consts::*;

/// What a scored kill produced besides points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillReward {
    /// A score threshold was crossed; the caller drops a companion egg
    /// at the kill site
    pub spawn_egg: bool,
}

pub struct PlayerStatus {
    lives: u32,
    score: u32,
    high_score: u32,
    /// Kill multiplier in 1..=MAX_MULTIPLIER
    multiplier: u32,
    /// Seconds until the multiplier streak lapses
    multiplier_timer: f32,
    next_life_score: u32,
    next_egg_score: u32,
    high_score_dirty: bool,
}

impl PlayerStatus {
    pub fn new(high_score: u32) -> Self {
        Self {
            lives: START_LIVES,
            score: 0,
            high_score,
            multiplier: 1,
            multiplier_timer: 0.0,
            next_life_score: EXTRA_LIFE_SCORE,
            next_egg_score: COMPANION_EGG_SCORE,
            high_score_dirty: false,
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    /// Score a kill worth `reward` base points. Each kill also extends
    /// the multiplier streak and bumps the multiplier one step.
    pub fn add_kill(&mut self, reward: u32) -> KillReward {
        if self.is_game_over() {
            // Leftover bullets and holes still clear enemies after the
            // last life, but the run's score is frozen
            return KillReward { spawn_egg: false };
        }

        self.score += reward * self.multiplier;
        self.multiplier_timer = MULTIPLIER_EXPIRY_SECS;
        if self.multiplier < MAX_MULTIPLIER {
            self.multiplier += 1;
        }

        while self.score >= self.next_life_score {
            self.next_life_score += EXTRA_LIFE_SCORE;
            self.lives += 1;
            info!("extra life at score {}", self.score);
        }

        let mut spawn_egg = false;
        while self.score >= self.next_egg_score {
            self.next_egg_score += COMPANION_EGG_SCORE;
            spawn_egg = true;
        }
        KillReward { spawn_egg }
    }

    /// Consolation points for an egg picked up with a full escort
    pub fn add_full_slots_bonus(&mut self) {
        if !self.is_game_over() {
            self.score += FULL_SLOTS_BONUS * self.multiplier;
        }
    }

    /// Losing a life breaks the multiplier streak. Reaching zero lives
    /// ends the run and publishes a new high score if one was set.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.multiplier = 1;
        self.multiplier_timer = 0.0;

        if self.is_game_over() {
            info!("game over at score {}", self.score);
            if self.score > self.high_score {
                self.high_score = self.score;
                self.high_score_dirty = true;
            }
        }
    }

    /// New-run state; the high score carries over
    pub fn reset(&mut self) {
        let high_score = self.high_score;
        let dirty = self.high_score_dirty;
        *self = Self::new(high_score);
        self.high_score_dirty = dirty;
    }

    /// Multiplier streak timeout
    pub fn update(&mut self, dt: f32) {
        if self.multiplier_timer > 0.0 {
            self.multiplier_timer -= dt;
            if self.multiplier_timer <= 0.0 {
                self.multiplier = 1;
            }
        }
    }

    /// True once per unsaved high score change
    pub fn take_high_score_dirty(&mut self) -> bool {
        std::mem::take(&mut self.high_score_dirty)
    }
}
