//! Persisted high score
//!
//! One small JSON document on disk. A missing or unparsable file is
//! recovered locally as zero; the player just sees a fresh high score.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
struct HighScoreFile {
    score: u32,
}

/// Load the saved high score, or 0 when absent or corrupt
pub fn load(path: &Path) -> u32 {
    match std::fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str::<HighScoreFile>(&json) {
            Ok(file) => {
                log::info!("loaded high score {}", file.score);
                file.score
            }
            Err(_) => {
                log::warn!("high score file {} is unparsable, using 0", path.display());
                0
            }
        },
        Err(_) => {
            log::info!("no high score file at {}, using 0", path.display());
            0
        }
    }
}

/// Save the high score, best effort
pub fn save(path: &Path, score: u32) {
    let json = match serde_json::to_string(&HighScoreFile { score }) {
        Ok(json) => json,
        Err(err) => {
            log::warn!("failed to encode high score: {err}");
            return;
        }
    };
    if let Err(err) = std::fs::write(path, json) {
        log::warn!("failed to save high score to {}: {err}", path.display());
    } else {
        log::info!("saved high score {score}");
    }
}
