//! Sound-trigger boundary
//!
//! Fire-and-forget requests the host mixer drains once per frame. No
//! return value, no delivery guarantee; dropping the whole queue is a
//! valid (silent) implementation.

/// Sound categories the simulation raises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    /// Player or companion fired a bullet
    Shot,
    /// Enemy, black hole, ship or bullet blew up
    Explosion,
    /// Enemy entered the arena
    Spawn,
}

/// One playback request with mixing hints
#[derive(Debug, Clone, Copy)]
pub struct SoundRequest {
    pub kind: SoundKind,
    /// 0.0 - 1.0
    pub volume: f32,
    /// -1.0 (left) - 1.0 (right)
    pub pan: f32,
    /// -1.0 - 1.0, semitone-ish shift hint
    pub pitch: f32,
}

impl SoundRequest {
    pub fn new(kind: SoundKind, volume: f32, pan: f32, pitch: f32) -> Self {
        Self {
            kind,
            volume,
            pan,
            pitch,
        }
    }
}
