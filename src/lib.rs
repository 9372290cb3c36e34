//! Motion Arcade - camera-controlled party mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gestures, scoring, spawning, collisions, game state)
//! - `snapshot`: Per-frame draw state handed to an external renderer
//! - `source`: Landmark sources (replayed recordings, synthetic motion)
//! - `settings`: Player-facing settings and JSON loading
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod source;
pub mod tuning;

pub use error::{Error, Result};
pub use settings::{QualityPreset, Settings};
pub use snapshot::FrameSnapshot;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the reference camera rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default arena dimensions (camera frame, pixels)
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 720.0;

    /// Players per session
    pub const MAX_PLAYERS: usize = 2;

    /// Calibration (camera warm-up) before play starts
    pub const CALIBRATION_SECS: f32 = 4.0;

    /// Round length shared by all four games (3 minutes)
    pub const ROUND_SECS: f32 = 180.0;

    /// Slack for comparing accumulated f32 timestamps against durations
    pub const TIME_EPSILON: f32 = 1e-4;
}

/// Squared distance helper for radius checks
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}

/// Whether `secs` have passed between `since` and `now`, tolerating f32
/// rounding in the timestamps (7.2 - 6.0 is 1.1999998)
#[inline]
pub fn has_elapsed(now: f32, since: f32, secs: f32) -> bool {
    now - since + consts::TIME_EPSILON >= secs
}

/// Midpoint of two landmarks (e.g. hip center from left/right hip)
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_elapsed_tolerates_rounding() {
        assert!(7.2f32 - 6.0f32 < 1.2);
        assert!(has_elapsed(7.2, 6.0, 1.2));
        assert!(!has_elapsed(7.19, 6.0, 1.2));
        assert!(has_elapsed(0.0, 0.0, 0.0));
    }
}
