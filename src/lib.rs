//! Sushi Cat - a cat catches falling sushi on its plate
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rounds, catching, judging)
//! - `scene`: Scene sequencing (challenge selection, gameplay)
//! - `proxy`: Sprite proxy seam between the simulation and a renderer
//! - `tuning`: Data-driven game balance

pub mod proxy;
pub mod scene;
pub mod sim;
pub mod tuning;

pub use scene::{Director, Scene, SceneId, SceneRequest};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Simulation ticks per second
    pub const TICKS_PER_SEC: u64 = 120;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical screen size (the browser canvas is scaled to fit)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Cat and plate rest on the counter; the plate sits just below the cat
    pub const CAT_Y: f32 = 500.0;
    pub const PLATE_Y: f32 = 520.0;
    /// Sushi rests this far above the plate centre
    pub const PLATE_SURFACE_OFFSET: f32 = 10.0;
    pub const PLATE_START_X: f32 = 400.0;
    pub const PLATE_MIN_X: f32 = 100.0;
    pub const PLATE_MAX_X: f32 = 700.0;

    /// Sushi spawns above the visible area
    pub const SPAWN_Y: f32 = -40.0;
    pub const SPAWN_MIN_X: f32 = 150.0;
    pub const SPAWN_MAX_X: f32 = 650.0;
    /// Items below this line have left the screen
    pub const MISS_Y: f32 = SCREEN_HEIGHT + 40.0;

    /// Challenge size bounds (selectable on the selection screen)
    pub const MIN_CHALLENGE: usize = 2;
    pub const MAX_CHALLENGE: usize = 5;
    pub const DEFAULT_CHALLENGE: usize = 2;
}

/// Convert milliseconds to whole simulation ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u64 {
    (ms as u64 * consts::TICKS_PER_SEC).div_ceil(1000)
}

/// Convert ticks to seconds for display
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 / consts::TICKS_PER_SEC as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(0), 0);
        assert_eq!(ms_to_ticks(1000), 120);
        assert_eq!(ms_to_ticks(500), 60);
        // Partial ticks round up so short delays never fire early
        assert_eq!(ms_to_ticks(1), 1);
    }

    #[test]
    fn test_ticks_to_secs() {
        assert!((ticks_to_secs(240) - 2.0).abs() < f32::EPSILON);
    }
}
