//! Photon - beam propagation core for a tile-grid light puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, blocks, beam propagation, recompute scheduling)
//! - `persistence`: In-memory level layout shape and JSON helpers
//! - `settings`: Tunable propagation parameters
//! - `error`: Error taxonomy for grid access and level loading

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{GridError, LevelError};
pub use settings::Settings;

use glam::{IVec2, Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Strongest channel below this counts as extinguished light
    pub const MIN_INTENSITY: f32 = 0.01;
    /// Per-channel slack when matching a beam colour against a target
    pub const COLOR_TOLERANCE: f32 = 0.05;
    /// Number of quarter-turn rotation states
    pub const ROTATION_STATES: u8 = 4;
    /// Largest grid (width * height) a level may allocate
    pub const MAX_CELLS: usize = 1 << 20;
}

/// Grid cell the player is targeting, from continuous player coordinates.
///
/// Rounds each axis to the nearest cell centre (floor(pos + 0.5)).
#[inline]
pub fn target_cell(player_pos: Vec2) -> IVec2 {
    (player_pos + Vec2::splat(0.5)).floor().as_ivec2()
}

/// Centre of a cell in segment space
#[inline]
pub fn cell_center(cell: IVec2) -> Vec2 {
    cell.as_vec2()
}

/// Strongest RGB channel
#[inline]
pub fn intensity(color: Vec3) -> f32 {
    color.max_element()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_cell_rounds_to_nearest() {
        assert_eq!(target_cell(Vec2::new(0.4, 0.6)), IVec2::new(0, 1));
        assert_eq!(target_cell(Vec2::new(2.5, -0.2)), IVec2::new(3, 0));
        assert_eq!(target_cell(Vec2::new(-0.6, 1.49)), IVec2::new(-1, 1));
    }

    #[test]
    fn test_intensity_is_max_channel() {
        assert_eq!(intensity(Vec3::new(0.2, 0.9, 0.1)), 0.9);
        assert_eq!(intensity(Vec3::ZERO), 0.0);
    }
}
