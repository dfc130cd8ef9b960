//! Compass directions and quarter-turn rotation state
//!
//! Grid space is y-up: `North` is +y, `East` is +x. Every direction is a unit
//! step in cell space so a ray advances exactly one cell per step.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::ROTATION_STATES;

/// One of the 8 compass directions a beam can travel in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl Direction {
    /// Counter-clockwise order starting at East (45° apart)
    pub const ALL: [Self; 8] = [
        Self::East,
        Self::NorthEast,
        Self::North,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Cell offset for one step in this direction
    pub fn offset(self) -> IVec2 {
        match self {
            Self::East => IVec2::new(1, 0),
            Self::NorthEast => IVec2::new(1, 1),
            Self::North => IVec2::new(0, 1),
            Self::NorthWest => IVec2::new(-1, 1),
            Self::West => IVec2::new(-1, 0),
            Self::SouthWest => IVec2::new(-1, -1),
            Self::South => IVec2::new(0, -1),
            Self::SouthEast => IVec2::new(1, -1),
        }
    }

    /// Inverse of `offset`; None for anything that is not a unit compass step
    pub fn from_offset(offset: IVec2) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.offset() == offset)
    }

    pub fn reversed(self) -> Self {
        Self::ALL[(self.index() + 4) % 8]
    }

    pub fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    /// Turn clockwise by `quarters` quarter-turns
    pub fn rotated_cw(self, quarters: u8) -> Self {
        let steps = (quarters % ROTATION_STATES) as usize * 2;
        Self::ALL[(self.index() + 8 - steps) % 8]
    }
}

/// Quarter-turn rotation state of a block (0..4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const ZERO: Self = Self(0);

    pub fn new(quarters: u8) -> Self {
        Self(quarters % ROTATION_STATES)
    }

    pub fn quarters(self) -> u8 {
        self.0
    }

    /// Advance by one quarter-turn in the given sense (wraps mod 4)
    pub fn turned(self, clockwise: bool) -> Self {
        if clockwise {
            Self((self.0 + 1) % ROTATION_STATES)
        } else {
            Self((self.0 + ROTATION_STATES - 1) % ROTATION_STATES)
        }
    }

    /// Odd states are the `\` diagonal for mirrors and splitters
    pub fn is_odd(self) -> bool {
        self.0 % 2 == 1
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < ROTATION_STATES {
            Ok(Self(value))
        } else {
            Err(format!("rotation must be below {ROTATION_STATES}, got {value}"))
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_offset(d.offset()), Some(d));
        }
        assert_eq!(Direction::from_offset(IVec2::new(2, 0)), None);
    }

    #[test]
    fn test_rotated_cw() {
        assert_eq!(Direction::East.rotated_cw(1), Direction::South);
        assert_eq!(Direction::East.rotated_cw(3), Direction::North);
        assert_eq!(Direction::NorthEast.rotated_cw(1), Direction::SouthEast);
        assert_eq!(Direction::West.rotated_cw(4), Direction::West);
    }

    #[test]
    fn test_reversed() {
        assert_eq!(Direction::North.reversed(), Direction::South);
        assert_eq!(Direction::SouthWest.reversed(), Direction::NorthEast);
    }

    #[test]
    fn test_rotation_wraps() {
        let r = Rotation::ZERO.turned(false);
        assert_eq!(r.quarters(), 3);
        assert_eq!(r.turned(true), Rotation::ZERO);
        assert_eq!(Rotation::new(6).quarters(), 2);
    }

    #[test]
    fn test_rotation_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rotation>("4").is_err());
        assert_eq!(serde_json::from_str::<Rotation>("3").unwrap(), Rotation::new(3));
    }
}
