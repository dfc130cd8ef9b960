//! Block variants and their single-cell transitions
//!
//! Every consumer that needs per-variant behaviour (beam interaction, rotate,
//! interact) matches exhaustively here, so a new variant cannot be forgotten.

use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};

use super::direction::{Direction, Rotation};
use crate::intensity;
use crate::settings::Settings;

/// Content of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Passable, no effect on light
    #[default]
    Empty,
    /// Opaque wall
    Plain,
    /// Double-sided diagonal mirror: even rotation is `/`, odd is `\`
    Mirror { rotation: Rotation, enabled: bool },
    /// Half-silvered diagonal: lets the beam through and reflects a copy
    Splitter { rotation: Rotation, enabled: bool },
    /// Colour filter; multiplies the beam colour, blocks it when nothing is left
    Absorber {
        filter: Vec3,
        rotation: Rotation,
        enabled: bool,
    },
    /// Beam source facing East rotated clockwise by `rotation`
    Emitter {
        color: Vec3,
        rotation: Rotation,
        enabled: bool,
    },
    /// Goal cell, lit when a beam of a covering colour lands on it
    Target { color: Vec3 },
}

/// What happens to a beam entering a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeamEffect {
    /// Keep walking with the (possibly tinted) colour
    Pass(Vec3),
    /// Stop at the cell's entry face
    Stop,
    /// End the run at the cell centre and continue in one new direction
    Reflect(Direction),
    /// End the run at the cell centre and continue in two directions
    Split(Direction, Direction),
}

/// A beam source: origin cell, heading and base colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub origin: IVec2,
    pub direction: Direction,
    pub color: Vec3,
}

impl Emitter {
    pub fn new(origin: IVec2, direction: Direction, color: Vec3) -> Self {
        Self {
            origin,
            direction,
            color,
        }
    }
}

/// Mirror reflection: `/` swaps the axes, `\` swaps and negates them
pub fn reflect(incoming: Direction, rotation: Rotation) -> Direction {
    let d = incoming.offset();
    let out = if rotation.is_odd() {
        IVec2::new(-d.y, -d.x)
    } else {
        IVec2::new(d.y, d.x)
    };
    // Swapping or negating a unit compass step always yields another one
    Direction::from_offset(out).unwrap_or(incoming.reversed())
}

impl Block {
    pub fn mirror(quarters: u8) -> Self {
        Self::Mirror {
            rotation: Rotation::new(quarters),
            enabled: true,
        }
    }

    pub fn splitter(quarters: u8) -> Self {
        Self::Splitter {
            rotation: Rotation::new(quarters),
            enabled: true,
        }
    }

    pub fn absorber(filter: Vec3) -> Self {
        Self::Absorber {
            filter,
            rotation: Rotation::ZERO,
            enabled: true,
        }
    }

    pub fn emitter(color: Vec3, quarters: u8) -> Self {
        Self::Emitter {
            color,
            rotation: Rotation::new(quarters),
            enabled: true,
        }
    }

    pub fn target(color: Vec3) -> Self {
        Self::Target { color }
    }

    pub fn is_emitter(&self) -> bool {
        matches!(self, Self::Emitter { .. })
    }

    /// Rotation state, for variants that carry one
    pub fn rotation(&self) -> Option<Rotation> {
        match self {
            Self::Mirror { rotation, .. }
            | Self::Splitter { rotation, .. }
            | Self::Absorber { rotation, .. }
            | Self::Emitter { rotation, .. } => Some(*rotation),
            Self::Empty | Self::Plain | Self::Target { .. } => None,
        }
    }

    /// Block after one quarter-turn; unrotatable variants are returned unchanged
    pub fn rotated(self, clockwise: bool) -> Self {
        match self {
            Self::Mirror { rotation, enabled } => Self::Mirror {
                rotation: rotation.turned(clockwise),
                enabled,
            },
            Self::Splitter { rotation, enabled } => Self::Splitter {
                rotation: rotation.turned(clockwise),
                enabled,
            },
            Self::Absorber {
                filter,
                rotation,
                enabled,
            } => Self::Absorber {
                filter,
                rotation: rotation.turned(clockwise),
                enabled,
            },
            Self::Emitter {
                color,
                rotation,
                enabled,
            } => Self::Emitter {
                color,
                rotation: rotation.turned(clockwise),
                enabled,
            },
            Self::Empty | Self::Plain | Self::Target { .. } => self,
        }
    }

    /// Block after the interact toggle (flips `enabled` where present)
    pub fn interacted(self) -> Self {
        match self {
            Self::Mirror { rotation, enabled } => Self::Mirror {
                rotation,
                enabled: !enabled,
            },
            Self::Splitter { rotation, enabled } => Self::Splitter {
                rotation,
                enabled: !enabled,
            },
            Self::Absorber {
                filter,
                rotation,
                enabled,
            } => Self::Absorber {
                filter,
                rotation,
                enabled: !enabled,
            },
            Self::Emitter {
                color,
                rotation,
                enabled,
            } => Self::Emitter {
                color,
                rotation,
                enabled: !enabled,
            },
            Self::Empty | Self::Plain | Self::Target { .. } => self,
        }
    }

    /// The beam this block emits when placed at `cell`, if it is an enabled emitter
    pub fn emitter_at(&self, cell: IVec2) -> Option<Emitter> {
        match *self {
            Self::Emitter {
                color,
                rotation,
                enabled: true,
            } => Some(Emitter::new(
                cell,
                Direction::East.rotated_cw(rotation.quarters()),
                color,
            )),
            _ => None,
        }
    }

    /// True if a beam starting inside this cell cannot leave it
    pub fn is_opaque(&self) -> bool {
        match self {
            Self::Plain | Self::Target { .. } => true,
            // An emitter's own cell is its aperture
            Self::Empty
            | Self::Mirror { .. }
            | Self::Splitter { .. }
            | Self::Absorber { .. }
            | Self::Emitter { .. } => false,
        }
    }

    /// Interaction with a beam entering this cell travelling `incoming`
    pub fn beam_effect(&self, incoming: Direction, color: Vec3, settings: &Settings) -> BeamEffect {
        match *self {
            Self::Empty => BeamEffect::Pass(color),
            Self::Plain | Self::Target { .. } | Self::Emitter { .. } => BeamEffect::Stop,
            Self::Mirror { enabled: false, .. }
            | Self::Splitter { enabled: false, .. }
            | Self::Absorber { enabled: false, .. } => BeamEffect::Pass(color),
            Self::Mirror { rotation, .. } => {
                let out = reflect(incoming, rotation);
                if out == incoming {
                    // Grazing along the mirror plane
                    BeamEffect::Pass(color)
                } else {
                    BeamEffect::Reflect(out)
                }
            }
            Self::Splitter { rotation, .. } => {
                let out = reflect(incoming, rotation);
                if out == incoming {
                    BeamEffect::Pass(color)
                } else {
                    BeamEffect::Split(incoming, out)
                }
            }
            Self::Absorber { filter, .. } => {
                let tinted = color * filter;
                if intensity(tinted) < settings.min_intensity {
                    BeamEffect::Stop
                } else {
                    BeamEffect::Pass(tinted)
                }
            }
        }
    }
}
