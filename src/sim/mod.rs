//! Deterministic simulation module
//!
//! All beam logic lives here. This module must be pure and deterministic:
//! - No global state; grid and emitters are passed in, trees are returned
//! - Stable iteration order (row-major cells, ordered emitter ids)
//! - No rendering or platform dependencies

pub mod block;
pub mod direction;
pub mod grid;
pub mod level;
pub mod propagate;
pub mod scheduler;
pub mod segment;

pub use block::{BeamEffect, Block, Emitter, reflect};
pub use direction::{Direction, Rotation};
pub use grid::Grid;
pub use level::{BlockChange, Intent, Level, covers};
pub use propagate::{propagate, propagate_with};
pub use scheduler::{EmitterId, RecomputeScheduler};
pub use segment::{Segment, SegmentId, SegmentTree, Termination};
