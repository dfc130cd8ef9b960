//! Error types for grid access and level loading.

use thiserror::Error;

/// Grid access and construction failures.
///
/// Both variants indicate a caller bug: the input layer must clamp cells
/// before calling in, and level data must carry positive dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
}

/// Failures while building a level from a layout.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("layout places more than one block at ({x}, {y})")]
    Overlap { x: i32, y: i32 },

    #[error("layout json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Returns true if this is an OutOfBounds error.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, GridError::OutOfBounds { .. })
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
