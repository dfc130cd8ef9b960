//! Level layout shape for load/save
//!
//! Features:
//! - Serde-friendly snapshot of a level (non-empty cells + external emitters)
//! - JSON string helpers; where the string is stored is up to the caller
//! - Overlap and dimension validation when building a level

use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::settings::Settings;
use crate::sim::{Block, Emitter, Grid, Level};

/// One non-empty cell of a layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub x: i32,
    pub y: i32,
    pub block: Block,
}

/// Persisted level description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub blocks: Vec<PlacedBlock>,
    #[serde(default)]
    pub emitters: Vec<Emitter>,
    #[serde(default)]
    pub settings: Settings,
}

impl LevelLayout {
    /// Snapshot a level; emitter ids are not preserved, only their order
    pub fn from_level(level: &Level) -> Self {
        let grid = level.grid();
        Self {
            width: i64::from(grid.width()),
            height: i64::from(grid.height()),
            blocks: grid
                .iter()
                .filter(|(_, block)| *block != Block::Empty)
                .map(|(cell, block)| PlacedBlock {
                    x: cell.x,
                    y: cell.y,
                    block,
                })
                .collect(),
            emitters: level.external_emitters().map(|(_, e)| *e).collect(),
            settings: *level.settings(),
        }
    }

    /// Build a level, rejecting out-of-bounds or doubly placed cells
    pub fn to_level(&self) -> Result<Level, LevelError> {
        let mut grid = Grid::new(self.width, self.height)?;
        let mut seen = HashSet::new();
        for placed in &self.blocks {
            let cell = IVec2::new(placed.x, placed.y);
            if !seen.insert(cell) {
                return Err(LevelError::Overlap {
                    x: placed.x,
                    y: placed.y,
                });
            }
            grid.set(cell, placed.block)?;
        }

        let mut level = Level::from_grid(grid, self.settings);
        for emitter in &self.emitters {
            level.add_emitter(*emitter);
        }
        Ok(level)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
