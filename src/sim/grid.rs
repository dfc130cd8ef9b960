//! Rectangular block grid
//!
//! Pure data: bounds-checked reads and writes, nothing else.

use glam::IVec2;

use super::block::{Block, Emitter};
use crate::consts::MAX_CELLS;
use crate::error::{GridError, Result};

/// Fixed-size grid of blocks, row-major with y=0 as the first row
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Block>,
}

impl Grid {
    /// Create an all-`Empty` grid; both dimensions must be positive and the
    /// cell count at most `MAX_CELLS`
    pub fn new(width: i64, height: i64) -> Result<Self> {
        let invalid = GridError::InvalidDimensions { width, height };
        let valid = |n: i64| n > 0 && n <= i64::from(i32::MAX);
        if !valid(width) || !valid(height) {
            return Err(invalid);
        }
        let (width, height) = (width as u32, height as u32);
        let count = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(invalid)?;
        Ok(Self {
            width,
            height,
            cells: vec![Block::Empty; count],
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells
    #[inline]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as u32) < self.width && (cell.y as u32) < self.height
    }

    fn index(&self, cell: IVec2) -> Result<usize> {
        if !self.contains(cell) {
            return Err(GridError::OutOfBounds {
                x: cell.x,
                y: cell.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(cell.y as usize * self.width as usize + cell.x as usize)
    }

    pub fn get(&self, cell: IVec2) -> Result<Block> {
        let i = self.index(cell)?;
        Ok(self.cells[i])
    }

    /// Store a block, returning the one it replaced
    pub fn set(&mut self, cell: IVec2, block: Block) -> Result<Block> {
        let i = self.index(cell)?;
        Ok(std::mem::replace(&mut self.cells[i], block))
    }

    /// All cells with their blocks, row by row
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Block)> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, b)| (IVec2::new((i % width) as i32, (i / width) as i32), *b))
    }

    /// Enabled emitter blocks in row-major order
    pub fn emitters(&self) -> impl Iterator<Item = Emitter> + '_ {
        self.iter().filter_map(|(cell, block)| block.emitter_at(cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_new_rejects_bad_dimensions() {
        assert_eq!(
            Grid::new(0, 5),
            Err(GridError::InvalidDimensions { width: 0, height: 5 })
        );
        assert!(Grid::new(4, -1).is_err());
        assert!(Grid::new(4, 5).is_ok());
    }

    #[test]
    fn test_new_rejects_oversized_grids() {
        let huge = i64::from(i32::MAX);
        assert_eq!(
            Grid::new(huge, huge),
            Err(GridError::InvalidDimensions { width: huge, height: huge })
        );
        assert!(Grid::new(MAX_CELLS as i64 + 1, 1).is_err());
        assert_eq!(Grid::new(MAX_CELLS as i64, 1).map(|g| g.area()), Ok(MAX_CELLS));
    }

    #[test]
    fn test_default_cells_are_empty() {
        let grid = Grid::new(3, 2).unwrap();
        assert_eq!(grid.area(), 6);
        assert!(grid.iter().all(|(_, b)| b == Block::Empty));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut grid = Grid::new(4, 5).unwrap();
        let prev = grid.set(IVec2::new(3, 4), Block::Plain).unwrap();
        assert_eq!(prev, Block::Empty);
        assert_eq!(grid.get(IVec2::new(3, 4)).unwrap(), Block::Plain);
        assert_eq!(grid.set(IVec2::new(3, 4), Block::Plain).unwrap(), Block::Plain);

        let err = grid.get(IVec2::new(4, 0)).unwrap_err();
        assert!(err.is_out_of_bounds());
        assert!(grid.set(IVec2::new(0, -1), Block::Plain).is_err());
    }

    #[test]
    fn test_iter_coordinates() {
        let mut grid = Grid::new(3, 2).unwrap();
        grid.set(IVec2::new(2, 1), Block::Plain).unwrap();
        let found: Vec<_> = grid.iter().filter(|(_, b)| *b == Block::Plain).collect();
        assert_eq!(found, vec![(IVec2::new(2, 1), Block::Plain)]);
    }

    #[test]
    fn test_emitters_skip_disabled() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(IVec2::new(0, 0), Block::emitter(Vec3::X, 0)).unwrap();
        grid.set(IVec2::new(1, 1), Block::emitter(Vec3::Y, 0).interacted())
            .unwrap();
        let emitters: Vec<_> = grid.emitters().collect();
        assert_eq!(emitters.len(), 1);
        assert_eq!(emitters[0].origin, IVec2::ZERO);
    }
}
