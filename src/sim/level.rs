//! Level state: the grid, its beam sources and their segment trees
//!
//! Every mutation goes through here so the scheduler sees it before the next
//! one is accepted.

use std::collections::{BTreeMap, BTreeSet};

use glam::{IVec2, Vec3};

use super::block::{Block, Emitter};
use super::grid::Grid;
use super::scheduler::{EmitterId, RecomputeScheduler};
use super::segment::SegmentTree;
use crate::consts::COLOR_TOLERANCE;
use crate::error::Result;
use crate::settings::Settings;

/// Discrete player intent aimed at one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Rotate { clockwise: bool },
    Interact,
    Place(Block),
    Remove,
}

/// Outcome of one cell mutation
#[derive(Debug, Clone, PartialEq)]
pub struct BlockChange {
    pub cell: IVec2,
    pub old: Block,
    pub new: Block,
    /// Emitters whose trees were rebuilt or discarded
    pub affected: BTreeSet<EmitterId>,
}

impl BlockChange {
    /// True if the cell content did not change
    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

/// True if every channel of `beam` reaches `wanted`, within tolerance
pub fn covers(beam: Vec3, wanted: Vec3) -> bool {
    beam.cmpge(wanted - Vec3::splat(COLOR_TOLERANCE)).all()
}

#[derive(Debug, Clone)]
pub struct Level {
    grid: Grid,
    external: BTreeMap<u32, Emitter>,
    next_emitter_id: u32,
    scheduler: RecomputeScheduler,
}

impl Level {
    /// Empty level with default settings
    pub fn new(width: i64, height: i64) -> Result<Self> {
        Ok(Self::from_grid(Grid::new(width, height)?, Settings::default()))
    }

    /// Wrap an existing grid and build every beam
    pub fn from_grid(grid: Grid, settings: Settings) -> Self {
        let mut level = Self {
            grid,
            external: BTreeMap::new(),
            next_emitter_id: 0,
            scheduler: RecomputeScheduler::new(settings),
        };
        let emitters = level.emitters();
        level.scheduler.rebuild_all(&level.grid, &emitters);
        log::info!(
            "Level {}x{} ready with {} beam(s)",
            level.grid.width(),
            level.grid.height(),
            emitters.len()
        );
        level
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &Settings {
        self.scheduler.settings()
    }

    pub fn scheduler(&self) -> &RecomputeScheduler {
        &self.scheduler
    }

    /// All active beam sources: emitter blocks first, then external ones
    pub fn emitters(&self) -> Vec<(EmitterId, Emitter)> {
        self.grid
            .emitters()
            .map(|e| (EmitterId::cell(e.origin), e))
            .chain(self.external.iter().map(|(id, e)| (EmitterId::External(*id), *e)))
            .collect()
    }

    /// Externally registered emitters, by id
    pub fn external_emitters(&self) -> impl Iterator<Item = (u32, &Emitter)> {
        self.external.iter().map(|(id, e)| (*id, e))
    }

    pub fn tree(&self, id: EmitterId) -> Option<&SegmentTree> {
        self.scheduler.tree(id)
    }

    pub fn trees(&self) -> impl Iterator<Item = (EmitterId, &SegmentTree)> {
        self.scheduler.trees()
    }

    fn mutate(&mut self, cell: IVec2, f: impl FnOnce(Block) -> Block) -> Result<BlockChange> {
        let old = self.grid.get(cell)?;
        let new = f(old);
        self.grid.set(cell, new)?;
        let emitters = self.emitters();
        let affected = self
            .scheduler
            .on_block_changed(&self.grid, cell, &old, &new, &emitters);
        Ok(BlockChange {
            cell,
            old,
            new,
            affected,
        })
    }

    /// Quarter-turn the block at `cell`; no-op for unrotatable blocks
    pub fn rotate(&mut self, cell: IVec2, clockwise: bool) -> Result<BlockChange> {
        self.mutate(cell, |b| b.rotated(clockwise))
    }

    /// Toggle the block at `cell`
    pub fn interact(&mut self, cell: IVec2) -> Result<BlockChange> {
        self.mutate(cell, Block::interacted)
    }

    /// Replace the block at `cell`
    pub fn place(&mut self, cell: IVec2, block: Block) -> Result<BlockChange> {
        self.mutate(cell, |_| block)
    }

    /// Clear `cell` back to `Empty`
    pub fn remove(&mut self, cell: IVec2) -> Result<BlockChange> {
        self.mutate(cell, |_| Block::Empty)
    }

    pub fn apply(&mut self, cell: IVec2, intent: Intent) -> Result<BlockChange> {
        match intent {
            Intent::Rotate { clockwise } => self.rotate(cell, clockwise),
            Intent::Interact => self.interact(cell),
            Intent::Place(block) => self.place(cell, block),
            Intent::Remove => self.remove(cell),
        }
    }

    /// Register a beam source that is not a grid block
    pub fn add_emitter(&mut self, emitter: Emitter) -> EmitterId {
        let id = self.next_emitter_id;
        self.next_emitter_id += 1;
        self.external.insert(id, emitter);
        let emitters = self.emitters();
        self.scheduler.on_emitters_changed(&self.grid, &emitters);
        EmitterId::External(id)
    }

    /// Unregister an external emitter, discarding its tree
    pub fn remove_emitter(&mut self, id: u32) -> Option<Emitter> {
        let removed = self.external.remove(&id)?;
        let emitters = self.emitters();
        self.scheduler.on_emitters_changed(&self.grid, &emitters);
        Some(removed)
    }

    /// Whether a beam covering `color` lands on `cell`
    pub fn is_lit(&self, cell: IVec2, color: Vec3) -> bool {
        self.trees().any(|(_, tree)| {
            tree.stopped_at()
                .any(|(hit, beam)| hit == cell && covers(beam, color))
        })
    }

    /// Every target cell with its colour
    pub fn targets(&self) -> impl Iterator<Item = (IVec2, Vec3)> + '_ {
        self.grid.iter().filter_map(|(cell, block)| match block {
            Block::Target { color } => Some((cell, color)),
            _ => None,
        })
    }

    /// Target cells currently lit by a matching beam
    pub fn lit_targets(&self) -> Vec<IVec2> {
        self.targets()
            .filter(|(cell, color)| self.is_lit(*cell, *color))
            .map(|(cell, _)| cell)
            .collect()
    }

    /// All targets lit, and there is at least one
    pub fn is_solved(&self) -> bool {
        let mut targets = self.targets().peekable();
        targets.peek().is_some() && targets.all(|(cell, color)| self.is_lit(cell, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::direction::Direction;
    use crate::sim::segment::Termination;

    const RED: Vec3 = Vec3::new(1.0, 0.0, 0.0);

    #[test]
    fn test_rotate_round_trip_restores_block() {
        let mut level = Level::new(4, 5).unwrap();
        let cell = IVec2::new(2, 0);
        level.place(cell, Block::mirror(0)).unwrap();
        let before = level.grid().get(cell).unwrap();

        let cw = level.rotate(cell, true).unwrap();
        assert_eq!(cw.old, before);
        let ccw = level.rotate(cell, false).unwrap();
        assert_eq!(ccw.new, before);
    }

    #[test]
    fn test_rotate_plain_is_noop() {
        let mut level = Level::new(4, 5).unwrap();
        level.add_emitter(Emitter::new(IVec2::ZERO, Direction::East, RED));
        let change = level.place(IVec2::new(2, 0), Block::Plain).unwrap();
        assert_eq!(change.affected.len(), 1);

        let change = level.rotate(IVec2::new(2, 0), true).unwrap();
        assert!(change.is_noop());
        assert!(change.affected.is_empty());
    }

    #[test]
    fn test_out_of_bounds_intent_is_rejected() {
        let mut level = Level::new(4, 5).unwrap();
        let err = level
            .apply(IVec2::new(9, 9), Intent::Rotate { clockwise: true })
            .unwrap_err();
        assert!(err.is_out_of_bounds());
    }

    #[test]
    fn test_emitter_block_added_and_removed() {
        let mut level = Level::new(4, 5).unwrap();
        let cell = IVec2::new(0, 2);
        let id = EmitterId::cell(cell);

        let change = level.place(cell, Block::emitter(RED, 0)).unwrap();
        assert!(change.affected.contains(&id));
        let tree = level.tree(id).unwrap();
        assert_eq!(tree.segments()[0].end, glam::Vec2::new(3.0, 2.0));

        let change = level.interact(cell).unwrap();
        assert!(change.affected.contains(&id));
        assert!(level.tree(id).is_none());

        level.interact(cell).unwrap();
        assert!(level.tree(id).is_some());
        let change = level.remove(cell).unwrap();
        assert!(change.affected.contains(&id));
        assert!(level.tree(id).is_none());
    }

    #[test]
    fn test_emitter_block_rotation_redirects_beam() {
        let mut level = Level::new(4, 5).unwrap();
        let cell = IVec2::new(1, 2);
        level.place(cell, Block::emitter(RED, 0)).unwrap();
        level.rotate(cell, false).unwrap();
        let tree = level.tree(EmitterId::cell(cell)).unwrap();
        assert_eq!(tree.segments()[0].direction, Direction::North);
        assert_eq!(tree.segments()[0].end, glam::Vec2::new(1.0, 4.0));
    }

    #[test]
    fn test_target_lit_and_solved() {
        let mut level = Level::new(4, 5).unwrap();
        assert!(!level.is_solved());
        level.add_emitter(Emitter::new(IVec2::ZERO, Direction::East, RED));
        level.place(IVec2::new(2, 3), Block::target(RED)).unwrap();
        assert!(!level.is_solved());

        level.place(IVec2::new(2, 0), Block::mirror(0)).unwrap();
        assert!(level.is_lit(IVec2::new(2, 3), RED));
        assert!(!level.is_lit(IVec2::new(2, 3), Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(level.lit_targets(), vec![IVec2::new(2, 3)]);
        assert!(level.is_solved());

        let tree = level.tree(EmitterId::External(0)).unwrap();
        let last = tree.segments().last().unwrap();
        assert_eq!(last.termination, Termination::Stopped(IVec2::new(2, 3)));
    }

    #[test]
    fn test_remove_external_emitter() {
        let mut level = Level::new(4, 5).unwrap();
        let EmitterId::External(id) = level.add_emitter(Emitter::new(IVec2::ZERO, Direction::East, RED))
        else {
            panic!("expected external id");
        };
        assert_eq!(level.trees().count(), 1);
        assert!(level.remove_emitter(id).is_some());
        assert_eq!(level.trees().count(), 0);
        assert!(level.remove_emitter(id).is_none());
    }

    #[test]
    fn test_covers_tolerance() {
        assert!(covers(Vec3::ONE, RED));
        assert!(covers(Vec3::new(0.97, 0.0, 0.0), RED));
        assert!(!covers(Vec3::new(0.5, 0.0, 0.0), RED));
    }
}
