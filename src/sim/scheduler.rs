//! Recompute scheduling
//!
//! Keeps the last segment tree of every emitter and, after a block mutation,
//! rebuilds only the trees the mutated cell can influence. Rebuilds replace
//! the whole tree; a single rotation can change the branch topology anywhere
//! downstream, so there is no incremental patching.

use std::collections::{BTreeMap, BTreeSet};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::block::{Block, Emitter};
use super::grid::Grid;
use super::propagate::propagate_with;
use super::segment::SegmentTree;
use crate::settings::Settings;

/// Identity of a beam source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmitterId {
    /// Emitter block at this cell
    Cell { x: i32, y: i32 },
    /// Emitter registered outside the grid
    External(u32),
}

impl EmitterId {
    pub fn cell(cell: IVec2) -> Self {
        Self::Cell {
            x: cell.x,
            y: cell.y,
        }
    }
}

/// Owner of every emitter's current segment tree
#[derive(Debug, Clone)]
pub struct RecomputeScheduler {
    settings: Settings,
    trees: BTreeMap<EmitterId, SegmentTree>,
    built: bool,
    /// Total tree builds since creation
    builds: u64,
}

impl RecomputeScheduler {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            trees: BTreeMap::new(),
            built: false,
            builds: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn builds(&self) -> u64 {
        self.builds
    }

    pub fn tree(&self, id: EmitterId) -> Option<&SegmentTree> {
        self.trees.get(&id)
    }

    /// Current trees in emitter order
    pub fn trees(&self) -> impl Iterator<Item = (EmitterId, &SegmentTree)> {
        self.trees.iter().map(|(id, tree)| (*id, tree))
    }

    /// Emitters whose trees a change of `cell` from `old` to `new` can affect.
    ///
    /// Before the first build every emitter is affected. Afterwards an emitter
    /// is affected if its tree touched `cell`, if it has no tree yet, or if the
    /// change added or removed the emitter block at `cell`.
    pub fn affected(
        &self,
        cell: IVec2,
        old: &Block,
        new: &Block,
        emitters: &[(EmitterId, Emitter)],
    ) -> BTreeSet<EmitterId> {
        if !self.built {
            return emitters.iter().map(|(id, _)| *id).collect();
        }
        if old == new {
            return BTreeSet::new();
        }
        let emitter_changed = old.is_emitter() || new.is_emitter();
        let here = EmitterId::cell(cell);

        emitters
            .iter()
            .filter(|(id, _)| {
                (emitter_changed && *id == here)
                    || self.trees.get(id).is_none_or(|tree| tree.touches(cell))
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Rebuild the affected trees after a block mutation.
    ///
    /// Returns every emitter whose tree was rebuilt or discarded. Trees of
    /// emitters missing from `emitters` are dropped.
    pub fn on_block_changed(
        &mut self,
        grid: &Grid,
        cell: IVec2,
        old: &Block,
        new: &Block,
        emitters: &[(EmitterId, Emitter)],
    ) -> BTreeSet<EmitterId> {
        let affected = self.affected(cell, old, new, emitters);
        self.rebuild(grid, &affected, emitters)
    }

    /// Bring the stored trees in line with a changed emitter set
    pub fn on_emitters_changed(
        &mut self,
        grid: &Grid,
        emitters: &[(EmitterId, Emitter)],
    ) -> BTreeSet<EmitterId> {
        let missing = emitters
            .iter()
            .filter(|(id, _)| !self.built || !self.trees.contains_key(id))
            .map(|(id, _)| *id)
            .collect();
        self.rebuild(grid, &missing, emitters)
    }

    /// Drop every tree and build all emitters again
    pub fn rebuild_all(
        &mut self,
        grid: &Grid,
        emitters: &[(EmitterId, Emitter)],
    ) -> BTreeSet<EmitterId> {
        self.trees.clear();
        self.built = false;
        self.on_emitters_changed(grid, emitters)
    }

    fn rebuild(
        &mut self,
        grid: &Grid,
        ids: &BTreeSet<EmitterId>,
        emitters: &[(EmitterId, Emitter)],
    ) -> BTreeSet<EmitterId> {
        let mut changed = ids.clone();
        for (id, emitter) in emitters.iter().filter(|(id, _)| ids.contains(id)) {
            self.trees
                .insert(*id, propagate_with(grid, emitter, &self.settings));
            self.builds += 1;
        }

        let live: BTreeSet<EmitterId> = emitters.iter().map(|(id, _)| *id).collect();
        self.trees.retain(|id, _| {
            let keep = live.contains(id);
            if !keep {
                log::debug!("Discarding tree for removed emitter {:?}", id);
                changed.insert(*id);
            }
            keep
        });

        self.built = true;
        if !changed.is_empty() {
            log::debug!("Recomputed {} beam(s)", changed.len());
        }
        changed
    }
}
