//! Segment arena for one beam
//!
//! Segments are stored in a flat `Vec` and linked by index, so parent/child
//! links stay valid while the arena grows during a build.

use std::collections::HashSet;

use glam::{IVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::block::Emitter;
use super::direction::Direction;

/// Stable index of a segment inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u32);

impl SegmentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Why a straight run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Walked off the grid; `end` is the last in-bounds cell centre
    Exit,
    /// Hit an opaque cell or was fully absorbed; `end` is that cell's entry face
    Stopped(IVec2),
    /// Bounced off a mirror at this cell's centre
    Reflected(IVec2),
    /// Divided by a splitter at this cell's centre
    Split(IVec2),
    /// Would retrace a (cell, direction) already lit by this beam
    Cycle,
}

/// One straight run of a beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
    pub direction: Direction,
    /// Colour entering the segment
    pub color: Vec3,
    /// Colour after any tints along the run, handed to children
    pub exit_color: Vec3,
    pub termination: Termination,
    pub parent: Option<SegmentId>,
    pub children: Vec<SegmentId>,
}

impl Segment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// All segments produced by one emitter, rooted at `root()`
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTree {
    emitter: Emitter,
    segments: Vec<Segment>,
    /// Cells the beam entered or was stopped by, including the origin
    touched: HashSet<IVec2>,
}

impl SegmentTree {
    pub(crate) fn new(emitter: Emitter) -> Self {
        let mut touched = HashSet::new();
        touched.insert(emitter.origin);
        Self {
            emitter,
            segments: Vec::new(),
            touched,
        }
    }

    /// Append a finished segment and link it under its parent
    pub(crate) fn push(&mut self, segment: Segment) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        if let Some(parent) = segment.parent {
            self.segments[parent.index()].children.push(id);
        }
        self.segments.push(segment);
        id
    }

    pub(crate) fn touch(&mut self, cell: IVec2) {
        self.touched.insert(cell);
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// The segment leaving the emitter
    pub fn root(&self) -> SegmentId {
        SegmentId(0)
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    pub fn parent(&self, id: SegmentId) -> Option<SegmentId> {
        self.get(id).and_then(|s| s.parent)
    }

    pub fn children(&self, id: SegmentId) -> &[SegmentId] {
        self.get(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in build (breadth-first) order
    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| (SegmentId(i as u32), s))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the beam passed through, turned in, or was stopped by `cell`
    pub fn touches(&self, cell: IVec2) -> bool {
        self.touched.contains(&cell)
    }

    /// Every cell `touches` reports, in no particular order
    pub fn lit_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.touched.iter().copied()
    }

    /// Cells where a run was stopped, with the colour that arrived there
    pub fn stopped_at(&self) -> impl Iterator<Item = (IVec2, Vec3)> + '_ {
        self.segments.iter().filter_map(|s| match s.termination {
            Termination::Stopped(cell) => Some((cell, s.exit_color)),
            _ => None,
        })
    }
}
