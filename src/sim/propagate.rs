//! Beam propagation
//!
//! Breadth-first walk over the branching beam: each pending ray steps one
//! cell at a time until it leaves the grid, is stopped, or turns at a mirror
//! or splitter. Turning ends the run and queues child rays.
//!
//! `entered` holds every (cell, direction) a ray has stepped into during one
//! build; stepping into one again ends the ray with `Termination::Cycle`
//! (closed mirror circuits, converging branches). Mirrors and splitters only
//! turn a ray on a fresh entry, each fresh entry turns into at most two
//! children, and there are at most `width*height*8` entries, so a build ends
//! with at most `1 + 2*width*height*8` segments.

use std::collections::{HashSet, VecDeque};

use glam::{IVec2, Vec2, Vec3};

use super::block::{BeamEffect, Emitter};
use super::direction::Direction;
use super::grid::Grid;
use super::segment::{Segment, SegmentId, SegmentTree, Termination};
use crate::cell_center;
use crate::settings::Settings;

/// A ray waiting to be walked
#[derive(Debug, Clone, Copy)]
struct Ray {
    origin: IVec2,
    direction: Direction,
    color: Vec3,
    parent: Option<SegmentId>,
}

/// Where a ray turned, and into which directions
#[derive(Debug, Clone, Copy)]
enum Turn {
    Reflect(IVec2, Direction),
    Split(IVec2, Direction, Direction),
}

/// Result of walking one ray
#[derive(Debug, Clone, Copy)]
struct Run {
    end: Vec2,
    exit_color: Vec3,
    termination: Termination,
    turn: Option<Turn>,
}

/// Point where a beam travelling `direction` enters `cell`
#[inline]
fn entry_face(cell: IVec2, direction: Direction) -> Vec2 {
    cell_center(cell) - direction.offset().as_vec2() * 0.5
}

/// Build the segment tree for one emitter with default settings
pub fn propagate(grid: &Grid, emitter: &Emitter) -> SegmentTree {
    propagate_with(grid, emitter, &Settings::default())
}

/// Build the segment tree for one emitter.
///
/// Pure in `(grid, emitter, settings)`: repeated calls give identical trees.
pub fn propagate_with(grid: &Grid, emitter: &Emitter, settings: &Settings) -> SegmentTree {
    let mut tree = SegmentTree::new(*emitter);
    let origin = cell_center(emitter.origin);

    let origin_stop = match grid.get(emitter.origin) {
        Err(_) => Some(Termination::Exit),
        Ok(block) if block.is_opaque() => Some(Termination::Stopped(emitter.origin)),
        Ok(_) => None,
    };
    if let Some(termination) = origin_stop {
        tree.push(Segment {
            start: origin,
            end: origin,
            direction: emitter.direction,
            color: emitter.color,
            exit_color: emitter.color,
            termination,
            parent: None,
            children: Vec::new(),
        });
        return tree;
    }

    let mut entered: HashSet<(IVec2, Direction)> = HashSet::new();

    let mut queue = VecDeque::new();
    queue.push_back(Ray {
        origin: emitter.origin,
        direction: emitter.direction,
        color: emitter.color,
        parent: None,
    });

    while let Some(ray) = queue.pop_front() {
        let run = walk(grid, &ray, settings, &mut entered, &mut tree);
        let id = tree.push(Segment {
            start: cell_center(ray.origin),
            end: run.end,
            direction: ray.direction,
            color: ray.color,
            exit_color: run.exit_color,
            termination: run.termination,
            parent: ray.parent,
            children: Vec::new(),
        });
        log::trace!(
            "segment {:?} {:?} -> {:?} ({:?})",
            id,
            ray.origin,
            run.end,
            run.termination
        );

        let (cell, outputs, color) = match run.turn {
            None => continue,
            Some(Turn::Reflect(cell, out)) => (cell, [Some(out), None], run.exit_color),
            Some(Turn::Split(cell, straight, side)) => (
                cell,
                [Some(straight), Some(side)],
                run.exit_color * settings.splitter_attenuation,
            ),
        };
        for direction in outputs.into_iter().flatten() {
            queue.push_back(Ray {
                origin: cell,
                direction,
                color,
                parent: Some(id),
            });
        }
    }

    tree
}

/// Step a single ray until it terminates or turns
fn walk(
    grid: &Grid,
    ray: &Ray,
    settings: &Settings,
    entered: &mut HashSet<(IVec2, Direction)>,
    tree: &mut SegmentTree,
) -> Run {
    let step = ray.direction.offset();
    let mut cell = ray.origin;
    let mut color = ray.color;

    loop {
        let next = cell + step;
        let Ok(block) = grid.get(next) else {
            return Run {
                end: cell_center(cell),
                exit_color: color,
                termination: Termination::Exit,
                turn: None,
            };
        };
        if !entered.insert((next, ray.direction)) {
            return Run {
                end: entry_face(next, ray.direction),
                exit_color: color,
                termination: Termination::Cycle,
                turn: None,
            };
        }
        tree.touch(next);

        match block.beam_effect(ray.direction, color, settings) {
            BeamEffect::Pass(tinted) => {
                color = tinted;
                cell = next;
            }
            BeamEffect::Stop => {
                return Run {
                    end: entry_face(next, ray.direction),
                    exit_color: color,
                    termination: Termination::Stopped(next),
                    turn: None,
                };
            }
            BeamEffect::Reflect(out) => {
                return Run {
                    end: cell_center(next),
                    exit_color: color,
                    termination: Termination::Reflected(next),
                    turn: Some(Turn::Reflect(next, out)),
                };
            }
            BeamEffect::Split(straight, side) => {
                return Run {
                    end: cell_center(next),
                    exit_color: color,
                    termination: Termination::Split(next),
                    turn: Some(Turn::Split(next, straight, side)),
                };
            }
        }
    }
}
