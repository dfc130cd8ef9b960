//! Property tests for beam propagation and recompute scheduling

use glam::{IVec2, Vec3};
use photon::sim::{Block, Direction, Emitter, Grid, Level, propagate};
use proptest::prelude::*;

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        4 => Just(Block::Empty),
        1 => Just(Block::Plain),
        2 => (0u8..4).prop_map(Block::mirror),
        1 => (0u8..4).prop_map(Block::splitter),
        1 => (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0)
            .prop_map(|(r, g, b)| Block::absorber(Vec3::new(r, g, b))),
        1 => Just(Block::target(Vec3::X)),
    ]
}

/// Grid plus an emitter somewhere inside it
fn scene() -> impl Strategy<Value = (Grid, Emitter)> {
    (1i64..8, 1i64..8).prop_flat_map(|(w, h)| {
        (
            prop::collection::vec(block(), (w * h) as usize),
            0..w as i32,
            0..h as i32,
            0usize..8,
        )
            .prop_map(move |(blocks, x, y, dir)| {
                let mut grid = Grid::new(w, h).unwrap();
                for (i, b) in blocks.into_iter().enumerate() {
                    let cell = IVec2::new((i as i64 % w) as i32, (i as i64 / w) as i32);
                    grid.set(cell, b).unwrap();
                }
                let emitter = Emitter::new(IVec2::new(x, y), Direction::ALL[dir], Vec3::ONE);
                (grid, emitter)
            })
    })
}

proptest! {
    #[test]
    fn prop_segment_count_bounded((grid, emitter) in scene()) {
        let tree = propagate(&grid, &emitter);
        let directions = if emitter.direction.is_diagonal() { 8 } else { 4 };
        prop_assert!(!tree.is_empty());
        // Only a fresh (cell, direction) entry can turn, into at most two children
        prop_assert!(tree.len() <= 1 + 2 * grid.area() * directions);
    }

    #[test]
    fn prop_tree_links_are_consistent((grid, emitter) in scene()) {
        let tree = propagate(&grid, &emitter);
        prop_assert_eq!(tree.parent(tree.root()), None);
        for (id, segment) in tree.iter().skip(1) {
            let parent = segment.parent.expect("non-root segment has a parent");
            prop_assert!(parent < id);
            prop_assert!(tree.children(parent).contains(&id));
        }
    }

    #[test]
    fn prop_propagate_is_idempotent((grid, emitter) in scene()) {
        prop_assert_eq!(propagate(&grid, &emitter), propagate(&grid, &emitter));
    }

    #[test]
    fn prop_rotate_round_trip((grid, emitter) in scene(), cx in 0i32..8, cy in 0i32..8, cw in any::<bool>()) {
        let cell = IVec2::new(cx % grid.width() as i32, cy % grid.height() as i32);
        let mut level = Level::from_grid(grid, Default::default());
        level.add_emitter(emitter);
        let before = level.grid().get(cell).unwrap();
        let trees_before: Vec<_> = level.trees().map(|(_, t)| t.clone()).collect();

        level.rotate(cell, cw).unwrap();
        level.rotate(cell, !cw).unwrap();

        prop_assert_eq!(level.grid().get(cell).unwrap(), before);
        let trees_after: Vec<_> = level.trees().map(|(_, t)| t.clone()).collect();
        prop_assert_eq!(trees_before, trees_after);
    }

    #[test]
    fn prop_scheduled_trees_match_full_rebuild(
        (grid, emitter) in scene(),
        cx in 0i32..8,
        cy in 0i32..8,
        placed in block(),
    ) {
        let cell = IVec2::new(cx % grid.width() as i32, cy % grid.height() as i32);
        let mut level = Level::from_grid(grid, Default::default());
        level.add_emitter(emitter);
        level.place(cell, placed).unwrap();

        for (_, tree) in level.trees() {
            prop_assert_eq!(tree, &propagate(level.grid(), tree.emitter()));
        }
    }
}
