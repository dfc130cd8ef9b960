//! Photon native demo driver
//!
//! Loads a level layout (JSON path as the first argument) or the built-in
//! demo level, prints every beam, then rotates the first mirror and prints
//! the recompute result.

use std::process::ExitCode;

use glam::{IVec2, Vec3};
use photon::persistence::LevelLayout;
use photon::sim::{Block, Direction, Emitter, Level, SegmentTree};
use photon::{LevelError, Settings};

fn demo_level() -> Result<Level, LevelError> {
    let mut level = Level::new(4, 5)?;
    for (x, y) in [(1, 1), (0, 2), (1, 2), (2, 1), (2, 2)] {
        level.place(IVec2::new(x, y), Block::Plain)?;
    }
    level.place(IVec2::new(3, 0), Block::mirror(1))?;
    level.place(IVec2::new(3, 4), Block::target(Vec3::new(1.0, 0.0, 0.0)))?;
    level.add_emitter(Emitter::new(
        IVec2::ZERO,
        Direction::East,
        Vec3::new(1.0, 0.0, 0.0),
    ));
    Ok(level)
}

fn load_level(path: &str) -> Result<Level, LevelError> {
    let json = std::fs::read_to_string(path)?;
    let mut layout = LevelLayout::from_json(&json)?;
    if let Some(settings_path) = std::env::args().nth(2) {
        layout.settings = Settings::load(settings_path);
    }
    layout.to_level()
}

fn print_tree(tree: &SegmentTree) {
    for (id, segment) in tree.iter() {
        let depth = std::iter::successors(segment.parent, |p| tree.parent(*p)).count();
        println!(
            "  {}#{} ({:.1}, {:.1}) -> ({:.1}, {:.1}) {:?} {:?}",
            "  ".repeat(depth),
            id.0,
            segment.start.x,
            segment.start.y,
            segment.end.x,
            segment.end.y,
            segment.direction,
            segment.termination
        );
    }
}

fn print_level(level: &Level) {
    for (id, tree) in level.trees() {
        println!("{:?}: {} segment(s)", id, tree.len());
        print_tree(tree);
    }
    println!(
        "targets lit: {}/{}{}",
        level.lit_targets().len(),
        level.targets().count(),
        if level.is_solved() { " - solved!" } else { "" }
    );
}

fn run() -> Result<(), LevelError> {
    let mut level = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading level from {}", path);
            load_level(&path)?
        }
        None => {
            log::info!("No level given, using demo level");
            demo_level()?
        }
    };
    print_level(&level);

    let mirror = level
        .grid()
        .iter()
        .find(|(_, block)| matches!(block, Block::Mirror { .. }))
        .map(|(cell, _)| cell);
    if let Some(cell) = mirror {
        let change = level.rotate(cell, true)?;
        println!(
            "\nrotated mirror at ({}, {}): {} beam(s) recomputed",
            cell.x,
            cell.y,
            change.affected.len()
        );
        print_level(&level);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Photon (native) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
