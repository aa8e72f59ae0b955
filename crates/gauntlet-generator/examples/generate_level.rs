//! Example demonstrating level generation.
//!
//! This example shows how to:
//! - Create a `LevelGenerator`
//! - Generate a random level, or reproduce one from a seed
//! - Display the grid, goal range, seed, and solution path
//! - Sample many levels in parallel and keep the one with the longest
//!   solution path
//!
//! # Usage
//!
//! ```sh
//! cargo run --example generate_level
//! ```
//!
//! Choose the grid size (default: 5):
//!
//! ```sh
//! cargo run --example generate_level -- --size 7
//! ```
//!
//! Reproduce a level from its seed:
//!
//! ```sh
//! cargo run --example generate_level -- --seed c1d44bd6afaf8af64f126546884e19298acbdc33c3924a28136715de946ef3f1
//! ```
//!
//! Sample several levels and keep the one with the longest solution path:
//!
//! ```sh
//! cargo run --example generate_level -- --samples 32
//! ```

use std::process;

use clap::Parser;
use gauntlet_core::{LevelData, Position};
use gauntlet_generator::{GeneratedLevel, LevelGenerator, LevelSeed};
use rayon::prelude::*;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Number of rows and columns.
    #[arg(long, value_name = "N", default_value_t = 5)]
    size: usize,

    /// Seed to reproduce (64 hex digits).
    #[arg(long, value_name = "HEX", conflicts_with = "samples")]
    seed: Option<LevelSeed>,

    /// Levels to sample; the one with the longest solution path is shown.
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    samples: usize,
}

fn main() {
    let args = Args::parse();
    let generator = LevelGenerator::default();

    if args.size < 2 {
        eprintln!("--size must be at least 2.");
        process::exit(2);
    }
    if args.samples == 0 {
        eprintln!("--samples must be at least 1.");
        process::exit(2);
    }

    let generated = match args.seed {
        Some(seed) => generator.generate_with_seed(args.size, seed),
        None => (0..args.samples)
            .into_par_iter()
            .filter_map(|_| generator.generate(args.size))
            .max_by_key(|generated| generated.solution_path.len()),
    };

    let Some(generated) = generated else {
        eprintln!("No solvable level found.");
        process::exit(1);
    };
    print_level(&generated);
}

fn print_level(generated: &GeneratedLevel) {
    let level = &generated.level;

    println!("Seed:");
    println!("  {}", generated.seed);
    println!();

    println!("Grid:");
    for line in grid_lines(level, &generated.solution_path) {
        println!("  {line}");
    }
    println!();

    println!("Start: {} with value {}", level.start_pos, level.start_value);
    println!(
        "Goal:  {} in [{}, {}]",
        level.goal_pos,
        level.goal_range.low(),
        level.goal_range.high()
    );
    println!();

    println!("Solution ({} steps):", generated.solution_path.len() - 1);
    let path = generated
        .solution_path
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    println!("  {}", path.join(" -> "));
    println!();

    println!("Stats:");
    println!("  iterations: {}", generated.iterations);
    println!("  attempts: {}", generated.attempts);
}

fn grid_lines(level: &LevelData, path: &[Position]) -> Vec<String> {
    let width = level
        .grid
        .iter_rows()
        .flatten()
        .map(|cell| cell.value.as_str().len())
        .max()
        .unwrap_or(0);
    level
        .grid
        .iter_rows()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, cell)| {
                    let pos = Position::new(row, col);
                    let marker = if pos == level.start_pos {
                        'S'
                    } else if pos == level.goal_pos {
                        'G'
                    } else if path.contains(&pos) {
                        '*'
                    } else {
                        ' '
                    };
                    format!("{marker}{:>width$}", cell.value.as_str())
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
