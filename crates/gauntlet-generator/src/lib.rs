//! Random level generation for arithmetic path puzzles.
//!
//! [`LevelGenerator`] draws random candidate levels and keeps the first one
//! the verifier can solve. Every candidate is derived from a [`LevelSeed`],
//! so a generated level can be reproduced exactly from its seed.
//!
//! [`generate_grid`] produces the simpler right/down-only grids used with
//! [`gauntlet_solver::count_valid_paths`], and [`generate_basic_level`]
//! turns them into playable levels of increasing difficulty.
//!
//! # Examples
//!
//! ```
//! use gauntlet_generator::{GeneratorConfig, LevelGenerator};
//! use gauntlet_solver::VerifierConfig;
//!
//! let generator = LevelGenerator::new(GeneratorConfig {
//!     max_iterations: 10,
//!     verifier: VerifierConfig { max_attempts: 100, ..VerifierConfig::default() },
//! });
//! match generator.generate(3) {
//!     Some(generated) => println!("seed {}", generated.seed),
//!     None => println!("no solvable level found"),
//! }
//! ```

pub use self::{basic::*, generator::*, random::*, seed::*};

mod basic;
mod generator;
mod random;
mod seed;
