//! Solvability analysis for arithmetic path puzzles.
//!
//! # Overview
//!
//! - [`path_count`]: exact counting of right/down paths whose final value
//!   lands in the goal range, for the basic monotonic mode.
//! - [`search`]: one randomized, budgeted depth-first attempt over the full
//!   move graph, with backtrack and diagonal powers.
//! - [`verifier`]: the Monte Carlo loop that repeats attempts until a path is
//!   found, the attempt cap is spent, or the host cancels.
//!
//! The search is incomplete by construction. A level reported as
//! [`VerificationStatus::Unverifiable`] may still have a solution.
//!
//! # Examples
//!
//! ```
//! use gauntlet_core::{BuilderGrid, CellData, GoalRange, LevelData, Position, rules};
//! use gauntlet_solver::verify_level;
//!
//! let mut grid = BuilderGrid::unset(3);
//! grid[Position::new(1, 1)] = CellData::new("2x");
//! grid[Position::new(2, 2)] = CellData::new("+1");
//! let level = LevelData {
//!     grid_size: 3,
//!     grid,
//!     start_pos: Position::new(0, 0),
//!     goal_pos: Position::new(2, 2),
//!     start_value: 3,
//!     goal_range: GoalRange::new(4, 7)?,
//! };
//!
//! let result = verify_level(&level, &mut ())?;
//! if let Some(path) = &result.path {
//!     assert!(rules::validate_path(&level.grid, &level.problem(), path).is_ok());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod path_count;
pub mod search;
pub mod verifier;

pub use self::{
    path_count::{count_valid_paths, final_value_distribution},
    search::{AttemptOutcome, SearchLimits, Solver, solve_attempt},
    verifier::{
        CancelFlag, ProgressObserver, VerificationResult, VerificationStatus, Verifier,
        VerifierConfig, VerifyObserver, verify_level,
    },
};
