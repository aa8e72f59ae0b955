//! Core data structures for arithmetic path puzzles.
//!
//! A puzzle is a square grid of cells. Each cell carries an operation token
//! (`+5`, `0.5x`, `sqrt`, ...) and optionally a power-up item. The player walks
//! from a start cell to a goal cell, applying the token of every cell entered
//! to a running value, and wins when the value at the goal lies inside the goal
//! range.
//!
//! # Overview
//!
//! 1. **Operations** - Token semantics
//!    - [`token`]: Raw operation strings and the lenient, total [`apply_op`]
//!    - [`operation`]: The typed [`Operation`] form and the strict authoring
//!      grammar behind [`is_valid_operation`]
//!
//! 2. **Grids** - Cell containers
//!    - [`position`]: Row/column coordinates
//!    - [`grid`]: The generic [`Grid`] container, [`CellData`], [`ItemType`]
//!      and [`GridShape`] neighborhoods
//!
//! 3. **Levels** - Complete puzzle instances
//!    - [`level`]: [`GoalRange`], [`LevelData`] and [`SearchProblem`]
//!    - [`rules`]: Movement legality, power-ups and path validation
//!
//! # Examples
//!
//! ```
//! use gauntlet_core::{Token, apply_op};
//!
//! assert_eq!(apply_op(7, "+3"), 10);
//! assert_eq!(apply_op(7, "0.5x"), 3);
//! assert_eq!(Token::from("sqrt").apply(17), 4);
//!
//! // Malformed tokens leave the value unchanged.
//! assert_eq!(apply_op(7, "+abc"), 7);
//! ```

pub mod grid;
pub mod level;
pub mod operation;
pub mod position;
pub mod rules;
pub mod token;

pub use self::{
    grid::{BuilderGrid, CellData, Grid, GridError, GridShape, ItemType, SimpleGrid},
    level::{GoalRange, GoalRangeError, LevelData, LevelError, SearchProblem},
    operation::{MAX_VALUE, MIN_VALUE, Operation, ParseOperationError, is_valid_operation},
    position::Position,
    token::{Token, apply_op},
};
