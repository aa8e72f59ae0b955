use gauntlet_core::{LevelError, Position, rules::MoveError};

use crate::GameStatus;

/// Errors returned by [`Game`](crate::Game) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GameError {
    /// The game already ended.
    #[display("the game is over ({status})")]
    GameOver {
        /// Final status.
        status: GameStatus,
    },
    /// The destination lies outside the grid.
    #[display("{pos} is outside the grid")]
    OutOfBounds {
        /// Requested destination.
        pos: Position,
    },
    /// The step breaks a movement rule.
    #[display("illegal move: {source}")]
    IllegalMove {
        /// The broken rule.
        source: MoveError,
    },
}

/// Errors returned by [`replay`](crate::replay).
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ReplayError {
    /// The level itself is malformed.
    #[display("invalid level: {source}")]
    InvalidLevel {
        /// The structural problem.
        source: LevelError,
    },
    /// The path does not begin at the start cell.
    #[display("path must begin at the start cell, found {pos:?}")]
    WrongStart {
        /// First cell of the path, if any.
        pos: Option<Position>,
    },
    /// A step was rejected.
    #[display("step {index} was rejected: {source}")]
    Move {
        /// Index of the rejected cell in the path.
        index: usize,
        /// Why the step was rejected.
        source: GameError,
    },
    /// The path ended without winning.
    #[display("path ended with status {status} and value {value}")]
    NotWon {
        /// Status after the last step.
        status: GameStatus,
        /// Value after the last step.
        value: i64,
    },
}
