use std::collections::HashSet;

use gauntlet_core::{
    LevelData, LevelError, Position,
    rules::{MoveKind, Powers},
};
use serde::{Deserialize, Serialize};

use crate::{GameError, ReplayError};

/// Whether a game is still running.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// The goal has not been reached.
    #[default]
    #[display("playing")]
    Playing,
    /// The goal was reached with a value inside the goal range.
    #[display("won")]
    Won,
    /// The goal was reached with a value outside the goal range.
    #[display("lost")]
    Lost,
}

/// What a successful [`Game::move_to`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Orthogonal or diagonal.
    pub kind: MoveKind,
    /// `true` if the destination was already visited and backtrack was spent.
    pub revisit: bool,
    /// Value after entering the destination.
    pub value: i64,
    /// Status after the move.
    pub status: GameStatus,
}

/// A play session on one level.
///
/// The player starts on the start cell holding the start value and the
/// powers of the start cell's item. Every move enters a neighboring cell and
/// applies its token. Reaching the goal ends the game.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{BuilderGrid, CellData, GoalRange, LevelData, Position};
/// use gauntlet_game::{Game, GameStatus};
///
/// let mut grid = BuilderGrid::unset(2);
/// grid[Position::new(0, 1)] = CellData::new("2x");
/// grid[Position::new(1, 1)] = CellData::new("+1");
/// let level = LevelData {
///     grid_size: 2,
///     grid,
///     start_pos: Position::new(0, 0),
///     goal_pos: Position::new(1, 1),
///     start_value: 3,
///     goal_range: GoalRange::new(7, 7)?,
/// };
///
/// let mut game = Game::new(level)?;
/// game.move_to(Position::new(0, 1))?;
/// assert_eq!(game.value(), 6);
/// let outcome = game.move_to(Position::new(1, 1))?;
/// assert_eq!(outcome.status, GameStatus::Won);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    level: LevelData,
    current: Position,
    value: i64,
    powers: Powers,
    visited: HashSet<Position>,
    path: Vec<Position>,
    status: GameStatus,
}

impl Game {
    /// Starts a game on `level`.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError`] if the level is structurally invalid.
    pub fn new(level: LevelData) -> Result<Self, LevelError> {
        level.validate()?;
        let start = level.start_pos;
        let powers = Powers::on_start(level.grid[start].item);
        Ok(Self {
            current: start,
            value: level.start_value,
            powers,
            visited: HashSet::from([start]),
            path: vec![start],
            status: GameStatus::Playing,
            level,
        })
    }

    /// Returns the level being played.
    #[must_use]
    pub fn level(&self) -> &LevelData {
        &self.level
    }

    /// Returns the cell the player stands on.
    #[must_use]
    pub fn position(&self) -> Position {
        self.current
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Returns the powers currently held.
    #[must_use]
    pub fn powers(&self) -> Powers {
        self.powers
    }

    /// Returns every cell entered so far, starting with the start cell.
    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Returns the game status.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns `true` if the player has stood on `pos`.
    #[must_use]
    pub fn is_visited(&self, pos: Position) -> bool {
        self.visited.contains(&pos)
    }

    /// Returns how far the current value is from the nearest goal bound.
    ///
    /// This is `0` when the value is inside the goal range.
    #[must_use]
    pub fn closest_difference(&self) -> u64 {
        self.level.goal_range.distance(self.value)
    }

    /// Returns every cell the player may enter next.
    ///
    /// Empty once the game is over.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Position> {
        if !self.status.is_playing() {
            return Vec::new();
        }
        self.level
            .grid
            .positions()
            .filter(|&pos| {
                self.powers
                    .check_move(self.current, pos, self.is_visited(pos))
                    .is_ok()
            })
            .collect()
    }

    /// Moves the player to `pos`.
    ///
    /// Costs are paid before the destination's item is collected, so entering
    /// a visited backtrack cell spends the power and then grants it again.
    ///
    /// # Errors
    ///
    /// Returns [`GameError`] if the game is over, `pos` is outside the grid,
    /// or the step breaks a movement rule. The game is unchanged on error.
    pub fn move_to(&mut self, pos: Position) -> Result<MoveOutcome, GameError> {
        if !self.status.is_playing() {
            return Err(GameError::GameOver {
                status: self.status,
            });
        }
        let Some(cell) = self.level.grid.get(pos) else {
            return Err(GameError::OutOfBounds { pos });
        };
        let revisit = self.is_visited(pos);
        let kind = self
            .powers
            .check_move(self.current, pos, revisit)
            .map_err(|source| GameError::IllegalMove { source })?;

        self.powers = self.powers.after_move(kind, revisit, cell.item);
        self.value = cell.value.apply(self.value);
        self.current = pos;
        self.visited.insert(pos);
        self.path.push(pos);

        if pos == self.level.goal_pos {
            self.status = if self.level.goal_range.contains(self.value) {
                GameStatus::Won
            } else {
                GameStatus::Lost
            };
        }

        Ok(MoveOutcome {
            kind,
            revisit,
            value: self.value,
            status: self.status,
        })
    }
}

/// Plays `path` on `level` and returns the finished game.
///
/// `path` lists every cell from the start to the goal, inclusive, as
/// returned by the solver and the generator.
///
/// # Errors
///
/// Returns [`ReplayError`] if the level is invalid, the path does not begin
/// at the start cell, a step is rejected, or the path does not end in a win.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{BuilderGrid, CellData, GoalRange, LevelData, Position};
/// use gauntlet_game::{ReplayError, replay};
///
/// let mut grid = BuilderGrid::unset(2);
/// grid[Position::new(0, 1)] = CellData::new("+5");
/// let level = LevelData {
///     grid_size: 2,
///     grid,
///     start_pos: Position::new(0, 0),
///     goal_pos: Position::new(0, 1),
///     start_value: 1,
///     goal_range: GoalRange::new(6, 6)?,
/// };
///
/// let game = replay(&level, &[Position::new(0, 0), Position::new(0, 1)])?;
/// assert_eq!(game.value(), 6);
///
/// let err = replay(&level, &[Position::new(0, 0), Position::new(1, 0)]).unwrap_err();
/// assert!(matches!(err, ReplayError::NotWon { .. }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn replay(level: &LevelData, path: &[Position]) -> Result<Game, ReplayError> {
    let mut game =
        Game::new(level.clone()).map_err(|source| ReplayError::InvalidLevel { source })?;
    match path.first() {
        Some(&first) if first == level.start_pos => {}
        first => {
            return Err(ReplayError::WrongStart {
                pos: first.copied(),
            });
        }
    }
    for (index, &pos) in path.iter().enumerate().skip(1) {
        game.move_to(pos)
            .map_err(|source| ReplayError::Move { index, source })?;
    }
    if !game.status().is_won() {
        return Err(ReplayError::NotWon {
            status: game.status(),
            value: game.value(),
        });
    }
    Ok(game)
}
