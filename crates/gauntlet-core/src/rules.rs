//! Movement rules and power-ups.
//!
//! A move goes from the current cell to a neighbor. Orthogonal steps are
//! always available; a diagonal step needs a diagonal move in stock and uses
//! it up. Entering a cell that is already on the path needs the backtrack
//! power and uses it up. After those costs are paid, the destination's item
//! grants its power, so stepping back onto a backtrack cell re-grants the
//! power that the step just consumed.

use std::collections::HashSet;

use crate::{BuilderGrid, ItemType, Position, SearchProblem};

/// The kind of step between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Up, down, left or right.
    Orthogonal,
    /// One step along a diagonal.
    Diagonal,
}

/// Why a move is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// The destination is neither an orthogonal nor a diagonal neighbor.
    #[display("{to} is not adjacent to {from}")]
    NotAdjacent {
        /// Current cell.
        from: Position,
        /// Requested destination.
        to: Position,
    },
    /// A diagonal step was requested without a diagonal move in stock.
    #[display("no diagonal move available")]
    NoDiagonalMove,
    /// The destination is on the path and no backtrack power is held.
    #[display("{pos} was already visited")]
    AlreadyVisited {
        /// Requested destination.
        pos: Position,
    },
}

/// Powers held by the player at one point of a path.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{ItemType, Position, rules::{MoveKind, Powers}};
///
/// let powers = Powers::on_start(ItemType::Diagonal);
/// let kind = powers.check_move(Position::new(0, 0), Position::new(1, 1), false)?;
/// assert_eq!(kind, MoveKind::Diagonal);
///
/// let powers = powers.after_move(kind, false, ItemType::Backtrack);
/// assert_eq!(powers.diagonal_moves(), 0);
/// assert!(powers.has_backtrack());
/// # Ok::<(), gauntlet_core::rules::MoveError>(())
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Powers {
    backtrack: bool,
    diagonal_moves: u32,
}

impl Powers {
    /// Holding nothing.
    pub const NONE: Self = Self {
        backtrack: false,
        diagonal_moves: 0,
    };

    /// Returns the powers granted by the start cell's item.
    #[must_use]
    pub fn on_start(item: ItemType) -> Self {
        Self::NONE.gain(item)
    }

    /// Returns `true` if a revisit is currently allowed.
    #[must_use]
    #[inline]
    pub fn has_backtrack(self) -> bool {
        self.backtrack
    }

    /// Returns the number of diagonal moves in stock.
    #[must_use]
    #[inline]
    pub fn diagonal_moves(self) -> u32 {
        self.diagonal_moves
    }

    /// Checks whether a step from `from` to `to` is legal.
    ///
    /// `revisit` tells whether `to` is already on the path.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] describing the first rule the step breaks.
    pub fn check_move(
        self,
        from: Position,
        to: Position,
        revisit: bool,
    ) -> Result<MoveKind, MoveError> {
        let kind = if from.is_orthogonal_step(to) {
            MoveKind::Orthogonal
        } else if from.is_diagonal_step(to) {
            if self.diagonal_moves == 0 {
                return Err(MoveError::NoDiagonalMove);
            }
            MoveKind::Diagonal
        } else {
            return Err(MoveError::NotAdjacent { from, to });
        };
        if revisit && !self.backtrack {
            return Err(MoveError::AlreadyVisited { pos: to });
        }
        Ok(kind)
    }

    /// Returns the powers after taking a checked step.
    ///
    /// Costs are paid first (a diagonal move for a diagonal step, the
    /// backtrack power for a revisit), then `item` of the destination grants
    /// its power.
    #[must_use]
    pub fn after_move(self, kind: MoveKind, revisit: bool, item: ItemType) -> Self {
        let mut next = self;
        if kind == MoveKind::Diagonal {
            next.diagonal_moves = next.diagonal_moves.saturating_sub(1);
        }
        if revisit {
            next.backtrack = false;
        }
        next.gain(item)
    }

    fn gain(mut self, item: ItemType) -> Self {
        match item {
            ItemType::None => {}
            ItemType::Backtrack => self.backtrack = true,
            ItemType::Diagonal => self.diagonal_moves += 1,
        }
        self
    }
}

/// Why a path is not a valid solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PathError {
    /// The path has no cells.
    #[display("path is empty")]
    Empty,
    /// The path does not begin at the start cell.
    #[display("path begins at {pos}, not at the start cell")]
    WrongStart {
        /// First cell of the path.
        pos: Position,
    },
    /// A cell lies outside the grid.
    #[display("step {index} leaves the grid at {pos}")]
    OutOfBounds {
        /// Index of the offending cell in the path.
        index: usize,
        /// Offending position.
        pos: Position,
    },
    /// A step breaks a movement rule.
    #[display("step {index} is illegal: {source}")]
    IllegalMove {
        /// Index of the offending cell in the path.
        index: usize,
        /// The broken rule.
        source: MoveError,
    },
    /// The path reaches the goal before its last cell.
    #[display("path reaches the goal early at step {index}")]
    PassesGoal {
        /// Index where the goal was reached.
        index: usize,
    },
    /// The path does not end at the goal cell.
    #[display("path ends at {pos}, not at the goal cell")]
    WrongEnd {
        /// Last cell of the path.
        pos: Position,
    },
    /// The final value misses the goal range.
    #[display("final value {value} is outside the goal range")]
    OutOfRange {
        /// Value at the goal.
        value: i64,
    },
}

/// Replays `path` on `grid` and returns the value reached at the goal.
///
/// The path must list every cell from the start to the goal, inclusive, and
/// every step must be legal under the power rules in effect at that step.
///
/// # Errors
///
/// Returns [`PathError`] for the first problem found.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{BuilderGrid, CellData, GoalRange, Position, SearchProblem, rules};
///
/// let mut grid = BuilderGrid::unset(2);
/// grid[Position::new(0, 1)] = CellData::new("2x");
/// grid[Position::new(1, 1)] = CellData::new("+1");
/// let problem = SearchProblem {
///     start: Position::new(0, 0),
///     start_value: 3,
///     goal: Position::new(1, 1),
///     goal_range: GoalRange::new(7, 7)?,
/// };
/// let path = [Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)];
/// assert_eq!(rules::validate_path(&grid, &problem, &path), Ok(7));
/// # Ok::<(), gauntlet_core::GoalRangeError>(())
/// ```
pub fn validate_path(
    grid: &BuilderGrid,
    problem: &SearchProblem,
    path: &[Position],
) -> Result<i64, PathError> {
    let (&first, steps) = path.split_first().ok_or(PathError::Empty)?;
    if first != problem.start {
        return Err(PathError::WrongStart { pos: first });
    }
    let Some(start_cell) = grid.get(first) else {
        return Err(PathError::OutOfBounds {
            index: 0,
            pos: first,
        });
    };

    let mut visited = HashSet::from([first]);
    let mut powers = Powers::on_start(start_cell.item);
    let mut value = problem.start_value;
    let mut current = first;

    for (i, &next) in steps.iter().enumerate() {
        let index = i + 1;
        if current == problem.goal {
            return Err(PathError::PassesGoal { index: index - 1 });
        }
        let Some(cell) = grid.get(next) else {
            return Err(PathError::OutOfBounds { index, pos: next });
        };
        let revisit = visited.contains(&next);
        let kind = powers
            .check_move(current, next, revisit)
            .map_err(|source| PathError::IllegalMove { index, source })?;
        powers = powers.after_move(kind, revisit, cell.item);
        value = cell.value.apply(value);
        visited.insert(next);
        current = next;
    }

    if current != problem.goal {
        return Err(PathError::WrongEnd { pos: current });
    }
    if !problem.goal_range.contains(value) {
        return Err(PathError::OutOfRange { value });
    }
    Ok(value)
}
