//! Complete puzzle instances.

use serde::{Deserialize, Serialize};

use crate::{BuilderGrid, Position, SimpleGrid};

/// An inclusive range of winning values at the goal cell.
///
/// `low <= high` always holds. Serialized as `[low, high]`.
///
/// # Examples
///
/// ```
/// use gauntlet_core::GoalRange;
///
/// let range = GoalRange::new(50, 120)?;
/// assert!(range.contains(50) && range.contains(120));
/// assert!(!range.contains(121));
/// assert_eq!(range.distance(40), 10);
/// assert_eq!(range.distance(100), 0);
///
/// assert!(GoalRange::new(5, 4).is_err());
/// # Ok::<(), gauntlet_core::GoalRangeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i64; 2]", into = "[i64; 2]")]
pub struct GoalRange {
    low: i64,
    high: i64,
}

/// Error returned when a goal range has `low > high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("goal range is inverted: low {low} > high {high}")]
pub struct GoalRangeError {
    low: i64,
    high: i64,
}

impl GoalRange {
    /// Creates a new range.
    ///
    /// # Errors
    ///
    /// Returns [`GoalRangeError`] if `low > high`.
    pub fn new(low: i64, high: i64) -> Result<Self, GoalRangeError> {
        if low > high {
            return Err(GoalRangeError { low, high });
        }
        Ok(Self { low, high })
    }

    /// Creates the range `low..=low + width`, saturating at `i64::MAX`.
    #[must_use]
    pub fn spanning(low: i64, width: u64) -> Self {
        let high = low.saturating_add_unsigned(width);
        Self { low, high }
    }

    /// Returns the lower bound.
    #[must_use]
    #[inline]
    pub fn low(self) -> i64 {
        self.low
    }

    /// Returns the upper bound.
    #[must_use]
    #[inline]
    pub fn high(self) -> i64 {
        self.high
    }

    /// Returns `true` if `value` lies inside the range.
    #[must_use]
    #[inline]
    pub fn contains(self, value: i64) -> bool {
        (self.low..=self.high).contains(&value)
    }

    /// Returns how far `value` is from the nearest bound, or `0` if inside.
    #[must_use]
    pub fn distance(self, value: i64) -> u64 {
        if self.contains(value) {
            0
        } else {
            value.abs_diff(self.low).min(value.abs_diff(self.high))
        }
    }
}

impl TryFrom<[i64; 2]> for GoalRange {
    type Error = GoalRangeError;

    fn try_from([low, high]: [i64; 2]) -> Result<Self, Self::Error> {
        Self::new(low, high)
    }
}

impl From<GoalRange> for [i64; 2] {
    fn from(range: GoalRange) -> Self {
        [range.low, range.high]
    }
}

/// The parameters of one search: where to start, with what value, and where
/// and what to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProblem {
    /// Start cell.
    pub start: Position,
    /// Value held on the start cell.
    pub start_value: i64,
    /// Goal cell.
    pub goal: Position,
    /// Winning values at the goal cell.
    pub goal_range: GoalRange,
}

/// A concrete puzzle instance.
///
/// This is the schema of record for saved and shared levels:
/// `{ gridSize, grid, startPos, goalPos, startValue, goalRange }`.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{BuilderGrid, CellData, GoalRange, LevelData, Position};
///
/// let mut grid = BuilderGrid::unset(2);
/// grid[Position::new(0, 1)] = CellData::new("+3");
/// let level = LevelData {
///     grid_size: 2,
///     grid,
///     start_pos: Position::new(0, 0),
///     goal_pos: Position::new(0, 1),
///     start_value: 4,
///     goal_range: GoalRange::new(7, 7)?,
/// };
/// level.validate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    /// Number of rows and columns.
    pub grid_size: usize,
    /// Cell contents.
    pub grid: BuilderGrid,
    /// Start cell.
    pub start_pos: Position,
    /// Goal cell.
    pub goal_pos: Position,
    /// Value held on the start cell.
    pub start_value: i64,
    /// Winning values at the goal cell.
    pub goal_range: GoalRange,
}

/// Structural problems detected by [`LevelData::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LevelError {
    /// The grid is not square.
    #[display("grid is not square: {rows}x{cols}")]
    NotSquare {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },
    /// `gridSize` disagrees with the grid.
    #[display("grid size {grid_size} does not match a {rows}x{rows} grid")]
    SizeMismatch {
        /// Declared size.
        grid_size: usize,
        /// Actual row count.
        rows: usize,
    },
    /// The start cell lies outside the grid.
    #[display("start position {pos} is out of bounds")]
    StartOutOfBounds {
        /// Offending position.
        pos: Position,
    },
    /// The goal cell lies outside the grid.
    #[display("goal position {pos} is out of bounds")]
    GoalOutOfBounds {
        /// Offending position.
        pos: Position,
    },
    /// Start and goal are the same cell.
    #[display("start and goal are the same cell {pos}")]
    StartIsGoal {
        /// The shared position.
        pos: Position,
    },
    /// The start cell of a simple grid holds no integer literal.
    #[display("start cell {pos} holds no number")]
    StartNotLiteral {
        /// The start cell.
        pos: Position,
    },
}

impl LevelData {
    /// Checks the structural invariants of the level.
    ///
    /// # Errors
    ///
    /// Returns the first [`LevelError`] found: a non-square grid, a size
    /// mismatch, an out-of-bounds start or goal, or a start equal to the goal.
    pub fn validate(&self) -> Result<(), LevelError> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        if rows != cols {
            return Err(LevelError::NotSquare { rows, cols });
        }
        if rows != self.grid_size {
            return Err(LevelError::SizeMismatch {
                grid_size: self.grid_size,
                rows,
            });
        }
        if !self.grid.contains(self.start_pos) {
            return Err(LevelError::StartOutOfBounds {
                pos: self.start_pos,
            });
        }
        if !self.grid.contains(self.goal_pos) {
            return Err(LevelError::GoalOutOfBounds { pos: self.goal_pos });
        }
        if self.start_pos == self.goal_pos {
            return Err(LevelError::StartIsGoal {
                pos: self.start_pos,
            });
        }
        Ok(())
    }

    /// Builds a level from a right/down grid.
    ///
    /// The start is the top-left cell and its literal is the start value; the
    /// goal is the bottom-right cell. No cell carries an item.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError`] if the grid fails [`LevelData::validate`] (for
    /// example, when it is not square or is smaller than `2x2`), or if the
    /// top-left cell holds no number.
    ///
    /// # Examples
    ///
    /// ```
    /// use gauntlet_core::{GoalRange, LevelData, Position, SimpleGrid};
    ///
    /// let grid: SimpleGrid = serde_json::from_str(r#"[["4", "+1"], ["2x", "+0"]]"#)?;
    /// let level = LevelData::from_simple_grid(&grid, GoalRange::new(5, 8)?)?;
    /// assert_eq!(level.start_value, 4);
    /// assert_eq!(level.goal_pos, Position::new(1, 1));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_simple_grid(grid: &SimpleGrid, goal_range: GoalRange) -> Result<Self, LevelError> {
        let size = grid.rows();
        let start_pos = Position::new(0, 0);
        let last = size.saturating_sub(1);
        let level = Self {
            grid_size: size,
            grid: BuilderGrid::from(grid),
            start_pos,
            goal_pos: Position::new(last, last),
            start_value: 0,
            goal_range,
        };
        level.validate()?;
        let start_value = grid[start_pos]
            .literal_value()
            .ok_or(LevelError::StartNotLiteral { pos: start_pos })?;
        Ok(Self {
            start_value,
            ..level
        })
    }

    /// Returns the search parameters of this level.
    #[must_use]
    pub fn problem(&self) -> SearchProblem {
        SearchProblem {
            start: self.start_pos,
            start_value: self.start_value,
            goal: self.goal_pos,
            goal_range: self.goal_range,
        }
    }
}
