//! Grid coordinates.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A cell coordinate within a grid.
///
/// Rows grow downward and columns grow rightward, both starting at `0`.
/// Serialized as `{ "r": row, "c": col }`.
///
/// # Examples
///
/// ```
/// use gauntlet_core::Position;
///
/// let pos = Position::new(1, 2);
/// assert!(pos.is_orthogonal_step(Position::new(1, 3)));
/// assert!(pos.is_diagonal_step(Position::new(0, 1)));
/// assert_eq!(pos.offset(-2, 0, 5, 5), None);
/// ```
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// Row index.
    #[serde(rename = "r")]
    pub row: usize,
    /// Column index.
    #[serde(rename = "c")]
    pub col: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the position shifted by `(d_row, d_col)` if it stays inside a
    /// `rows` x `cols` grid.
    #[must_use]
    #[inline]
    pub fn offset(self, d_row: isize, d_col: isize, rows: usize, cols: usize) -> Option<Self> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        (row < rows && col < cols).then_some(Self { row, col })
    }

    /// Returns `true` if `other` is one step up, down, left or right.
    #[must_use]
    #[inline]
    pub fn is_orthogonal_step(self, other: Self) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// Returns `true` if `other` is one step along a diagonal.
    #[must_use]
    #[inline]
    pub fn is_diagonal_step(self, other: Self) -> bool {
        self.row.abs_diff(other.row) == 1 && self.col.abs_diff(other.col) == 1
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
