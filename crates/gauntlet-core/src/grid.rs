//! Grid containers and cell contents.
//!
//! [`Grid`] is a dense, row-major 2D container indexed by [`Position`]. Two
//! instantiations are used throughout the workspace:
//!
//! - [`BuilderGrid`] (`Grid<CellData>`): operation tokens plus power-up items,
//!   used by levels and the randomized solver.
//! - [`SimpleGrid`] (`Grid<Token>`): bare tokens, used by the monotonic
//!   path-counting mode.
//!
//! Grids serialize as nested arrays (`T[][]`). Deserialization rejects ragged
//! rows.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeSeq as _};

use crate::{Position, Token};

/// A power-up carried by a cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// No power-up.
    #[default]
    None,
    /// Grants one revisit of a cell already on the path.
    Backtrack,
    /// Grants one extra diagonal move.
    Diagonal,
}

/// The gameplay content of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    /// Operation applied when the cell is entered.
    pub value: Token,
    /// Power-up granted when the cell is entered.
    pub item: ItemType,
}

impl CellData {
    /// Creates a cell without a power-up.
    #[must_use]
    pub fn new(value: impl Into<Token>) -> Self {
        Self {
            value: value.into(),
            item: ItemType::None,
        }
    }

    /// Returns this cell with `item` attached.
    #[must_use]
    pub fn with_item(mut self, item: ItemType) -> Self {
        self.item = item;
        self
    }
}

impl Default for CellData {
    fn default() -> Self {
        Self::new(Token::unset())
    }
}

/// Errors produced when building a grid from nested rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridError {
    /// A row's length differs from the first row's.
    #[display("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
}

/// A dense 2D grid stored in row-major order.
///
/// Dimensions are fixed at construction. A grid with zero rows or zero
/// columns is normalized to the empty `0 x 0` grid.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{Grid, Position};
///
/// let mut grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]])?;
/// assert_eq!((grid.rows(), grid.cols()), (2, 3));
/// assert_eq!(grid[Position::new(1, 2)], 6);
///
/// grid[Position::new(0, 0)] = 10;
/// assert_eq!(grid.get(Position::new(0, 0)), Some(&10));
/// assert_eq!(grid.get(Position::new(2, 0)), None);
/// # Ok::<(), gauntlet_core::GridError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

/// A grid of cells with tokens and items.
pub type BuilderGrid = Grid<CellData>;

/// A grid of bare tokens.
pub type SimpleGrid = Grid<Token>;

impl<T> Grid<T> {
    /// Creates a grid by calling `f` for every position in row-major order.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        if rows == 0 || cols == 0 {
            return Self::empty();
        }
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Position::new(row, col)))
            .map(&mut f)
            .collect();
        Self { rows, cols, cells }
    }

    /// Creates a grid from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Ragged`] if the rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(GridError::Ragged {
                row,
                expected,
                found,
            });
        }
        if expected == 0 {
            return Ok(Self::empty());
        }
        let row_count = rows.len();
        let cells = rows.into_iter().flatten().collect();
        Ok(Self {
            rows: row_count,
            cols: expected,
            cells,
        })
    }

    /// Creates the empty `0 x 0` grid.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `true` if the grid has no cells.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if the grid has as many rows as columns.
    #[must_use]
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns `true` if `pos` lies inside the grid.
    #[must_use]
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Returns the cell at `pos`, or `None` if out of bounds.
    #[must_use]
    #[inline]
    pub fn get(&self, pos: Position) -> Option<&T> {
        self.contains(pos)
            .then(|| &self.cells[pos.row * self.cols + pos.col])
    }

    /// Returns the cell at `pos` mutably, or `None` if out of bounds.
    #[must_use]
    #[inline]
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        if self.contains(pos) {
            Some(&mut self.cells[pos.row * self.cols + pos.col])
        } else {
            None
        }
    }

    /// Returns an iterator over all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<T> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }

    /// Returns an iterator over the rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.cols.max(1))
    }

    /// Creates a new grid of the same shape by mapping every cell.
    #[must_use]
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Position) -> &T {
        assert!(
            self.contains(pos),
            "position {pos} out of bounds for {}x{} grid",
            self.rows,
            self.cols
        );
        &self.cells[pos.row * self.cols + pos.col]
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, pos: Position) -> &mut T {
        assert!(
            self.contains(pos),
            "position {pos} out of bounds for {}x{} grid",
            self.rows,
            self.cols
        );
        &mut self.cells[pos.row * self.cols + pos.col]
    }
}

impl BuilderGrid {
    /// Creates a `size x size` grid of unset (`?`) cells without items.
    ///
    /// This is the blank state an editor starts from.
    ///
    /// # Examples
    ///
    /// ```
    /// use gauntlet_core::{BuilderGrid, ItemType, Position, Token};
    ///
    /// let grid = BuilderGrid::unset(3);
    /// assert!(grid.is_square());
    /// assert_eq!(grid[Position::new(2, 2)].value, Token::unset());
    /// assert_eq!(grid[Position::new(2, 2)].item, ItemType::None);
    /// ```
    #[must_use]
    pub fn unset(size: usize) -> Self {
        Self::from_fn(size, size, |_| CellData::default())
    }

    /// Drops items and keeps only the tokens.
    #[must_use]
    pub fn to_simple(&self) -> SimpleGrid {
        self.map(|cell| cell.value.clone())
    }
}

impl From<&SimpleGrid> for BuilderGrid {
    /// Wraps every token in a cell without an item.
    fn from(grid: &SimpleGrid) -> Self {
        grid.map(|token| CellData::new(token.clone()))
    }
}

impl<T> Serialize for Grid<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.rows))?;
        for row in self.iter_rows() {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

impl<'de, T> Deserialize<'de> for Grid<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<T>>::deserialize(deserializer)?;
        Self::from_rows(rows).map_err(de::Error::custom)
    }
}

/// The neighborhood topology of a grid.
///
/// Only square cells exist today; the type is kept so levels can name their
/// topology explicitly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridShape {
    /// Square cells with four orthogonal and four diagonal neighbors.
    #[default]
    Square,
}

impl GridShape {
    const SQUARE_ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    const SQUARE_DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

    /// Returns the in-bounds orthogonal neighbors of `pos`.
    pub fn orthogonal_neighbors(
        self,
        pos: Position,
        rows: usize,
        cols: usize,
    ) -> impl Iterator<Item = Position> {
        let offsets = match self {
            Self::Square => Self::SQUARE_ORTHOGONAL,
        };
        offsets
            .into_iter()
            .filter_map(move |(d_row, d_col)| pos.offset(d_row, d_col, rows, cols))
    }

    /// Returns the in-bounds diagonal neighbors of `pos`.
    pub fn diagonal_neighbors(
        self,
        pos: Position,
        rows: usize,
        cols: usize,
    ) -> impl Iterator<Item = Position> {
        let offsets = match self {
            Self::Square => Self::SQUARE_DIAGONAL,
        };
        offsets
            .into_iter()
            .filter_map(move |(d_row, d_col)| pos.offset(d_row, d_col, rows, cols))
    }
}
