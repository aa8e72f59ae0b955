//! Exact path counting for monotonic movement.
//!
//! In the basic game mode the player starts in the top-left cell and may only
//! move right or down until reaching the bottom-right cell. Different paths
//! can reach the same cell with different values, so each cell tracks a
//! histogram `value -> number of paths` rather than a single count.

use std::collections::{BTreeMap, HashMap};

use gauntlet_core::{GoalRange, Grid, Position, SimpleGrid};

const MONOTONIC_STEPS: [(isize, isize); 2] = [(0, 1), (1, 0)];

/// Returns how many right/down paths end in the bottom-right cell with a
/// value inside `goal_range`.
///
/// The start value is the integer literal written in the top-left cell. An
/// empty grid, or a top-left cell without a readable literal, has no paths.
/// Counts saturate at `u64::MAX`.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{GoalRange, SimpleGrid, Token};
/// use gauntlet_solver::count_valid_paths;
///
/// let grid = SimpleGrid::from_rows(vec![
///     vec![Token::from("3"), Token::from("+2")],
///     vec![Token::from("2x"), Token::from("+1")],
/// ])?;
/// // right then down: 3 + 2 + 1 = 6; down then right: 3 * 2 + 1 = 7
/// assert_eq!(count_valid_paths(&grid, GoalRange::new(6, 7)?), 2);
/// assert_eq!(count_valid_paths(&grid, GoalRange::new(7, 10)?), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn count_valid_paths(grid: &SimpleGrid, goal_range: GoalRange) -> u64 {
    final_value_distribution(grid)
        .range(goal_range.low()..=goal_range.high())
        .fold(0, |total, (_, &count)| total.saturating_add(count))
}

/// Returns the histogram of values reached in the bottom-right cell over all
/// right/down paths.
#[must_use]
pub fn final_value_distribution(grid: &SimpleGrid) -> BTreeMap<i64, u64> {
    if grid.is_empty() {
        return BTreeMap::new();
    }
    let origin = Position::new(0, 0);
    let Some(start_value) = grid[origin].literal_value() else {
        return BTreeMap::new();
    };

    let (rows, cols) = (grid.rows(), grid.cols());
    let mut counts: Grid<HashMap<i64, u64>> = grid.map(|_| HashMap::new());
    counts[origin].insert(start_value, 1);

    // Row-major order visits both predecessors (up, left) before each cell.
    for pos in grid.positions() {
        let current = std::mem::take(&mut counts[pos]);
        if current.is_empty() {
            continue;
        }
        for (d_row, d_col) in MONOTONIC_STEPS {
            let Some(next) = pos.offset(d_row, d_col, rows, cols) else {
                continue;
            };
            let token = &grid[next];
            let dest = &mut counts[next];
            for (&value, &count) in &current {
                let entry = dest.entry(token.apply(value)).or_insert(0);
                *entry = entry.saturating_add(count);
            }
        }
        counts[pos] = current;
    }

    let last = Position::new(rows - 1, cols - 1);
    std::mem::take(&mut counts[last]).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use gauntlet_core::Token;
    use proptest::prelude::*;

    use super::*;

    fn grid(rows: &[&[&str]]) -> SimpleGrid {
        SimpleGrid::from_rows(
            rows.iter()
                .map(|row| row.iter().map(|&t| Token::from(t)).collect())
                .collect(),
        )
        .unwrap()
    }

    fn range(low: i64, high: i64) -> GoalRange {
        GoalRange::new(low, high).unwrap()
    }

    fn brute_force(grid: &SimpleGrid, pos: Position, value: i64, out: &mut Vec<i64>) {
        let last = Position::new(grid.rows() - 1, grid.cols() - 1);
        if pos == last {
            out.push(value);
            return;
        }
        for (d_row, d_col) in MONOTONIC_STEPS {
            if let Some(next) = pos.offset(d_row, d_col, grid.rows(), grid.cols()) {
                brute_force(grid, next, grid[next].apply(value), out);
            }
        }
    }

    #[test]
    fn test_two_by_two_paths() {
        let g = grid(&[&["3", "+2"], &["2x", "+1"]]);
        assert_eq!(count_valid_paths(&g, range(6, 7)), 2);
        assert_eq!(count_valid_paths(&g, range(6, 6)), 1);
        assert_eq!(count_valid_paths(&g, range(8, 100)), 0);
    }

    #[test]
    fn test_converging_paths_merge_by_value() {
        let g = grid(&[&["4", "+2"], &["+2", "+0"]]);
        let distribution = final_value_distribution(&g);
        assert_eq!(distribution, BTreeMap::from([(6, 2)]));
        assert_eq!(count_valid_paths(&g, range(6, 6)), 2);
    }

    #[test]
    fn test_degenerate_grids() {
        assert_eq!(count_valid_paths(&SimpleGrid::empty(), range(0, 0)), 0);
        assert_eq!(count_valid_paths(&grid(&[&["9"]]), range(9, 9)), 1);
        assert_eq!(count_valid_paths(&grid(&[&["?", "+1"]]), range(-100, 100)), 0);
        assert_eq!(count_valid_paths(&grid(&[&["1", "+1", "+1"]]), range(3, 3)), 1);
    }

    #[test]
    fn test_path_count_of_open_grid() {
        // Every monotonic path through an all-neutral 4x4 grid keeps the value.
        let g = Grid::from_fn(4, 4, |pos| {
            if pos == Position::new(0, 0) {
                Token::literal(5)
            } else {
                Token::neutral()
            }
        });
        // C(6, 3) = 20 monotonic paths
        assert_eq!(count_valid_paths(&g, range(5, 5)), 20);
    }

    fn token() -> impl Strategy<Value = Token> {
        prop::sample::select(vec![
            "+1", "+7", "-3", "2x", "0.5x", "-1x", "%4", "sqrt", "^2", "+0",
        ])
        .prop_map(Token::from)
    }

    proptest! {
        #[test]
        fn matches_brute_force(
            tokens in prop::collection::vec(token(), 9),
            start in 1_i64..=30,
            low in -200_i64..=200,
            width in 0_i64..=200,
        ) {
            let mut g = Grid::from_fn(3, 3, |pos| tokens[pos.row * 3 + pos.col].clone());
            g[Position::new(0, 0)] = Token::literal(start);

            let mut values = Vec::new();
            brute_force(&g, Position::new(0, 0), start, &mut values);
            let goal = range(low, low + width);
            let expected = values.iter().filter(|&&v| goal.contains(v)).count() as u64;

            prop_assert_eq!(count_valid_paths(&g, goal), expected);
            prop_assert_eq!(final_value_distribution(&g).values().sum::<u64>(), 6);
        }
    }
}
