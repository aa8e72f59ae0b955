//! Levels for the right/down mode.
//!
//! A basic level is a random [`SimpleGrid`] played from the top-left to the
//! bottom-right cell without items. Grids are redrawn until at least one
//! monotonic path ends inside the goal range; after
//! [`BasicLevelConfig::max_retries`] redraws the last grid is kept even if
//! no such path exists.

use gauntlet_core::{GoalRange, LevelData, LevelError, SimpleGrid};
use gauntlet_solver::count_valid_paths;
use log::{debug, warn};
use rand::Rng;
use serde::Serialize;

use crate::generate_grid;

/// Grid sizes of the basic levels, indexed by level.
pub const LEVEL_SIZES: [usize; 3] = [5, 7, 10];

/// Default number of redraws before the last grid is kept.
pub const DEFAULT_MAX_RETRIES: usize = 50;

/// Parameters of one basic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicLevelConfig {
    /// Number of rows and columns.
    pub grid_size: usize,
    /// Difficulty tier; raises the goal range and narrows it.
    pub level_index: usize,
    /// Redraws allowed after the first grid.
    pub max_retries: usize,
}

impl BasicLevelConfig {
    /// Returns the configuration of level `level_index` of [`LEVEL_SIZES`].
    #[must_use]
    pub fn for_level(level_index: usize) -> Option<Self> {
        let grid_size = *LEVEL_SIZES.get(level_index)?;
        Some(Self {
            grid_size,
            level_index,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Draws grids until one has a winning monotonic path or the retries
    /// run out.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError`] if `grid_size` is below 2, since start and goal
    /// would not be distinct cells.
    pub fn generate<R>(&self, rng: &mut R) -> Result<BasicLevel, LevelError>
    where
        R: Rng + ?Sized,
    {
        let size = self.grid_size;
        let mut retries = 0;
        loop {
            let goal_range = basic_goal_range(self.level_index, rng);
            let grid = generate_grid(size, size, rng);
            let path_count = count_valid_paths(&grid, goal_range);

            if path_count > 0 || retries >= self.max_retries {
                if path_count == 0 {
                    warn!("no {size}x{size} grid with a winning path after {retries} retries, keeping the last one");
                } else {
                    debug!("{size}x{size} grid with {path_count} winning paths after {retries} retries");
                }
                let level = LevelData::from_simple_grid(&grid, goal_range)?;
                return Ok(BasicLevel {
                    level_index: self.level_index,
                    grid,
                    goal_range,
                    path_count,
                    retries,
                    level,
                });
            }
            retries += 1;
        }
    }
}

/// A generated basic level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicLevel {
    /// Difficulty tier the level was drawn for.
    pub level_index: usize,
    /// The operation grid.
    pub grid: SimpleGrid,
    /// Winning values at the bottom-right cell.
    pub goal_range: GoalRange,
    /// Number of right/down paths ending inside the goal range.
    pub path_count: u64,
    /// Grids discarded before this one.
    pub retries: usize,
    /// The grid as a playable level.
    pub level: LevelData,
}

/// Draws the goal range of tier `level_index`.
///
/// `low` is `rand(0..200) + 100 * level_index` and the width is
/// `rand(0..50) + 125 - 50 * level_index`, floored at zero.
pub fn basic_goal_range<R>(level_index: usize, rng: &mut R) -> GoalRange
where
    R: Rng + ?Sized,
{
    let tier = i64::try_from(level_index).unwrap_or(i64::MAX);
    let low = rng
        .random_range(0..200_i64)
        .saturating_add(tier.saturating_mul(100));
    let width = rng
        .random_range(0..50_i64)
        .saturating_add(125)
        .saturating_sub(tier.saturating_mul(50));
    GoalRange::spanning(low, u64::try_from(width).unwrap_or(0))
}

/// Generates basic level `level_index` of [`LEVEL_SIZES`].
///
/// Returns `None` for an index past the last level.
///
/// # Examples
///
/// ```
/// use gauntlet_core::Position;
/// use gauntlet_generator::generate_basic_level;
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// let basic = generate_basic_level(0, &mut Pcg64::seed_from_u64(5)).unwrap();
/// assert_eq!(basic.level.grid_size, 5);
/// assert_eq!(basic.level.goal_pos, Position::new(4, 4));
/// assert!(generate_basic_level(3, &mut Pcg64::seed_from_u64(5)).is_none());
/// ```
pub fn generate_basic_level<R>(level_index: usize, rng: &mut R) -> Option<BasicLevel>
where
    R: Rng + ?Sized,
{
    BasicLevelConfig::for_level(level_index)?.generate(rng).ok()
}
