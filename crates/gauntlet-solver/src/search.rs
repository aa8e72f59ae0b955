//! Randomized, budgeted depth-first search over the move graph.
//!
//! One call to [`Solver::attempt`] is a single bounded attempt: an explicit
//! stack DFS from the start cell that shuffles the candidate moves of every
//! expansion, so repeated attempts explore different parts of the space. The
//! attempt stops as soon as it finds a path into the goal range, or when
//! [`SearchLimits::node_budget`] nodes have been popped.
//!
//! Within one attempt a memo keyed by position holds the
//! `(value, powers)` states already expanded there, and a repeated state is
//! skipped. Nothing is shared between attempts.

use std::collections::{HashMap, HashSet};

use gauntlet_core::{
    BuilderGrid, Grid, GridShape, ItemType, Operation, Position, SearchProblem, rules::Powers,
};
use rand::{Rng, seq::SliceRandom as _};
use tinyvec::ArrayVec;

/// Default number of pops allowed per attempt.
pub const DEFAULT_NODE_BUDGET: usize = 1_000;

/// Default ceiling on distinct positions along one branch.
pub const DEFAULT_MAX_DEPTH: usize = 300;

/// Resource limits of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of stack pops before the attempt gives up.
    pub node_budget: usize,
    /// A branch whose ancestor chain holds this many distinct positions is
    /// abandoned.
    pub max_depth: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            node_budget: DEFAULT_NODE_BUDGET,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    /// The path from start to goal, inclusive, if one was found.
    pub path: Option<Vec<Position>>,
    /// Number of nodes popped from the stack.
    pub nodes_popped: usize,
}

impl AttemptOutcome {
    /// Returns `true` if the attempt found a path.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.path.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    operation: Option<Operation>,
    item: ItemType,
}

#[derive(Debug, Clone, Copy)]
struct SearchNode {
    pos: Position,
    value: i64,
    parent: Option<usize>,
    powers: Powers,
}

/// A search problem bound to a grid, ready for repeated attempts.
///
/// Tokens are parsed once at construction, so running many attempts on the
/// same solver does not re-read the grid.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{BuilderGrid, CellData, GoalRange, GridShape, Position, SearchProblem};
/// use gauntlet_solver::{SearchLimits, Solver};
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// let mut grid = BuilderGrid::unset(2);
/// grid[Position::new(0, 1)] = CellData::new("+0");
/// let problem = SearchProblem {
///     start: Position::new(0, 0),
///     start_value: 5,
///     goal: Position::new(0, 1),
///     goal_range: GoalRange::new(5, 5)?,
/// };
///
/// let solver = Solver::new(&grid, GridShape::Square, problem);
/// let mut rng = Pcg64::seed_from_u64(1);
/// let outcome = solver.attempt(SearchLimits::default(), &mut rng);
/// assert_eq!(outcome.path, Some(vec![Position::new(0, 0), Position::new(0, 1)]));
/// # Ok::<(), gauntlet_core::GoalRangeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Solver {
    cells: Grid<Cell>,
    shape: GridShape,
    problem: SearchProblem,
}

impl Solver {
    /// Binds `problem` to `grid`.
    #[must_use]
    pub fn new(grid: &BuilderGrid, shape: GridShape, problem: SearchProblem) -> Self {
        let cells = grid.map(|cell| Cell {
            operation: cell.value.operation(),
            item: cell.item,
        });
        Self {
            cells,
            shape,
            problem,
        }
    }

    /// Returns the bound problem.
    #[must_use]
    pub fn problem(&self) -> &SearchProblem {
        &self.problem
    }

    /// Runs one bounded attempt with a fresh stack, arena and memo.
    ///
    /// A start cell outside the grid yields no path and pops nothing.
    pub fn attempt<R>(&self, limits: SearchLimits, rng: &mut R) -> AttemptOutcome
    where
        R: Rng + ?Sized,
    {
        let problem = &self.problem;
        let Some(start_cell) = self.cells.get(problem.start) else {
            return AttemptOutcome {
                path: None,
                nodes_popped: 0,
            };
        };
        let (rows, cols) = (self.cells.rows(), self.cells.cols());

        let mut arena = vec![SearchNode {
            pos: problem.start,
            value: problem.start_value,
            parent: None,
            powers: Powers::on_start(start_cell.item),
        }];
        let mut stack = vec![0];
        let mut expanded: HashMap<Position, HashSet<(i64, Powers)>> = HashMap::new();
        let mut nodes_popped = 0;

        while nodes_popped < limits.node_budget {
            let Some(index) = stack.pop() else {
                break;
            };
            nodes_popped += 1;
            let node = arena[index];

            if !expanded
                .entry(node.pos)
                .or_default()
                .insert((node.value, node.powers))
            {
                continue;
            }

            if node.pos == problem.goal {
                if problem.goal_range.contains(node.value) {
                    return AttemptOutcome {
                        path: Some(reconstruct_path(&arena, index)),
                        nodes_popped,
                    };
                }
                continue;
            }

            let on_path = ancestor_positions(&arena, index);
            if on_path.len() >= limits.max_depth {
                continue;
            }

            let mut candidates: ArrayVec<[Position; 8]> = self
                .shape
                .orthogonal_neighbors(node.pos, rows, cols)
                .collect();
            if node.powers.diagonal_moves() > 0 {
                candidates.extend(self.shape.diagonal_neighbors(node.pos, rows, cols));
            }
            candidates.as_mut_slice().shuffle(rng);

            for next in candidates {
                let revisit = on_path.contains(&next);
                let Ok(kind) = node.powers.check_move(node.pos, next, revisit) else {
                    continue;
                };
                let cell = self.cells[next];
                arena.push(SearchNode {
                    pos: next,
                    value: cell.operation.map_or(node.value, |op| op.apply(node.value)),
                    parent: Some(index),
                    powers: node.powers.after_move(kind, revisit, cell.item),
                });
                stack.push(arena.len() - 1);
            }
        }

        AttemptOutcome {
            path: None,
            nodes_popped,
        }
    }
}

/// Runs one bounded attempt on `grid`.
///
/// Shorthand for [`Solver::new`] followed by [`Solver::attempt`].
pub fn solve_attempt<R>(
    grid: &BuilderGrid,
    shape: GridShape,
    problem: &SearchProblem,
    limits: SearchLimits,
    rng: &mut R,
) -> AttemptOutcome
where
    R: Rng + ?Sized,
{
    Solver::new(grid, shape, *problem).attempt(limits, rng)
}

fn ancestor_positions(arena: &[SearchNode], index: usize) -> HashSet<Position> {
    let mut positions = HashSet::new();
    let mut current = Some(index);
    while let Some(i) = current {
        positions.insert(arena[i].pos);
        current = arena[i].parent;
    }
    positions
}

fn reconstruct_path(arena: &[SearchNode], index: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = Some(index);
    while let Some(i) = current {
        path.push(arena[i].pos);
        current = arena[i].parent;
    }
    path.reverse();
    path
}
