//! Repeated randomized attempts over one level.
//!
//! The verifier is a Monte Carlo loop around [`Solver::attempt`]: every
//! attempt runs with the same limits but continues the RNG stream, so it
//! explores the grid in a different order. The first path found wins. If the
//! attempt cap is spent first, the level is reported as unverifiable, which
//! does not mean it is unsolvable.

use std::sync::Arc;

use gauntlet_core::{BuilderGrid, GridShape, LevelData, LevelError, Position, SearchProblem};
use log::{debug, trace};
use portable_atomic::{AtomicBool, Ordering};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::search::{DEFAULT_MAX_DEPTH, DEFAULT_NODE_BUDGET, SearchLimits, Solver};

/// Tuning knobs of a [`Verifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Number of attempts before giving up.
    pub max_attempts: usize,
    /// Node budget of each attempt.
    pub nodes_per_attempt: usize,
    /// Depth ceiling of each attempt.
    pub max_depth: usize,
    /// The observer's yield hook runs after every this many attempts. `0`
    /// disables yielding.
    pub yield_interval: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            nodes_per_attempt: DEFAULT_NODE_BUDGET,
            max_depth: DEFAULT_MAX_DEPTH,
            yield_interval: 50,
        }
    }
}

impl VerifierConfig {
    /// Returns the per-attempt limits.
    #[must_use]
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            node_budget: self.nodes_per_attempt,
            max_depth: self.max_depth,
        }
    }
}

/// How a verification ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// A path into the goal range was found.
    #[display("success")]
    Success,
    /// Every attempt ran out of budget.
    #[display("unverifiable")]
    Unverifiable,
    /// The observer asked to stop before the next attempt.
    #[display("cancelled")]
    Cancelled,
}

/// Outcome of [`Verifier::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// How the run ended.
    pub status: VerificationStatus,
    /// The path found, start to goal inclusive. Present iff `status` is
    /// [`VerificationStatus::Success`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Position>>,
    /// Attempts run. For a success this is the 1-based index of the
    /// successful attempt.
    pub attempts: usize,
}

impl VerificationResult {
    /// Returns `true` if a path was found.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == VerificationStatus::Success
    }
}

/// Hooks a host can attach to a verification run.
///
/// Every method has a default, so an observer only overrides what it needs.
pub trait VerifyObserver {
    /// Called after each attempt with the number of attempts run so far.
    fn on_progress(&mut self, _attempts: usize) {}

    /// Checked before each attempt. Returning `true` ends the run as
    /// [`VerificationStatus::Cancelled`].
    fn should_cancel(&self) -> bool {
        false
    }

    /// Suspension point, called every [`VerifierConfig::yield_interval`]
    /// attempts.
    fn on_yield(&mut self) {
        std::thread::yield_now();
    }
}

impl VerifyObserver for () {}

impl<O> VerifyObserver for &mut O
where
    O: VerifyObserver + ?Sized,
{
    fn on_progress(&mut self, attempts: usize) {
        (**self).on_progress(attempts);
    }

    fn should_cancel(&self) -> bool {
        (**self).should_cancel()
    }

    fn on_yield(&mut self) {
        (**self).on_yield();
    }
}

/// A shared cancellation token.
///
/// Clones share the same flag, so one clone can be handed to a worker while
/// another stays with the host.
///
/// # Examples
///
/// ```
/// use gauntlet_solver::{CancelFlag, VerifyObserver as _};
///
/// let flag = CancelFlag::new();
/// let worker_side = flag.clone();
/// assert!(!worker_side.should_cancel());
/// flag.cancel();
/// assert!(worker_side.should_cancel());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag that is not set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clears a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Returns `true` if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl VerifyObserver for CancelFlag {
    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// An observer that forwards progress to a closure and optionally honors a
/// [`CancelFlag`].
#[derive(Debug)]
pub struct ProgressObserver<F> {
    on_progress: F,
    cancel: Option<CancelFlag>,
}

impl<F> ProgressObserver<F>
where
    F: FnMut(usize),
{
    /// Creates an observer calling `on_progress` after every attempt.
    pub fn new(on_progress: F) -> Self {
        Self {
            on_progress,
            cancel: None,
        }
    }

    /// Stops the run once `flag` is set.
    #[must_use]
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }
}

impl<F> VerifyObserver for ProgressObserver<F>
where
    F: FnMut(usize),
{
    fn on_progress(&mut self, attempts: usize) {
        (self.on_progress)(attempts);
    }

    fn should_cancel(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}

/// Decides whether a level can be solved, within a budget.
///
/// # Examples
///
/// ```
/// use gauntlet_core::{BuilderGrid, CellData, GoalRange, GridShape, Position, SearchProblem};
/// use gauntlet_solver::{VerificationStatus, Verifier};
///
/// let mut grid = BuilderGrid::unset(3);
/// grid[Position::new(0, 1)] = CellData::new("+0");
/// let problem = SearchProblem {
///     start: Position::new(0, 0),
///     start_value: 7,
///     goal: Position::new(0, 1),
///     goal_range: GoalRange::new(0, 10)?,
/// };
///
/// let result = Verifier::default().verify(&grid, GridShape::Square, &problem, &mut ());
/// assert_eq!(result.status, VerificationStatus::Success);
/// assert_eq!(result.attempts, 1);
/// # Ok::<(), gauntlet_core::GoalRangeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    /// Creates a verifier with `config`.
    #[must_use]
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verifies `problem` on `grid`, seeding a fresh RNG stream from the
    /// thread RNG.
    pub fn verify<O>(
        &self,
        grid: &BuilderGrid,
        shape: GridShape,
        problem: &SearchProblem,
        observer: &mut O,
    ) -> VerificationResult
    where
        O: VerifyObserver + ?Sized,
    {
        let mut rng = Pcg64::from_rng(&mut rand::rng());
        self.verify_with_rng(grid, shape, problem, &mut rng, observer)
    }

    /// Verifies `problem` on `grid` drawing from `rng`.
    ///
    /// With a seeded `rng` the result is reproducible.
    pub fn verify_with_rng<R, O>(
        &self,
        grid: &BuilderGrid,
        shape: GridShape,
        problem: &SearchProblem,
        rng: &mut R,
        observer: &mut O,
    ) -> VerificationResult
    where
        R: Rng + ?Sized,
        O: VerifyObserver + ?Sized,
    {
        let solver = Solver::new(grid, shape, *problem);
        let limits = self.config.limits();
        let yield_interval = self.config.yield_interval;

        for attempt in 1..=self.config.max_attempts {
            if observer.should_cancel() {
                debug!("verification cancelled after {} attempts", attempt - 1);
                return VerificationResult {
                    status: VerificationStatus::Cancelled,
                    path: None,
                    attempts: attempt - 1,
                };
            }

            let outcome = solver.attempt(limits, rng);
            trace!(
                "attempt {attempt}: {} nodes popped, solved: {}",
                outcome.nodes_popped,
                outcome.is_solved()
            );
            observer.on_progress(attempt);

            if let Some(path) = outcome.path {
                debug!(
                    "verified in {attempt} attempts, path length {}",
                    path.len()
                );
                return VerificationResult {
                    status: VerificationStatus::Success,
                    path: Some(path),
                    attempts: attempt,
                };
            }

            if yield_interval > 0 && attempt % yield_interval == 0 {
                observer.on_yield();
            }
        }

        debug!(
            "unverifiable after {} attempts",
            self.config.max_attempts
        );
        VerificationResult {
            status: VerificationStatus::Unverifiable,
            path: None,
            attempts: self.config.max_attempts,
        }
    }
}

/// Validates `level` and verifies it with the default configuration.
///
/// # Errors
///
/// Returns [`LevelError`] if the level is structurally invalid; no search is
/// run in that case.
pub fn verify_level<O>(level: &LevelData, observer: &mut O) -> Result<VerificationResult, LevelError>
where
    O: VerifyObserver + ?Sized,
{
    level.validate()?;
    Ok(Verifier::default().verify(&level.grid, GridShape::Square, &level.problem(), observer))
}

#[cfg(test)]
mod tests {
    use gauntlet_core::{CellData, GoalRange, rules};

    use super::*;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn neutral_level() -> LevelData {
        let grid = BuilderGrid::from_fn(3, 3, |_| CellData::new("+0"));
        LevelData {
            grid_size: 3,
            grid,
            start_pos: p(0, 0),
            goal_pos: p(2, 2),
            start_value: 4,
            goal_range: GoalRange::new(4, 4).unwrap(),
        }
    }

    fn unreachable_level() -> LevelData {
        LevelData {
            goal_range: GoalRange::new(1_000, 2_000).unwrap(),
            ..neutral_level()
        }
    }

    fn small_config() -> VerifierConfig {
        VerifierConfig {
            max_attempts: 120,
            nodes_per_attempt: 20,
            ..VerifierConfig::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<usize>,
        yields: usize,
        cancel_after: Option<usize>,
    }

    impl VerifyObserver for Recorder {
        fn on_progress(&mut self, attempts: usize) {
            self.progress.push(attempts);
        }

        fn should_cancel(&self) -> bool {
            self.cancel_after
                .is_some_and(|limit| self.progress.len() >= limit)
        }

        fn on_yield(&mut self) {
            self.yields += 1;
        }
    }

    #[test]
    fn test_success_carries_valid_path() {
        let level = neutral_level();
        let result = verify_level(&level, &mut ()).unwrap();
        assert!(result.is_success());
        assert!(result.attempts >= 1);
        let path = result.path.unwrap();
        assert_eq!(
            rules::validate_path(&level.grid, &level.problem(), &path),
            Ok(4)
        );
    }

    #[test]
    fn test_exhaustion_reports_unverifiable() {
        let level = unreachable_level();
        let mut recorder = Recorder::default();
        let result = Verifier::new(small_config()).verify(
            &level.grid,
            GridShape::Square,
            &level.problem(),
            &mut recorder,
        );
        assert_eq!(result.status, VerificationStatus::Unverifiable);
        assert_eq!(result.attempts, 120);
        assert_eq!(result.path, None);
        assert_eq!(recorder.progress, (1..=120).collect::<Vec<_>>());
        assert_eq!(recorder.yields, 2);
    }

    #[test]
    fn test_cancellation_is_checked_between_attempts() {
        let level = unreachable_level();
        let mut recorder = Recorder {
            cancel_after: Some(7),
            ..Recorder::default()
        };
        let result = Verifier::new(small_config()).verify(
            &level.grid,
            GridShape::Square,
            &level.problem(),
            &mut recorder,
        );
        assert_eq!(result.status, VerificationStatus::Cancelled);
        assert_eq!(result.attempts, 7);
        assert_eq!(recorder.progress.len(), 7);
    }

    #[test]
    fn test_cancel_flag_stops_before_first_attempt() {
        let level = neutral_level();
        let flag = CancelFlag::new();
        flag.cancel();
        let mut observer = ProgressObserver::new(|_| panic!("no attempt should run"))
            .with_cancel(flag.clone());
        let result = verify_level(&level, &mut observer).unwrap();
        assert_eq!(result.status, VerificationStatus::Cancelled);
        assert_eq!(result.attempts, 0);

        flag.reset();
        let mut calls = 0;
        let result = verify_level(&level, &mut ProgressObserver::new(|_| calls += 1).with_cancel(flag))
            .unwrap();
        assert!(result.is_success());
        assert_eq!(calls, result.attempts);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut grid = BuilderGrid::from_fn(4, 4, |pos| {
            CellData::new(["+3", "-2", "2x", "%7", "sqrt", "+11"][(pos.row * 4 + pos.col) % 6])
        });
        grid[p(3, 3)] = CellData::new("+0");
        let problem = SearchProblem {
            start: p(0, 0),
            start_value: 5,
            goal: p(3, 3),
            goal_range: GoalRange::new(20, 60).unwrap(),
        };
        let verifier = Verifier::new(small_config());
        let run = |seed| {
            let mut rng = Pcg64::seed_from_u64(seed);
            verifier.verify_with_rng(&grid, GridShape::Square, &problem, &mut rng, &mut ())
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_invalid_level_is_rejected_before_search() {
        let mut level = neutral_level();
        level.goal_pos = level.start_pos;
        let mut recorder = Recorder::default();
        assert_eq!(
            verify_level(&level, &mut recorder),
            Err(LevelError::StartIsGoal { pos: p(0, 0) })
        );
        assert!(recorder.progress.is_empty());
    }

    #[test]
    fn test_result_json_shape() {
        let result = VerificationResult {
            status: VerificationStatus::Unverifiable,
            path: None,
            attempts: 10_000,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "status": "unverifiable", "attempts": 10_000 })
        );
    }

    #[test]
    fn test_default_limits_match_search_defaults() {
        assert_eq!(VerifierConfig::default().limits(), SearchLimits::default());
    }

    #[test]
    fn test_status_display_matches_json() {
        for status in [
            VerificationStatus::Success,
            VerificationStatus::Unverifiable,
            VerificationStatus::Cancelled,
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.to_string())
            );
        }
    }
}
