use gauntlet_core::{BuilderGrid, CellData, GoalRange, GridShape, LevelData, Position, Token};
use gauntlet_solver::{VerificationStatus, Verifier, VerifierConfig, VerifyObserver};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{LevelSeed, random_operation};

/// Configuration of a [`LevelGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of candidate levels tried before giving up.
    pub max_iterations: usize,
    /// Verifier settings used for each candidate.
    pub verifier: VerifierConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            verifier: VerifierConfig::default(),
        }
    }
}

/// A generated level together with the path that proved it solvable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLevel {
    /// The seed that reproduces this level.
    pub seed: LevelSeed,
    /// The level itself.
    pub level: LevelData,
    /// A valid path from start to goal, inclusive.
    pub solution_path: Vec<Position>,
    /// 1-based index of the iteration that produced the level.
    pub iterations: usize,
    /// Verifier attempts spent on the successful candidate.
    pub attempts: usize,
}

/// Generates solvable levels by rejection sampling.
///
/// Each iteration draws a random candidate and runs the verifier on it once.
/// The first candidate with a verified path is returned.
///
/// # Examples
///
/// ```
/// use gauntlet_core::rules;
/// use gauntlet_generator::{GeneratorConfig, LevelGenerator, LevelSeed};
/// use gauntlet_solver::VerifierConfig;
///
/// let generator = LevelGenerator::new(GeneratorConfig {
///     max_iterations: 20,
///     verifier: VerifierConfig { max_attempts: 100, ..VerifierConfig::default() },
/// });
/// let seed = LevelSeed::new([7; 32]);
/// if let Some(generated) = generator.generate_with_seed(4, seed) {
///     let level = &generated.level;
///     assert_eq!(level.grid_size, 4);
///     assert!(rules::validate_path(&level.grid, &level.problem(), &generated.solution_path).is_ok());
///     assert_eq!(generator.generate_with_seed(4, seed), Some(generated));
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevelGenerator {
    config: GeneratorConfig,
    verifier: Verifier,
}

impl LevelGenerator {
    /// Creates a generator with `config`.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            verifier: Verifier::new(config.verifier),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a `grid_size x grid_size` level from a random seed.
    ///
    /// Returns `None` if `grid_size < 2` or if every iteration failed to
    /// verify.
    #[must_use]
    pub fn generate(&self, grid_size: usize) -> Option<GeneratedLevel> {
        self.generate_with_seed(grid_size, LevelSeed::random())
    }

    /// Generates a level deterministically from `seed`.
    #[must_use]
    pub fn generate_with_seed(&self, grid_size: usize, seed: LevelSeed) -> Option<GeneratedLevel> {
        self.generate_with_observer(grid_size, seed, &mut ())
    }

    /// Generates a level from `seed`, reporting verifier progress to
    /// `observer`.
    ///
    /// Progress counts restart at 1 for every candidate. If the observer
    /// cancels, generation stops and returns `None`.
    pub fn generate_with_observer<O>(
        &self,
        grid_size: usize,
        seed: LevelSeed,
        observer: &mut O,
    ) -> Option<GeneratedLevel>
    where
        O: VerifyObserver + ?Sized,
    {
        if grid_size < 2 {
            debug!("grid size {grid_size} cannot hold distinct start and goal cells");
            return None;
        }

        for iteration in 1..=self.config.max_iterations {
            let mut rng = seed.iteration_rng(iteration);
            let level = random_level(grid_size, &mut rng);
            let result = self.verifier.verify_with_rng(
                &level.grid,
                GridShape::Square,
                &level.problem(),
                &mut rng,
                observer,
            );
            debug!(
                "iteration {iteration}: {} after {} attempts",
                result.status, result.attempts
            );

            match (result.status, result.path) {
                (VerificationStatus::Success, Some(solution_path)) => {
                    info!("generated {grid_size}x{grid_size} level in {iteration} iterations");
                    return Some(GeneratedLevel {
                        seed,
                        level,
                        solution_path,
                        iterations: iteration,
                        attempts: result.attempts,
                    });
                }
                (VerificationStatus::Cancelled, _) => return None,
                _ => {}
            }
        }

        info!(
            "no solvable {grid_size}x{grid_size} level found in {} iterations",
            self.config.max_iterations
        );
        None
    }
}

/// Draws one unverified candidate level.
///
/// Start and goal are distinct random cells. The start cell holds the start
/// value (`1..=20`) as a literal and the goal cell holds `+0`; every other
/// cell gets a random operation and no item. The goal range starts at
/// `rand(0..150) + 10 * grid_size` and spans `100 + rand(0..50)`.
///
/// # Panics
///
/// Panics if `grid_size < 2`.
pub fn random_level<R>(grid_size: usize, rng: &mut R) -> LevelData
where
    R: Rng + ?Sized,
{
    assert!(grid_size >= 2, "grid size must be at least 2");

    let random_position = |rng: &mut R| {
        Position::new(rng.random_range(0..grid_size), rng.random_range(0..grid_size))
    };
    let start_pos = random_position(&mut *rng);
    let goal_pos = loop {
        let pos = random_position(&mut *rng);
        if pos != start_pos {
            break pos;
        }
    };
    let start_value = rng.random_range(1..=20);

    let mut grid =
        BuilderGrid::from_fn(grid_size, grid_size, |_| CellData::new(random_operation(&mut *rng)));
    grid[start_pos] = CellData::new(Token::literal(start_value));
    grid[goal_pos] = CellData::new(Token::neutral());

    let base = i64::try_from(grid_size).map_or(i64::MAX, |size| size.saturating_mul(10));
    let low = base.saturating_add(rng.random_range(0..150));
    let goal_range = GoalRange::spanning(low, 100 + rng.random_range(0..50));

    LevelData {
        grid_size,
        grid,
        start_pos,
        goal_pos,
        start_value,
        goal_range,
    }
}

#[cfg(test)]
mod tests {
    use gauntlet_core::rules;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    const SEED: LevelSeed = LevelSeed::new([0x5a; 32]);

    fn quick_generator() -> LevelGenerator {
        LevelGenerator::new(GeneratorConfig {
            max_iterations: 30,
            verifier: VerifierConfig {
                max_attempts: 200,
                ..VerifierConfig::default()
            },
        })
    }

    #[test]
    fn test_random_level_invariants() {
        let mut rng = Pcg64::seed_from_u64(11);
        for size in 2..8 {
            let level = random_level(size, &mut rng);
            assert_eq!(level.validate(), Ok(()));
            assert_eq!(
                level.grid[level.start_pos].value.literal_value(),
                Some(level.start_value)
            );
            assert!((1..=20).contains(&level.start_value));
            assert_eq!(level.grid[level.goal_pos].value, Token::neutral());

            let size = i64::try_from(size).unwrap();
            let (low, high) = (level.goal_range.low(), level.goal_range.high());
            assert!((10 * size..10 * size + 150).contains(&low));
            assert!((100..150).contains(&(high - low)));
        }
    }

    #[test]
    fn test_tiny_grids_are_rejected() {
        let generator = quick_generator();
        assert_eq!(generator.generate_with_seed(0, SEED), None);
        assert_eq!(generator.generate_with_seed(1, SEED), None);
    }

    #[test]
    fn test_generated_level_is_solvable_and_reproducible() {
        let generator = quick_generator();
        let Some(generated) = generator.generate_with_seed(4, SEED) else {
            // Rejection sampling may legitimately fail; the invariants below
            // only apply to a produced level.
            return;
        };
        let level = &generated.level;
        assert_eq!(
            rules::validate_path(&level.grid, &level.problem(), &generated.solution_path)
                .map(|value| level.goal_range.contains(value)),
            Ok(true)
        );
        assert!(generated.iterations >= 1);
        assert!(generated.attempts >= 1);
        assert_eq!(generator.generate_with_seed(4, SEED), Some(generated));
    }

    #[test]
    fn test_cancelled_generation_returns_none() {
        let flag = gauntlet_solver::CancelFlag::new();
        flag.cancel();
        let mut observer = flag.clone();
        assert_eq!(
            quick_generator().generate_with_observer(4, SEED, &mut observer),
            None
        );
    }

    #[test]
    fn test_generated_level_json_shape() {
        let mut rng = Pcg64::seed_from_u64(3);
        let level = random_level(3, &mut rng);
        let generated = GeneratedLevel {
            seed: SEED,
            solution_path: vec![level.start_pos, level.goal_pos],
            level,
            iterations: 1,
            attempts: 1,
        };
        let value = serde_json::to_value(&generated).unwrap();
        assert_eq!(value["seed"], SEED.to_string());
        assert!(value["solutionPath"].is_array());
        assert_eq!(value["level"]["gridSize"], 3);
    }
}
