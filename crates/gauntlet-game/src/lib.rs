//! Play sessions for arithmetic path puzzles.
//!
//! [`Game`] tracks one player walking a level under the movement and power
//! rules of [`gauntlet_core::rules`]. [`replay`] runs a whole path through a
//! fresh game, which is how solver and generator output is checked against
//! the rules a player sees.

pub use self::{error::*, game::*};

mod error;
mod game;

#[cfg(test)]
mod tests {
    use gauntlet_core::{
        BuilderGrid, CellData, GoalRange, GridShape, ItemType, LevelData, Position, rules,
    };
    use gauntlet_generator::{
        GeneratorConfig, LEVEL_SIZES, LevelGenerator, LevelSeed, generate_basic_level, random_level,
    };
    use gauntlet_solver::{Verifier, VerifierConfig};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn quick_verifier() -> VerifierConfig {
        VerifierConfig {
            max_attempts: 300,
            ..VerifierConfig::default()
        }
    }

    #[test]
    fn test_verified_paths_replay_to_a_win() {
        let verifier = Verifier::new(quick_verifier());
        let mut rng = Pcg64::seed_from_u64(99);
        for size in [3, 4, 5].into_iter().cycle().take(30) {
            let level: LevelData = random_level(size, &mut rng);
            let result = verifier.verify_with_rng(
                &level.grid,
                GridShape::Square,
                &level.problem(),
                &mut rng,
                &mut (),
            );
            if let Some(path) = result.path {
                let game = replay(&level, &path).unwrap();
                assert!(game.status().is_won());
                assert_eq!(game.closest_difference(), 0);
            }
        }
    }

    #[test]
    fn test_paths_using_powers_replay_to_a_win() {
        let mut grid = BuilderGrid::from_fn(4, 4, |_| CellData::new("+1"));
        grid[Position::new(0, 1)].item = ItemType::Backtrack;
        grid[Position::new(1, 0)].item = ItemType::Diagonal;
        grid[Position::new(2, 2)].item = ItemType::Diagonal;
        let level = LevelData {
            grid_size: 4,
            grid,
            start_pos: Position::new(0, 0),
            goal_pos: Position::new(3, 3),
            start_value: 0,
            goal_range: GoalRange::new(0, 1_000).unwrap(),
        };
        let verifier = Verifier::new(quick_verifier());
        for seed in 0..20 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let result = verifier.verify_with_rng(
                &level.grid,
                GridShape::Square,
                &level.problem(),
                &mut rng,
                &mut (),
            );
            let path = result.path.unwrap();
            assert!(replay(&level, &path).unwrap().status().is_won());
        }
    }

    #[test]
    fn test_generated_levels_replay_to_a_win() {
        let generator = LevelGenerator::new(GeneratorConfig {
            max_iterations: 30,
            verifier: quick_verifier(),
        });
        for byte in 0..3 {
            let seed = LevelSeed::new([byte; 32]);
            if let Some(generated) = generator.generate_with_seed(4, seed) {
                let game = replay(&generated.level, &generated.solution_path).unwrap();
                assert_eq!(game.path(), generated.solution_path.as_slice());
            }
        }
    }

    fn monotonic_paths(size: usize) -> Vec<Vec<Position>> {
        fn extend(path: &mut Vec<Position>, size: usize, out: &mut Vec<Vec<Position>>) {
            let last = path[path.len() - 1];
            if last == Position::new(size - 1, size - 1) {
                out.push(path.clone());
                return;
            }
            for next in [
                Position::new(last.row, last.col + 1),
                Position::new(last.row + 1, last.col),
            ] {
                if next.row < size && next.col < size {
                    path.push(next);
                    extend(path, size, out);
                    path.pop();
                }
            }
        }
        let mut out = Vec::new();
        extend(&mut vec![Position::new(0, 0)], size, &mut out);
        out
    }

    #[test]
    fn test_basic_levels_are_playable() {
        let mut rng = Pcg64::seed_from_u64(21);
        for level_index in 0..2 {
            let size = LEVEL_SIZES[level_index];
            let paths = monotonic_paths(size);
            for _ in 0..3 {
                let basic = generate_basic_level(level_index, &mut rng).unwrap();
                let problem = basic.level.problem();
                let winning: Vec<_> = paths
                    .iter()
                    .filter(|path| rules::validate_path(&basic.level.grid, &problem, path).is_ok())
                    .collect();
                assert_eq!(u64::try_from(winning.len()).unwrap(), basic.path_count);
                for path in winning {
                    let game = replay(&basic.level, path).unwrap();
                    assert!(game.status().is_won());
                }
            }
        }
    }
}
