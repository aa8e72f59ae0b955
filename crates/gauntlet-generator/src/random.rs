//! Random operations and simple grids.

use gauntlet_core::{Operation, Position, SimpleGrid, Token};
use rand::Rng;

/// Draws a random operation.
///
/// | weight | operation        |
/// |-------:|------------------|
/// | 20%    | `+1` ..= `+100`  |
/// | 15%    | `-1` ..= `-100`  |
/// | 15%    | `2x` ..= `10x`   |
/// | 10%    | `0.1x` ..= `0.9x`|
/// | 10%    | `-1x` ..= `-5x`  |
/// | 10%    | `-0.1x` ..= `-0.9x` |
/// | 10%    | `%2` ..= `%20`   |
/// | 5%     | `sqrt`           |
/// | 5%     | `^2`             |
pub fn random_operation<R>(rng: &mut R) -> Operation
where
    R: Rng + ?Sized,
{
    match rng.random_range(0..100) {
        0..20 => Operation::Add(rng.random_range(1..=100)),
        20..35 => Operation::Subtract(rng.random_range(1..=100)),
        35..50 => Operation::Multiply(f64::from(rng.random_range(2..=10_i32))),
        50..60 => Operation::Multiply(random_tenths(rng)),
        60..70 => Operation::Multiply(-f64::from(rng.random_range(1..=5_i32))),
        70..80 => Operation::Multiply(-random_tenths(rng)),
        80..90 => Operation::Modulo(rng.random_range(2..=20)),
        90..95 => Operation::Sqrt,
        _ => Operation::Square,
    }
}

/// One of `0.1`, `0.2`, ..., `0.9`.
fn random_tenths<R>(rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    f64::from(rng.random_range(1..=9_i32)) / 10.0
}

/// Creates a `rows x cols` grid for the monotonic mode.
///
/// Every cell gets a random operation, except the top-left cell, which holds
/// a start literal in `1..=50`, and the bottom-right cell, which is `+0`.
/// A zero dimension yields the empty grid.
///
/// # Examples
///
/// ```
/// use gauntlet_core::Position;
/// use gauntlet_generator::generate_grid;
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg64;
///
/// let grid = generate_grid(4, 5, &mut Pcg64::seed_from_u64(0));
/// let start = grid[Position::new(0, 0)].literal_value().unwrap();
/// assert!((1..=50).contains(&start));
/// assert_eq!(grid[Position::new(3, 4)].as_str(), "+0");
/// ```
pub fn generate_grid<R>(rows: usize, cols: usize, rng: &mut R) -> SimpleGrid
where
    R: Rng + ?Sized,
{
    if rows == 0 || cols == 0 {
        return SimpleGrid::empty();
    }
    let mut grid = SimpleGrid::from_fn(rows, cols, |_| Token::from(random_operation(&mut *rng)));
    grid[Position::new(0, 0)] = Token::literal(rng.random_range(1..=50));
    grid[Position::new(rows - 1, cols - 1)] = Token::neutral();
    grid
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_distribution_buckets() {
        let mut rng = Pcg64::seed_from_u64(0);
        let mut add = 0;
        let mut sqrt = 0;
        let total = 20_000;
        for _ in 0..total {
            match random_operation(&mut rng) {
                Operation::Add(_) => add += 1,
                Operation::Sqrt => sqrt += 1,
                _ => {}
            }
        }
        // 20% and 5% with generous slack
        assert!((3_500..4_500).contains(&add), "add = {add}");
        assert!((700..1_300).contains(&sqrt), "sqrt = {sqrt}");
    }

    #[test]
    fn test_degenerate_grid_is_empty() {
        let mut rng = Pcg64::seed_from_u64(0);
        assert!(generate_grid(0, 3, &mut rng).is_empty());
        let single = generate_grid(1, 1, &mut rng);
        assert_eq!(single[Position::new(0, 0)], Token::neutral());
    }

    proptest! {
        #[test]
        fn generated_tokens_are_well_formed(seed: u64) {
            let mut rng = Pcg64::seed_from_u64(seed);
            let op = random_operation(&mut rng);
            let token = Token::from(op);
            prop_assert!(token.is_valid(), "{token} rejected by the strict grammar");
            prop_assert_eq!(token.operation(), Some(op));
        }

        #[test]
        fn generated_operations_stay_in_their_ranges(seed: u64) {
            let mut rng = Pcg64::seed_from_u64(seed);
            match random_operation(&mut rng) {
                Operation::Add(n) | Operation::Subtract(n) => prop_assert!((1..=100).contains(&n)),
                Operation::Modulo(n) => prop_assert!((2..=20).contains(&n)),
                Operation::Multiply(f) => {
                    let magnitude = f.abs();
                    prop_assert!((0.1..=10.0).contains(&magnitude));
                }
                Operation::Sqrt | Operation::Square => {}
                Operation::Identity => prop_assert!(false, "identity is never generated"),
            }
        }
    }
}
