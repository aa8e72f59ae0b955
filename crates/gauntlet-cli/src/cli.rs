//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gauntlet_generator::LevelSeed;

/// Generate, verify and analyze arithmetic path puzzles.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a solvable level and print it as JSON.
    Generate(GenerateArgs),
    /// Check a level file for solvability and print the result as JSON.
    Verify(VerifyArgs),
    /// Count right/down paths into the goal range on a simple grid.
    Count(CountArgs),
    /// Generate a right/down level of a fixed difficulty tier.
    Basic(BasicArgs),
}

/// Options shared by commands that run the verifier in the background.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Verifier attempts per level.
    #[arg(long, value_name = "COUNT", default_value_t = 10_000)]
    pub max_attempts: usize,

    /// Node budget of each attempt.
    #[arg(long, value_name = "COUNT", default_value_t = 1_000)]
    pub nodes_per_attempt: usize,

    /// Cancel the run after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Report verifier progress on stderr.
    #[arg(long)]
    pub progress: bool,
}

/// Arguments of `gauntlet generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Number of rows and columns.
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub size: usize,

    /// Seed to reproduce (64 hex digits). Random if omitted.
    #[arg(long, value_name = "HEX")]
    pub seed: Option<LevelSeed>,

    /// Candidate levels to try before giving up.
    #[arg(long, value_name = "COUNT", default_value_t = 100)]
    pub max_iterations: usize,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments of `gauntlet verify`.
#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// Level file in JSON (`{ gridSize, grid, startPos, goalPos, startValue, goalRange }`).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Seed of the search order, for reproducible runs.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments of `gauntlet count`.
#[derive(Debug, Clone, Args)]
pub struct CountArgs {
    /// Grid file in JSON (`string[][]`). A random grid is used if omitted.
    #[arg(long, value_name = "FILE")]
    pub grid: Option<PathBuf>,

    /// Rows of the random grid.
    #[arg(long, value_name = "N", default_value_t = 5, conflicts_with = "grid")]
    pub rows: usize,

    /// Columns of the random grid.
    #[arg(long, value_name = "N", default_value_t = 5, conflicts_with = "grid")]
    pub cols: usize,

    /// Seed of the random grid.
    #[arg(long, value_name = "N", conflicts_with = "grid")]
    pub seed: Option<u64>,

    /// Lowest winning value.
    #[arg(long, allow_negative_numbers = true)]
    pub low: i64,

    /// Highest winning value.
    #[arg(long, allow_negative_numbers = true)]
    pub high: i64,
}

/// Arguments of `gauntlet basic`.
#[derive(Debug, Clone, Args)]
pub struct BasicArgs {
    /// Difficulty tier, starting at 0 (5x5, 7x7, 10x10).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub level: usize,

    /// Seed of the grid draws.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "gauntlet",
            "generate",
            "--size",
            "7",
            "--seed",
            "1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
            "--timeout",
            "3",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.size, 7);
        assert!(args.seed.is_some());
        assert_eq!(args.run.timeout, Some(3));
        assert_eq!(args.run.max_attempts, 10_000);
    }

    #[test]
    fn test_parse_count_with_negative_range() {
        let cli =
            Cli::try_parse_from(["gauntlet", "count", "--low", "-20", "--high", "-5"]).unwrap();
        let Command::Count(args) = cli.command else {
            panic!("expected count");
        };
        assert_eq!((args.low, args.high), (-20, -5));
        assert_eq!((args.rows, args.cols), (5, 5));
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        assert!(Cli::try_parse_from(["gauntlet", "generate", "--seed", "xyz"]).is_err());
    }

    #[test]
    fn test_parse_basic() {
        let cli = Cli::try_parse_from(["gauntlet", "basic", "--level", "2", "--seed", "9"]).unwrap();
        let Command::Basic(args) = cli.command else {
            panic!("expected basic");
        };
        assert_eq!((args.level, args.seed), (2, Some(9)));
    }
}
