//! Library side of the `gauntlet` command-line tool.
//!
//! The binary parses [`Cli`] and hands it to [`run`]. Generation and
//! verification run on a background worker thread; progress comes back over
//! a channel and a timeout cancels the job between verifier attempts. Results
//! are printed to stdout as JSON.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write as _},
    path::Path,
    process::ExitCode,
    time::Duration,
};

use gauntlet_core::{GoalRange, GridShape, LevelData, SimpleGrid};
use gauntlet_generator::{
    BasicLevelConfig, GeneratorConfig, LevelGenerator, LevelSeed, generate_grid,
};
use gauntlet_solver::{
    VerificationStatus, Verifier, VerifierConfig, count_valid_paths, final_value_distribution,
};
use log::{info, warn};
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use serde::Serialize;

pub use self::{
    cli::{BasicArgs, Cli, Command, CountArgs, GenerateArgs, RunArgs, VerifyArgs},
    error::CliError,
};

pub mod cli;
mod error;
mod worker;

/// Exit status when a run ends without a result (unverifiable, cancelled,
/// or no level generated).
const NO_RESULT: u8 = 1;

/// Attempts between two progress lines on stderr.
const PROGRESS_EVERY: usize = 100;

/// Runs one parsed command line.
///
/// # Errors
///
/// Returns [`CliError`] for unreadable or malformed input, output failures,
/// and a lost worker thread. A run that finds nothing is not an error; it is
/// reported through the exit code.
pub fn run(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Command::Generate(args) => generate(&args),
        Command::Verify(args) => verify(&args),
        Command::Count(args) => count(&args),
        Command::Basic(args) => basic(&args),
    }
}

impl RunArgs {
    fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            max_attempts: self.max_attempts,
            nodes_per_attempt: self.nodes_per_attempt,
            ..VerifierConfig::default()
        }
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    fn progress_reporter(&self) -> impl FnMut(usize) + use<> {
        let enabled = self.progress;
        move |attempts| {
            if enabled && should_report(attempts) {
                eprint!("\rattempts: {attempts}");
            }
        }
    }
}

fn generate(args: &GenerateArgs) -> Result<ExitCode, CliError> {
    let seed = args.seed.unwrap_or_else(LevelSeed::random);
    let size = args.size;
    info!("generating {size}x{size} level from seed {seed}");

    let generator = LevelGenerator::new(GeneratorConfig {
        max_iterations: args.max_iterations,
        verifier: args.run.verifier_config(),
    });
    let handle = worker::spawn(move |observer| {
        generator.generate_with_observer(size, seed, observer)
    });
    let generated = handle.wait(args.run.timeout(), args.run.progress_reporter())?;
    finish_progress(&args.run);

    let Some(generated) = generated else {
        warn!("no solvable {size}x{size} level found from seed {seed}");
        return Ok(ExitCode::from(NO_RESULT));
    };
    gauntlet_game::replay(&generated.level, &generated.solution_path)?;
    print_json(&generated)?;
    Ok(ExitCode::SUCCESS)
}

fn verify(args: &VerifyArgs) -> Result<ExitCode, CliError> {
    let level: LevelData = read_json(&args.file)?;
    level.validate()?;

    let verifier = Verifier::new(args.run.verifier_config());
    let seed = args.seed;
    let job_level = level.clone();
    let handle = worker::spawn(move |observer| {
        let problem = job_level.problem();
        match seed {
            Some(seed) => verifier.verify_with_rng(
                &job_level.grid,
                GridShape::Square,
                &problem,
                &mut Pcg64::seed_from_u64(seed),
                observer,
            ),
            None => verifier.verify(&job_level.grid, GridShape::Square, &problem, observer),
        }
    });
    let result = handle.wait(args.run.timeout(), args.run.progress_reporter())?;
    finish_progress(&args.run);
    info!("verification finished: {} after {} attempts", result.status, result.attempts);

    if let Some(path) = &result.path {
        gauntlet_game::replay(&level, path)?;
    }
    print_json(&result)?;
    Ok(match result.status {
        VerificationStatus::Success => ExitCode::SUCCESS,
        VerificationStatus::Unverifiable | VerificationStatus::Cancelled => {
            ExitCode::from(NO_RESULT)
        }
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CountReport {
    grid: SimpleGrid,
    goal_range: GoalRange,
    valid_paths: u64,
    final_values: BTreeMap<i64, u64>,
}

fn count(args: &CountArgs) -> Result<ExitCode, CliError> {
    let goal_range = GoalRange::new(args.low, args.high)?;
    let grid = match &args.grid {
        Some(path) => read_json(path)?,
        None => generate_grid(args.rows, args.cols, &mut seeded_or_random(args.seed)),
    };

    let report = CountReport {
        valid_paths: count_valid_paths(&grid, goal_range),
        final_values: final_value_distribution(&grid),
        grid,
        goal_range,
    };
    print_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

fn basic(args: &BasicArgs) -> Result<ExitCode, CliError> {
    let config = BasicLevelConfig::for_level(args.level)
        .ok_or(CliError::UnknownLevel { index: args.level })?;
    let mut rng = seeded_or_random(args.seed);
    let level = config.generate(&mut rng)?;
    info!(
        "basic level {}: {} winning paths after {} retries",
        level.level_index, level.path_count, level.retries
    );
    print_json(&level)?;
    Ok(ExitCode::SUCCESS)
}

fn seeded_or_random(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    }
}

fn read_json<T>(path: &Path) -> Result<T, CliError>
where
    T: serde::de::DeserializeOwned,
{
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

fn print_json<T>(value: &T) -> Result<(), CliError>
where
    T: Serialize,
{
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn should_report(attempts: usize) -> bool {
    attempts % PROGRESS_EVERY == 0
}

fn finish_progress(args: &RunArgs) {
    if args.progress {
        eprintln!();
    }
}
