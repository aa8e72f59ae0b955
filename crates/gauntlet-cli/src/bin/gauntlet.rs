//! Command-line front end for the arithmetic path puzzle engine.

use std::process::ExitCode;

use clap::Parser as _;
use gauntlet_cli::Cli;

fn main() -> ExitCode {
    better_panic::install();
    env_logger::init();

    match gauntlet_cli::run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
