use std::{io, path::PathBuf};

use gauntlet_core::{GoalRangeError, LevelError};
use gauntlet_game::ReplayError;

/// Errors reported by the `gauntlet` binary.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CliError {
    /// An input file could not be read.
    #[display("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Input or output JSON was malformed.
    #[display("JSON error: {_0}")]
    #[from]
    Json(serde_json::Error),
    /// The level file is structurally invalid.
    #[display("invalid level: {_0}")]
    #[from]
    Level(LevelError),
    /// The goal range bounds are inverted.
    #[display("{_0}")]
    #[from]
    GoalRange(GoalRangeError),
    /// A solver path did not replay to a win.
    #[display("solution failed to replay: {_0}")]
    #[from]
    Replay(ReplayError),
    /// Writing to stdout failed.
    #[display("failed to write output: {_0}")]
    #[from]
    Output(io::Error),
    /// No basic level exists at this index.
    #[display("no basic level {index}")]
    UnknownLevel {
        /// Requested level.
        index: usize,
    },
    /// The background worker stopped without a result.
    #[display("background worker disconnected")]
    WorkerDisconnected,
}
