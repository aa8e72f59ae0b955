//! Background work on a dedicated thread.
//!
//! A job runs on its own thread and reports verifier progress over a channel.
//! The caller keeps a [`CancelFlag`] clone and may request cancellation, which
//! the verifier honors between attempts.

use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use gauntlet_solver::{CancelFlag, ProgressObserver, VerifyObserver};
use log::{trace, warn};

use crate::CliError;

enum WorkEvent<T> {
    Progress { attempts: usize },
    Done(T),
}

/// A handle for waiting on a background job.
pub(crate) struct WorkHandle<T> {
    events: mpsc::Receiver<WorkEvent<T>>,
    cancel: CancelFlag,
}

impl<T> std::fmt::Debug for WorkHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Runs `job` on a new thread.
///
/// The job receives an observer that forwards progress to the handle and
/// stops the verifier once the handle cancels.
pub(crate) fn spawn<T, F>(job: F) -> WorkHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&mut dyn VerifyObserver) -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();
    thread::spawn(move || {
        let progress_tx = tx.clone();
        let mut observer = ProgressObserver::new(move |attempts| {
            let _ = progress_tx.send(WorkEvent::Progress { attempts });
        })
        .with_cancel(worker_cancel);
        let output = job(&mut observer);
        let _ = tx.send(WorkEvent::Done(output));
    });
    WorkHandle { events: rx, cancel }
}

impl<T> WorkHandle<T> {
    /// Requests cancellation of the job.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Blocks until the job finishes, passing progress to `on_progress`.
    ///
    /// When `timeout` elapses the job is cancelled, and waiting continues
    /// until it returns its (cancelled) output.
    pub(crate) fn wait<P>(self, timeout: Option<Duration>, mut on_progress: P) -> Result<T, CliError>
    where
        P: FnMut(usize),
    {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        loop {
            let event = match deadline {
                Some(deadline) if !self.cancel.is_cancelled() => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.events.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => {
                            warn!("timeout reached, cancelling");
                            self.cancel();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            return Err(CliError::WorkerDisconnected);
                        }
                    }
                }
                _ => self
                    .events
                    .recv()
                    .map_err(|_| CliError::WorkerDisconnected)?,
            };
            match event {
                WorkEvent::Progress { attempts } => {
                    trace!("progress: {attempts} attempts");
                    on_progress(attempts);
                }
                WorkEvent::Done(output) => return Ok(output),
            }
        }
    }
}
