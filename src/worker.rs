//! This module defines the interfaces shared by the various executor
//! implementations: a `Job` is a unit of work, and an `Executor` runs a batch
//! of jobs and hands back their results in submission order.

use crate::error::{BenchError, WorkError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// A self-contained unit of work.
///
/// A job is moved into whichever worker runs it, and the only thing that
/// comes back is its output. Jobs therefore never observe each other's state.
pub trait Job: Send + 'static {
    /// The value produced by a successful run.
    type Output: Send + 'static;

    /// Consume the job and compute its output.
    fn run(self) -> Result<Self::Output, WorkError>;
}

/// An interface over different strategies for running a batch of jobs.
///
/// This allows the benchmark pipelines to be written once and driven by
/// any of the executors.
pub trait Executor {
    /// Get the name of this executor so we can label its measurements.
    fn name(&self) -> &'static str;

    /// The maximum number of jobs this executor runs at the same time.
    fn worker_count(&self) -> usize;

    /// Run every job and return the outputs in the same order as `items`.
    ///
    /// Every job is driven to completion even if some of them fail. If any
    /// failed, the failure with the lowest submission index is returned and
    /// the successful outputs are discarded.
    fn submit_all<J: Job>(&self, items: Vec<J>) -> Result<Vec<J::Output>, BenchError>;
}

/// The outcome of one job, addressed by its submission index.
pub type ResultSlot<T> = Option<Result<T, WorkError>>;

/// Runs a job, turning a panic into a `WorkError` so a single bad job cannot
/// take its worker down with it.
pub fn execute<J: Job>(job: J) -> Result<J::Output, WorkError> {
    match panic::catch_unwind(AssertUnwindSafe(move || job.run())) {
        Ok(result) => result,
        Err(payload) => Err(WorkError::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Extracts the message of a caught panic.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Creates one empty slot per submitted job.
pub fn empty_slots<T>(len: usize) -> Vec<ResultSlot<T>> {
    (0..len).map(|_| None).collect()
}

/// Turns a full set of result slots into ordered outputs, or the failure with
/// the lowest submission index.
pub fn collect_ordered<T>(slots: Vec<ResultSlot<T>>) -> Result<Vec<T>, BenchError> {
    let mut outputs = Vec::with_capacity(slots.len());

    for (index, slot) in slots.into_iter().enumerate() {
        match slot.unwrap_or(Err(WorkError::Lost)) {
            Ok(output) => outputs.push(output),
            Err(cause) => return Err(BenchError::TaskExecution { index, cause }),
        }
    }

    Ok(outputs)
}

#[cfg(test)]
pub mod testing {
    //! Jobs used to exercise the executors.

    use super::Job;
    use crate::error::WorkError;
    use std::thread;
    use std::time::Duration;

    /// Sleeps for a while and then echoes its id back.
    pub struct Delayed {
        /// Echoed back as the output.
        pub id: usize,
        /// How long to sleep before finishing.
        pub sleep: Duration,
    }

    impl Job for Delayed {
        type Output = usize;

        fn run(self) -> Result<usize, WorkError> {
            thread::sleep(self.sleep);
            Ok(self.id)
        }
    }

    /// Fails for ids listed in `fail`, panics for ids listed in `panic`.
    pub struct Flaky {
        /// Echoed back as the output.
        pub id: usize,
        /// Ids that return an error.
        pub fail: &'static [usize],
        /// Ids that panic.
        pub panic: &'static [usize],
    }

    impl Job for Flaky {
        type Output = usize;

        fn run(self) -> Result<usize, WorkError> {
            if self.panic.contains(&self.id) {
                panic!("job {} blew up", self.id);
            }
            if self.fail.contains(&self.id) {
                return Err(WorkError::Failed(format!("job {} refused", self.id)));
            }
            Ok(self.id)
        }
    }

    /// Owns its own counter and bumps it while running.
    #[derive(Clone)]
    pub struct Bump {
        /// This job's private copy of the counter.
        pub counter: Vec<u64>,
    }

    impl Job for Bump {
        type Output = u64;

        fn run(mut self) -> Result<u64, WorkError> {
            for value in self.counter.iter_mut() {
                *value += 1;
            }
            thread::sleep(Duration::from_millis(5));
            Ok(self.counter.iter().sum())
        }
    }
}
