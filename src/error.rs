//! Error types shared by the executors, the pipelines, and the harness.

use std::time::Duration;

use thiserror::Error;

/// Why a single job failed to produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    /// The job ran to completion but rejected its input.
    #[error("{0}")]
    Failed(String),

    /// The job panicked while running on a worker.
    #[error("panicked: {0}")]
    Panicked(String),

    /// No worker ever reported a result for the job.
    #[error("no result was reported")]
    Lost,
}

/// Failures surfaced by a benchmark run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BenchError {
    /// The executor could not acquire its execution contexts.
    #[error("could not start {requested} worker(s): {cause}")]
    WorkerStartup {
        /// How many execution contexts were asked for.
        requested: usize,
        /// What the operating system or thread pool reported.
        cause: String,
    },

    /// One submitted job failed.
    #[error("job #{index} failed: {cause}")]
    TaskExecution {
        /// Submission index of the failed job.
        index: usize,
        /// Why the job failed.
        #[source]
        cause: WorkError,
    },

    /// A timed phase failed outside of any submitted job, e.g. the serial
    /// pass on the calling thread.
    #[error("{phase} phase failed: {cause}")]
    PhaseFailed {
        /// Name of the phase, `"serial"` or `"parallel"`.
        phase: &'static str,
        /// Why the phase failed.
        #[source]
        cause: WorkError,
    },

    /// Partial results came back but could not be combined.
    #[error("combining partial results failed: {0}")]
    Combine(#[source] WorkError),

    /// The parallel phase was too fast for the clock to measure.
    #[error("parallel duration {parallel:?} is too small to derive speedup")]
    DegenerateMetrics {
        /// The measured parallel duration.
        parallel: Duration,
    },

    /// The serial and parallel phases disagree on the result.
    #[error("{pipeline}: serial and parallel results differ")]
    ResultMismatch {
        /// Name of the pipeline that produced the results.
        pipeline: &'static str,
    },

    /// At least one pipeline reported a failure instead of metrics.
    #[error("{0} pipeline(s) failed")]
    PipelinesFailed(usize),
}
