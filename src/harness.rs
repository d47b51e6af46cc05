//! This module defines the benchmark runner which drives a workload once
//! serially and once in parallel, times both, and derives speedup and
//! efficiency from the measurements.

use crate::error::{BenchError, WorkError};
use crate::worker::panic_message;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Efficiency above 100% by more than this many percentage points hints at
/// a measurement problem rather than noise.
pub const EFFICIENCY_NOISE_PCT: f64 = 5.0;

/// The phases a runner moves through, strictly in this order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing has run yet.
    Idle,
    /// The workload is running on the calling thread.
    SerialRun,
    /// The workload is running on the executor.
    ParallelRun,
    /// Both timings are in and the metrics are derived.
    MetricsComputed,
    /// The outcome has been handed back to the caller.
    Reported,
}

impl Phase {
    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::SerialRun),
            Phase::SerialRun => Some(Phase::ParallelRun),
            Phase::ParallelRun => Some(Phase::MetricsComputed),
            Phase::MetricsComputed => Some(Phase::Reported),
            Phase::Reported => None,
        }
    }
}

/// A value together with how long it took to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<R> {
    /// What the timed closure returned.
    pub output: R,
    /// Wall-clock time the closure took.
    pub elapsed: Duration,
}

impl<R> Measured<R> {
    /// Runs `f`, timing it with a monotonic clock.
    ///
    /// A panic inside `f` is reported as `PhaseFailed` for `phase` instead
    /// of unwinding into the caller.
    pub fn time<F>(phase: &'static str, f: F) -> Result<Self, BenchError>
    where
        F: FnOnce() -> Result<R, BenchError>,
    {
        let start = Instant::now();
        let output = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result?,
            Err(payload) => {
                return Err(BenchError::PhaseFailed {
                    phase,
                    cause: WorkError::Panicked(panic_message(payload.as_ref())),
                })
            }
        };
        let elapsed = start.elapsed();

        Ok(Measured { output, elapsed })
    }
}

/// Timings of one pipeline and the figures derived from them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BenchmarkMetrics {
    /// Duration of the serial phase.
    pub serial: Duration,
    /// Duration of the parallel phase, worker startup included.
    pub parallel: Duration,
    /// Workers the parallel phase could use; efficiency is normalized by it.
    pub worker_count: usize,
}

impl BenchmarkMetrics {
    /// Metrics for one run; `worker_count` is clamped to at least 1.
    pub fn new(serial: Duration, parallel: Duration, worker_count: usize) -> Self {
        BenchmarkMetrics {
            serial,
            parallel,
            worker_count: worker_count.max(1),
        }
    }

    /// `serial / parallel`, or `DegenerateMetrics` if the parallel phase was
    /// below the clock's resolution.
    pub fn speedup(&self) -> Result<f64, BenchError> {
        let parallel = self.parallel.as_secs_f64();
        if parallel <= 0.0 {
            return Err(BenchError::DegenerateMetrics { parallel: self.parallel });
        }

        Ok(self.serial.as_secs_f64() / parallel)
    }

    /// Speedup per worker, as a percentage of ideal linear scaling.
    pub fn efficiency(&self) -> Result<f64, BenchError> {
        Ok(self.speedup()? / self.worker_count as f64 * 100.0)
    }

    /// Whether the efficiency is above 100% by more than measurement noise.
    pub fn exceeds_ideal(&self) -> bool {
        match self.efficiency() {
            Ok(efficiency) => efficiency > 100.0 + EFFICIENCY_NOISE_PCT,
            Err(_) => false,
        }
    }
}

impl fmt::Display for BenchmarkMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.speedup(), self.efficiency()) {
            (Ok(speedup), Ok(efficiency)) => {
                write!(f, "Speedup: {:.2}x, Efficiency: {:.2}%", speedup, efficiency)
            }
            _ => write!(f, "Speedup: N/A, Efficiency: N/A"),
        }
    }
}

/// Everything a finished run reports for one pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkOutcome<R> {
    /// Name of the pipeline.
    pub name: &'static str,
    /// Result and timing of the serial phase.
    pub serial: Measured<R>,
    /// Result and timing of the parallel phase.
    pub parallel: Measured<R>,
    /// Speedup and efficiency derived from both timings.
    pub metrics: BenchmarkMetrics,
}

/// Drives one pipeline through serial and parallel execution.
///
/// A runner is consumed by `run`; every pipeline invocation gets a fresh one.
#[derive(Debug)]
pub struct BenchmarkRunner {
    name: &'static str,
    worker_count: usize,
    phase: Phase,
}

impl BenchmarkRunner {
    /// `worker_count` is the size of the pool the parallel phase runs on and
    /// is what efficiency is normalized by.
    pub fn new(name: &'static str, worker_count: usize) -> Self {
        BenchmarkRunner {
            name,
            worker_count,
            phase: Phase::Idle,
        }
    }

    /// The phase the runner is currently in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn advance(&mut self) {
        if let Some(next) = self.phase.next() {
            debug!("{}: {:?} -> {:?}", self.name, self.phase, next);
            self.phase = next;
        }
    }

    /// Times `serial` then `parallel`, checks they agree, and computes the
    /// metrics.
    ///
    /// `parallel` is timed around the whole submit-and-collect call, worker
    /// startup included. Any failure, a panic in either closure included,
    /// aborts the run before metrics are computed.
    pub fn run<R, S, P>(
        mut self,
        serial: S,
        parallel: P,
    ) -> Result<BenchmarkOutcome<R>, BenchError>
    where
        R: PartialEq,
        S: FnOnce() -> Result<R, BenchError>,
        P: FnOnce() -> Result<R, BenchError>,
    {
        self.advance();
        let serial = Measured::time("serial", serial)?;
        debug!("{}: serial phase took {:?}", self.name, serial.elapsed);

        self.advance();
        let parallel = Measured::time("parallel", parallel)?;
        debug!("{}: parallel phase took {:?}", self.name, parallel.elapsed);

        if serial.output != parallel.output {
            return Err(BenchError::ResultMismatch { pipeline: self.name });
        }

        self.advance();
        let metrics = BenchmarkMetrics::new(serial.elapsed, parallel.elapsed, self.worker_count);
        if metrics.exceeds_ideal() {
            warn!("{}: super-linear efficiency measured ({})", self.name, metrics);
        }

        self.advance();
        debug_assert_eq!(self.phase(), Phase::Reported);
        Ok(BenchmarkOutcome {
            name: self.name,
            serial,
            parallel,
            metrics,
        })
    }
}
