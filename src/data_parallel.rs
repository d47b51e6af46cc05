//! Data parallelism: one homogeneous dataset, cut into one chunk per worker,
//! each chunk reduced independently and the partial results combined.

use crate::config::BenchConfig;
use crate::error::{BenchError, WorkError};
use crate::harness::{BenchmarkOutcome, BenchmarkRunner};
use crate::partition::Chunk;
use crate::worker::{Executor, Job};
use std::sync::Arc;

/// A map-then-fold reduction over a dataset.
///
/// `combine` must be associative and commutative, and `identity` must be its
/// neutral element: chunks finish in any order and may be empty. Both
/// functions may fail, e.g. when the accumulator would overflow.
pub struct Reduction<T, U> {
    /// The value an empty chunk reduces to.
    pub identity: U,
    /// Applied to every element.
    pub map: fn(&T) -> Result<U, WorkError>,
    /// Folds two reduced values into one.
    pub combine: fn(U, U) -> Result<U, WorkError>,
}

impl<T, U: Clone> Clone for Reduction<T, U> {
    fn clone(&self) -> Self {
        Reduction {
            identity: self.identity.clone(),
            map: self.map,
            combine: self.combine,
        }
    }
}

impl<T, U: Clone> Reduction<T, U> {
    /// Reduces `items` in a single pass on the calling thread.
    pub fn serial(&self, items: &[T]) -> Result<U, WorkError> {
        items
            .iter()
            .try_fold(self.identity.clone(), |acc, item| (self.combine)(acc, (self.map)(item)?))
    }

    /// Folds already reduced values into one, starting from `identity`.
    pub fn combine_all<I>(&self, partials: I) -> Result<U, WorkError>
    where
        I: IntoIterator<Item = U>,
    {
        partials
            .into_iter()
            .try_fold(self.identity.clone(), |acc, partial| (self.combine)(acc, partial))
    }
}

fn overflow(what: &str) -> WorkError {
    WorkError::Failed(format!("sum of cubes overflows u128 ({})", what))
}

fn cube(x: &u64) -> Result<u128, WorkError> {
    let x = u128::from(*x);
    x.checked_mul(x)
        .and_then(|square| square.checked_mul(x))
        .ok_or_else(|| overflow("cube"))
}

fn add(a: u128, b: u128) -> Result<u128, WorkError> {
    a.checked_add(b).ok_or_else(|| overflow("sum"))
}

/// Sum of the cubes of every element.
pub fn sum_of_cubes() -> Reduction<u64, u128> {
    Reduction {
        identity: 0,
        map: cube,
        combine: add,
    }
}

/// The job reducing a single chunk.
pub struct ReduceChunk<T, U> {
    chunk: Chunk<T>,
    reduction: Reduction<T, U>,
}

impl<T, U> Job for ReduceChunk<T, U>
where
    T: Send + Sync + 'static,
    U: Clone + Send + 'static,
{
    type Output = U;

    fn run(self) -> Result<U, WorkError> {
        trace!("reducing chunk {:?} ({} elements)", self.chunk.range(), self.chunk.len());
        self.reduction.serial(self.chunk.as_slice())
    }
}

/// Reduces `dataset` on `executor`, one chunk per worker.
///
/// The result is always equal to `reduction.serial(&dataset)`; partitioning
/// only changes the schedule. A chunk that fails to reduce is reported by its
/// chunk index.
pub fn run<E, T, U>(
    executor: &E,
    dataset: &Arc<[T]>,
    reduction: &Reduction<T, U>,
) -> Result<U, BenchError>
where
    E: Executor,
    T: Send + Sync + 'static,
    U: Clone + Send + 'static,
{
    let chunks = Chunk::split(dataset, executor.worker_count());
    debug!(
        "{}: {} element(s) in {} chunk(s), {} empty",
        executor.name(),
        dataset.len(),
        chunks.len(),
        chunks.iter().filter(|chunk| chunk.is_empty()).count(),
    );

    let jobs = chunks
        .into_iter()
        .map(|chunk| ReduceChunk {
            chunk,
            reduction: reduction.clone(),
        })
        .collect();

    let partials = executor.submit_all(jobs)?;

    reduction.combine_all(partials).map_err(BenchError::Combine)
}

/// The integers `0..config.data_size`.
pub fn dataset(config: &BenchConfig) -> Arc<[u64]> {
    (0..config.data_size as u64).collect::<Vec<_>>().into()
}

/// Benchmarks the sum of cubes of `dataset`: one pass on the calling thread,
/// then chunked on `executor`.
pub fn benchmark<E: Executor>(
    executor: &E,
    dataset: &Arc<[u64]>,
) -> Result<BenchmarkOutcome<u128>, BenchError> {
    let reduction = sum_of_cubes();

    BenchmarkRunner::new("data parallelism", executor.worker_count()).run(
        || {
            reduction
                .serial(dataset)
                .map_err(|cause| BenchError::PhaseFailed { phase: "serial", cause })
        },
        || run(executor, dataset, &reduction),
    )
}
