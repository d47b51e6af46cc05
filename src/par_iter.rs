//! This module provides an `Executor` implementation which uses a rayon
//! parallel iterator to perform work.

use crate::error::BenchError;
use crate::worker::{collect_ordered, execute, Executor, Job};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// An `Executor` backed by a dedicated rayon threadpool.
///
/// The pool is built once and reused for every batch; its threads are
/// released when the executor is dropped.
pub struct RayonExecutor {
    pool: ThreadPool,
    worker_count: usize,
}

impl RayonExecutor {
    /// Build a rayon pool with exactly `worker_count` threads (at least one).
    pub fn new(worker_count: usize) -> Result<Self, BenchError> {
        let worker_count = worker_count.max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|id| format!("bench-rayon-{}", id))
            .build()
            .map_err(|err| BenchError::WorkerStartup {
                requested: worker_count,
                cause: err.to_string(),
            })?;

        Ok(RayonExecutor { pool, worker_count })
    }
}

impl Executor for RayonExecutor {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn submit_all<J: Job>(&self, items: Vec<J>) -> Result<Vec<J::Output>, BenchError> {
        debug!("rayon: {} job(s) on {} worker(s)", items.len(), self.worker_count);

        // An indexed parallel iterator collects into a `Vec` in submission
        // order no matter which thread finished first.
        let slots = self.pool.install(move || {
            items
                .into_par_iter()
                .map(|job| Some(execute(job)))
                .collect::<Vec<_>>()
        });

        collect_ordered(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkError;
    use crate::worker::testing::{Bump, Delayed, Flaky};
    use rand::distributions::uniform::Uniform;
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn results_follow_submission_order() {
        let dist_sleep_ms = Uniform::new(0, 20);
        let rng = &mut StdRng::from_seed([9; 32]);

        let jobs: Vec<_> = (0..24)
            .map(|id| Delayed {
                id,
                sleep: Duration::from_millis(dist_sleep_ms.sample(rng)),
            })
            .collect();

        let executor = RayonExecutor::new(4).unwrap();
        assert_eq!(executor.submit_all(jobs).unwrap(), (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn reports_lowest_failing_index() {
        let jobs: Vec<_> = (0..8)
            .map(|id| Flaky { id, fail: &[2, 6], panic: &[5] })
            .collect();

        let executor = RayonExecutor::new(3).unwrap();
        assert_eq!(
            executor.submit_all(jobs),
            Err(BenchError::TaskExecution {
                index: 2,
                cause: WorkError::Failed("job 2 refused".to_owned()),
            })
        );
    }

    #[test]
    fn jobs_cannot_see_each_others_mutations() {
        let counter = vec![10u64; 4];
        let jobs = vec![Bump { counter: counter.clone() }; 3];

        let executor = RayonExecutor::new(3).unwrap();
        assert_eq!(executor.submit_all(jobs).unwrap(), vec![44, 44, 44]);
        assert_eq!(counter, vec![10; 4]);
    }
}
