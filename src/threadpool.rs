//! This module provides an `Executor` implementation which uses its own
//! blocking threadpool to process jobs.

use crate::error::{BenchError, WorkError};
use crate::worker::{collect_ordered, empty_slots, execute, Executor, Job};
use std::cmp;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::vec;

/// The queue of pending jobs, tagged with their submission index.
type Pending<J> = Mutex<std::iter::Enumerate<vec::IntoIter<J>>>;

/// An `Executor` which runs each batch on a fixed number of dedicated
/// worker threads.
///
/// The threads are acquired when a batch is submitted and joined before
/// `submit_all` returns, so the pool never holds on to execution contexts
/// between batches and the cost of starting them is part of every
/// measurement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    /// Create a pool of `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Self {
        WorkerPool {
            worker_count: worker_count.max(1),
        }
    }
}

impl Executor for WorkerPool {
    fn name(&self) -> &'static str {
        "threadpool"
    }

    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn submit_all<J: Job>(&self, items: Vec<J>) -> Result<Vec<J::Output>, BenchError> {
        let total = items.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        // Never start more workers than there are jobs to hand out.
        let workers = cmp::min(self.worker_count, total);
        debug!("threadpool: {} job(s) on {} worker(s)", total, workers);

        // Workers pull the next pending job as soon as they are free, so a
        // slow job only ever holds up the worker running it.
        let pending: Pending<J> = Mutex::new(items.into_iter().enumerate());
        let (resp_tx, resp_rx) = channel();

        let started: Result<(), BenchError> = thread::scope(|scope| {
            for id in 0..workers {
                let pending = &pending;
                let resp_tx = resp_tx.clone();

                thread::Builder::new()
                    .name(format!("bench-worker-{}", id))
                    .spawn_scoped(scope, move || thread_worker(id, pending, resp_tx))
                    .map_err(|err| BenchError::WorkerStartup {
                        requested: workers,
                        cause: err.to_string(),
                    })?;
            }

            Ok(())
        });

        // Every worker has been joined by now; dropping our own sender lets
        // the receiver below terminate once the buffered results are read.
        drop(resp_tx);
        started?;

        let mut slots = empty_slots(total);
        for (index, result) in resp_rx {
            slots[index] = Some(result);
        }

        collect_ordered(slots)
    }
}

fn thread_worker<J: Job>(
    id: usize,
    pending: &Pending<J>,
    tx: Sender<(usize, Result<J::Output, WorkError>)>,
) {
    loop {
        // Jobs run outside the lock, so a poisoned lock still guards a
        // consistent queue.
        let next = pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next();

        let (index, job) = match next {
            Some(entry) => entry,
            None => break,
        };

        let result = execute(job);
        trace!("worker {}: job #{} finished (ok = {})", id, index, result.is_ok());

        if tx.send((index, result)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::{Bump, Delayed, Flaky};
    use rand::distributions::uniform::Uniform;
    use rand::distributions::Distribution;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn results_follow_submission_order() {
        let dist_sleep_ms = Uniform::new(0, 20);
        let rng = &mut StdRng::from_seed([42; 32]);

        let jobs: Vec<_> = (0..32)
            .map(|id| Delayed {
                id,
                sleep: Duration::from_millis(dist_sleep_ms.sample(rng)),
            })
            .collect();

        let results = WorkerPool::new(4).submit_all(jobs).unwrap();
        assert_eq!(results, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn reverse_delays_still_come_back_in_order() {
        // The first job is the slowest, so it finishes last.
        let jobs: Vec<_> = (0..4)
            .map(|id| Delayed {
                id,
                sleep: Duration::from_millis(40 - 10 * id as u64),
            })
            .collect();

        let results = WorkerPool::new(4).submit_all(jobs).unwrap();
        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_batch_yields_no_results() {
        let results = WorkerPool::new(3).submit_all(Vec::<Delayed>::new()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn reports_lowest_failing_index() {
        let jobs: Vec<_> = (0..10)
            .map(|id| Flaky { id, fail: &[7], panic: &[4] })
            .collect();

        match WorkerPool::new(3).submit_all(jobs) {
            Err(BenchError::TaskExecution { index, cause }) => {
                assert_eq!(index, 4);
                assert_eq!(cause, WorkError::Panicked("job 4 blew up".to_owned()));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn pool_survives_a_failed_batch() {
        let pool = WorkerPool::new(2);
        let failing: Vec<_> = (0..4).map(|id| Flaky { id, fail: &[0], panic: &[] }).collect();
        assert!(pool.submit_all(failing).is_err());

        let passing: Vec<_> = (0..4).map(|id| Flaky { id, fail: &[], panic: &[] }).collect();
        assert_eq!(pool.submit_all(passing).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn jobs_cannot_see_each_others_mutations() {
        let counter = vec![0u64; 8];
        let jobs = vec![
            Bump { counter: counter.clone() },
            Bump { counter: counter.clone() },
        ];

        let results = WorkerPool::new(2).submit_all(jobs).unwrap();

        // Each job saw only its own increments...
        assert_eq!(results, vec![8, 8]);
        // ...and the submitting side's copy never changed.
        assert!(counter.iter().all(|&value| value == 0));
    }

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(WorkerPool::new(0).worker_count(), 1);
        assert_eq!(WorkerPool::new(6).worker_count(), 6);
    }
}
