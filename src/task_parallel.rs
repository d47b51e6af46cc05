//! Task parallelism: a fixed list of unrelated jobs, one worker per job.

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::harness::{BenchmarkOutcome, BenchmarkRunner};
use crate::sequential::SequentialExecutor;
use crate::tasks::{Task, TaskOutput};
use crate::worker::{Executor, Job};
use std::cmp;

/// Runs every task on `executor` and returns one result per task, in task
/// order.
///
/// At most `min(tasks.len(), executor.worker_count())` tasks run at once;
/// beyond that, the next free worker takes the next task.
pub fn run<E, J>(executor: &E, tasks: Vec<J>) -> Result<Vec<J::Output>, BenchError>
where
    E: Executor,
    J: Job,
{
    debug!(
        "{}: dispatching {} task(s) over {} worker(s)",
        executor.name(),
        tasks.len(),
        cmp::min(tasks.len(), executor.worker_count()),
    );

    executor.submit_all(tasks)
}

/// The three reference workloads at their configured sizes.
pub fn default_tasks(config: &BenchConfig) -> Vec<Task> {
    vec![
        Task::Factorial(config.factorial_n),
        Task::SumPrimes(config.primes_limit),
        Task::random_sort(config.sort_size, config.seed),
    ]
}

/// Benchmarks `tasks` serially on the calling thread, then on `executor`.
///
/// Efficiency is normalized by the executor's full worker count, even when
/// there are fewer tasks than workers.
pub fn benchmark<E: Executor>(
    executor: &E,
    tasks: Vec<Task>,
) -> Result<BenchmarkOutcome<Vec<TaskOutput>>, BenchError> {
    // Each phase consumes its own copy; cloning stays outside the timings.
    let serial_tasks = tasks.clone();
    let parallel_tasks = tasks;
    let sequential = SequentialExecutor::new();

    BenchmarkRunner::new("task parallelism", executor.worker_count()).run(
        move || run(&sequential, serial_tasks),
        move || run(executor, parallel_tasks),
    )
}
