//! Measures how much faster CPU-bound work gets when it is spread over every
//! core, using two strategies:
//!
//! * data parallelism: one large dataset, split into a chunk per worker;
//! * task parallelism: a handful of unrelated jobs, one per worker.
//!
//! Each pipeline runs once serially and once in parallel, and the report
//! shows both timings with the resulting speedup and efficiency. Both
//! pipelines are driven by a hand-rolled threadpool and then by rayon.
//!
//! To see it in action, simply run `cargo run --release`!

#![deny(missing_docs)]

#[macro_use]
extern crate log;

use rand::RngCore;
use std::panic;
use std::process;
use std::sync::Arc;

pub mod config;
pub mod data_parallel;
pub mod error;
pub mod harness;
pub mod par_iter;
pub mod partition;
pub mod report;
pub mod sequential;
pub mod task_parallel;
pub mod tasks;
pub mod threadpool;
pub mod worker;

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::par_iter::RayonExecutor;
use crate::tasks::Task;
use crate::threadpool::WorkerPool;
use crate::worker::Executor;

fn main() {
    env_logger::init();

    let code = match panic::catch_unwind(run) {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            eprintln!("error: {}", err);
            1
        }
        Err(_) => {
            eprintln!("error: the benchmark aborted unexpectedly");
            101
        }
    };

    process::exit(code);
}

fn run() -> Result<(), BenchError> {
    let seed = {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        seed
    };

    let config = BenchConfig::new(seed);
    info!(
        "{} worker(s), {} data element(s), factorial({}), primes <= {}, sort of {}",
        config.worker_count,
        config.data_size,
        config.factorial_n,
        config.primes_limit,
        config.sort_size,
    );

    // Inputs are built once, outside every timed region, and shared by all
    // executors.
    let dataset = data_parallel::dataset(&config);
    let tasks = task_parallel::default_tasks(&config);

    let threadpool = WorkerPool::new(config.worker_count);
    let mut failures = run_pipelines(&threadpool, &dataset, &tasks);

    let rayon = RayonExecutor::new(config.worker_count)?;
    failures += run_pipelines(&rayon, &dataset, &tasks);

    if failures > 0 {
        return Err(BenchError::PipelinesFailed(failures));
    }

    Ok(())
}

/// Runs the data- then the task-parallel pipeline on `executor`, returning
/// how many of them failed. A failed pipeline never stops the other one.
fn run_pipelines<E: Executor>(executor: &E, dataset: &Arc<[u64]>, tasks: &[Task]) -> usize {
    let mut failures = 0;

    report::section("data parallelism", executor.name(), executor.worker_count());
    match data_parallel::benchmark(executor, dataset) {
        Ok(outcome) => report::data_parallel(&outcome),
        Err(err) => {
            error!("data parallelism on {}: {}", executor.name(), err);
            report::failure("Data parallelism", &err);
            failures += 1;
        }
    }

    report::section("task parallelism", executor.name(), executor.worker_count());
    match task_parallel::benchmark(executor, tasks.to_vec()) {
        Ok(outcome) => report::task_parallel(&outcome),
        Err(err) => {
            error!("task parallelism on {}: {}", executor.name(), err);
            report::failure("Task parallelism", &err);
            failures += 1;
        }
    }

    failures
}
