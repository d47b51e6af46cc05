//! Benchmark configuration.
//!
//! Nothing is read from files or flags: the only input taken from the
//! environment is the number of available CPUs, which fixes the worker count
//! for the whole run.

/// Number of `u64` values in the data-parallel dataset.
pub const DEFAULT_DATA_SIZE: usize = 50_000_000;
/// Argument of the factorial task.
pub const DEFAULT_FACTORIAL_N: u32 = 50_000;
/// Upper bound of the prime-summing task.
pub const DEFAULT_PRIMES_LIMIT: usize = 2_000_000;
/// Number of random values sorted by the sort task.
pub const DEFAULT_SORT_SIZE: usize = 10_000_000;

/// Parameters shared by every pipeline of a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Size of every worker pool created for this run. Always at least 1.
    pub worker_count: usize,
    /// Length of the data-parallel dataset (`0..data_size`).
    pub data_size: usize,
    /// `n` in the factorial task.
    pub factorial_n: u32,
    /// Limit of the sum-of-primes task.
    pub primes_limit: usize,
    /// Length of the array sorted by the sort task.
    pub sort_size: usize,
    /// Seed for the sort task's input, so the serial and parallel phases
    /// sort exactly the same values.
    pub seed: [u8; 32],
}

impl BenchConfig {
    /// A configuration using the default workload sizes and one worker per
    /// available CPU.
    pub fn new(seed: [u8; 32]) -> Self {
        BenchConfig {
            worker_count: num_cpus::get().max(1),
            data_size: DEFAULT_DATA_SIZE,
            factorial_n: DEFAULT_FACTORIAL_N,
            primes_limit: DEFAULT_PRIMES_LIMIT,
            sort_size: DEFAULT_SORT_SIZE,
            seed,
        }
    }

    /// Replaces the worker count, clamping it to at least one worker.
    #[cfg(test)]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }
}
