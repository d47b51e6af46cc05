//! The heterogeneous CPU-bound workloads used by the task-parallel pipeline.
//!
//! Each workload is a variant of `Task`, so it can be moved to any worker as
//! plain data.

use crate::error::WorkError;
use crate::worker::Job;
use rand::distributions::uniform::Uniform;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

/// Largest value produced for the sort task's input.
pub const SORT_VALUE_MAX: u32 = 1_000_000;

/// Base of the limbs used to accumulate factorials.
const LIMB_BASE: u64 = 1_000_000_000;
const LIMB_DIGITS: usize = 9;

/// One workload, carried as plain data so any worker can run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Computes `n!` exactly.
    Factorial(u32),
    /// Sums every prime `<= limit`.
    SumPrimes(usize),
    /// Sorts the given values.
    Sort(Vec<u32>),
}

impl Task {
    /// A sort task over `size` values drawn uniformly from
    /// `0..=SORT_VALUE_MAX`.
    ///
    /// The input is generated here, ahead of any timed region, so the same
    /// seed always yields the same task.
    pub fn random_sort(size: usize, seed: [u8; 32]) -> Task {
        let dist = Uniform::new(0, SORT_VALUE_MAX + 1);
        let rng = &mut StdRng::from_seed(seed);

        Task::Sort((0..size).map(|_| dist.sample(rng)).collect())
    }
}

/// Completion marker of a finished `Task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
    /// Output of `Task::Factorial`.
    Factorial {
        /// The argument.
        n: u32,
        /// Number of decimal digits of `n!`.
        digits: usize,
        /// `n! mod 10^9`.
        low_digits: u64,
    },
    /// Output of `Task::SumPrimes`.
    SumPrimes {
        /// The inclusive upper bound.
        limit: usize,
        /// Sum of every prime `<= limit`.
        total: u64,
    },
    /// Output of `Task::Sort`.
    Sorted {
        /// Number of sorted values.
        len: usize,
        /// Smallest value, if any.
        min: Option<u32>,
        /// Largest value, if any.
        max: Option<u32>,
    },
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskOutput::Factorial { n, digits, .. } => {
                write!(f, "Factorial({}) done ({} digits)", n, digits)
            }
            TaskOutput::SumPrimes { limit, total } => {
                write!(f, "Sum of primes <= {}: {}", limit, total)
            }
            TaskOutput::Sorted { len, .. } => write!(f, "Sorted list of {} elements", len),
        }
    }
}

impl Job for Task {
    type Output = TaskOutput;

    fn run(self) -> Result<TaskOutput, WorkError> {
        match self {
            Task::Factorial(n) => Ok(factorial(n)),
            Task::SumPrimes(limit) => Ok(TaskOutput::SumPrimes {
                limit,
                total: sum_primes(limit),
            }),
            Task::Sort(values) => Ok(sort(values)),
        }
    }
}

/// `n!` as little-endian base-10^9 limbs.
fn factorial_limbs(n: u32) -> Vec<u64> {
    let mut limbs = vec![1u64];

    for i in 2..=u64::from(n) {
        let mut carry = 0;
        for limb in limbs.iter_mut() {
            let product = *limb * i + carry;
            *limb = product % LIMB_BASE;
            carry = product / LIMB_BASE;
        }
        while carry > 0 {
            limbs.push(carry % LIMB_BASE);
            carry /= LIMB_BASE;
        }
    }

    limbs
}

fn factorial(n: u32) -> TaskOutput {
    let limbs = factorial_limbs(n);

    // Every limb but the most significant one is exactly LIMB_DIGITS wide.
    let top = limbs[limbs.len() - 1];
    let digits = (limbs.len() - 1) * LIMB_DIGITS + top.to_string().len();

    TaskOutput::Factorial {
        n,
        digits,
        low_digits: limbs[0],
    }
}

/// Sum of the primes `<= limit`, by the sieve of Eratosthenes.
pub fn sum_primes(limit: usize) -> u64 {
    if limit < 2 {
        return 0;
    }

    let mut sieve = vec![true; limit + 1];
    sieve[0] = false;
    sieve[1] = false;

    let mut i = 2;
    while i * i <= limit {
        if sieve[i] {
            for multiple in (i * i..=limit).step_by(i) {
                sieve[multiple] = false;
            }
        }
        i += 1;
    }

    sieve
        .iter()
        .enumerate()
        .filter(|&(_, &prime)| prime)
        .map(|(value, _)| value as u64)
        .sum()
}

fn sort(mut values: Vec<u32>) -> TaskOutput {
    values.sort_unstable();

    TaskOutput::Sorted {
        len: values.len(),
        min: values.first().cloned(),
        max: values.last().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_factorials() {
        assert_eq!(
            Task::Factorial(10).run(),
            Ok(TaskOutput::Factorial { n: 10, digits: 7, low_digits: 3_628_800 })
        );
        assert_eq!(
            Task::Factorial(0).run(),
            Ok(TaskOutput::Factorial { n: 0, digits: 1, low_digits: 1 })
        );
    }

    #[test]
    fn factorial_spanning_limbs() {
        // 20! = 2432902008176640000
        assert_eq!(factorial_limbs(20), vec![176_640_000, 432_902_008, 2]);

        match factorial(100) {
            TaskOutput::Factorial { digits, low_digits, .. } => {
                assert_eq!(digits, 158);
                // 100! ends in 24 zeros.
                assert_eq!(low_digits, 0);
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn prime_sums() {
        assert_eq!(sum_primes(0), 0);
        assert_eq!(sum_primes(1), 0);
        assert_eq!(sum_primes(2), 2);
        assert_eq!(sum_primes(10), 17);
        assert_eq!(sum_primes(100), 1060);
        assert_eq!(sum_primes(2_000_000), 142_913_828_922);
    }

    #[test]
    fn sort_reports_bounds() {
        assert_eq!(
            Task::Sort(vec![5, 3, 9, 1]).run(),
            Ok(TaskOutput::Sorted { len: 4, min: Some(1), max: Some(9) })
        );
        assert_eq!(
            Task::Sort(Vec::new()).run(),
            Ok(TaskOutput::Sorted { len: 0, min: None, max: None })
        );
    }

    #[test]
    fn random_sort_is_reproducible() {
        let a = Task::random_sort(1000, [3; 32]);
        let b = Task::random_sort(1000, [3; 32]);
        assert_eq!(a, b);

        match a {
            Task::Sort(values) => {
                assert_eq!(values.len(), 1000);
                assert!(values.iter().all(|&v| v <= SORT_VALUE_MAX));
            }
            other => panic!("unexpected task: {:?}", other),
        }
    }

    #[test]
    fn markers_read_like_the_report() {
        assert_eq!(
            TaskOutput::SumPrimes { limit: 100, total: 1060 }.to_string(),
            "Sum of primes <= 100: 1060"
        );
        assert_eq!(factorial(10).to_string(), "Factorial(10) done (7 digits)");
    }
}
