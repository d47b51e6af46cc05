//! This module provides an `Executor` implementation which sequentially
//! processes jobs on the calling thread.

use crate::error::BenchError;
use crate::worker::{collect_ordered, execute, Executor, Job};

/// An `Executor` which runs every job, one after another, on the thread
/// that submitted them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequentialExecutor(());

impl SequentialExecutor {
    /// Create a new sequential executor.
    pub fn new() -> Self {
        SequentialExecutor(())
    }
}

impl Default for SequentialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for SequentialExecutor {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn worker_count(&self) -> usize {
        1
    }

    fn submit_all<J: Job>(&self, items: Vec<J>) -> Result<Vec<J::Output>, BenchError> {
        let slots = items.into_iter().map(|job| Some(execute(job))).collect();
        collect_ordered(slots)
    }
}
