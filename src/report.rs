//! Human-readable console output for finished pipelines.

use crate::error::BenchError;
use crate::harness::{BenchmarkMetrics, BenchmarkOutcome};
use crate::tasks::TaskOutput;
use std::time::Duration;

fn secs(elapsed: Duration) -> String {
    format!("{:.4}s", elapsed.as_secs_f64())
}

/// Prints the banner that opens a pipeline's section.
pub fn section(title: &str, executor: &str, worker_count: usize) {
    println!("\n=== {} ({}) ===", title.to_uppercase(), executor);
    println!("Workers available: {}", worker_count);
}

fn summary(metrics: &BenchmarkMetrics) {
    match (metrics.speedup(), metrics.efficiency()) {
        (Ok(speedup), Ok(efficiency)) => {
            println!("Speedup       : {:.2}x", speedup);
            println!("Efficiency    : {:.2}%", efficiency);
            if metrics.exceeds_ideal() {
                println!("(efficiency above 100%: the measurement is suspect)");
            }
        }
        (Err(err), _) | (_, Err(err)) => {
            println!("Speedup       : N/A");
            println!("Efficiency    : N/A");
            println!("({})", err);
        }
    }
}

/// Prints the results of the data-parallel pipeline.
pub fn data_parallel(outcome: &BenchmarkOutcome<u128>) {
    println!("Serial result: {}", outcome.serial.output);
    println!("Serial time: {}", secs(outcome.serial.elapsed));
    println!("Parallel result: {}", outcome.parallel.output);
    println!("Parallel time: {}", secs(outcome.parallel.elapsed));
    summary(&outcome.metrics);
}

/// Prints every task's completion marker for both phases, then the summary.
pub fn task_parallel(outcome: &BenchmarkOutcome<Vec<TaskOutput>>) {
    println!("\n-- Serial Results --");
    for output in &outcome.serial.output {
        println!("{}", output);
    }
    println!("Serial time: {}", secs(outcome.serial.elapsed));

    println!("\n-- Parallel Results --");
    for output in &outcome.parallel.output {
        println!("{}", output);
    }
    println!("Parallel time: {}", secs(outcome.parallel.elapsed));

    println!("\n=== PERFORMANCE SUMMARY ===");
    println!("Serial Time   : {}", secs(outcome.serial.elapsed));
    println!("Parallel Time : {}", secs(outcome.parallel.elapsed));
    summary(&outcome.metrics);
}

/// Printed in place of the metrics of a pipeline that did not finish.
pub fn failure(title: &str, err: &BenchError) {
    println!("{} FAILED: {}", title, err);
    println!("Speedup and efficiency were not computed.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_use_four_decimals() {
        assert_eq!(secs(Duration::from_millis(1500)), "1.5000s");
        assert_eq!(secs(Duration::from_micros(1234)), "0.0012s");
    }
}
