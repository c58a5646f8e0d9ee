//! Benchmark mode: repeated runs of one compiled program and their statistics.

pub mod runner;
pub mod stats;

pub use runner::{BenchmarkRun, run_benchmark, run_benchmark_with};
pub use stats::{BenchmarkSummary, RunSample};
