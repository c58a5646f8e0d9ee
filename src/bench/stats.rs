//! Summary statistics over benchmark durations.

use std::fmt;
use std::time::Duration;

use crate::ExitInfo;

/// One benchmark iteration. Failed iterations keep their duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSample {
    pub duration: Duration,
    pub failure: Option<ExitInfo>,
}

impl RunSample {
    pub fn ok(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkSummary {
    pub runs: usize,
    pub total: Duration,
    pub mean: Duration,
    /// Element at index `n / 2` of the sorted durations (the upper middle for
    /// even counts).
    pub median: Duration,
    pub min: Duration,
    pub max: Duration,
    /// Population standard deviation.
    pub std_dev: Duration,
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// `total / n` without narrowing `n` to the `u32` that `Duration` division takes.
fn mean_of(total: Duration, n: usize) -> Duration {
    let nanos = total.as_nanos() / n as u128;
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}

impl BenchmarkSummary {
    /// `None` for an empty slice.
    pub fn from_durations(durations: &[Duration]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }
        let mut sorted = durations.to_vec();
        sorted.sort();

        let n = sorted.len();
        let total: Duration = sorted.iter().sum();
        let mean = mean_of(total, n);
        let mean_ns = mean.as_nanos() as f64;
        let variance = sorted
            .iter()
            .map(|d| {
                let diff = d.as_nanos() as f64 - mean_ns;
                diff * diff
            })
            .sum::<f64>()
            / n as f64;

        Some(BenchmarkSummary {
            runs: n,
            total,
            mean,
            median: sorted[n / 2],
            min: sorted[0],
            max: sorted[n - 1],
            std_dev: Duration::from_nanos(variance.sqrt() as u64),
        })
    }
}

impl fmt::Display for BenchmarkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "  Benchmark Results:")?;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(f, "Runs:         {}", self.runs)?;
        writeln!(f, "Total time:   {:?}", self.total)?;
        writeln!(f, "Average:      {:?}", self.mean)?;
        writeln!(f, "Median:       {:?}", self.median)?;
        writeln!(f, "Min:          {:?}", self.min)?;
        writeln!(f, "Max:          {:?}", self.max)?;
        writeln!(f, "Std Dev:      {:?}", self.std_dev)?;
        write!(f, "{}", "=".repeat(50))
    }
}
