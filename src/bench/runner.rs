use std::time::Instant;

use tracing::{debug, info};

use super::stats::{BenchmarkSummary, RunSample};
use crate::engine::{InvocationContext, Pipeline};
use crate::{RunError, RunResult};

/// Upper bound on up-front sample storage; larger runs grow as they go.
const MAX_PREALLOCATED_SAMPLES: usize = 1024;

/// Samples of one benchmark plus their summary.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub samples: Vec<RunSample>,
    pub summary: BenchmarkSummary,
}

impl BenchmarkRun {
    pub fn from_samples(samples: Vec<RunSample>) -> RunResult<Self> {
        let durations: Vec<_> = samples.iter().map(|s| s.duration).collect();
        let summary = BenchmarkSummary::from_durations(&durations)
            .ok_or_else(|| RunError::Message("benchmark produced no samples".into()))?;
        Ok(BenchmarkRun { samples, summary })
    }

    pub fn failed_runs(&self) -> usize {
        self.samples.iter().filter(|s| !s.ok()).count()
    }
}

/// Benchmark without progress reporting.
pub fn run_benchmark(pipeline: &Pipeline<'_>, ctx: &InvocationContext<'_>, runs: usize) -> RunResult<BenchmarkRun> {
    run_benchmark_with(pipeline, ctx, runs, |_, _, _| {})
}

/// Compile once, run `runs` times with output discarded, clean up once.
///
/// `on_sample(i, runs, sample)` is called after each iteration with a
/// 1-based index. A failing iteration is recorded and the loop continues.
pub fn run_benchmark_with<F>(
    pipeline: &Pipeline<'_>,
    ctx: &InvocationContext<'_>,
    runs: usize,
    mut on_sample: F,
) -> RunResult<BenchmarkRun>
where
    F: FnMut(usize, usize, &RunSample),
{
    if runs == 0 {
        return Err(RunError::Message("runs must be at least 1".into()));
    }
    pipeline.check_source(ctx)?;
    pipeline.ensure_runtime(ctx.profile)?;
    pipeline.compile(ctx)?;

    let cmd = pipeline.run_command(ctx).quiet();
    info!("benchmarking {} with {runs} iterations", ctx.source.display());
    debug!(argv = ?cmd.argv, cwd = ?cmd.cwd, "bench run");

    let mut samples = Vec::with_capacity(runs.min(MAX_PREALLOCATED_SAMPLES));
    for i in 0..runs {
        let start = Instant::now();
        let result = pipeline.executor().spawn(&cmd);
        let sample = RunSample { duration: start.elapsed(), failure: result.err() };
        on_sample(i + 1, runs, &sample);
        samples.push(sample);
    }

    pipeline.cleanup(ctx);
    BenchmarkRun::from_samples(samples)
}
