use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::bench::{self, RunSample};
use crate::core::{BenchReport, CommonMeta, Platform, RunReport};
use crate::engine::{
    ConsentGate, DryRunStep, FixedConsent, InvocationContext, Mode, Pipeline, StdinConsent, SystemExecutor,
};
use crate::profile::{ProfileTable, builtin_profiles, config::DEFAULT_CONFIG, load_overrides};
use crate::{RunError, RunResult, write_json};

/// Options for one `polyrun <source>` invocation.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub source: PathBuf,
    pub dry_run: bool,
    pub time: bool,
    /// Benchmark iteration count when `--bench` was given.
    pub bench: Option<usize>,
    pub yes: bool,
    pub config: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Raw command line, recorded in JSON reports.
    pub cli_args: Vec<String>,
}

/// Built-in profiles for this platform plus overrides from `config`, or from
/// `polyrun.toml` in the current directory when present.
pub fn load_profiles(platform: Platform, config: Option<&Path>) -> RunResult<ProfileTable> {
    let mut table = builtin_profiles(platform);
    let path = match config {
        Some(p) => Some(p.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|p| p.is_file()),
    };
    if let Some(path) = path {
        let applied = load_overrides(&mut table, &path)?;
        info!("loaded {applied} language override(s) from {}", path.display());
    }
    Ok(table)
}

/// Reconcile the mode flags. Dry run wins over timing and benchmarking, and
/// benchmarking already includes timing.
pub fn resolve_mode(dry_run: bool, time: bool, bench: Option<usize>) -> Mode {
    if dry_run {
        if time || bench.is_some() {
            warn!("--dry-run cannot be used with --time or --bench; ignoring timing flags");
        }
        return Mode::DryRun;
    }
    if let Some(runs) = bench {
        if time {
            warn!("--bench already includes timing; ignoring --time");
        }
        return Mode::Benchmark(runs);
    }
    if time { Mode::Timed } else { Mode::Normal }
}

fn print_sample(i: usize, runs: usize, sample: &RunSample) {
    match &sample.failure {
        None => println!("Run {i}/{runs}... ✓ {:?}", sample.duration),
        Some(e) => println!("Run {i}/{runs}... ✗ Failed ({e})"),
    }
    let _ = std::io::stdout().flush();
}

pub fn run(args: RunArgs) -> RunResult<()> {
    let platform = Platform::current();
    let table = load_profiles(platform, args.config.as_deref())?;
    let mode = resolve_mode(args.dry_run, args.time, args.bench);

    let ctx = match InvocationContext::new(&args.source, &table, mode) {
        Ok(ctx) => ctx,
        Err(e @ RunError::UnsupportedExtension(_)) => {
            eprintln!("Run 'polyrun --list' to see supported languages.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let executor = SystemExecutor;
    let consent: Box<dyn ConsentGate> =
        if args.yes { Box::new(FixedConsent(true)) } else { Box::new(StdinConsent) };
    let pipeline = Pipeline::new(&executor, consent.as_ref(), platform);
    let meta = CommonMeta::new(&ctx.source, &ctx.extension, ctx.profile.runtime(), args.cli_args.clone());

    match mode {
        Mode::DryRun => {
            let report = pipeline.dry_run(&ctx);
            println!("{report}");
            match report.steps.last() {
                Some(DryRunStep::FileMissing(path)) => Err(RunError::SourceNotFound(path.clone())),
                Some(DryRunStep::RuntimeMissing(rt)) => Err(RunError::RuntimeUnavailable(rt.clone())),
                _ => Ok(()),
            }
        }
        Mode::Benchmark(runs) => {
            println!("🔥  Running benchmark with {runs} iterations...");
            println!("{}", "=".repeat(50));
            let run = bench::run_benchmark_with(&pipeline, &ctx, runs, print_sample)?;
            println!("{}", run.summary);
            let failed = run.failed_runs();
            if failed > 0 {
                println!("Failed runs:  {failed}/{runs} (included in statistics)");
            }
            if let Some(path) = &args.json {
                write_json(path, &BenchReport::new(meta, &run))?;
                info!("wrote report to {}", path.display());
            }
            Ok(())
        }
        Mode::Normal | Mode::Timed => {
            let outcome = pipeline.run_once(&ctx)?;
            if let Some(elapsed) = outcome.elapsed {
                println!("\n⏱  Execution time: {elapsed:?}");
            }
            if let Some(path) = &args.json {
                write_json(path, &RunReport::new(meta, outcome.elapsed))?;
                info!("wrote report to {}", path.display());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mode_precedence() {
        assert_eq!(resolve_mode(false, false, None), Mode::Normal);
        assert_eq!(resolve_mode(false, true, None), Mode::Timed);
        assert_eq!(resolve_mode(false, true, Some(5)), Mode::Benchmark(5));
        assert_eq!(resolve_mode(true, true, Some(5)), Mode::DryRun);
        assert_eq!(resolve_mode(true, false, None), Mode::DryRun);
    }

    #[test]
    fn test_load_profiles_applies_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("langs.toml");
        std::fs::write(
            &cfg,
            r#"
[language.".cr"]
name = "Crystal"
detect = "crystal --version"
manual = "Install Crystal from https://crystal-lang.org"
run = "crystal run"
"#,
        )
        .unwrap();
        let table = load_profiles(Platform::Linux, Some(&cfg)).unwrap();
        assert_eq!(table.get(".cr").unwrap().name, "Crystal");
        assert!(table.get(".py").is_some());
    }

    #[test]
    fn test_load_profiles_missing_explicit_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_profiles(Platform::Linux, Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }
}
