//! Real-process smoke tests using `sh` as the toolchain.

#![cfg(unix)]

use std::time::Duration;

use polyrun::core::{BenchReport, CommonMeta, Platform};
use polyrun::engine::{FixedConsent, InvocationContext, Mode, Outcome, Pipeline, SystemExecutor};
use polyrun::profile::{ProfileTable, config::parse_overrides};
use polyrun::{ExitInfo, RunError};

const SH_PROFILE: &str = r#"
[language.".sh"]
name = "POSIX shell"
detect = "sh -c true"
manual = "install a POSIX shell"
run = "sh"
"#;

fn sh_table() -> ProfileTable {
    let mut table = ProfileTable::new();
    for (ext, profile) in parse_overrides(SH_PROFILE).unwrap() {
        table.insert(ext, profile).unwrap();
    }
    table
}

#[test]
fn test_runs_script_and_times_it() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("hello.sh");
    std::fs::write(&script, "sleep 0.05\n").unwrap();

    let table = sh_table();
    let consent = FixedConsent(false);
    let pipeline = Pipeline::new(&SystemExecutor, &consent, Platform::current());
    let ctx = InvocationContext::new(&script, &table, Mode::Timed).unwrap();

    let Outcome::Ran(outcome) = pipeline.execute(&ctx).unwrap() else {
        panic!("expected a single run");
    };
    assert!(outcome.elapsed.unwrap() >= Duration::from_millis(40));
}

#[test]
fn test_nonzero_exit_is_run_failure() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fail.sh");
    std::fs::write(&script, "exit 3\n").unwrap();

    let table = sh_table();
    let consent = FixedConsent(false);
    let pipeline = Pipeline::new(&SystemExecutor, &consent, Platform::current());
    let ctx = InvocationContext::new(&script, &table, Mode::Normal).unwrap();

    let err = pipeline.run_once(&ctx).unwrap_err();
    assert!(matches!(err, RunError::RunFailed(ExitInfo::Status(Some(3)))));
}

#[test]
fn test_benchmark_report_round_trips_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("flaky.sh");
    // fails on every second run, tracked through a counter file
    let counter = dir.path().join("count");
    std::fs::write(
        &script,
        format!(
            "n=$(cat '{c}' 2>/dev/null || echo 0); n=$((n+1)); echo $n > '{c}'; [ $((n % 2)) -eq 1 ]\n",
            c = counter.display()
        ),
    )
    .unwrap();

    let table = sh_table();
    let consent = FixedConsent(false);
    let pipeline = Pipeline::new(&SystemExecutor, &consent, Platform::current());
    let ctx = InvocationContext::new(&script, &table, Mode::Benchmark(4)).unwrap();
    let meta = CommonMeta::new(&ctx.source, &ctx.extension, ctx.profile.runtime(), vec!["--bench".into()]);

    let Outcome::Benchmark(run) = pipeline.execute(&ctx).unwrap() else {
        panic!("expected a benchmark");
    };
    assert_eq!(run.samples.len(), 4);
    assert_eq!(run.failed_runs(), 2);

    let out = dir.path().join("report/bench.json");
    polyrun::write_json(&out, &BenchReport::new(meta, &run)).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(json["runtime"], "sh");
    assert_eq!(json["stats"]["iterations"], 4);
    assert_eq!(json["failed_runs"], 2);
    assert!(json["source_sha256"].is_string());
}
