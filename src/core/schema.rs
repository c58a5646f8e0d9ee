//! Machine-readable report schemas written by `--json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::env::SystemInfo;
use crate::bench::{BenchmarkRun, BenchmarkSummary, RunSample};

/// Schema version for forward compatibility
pub const SCHEMA_VERSION: u32 = 1;

fn as_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

/// Metadata common to every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonMeta {
    pub schema_version: u32,
    pub source: PathBuf,
    pub extension: String,
    pub runtime: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
    pub cli_args: Vec<String>,
}

impl CommonMeta {
    /// Build metadata for a source file. The digest is taken now, before any
    /// step has a chance to move the file.
    pub fn new(source: &Path, extension: &str, runtime: &str, cli_args: Vec<String>) -> Self {
        CommonMeta {
            schema_version: SCHEMA_VERSION,
            source: source.to_path_buf(),
            extension: extension.to_string(),
            runtime: runtime.to_string(),
            timestamp: crate::now_string(),
            source_sha256: std::fs::read(source).ok().map(|b| crate::sha256_hex(&b)),
            cli_args,
        }
    }
}

/// Timing statistics in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingStat {
    pub iterations: u32,
    pub total_ms: f64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub stddev_ms: f64,
}

impl From<&BenchmarkSummary> for TimingStat {
    fn from(s: &BenchmarkSummary) -> Self {
        TimingStat {
            iterations: s.runs as u32,
            total_ms: as_ms(s.total),
            mean_ms: as_ms(s.mean),
            median_ms: as_ms(s.median),
            min_ms: as_ms(s.min),
            max_ms: as_ms(s.max),
            stddev_ms: as_ms(s.std_dev),
        }
    }
}

/// One benchmark iteration as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub duration_ms: f64,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RunSample> for SampleRecord {
    fn from(s: &RunSample) -> Self {
        SampleRecord {
            duration_ms: as_ms(s.duration),
            ok: s.failure.is_none(),
            error: s.failure.as_ref().map(|f| f.to_string()),
        }
    }
}

/// Report for a normal or timed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub meta: CommonMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<f64>,
    pub system: Option<SystemInfo>,
}

impl RunReport {
    pub fn new(meta: CommonMeta, elapsed: Option<Duration>) -> Self {
        RunReport { meta, elapsed_ms: elapsed.map(as_ms), system: Some(SystemInfo::detect()) }
    }
}

/// Report for a benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    #[serde(flatten)]
    pub meta: CommonMeta,
    pub runs: usize,
    pub failed_runs: usize,
    pub stats: TimingStat,
    pub samples: Vec<SampleRecord>,
    pub system: Option<SystemInfo>,
}

impl BenchReport {
    pub fn new(meta: CommonMeta, run: &BenchmarkRun) -> Self {
        BenchReport {
            meta,
            runs: run.samples.len(),
            failed_runs: run.failed_runs(),
            stats: TimingStat::from(&run.summary),
            samples: run.samples.iter().map(SampleRecord::from).collect(),
            system: Some(SystemInfo::detect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExitInfo;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_timing_stat_from_summary() {
        let summary = BenchmarkSummary::from_durations(&[ms(10), ms(20), ms(30)]).unwrap();
        let stat = TimingStat::from(&summary);
        assert_eq!(stat.iterations, 3);
        assert_eq!(stat.total_ms, 60.0);
        assert_eq!(stat.mean_ms, 20.0);
        assert_eq!(stat.median_ms, 20.0);
        assert_eq!(stat.min_ms, 10.0);
        assert_eq!(stat.max_ms, 30.0);
    }

    #[test]
    fn test_sample_record_carries_failure() {
        let failed = RunSample { duration: ms(5), failure: Some(ExitInfo::Status(Some(3))) };
        let rec = SampleRecord::from(&failed);
        assert!(!rec.ok);
        assert_eq!(rec.error.as_deref(), Some("exit status: 3"));
        assert_eq!(rec.duration_ms, 5.0);
    }

    #[test]
    fn test_common_meta_hashes_readable_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("hello.py");
        std::fs::write(&src, b"abc").unwrap();
        let meta = CommonMeta::new(&src, ".py", "python3", vec![]);
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.source_sha256.as_deref(), Some(crate::sha256_hex(b"abc").as_str()));

        let missing = CommonMeta::new(&dir.path().join("gone.py"), ".py", "python3", vec![]);
        assert!(missing.source_sha256.is_none());
    }

    #[test]
    fn test_bench_report_serializes_flat_meta() {
        let samples = vec![
            RunSample { duration: ms(10), failure: None },
            RunSample { duration: ms(20), failure: Some(ExitInfo::Status(Some(1))) },
        ];
        let run = BenchmarkRun::from_samples(samples).unwrap();
        let meta = CommonMeta::new(Path::new("nope.cpp"), ".cpp", "g++", vec!["--bench".into()]);
        let report = BenchReport { system: None, ..BenchReport::new(meta, &run) };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["extension"], ".cpp");
        assert_eq!(json["runs"], 2);
        assert_eq!(json["failed_runs"], 1);
        assert_eq!(json["samples"][1]["ok"], false);
    }
}
