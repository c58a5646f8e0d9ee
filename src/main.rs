#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use polyrun::{list_cmd, run_cmd};

const DEFAULT_BENCH_RUNS: &str = "10";

#[derive(Parser, Debug)]
#[command(name = "polyrun")]
#[command(about = "Run a source file in any supported language", long_about = None)]
#[command(after_help = "Examples:
  polyrun script.py                 Run Python script
  polyrun --time app.js             Run with execution time
  polyrun --bench 20 program.cpp    Benchmark with 20 runs
  polyrun --dry-run test.go         Preview without executing
  polyrun --list                    Show all supported languages")]
struct Cli {
    /// Show version information
    #[arg(short = 'v', long)]
    version: bool,

    /// List all supported languages
    #[arg(short, long)]
    list: bool,

    /// Show what would be executed without running
    #[arg(short, long)]
    dry_run: bool,

    /// Measure and display execution time
    #[arg(short, long)]
    time: bool,

    /// Run benchmark (default: 10 runs)
    #[arg(short, long, value_name = "N", num_args = 0..=1, default_missing_value = DEFAULT_BENCH_RUNS)]
    bench: Option<String>,

    /// Install missing toolchains without asking
    #[arg(short, long)]
    yes: bool,

    /// Language override file (defaults to ./polyrun.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write machine-readable JSON report to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Enable verbose logging (or set POLYRUN_LOG)
    #[arg(long)]
    verbose: bool,

    /// Source file to run
    source: Option<PathBuf>,
}

/// `--bench` takes an optional count; anything non-numeric after it is the
/// source file.
fn split_bench(bench: Option<String>, source: Option<PathBuf>) -> (Option<usize>, Option<PathBuf>) {
    match bench {
        None => (None, source),
        Some(value) => match value.parse::<usize>() {
            Ok(n) if value.bytes().all(|b| b.is_ascii_digit()) => (Some(n), source),
            _ => {
                let default = DEFAULT_BENCH_RUNS.parse().ok();
                (default, source.or(Some(PathBuf::from(value))))
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("POLYRUN_LOG").unwrap_or_else(|_| {
        if verbose { "polyrun=debug".to_string() } else { "polyrun=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli_args: Vec<String> = std::env::args().skip(1).collect();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.version {
        println!("polyrun version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = if cli.list {
        list_cmd::run(cli.config.as_deref())
    } else {
        let (bench, source) = split_bench(cli.bench, cli.source);
        let Some(source) = source else {
            let _ = Cli::command().print_help();
            std::process::exit(1);
        };
        run_cmd::run(run_cmd::RunArgs {
            source,
            dry_run: cli.dry_run,
            time: cli.time,
            bench,
            yes: cli.yes,
            config: cli.config,
            json: cli.json,
            cli_args,
        })
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_bench_numeric_count() {
        let (runs, src) = split_bench(Some("20".into()), Some(PathBuf::from("a.cpp")));
        assert_eq!(runs, Some(20));
        assert_eq!(src, Some(PathBuf::from("a.cpp")));
    }

    #[test]
    fn test_split_bench_non_numeric_is_source() {
        let (runs, src) = split_bench(Some("prog.cpp".into()), None);
        assert_eq!(runs, Some(10));
        assert_eq!(src, Some(PathBuf::from("prog.cpp")));
    }

    #[test]
    fn test_cli_parses_bench_without_value() {
        let cli = Cli::try_parse_from(["polyrun", "prog.cpp", "--bench"]).unwrap();
        assert_eq!(cli.bench.as_deref(), Some("10"));
        assert_eq!(cli.source, Some(PathBuf::from("prog.cpp")));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::try_parse_from(["polyrun", "-d", "-t", "-y", "x.py"]).unwrap();
        assert!(cli.dry_run && cli.time && cli.yes);
        assert!(!cli.version);
    }
}
