//! Dry-run simulation: the pipeline's decisions without its side effects.

use std::fmt;
use std::path::PathBuf;

use super::executor::CommandSpec;
use super::pipeline::{InvocationContext, Pipeline};

/// One reported decision, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryRunStep {
    FileMissing(PathBuf),
    FileExists,
    /// The source is gone but its project directory exists (earlier run).
    SourceAlreadyMoved(PathBuf),
    RuntimeMissing(String),
    RuntimeFound(String),
    Scaffold(CommandSpec),
    MoveSource { from: PathBuf, to: PathBuf },
    ProjectExists(PathBuf),
    Compile(CommandSpec),
    Run(CommandSpec),
    Cleanup(Vec<PathBuf>),
}

#[derive(Debug, Clone)]
pub struct DryRunReport {
    pub source: PathBuf,
    pub extension: String,
    pub runtime: String,
    pub steps: Vec<DryRunStep>,
}

impl DryRunReport {
    /// False when the simulation stopped on a missing file or runtime.
    pub fn succeeded(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|s| matches!(s, DryRunStep::FileMissing(_) | DryRunStep::RuntimeMissing(_)))
    }
}

/// Walk the pipeline for `ctx`. Only the availability probe is spawned.
pub(crate) fn simulate(pipeline: &Pipeline<'_>, ctx: &InvocationContext<'_>) -> DryRunReport {
    let mut report = DryRunReport {
        source: ctx.source.clone(),
        extension: ctx.extension.clone(),
        runtime: ctx.profile.runtime().to_string(),
        steps: Vec::new(),
    };
    let steps = &mut report.steps;

    if pipeline.executor().exists(&ctx.source) {
        steps.push(DryRunStep::FileExists);
    } else if pipeline.source_present(ctx) {
        steps.push(DryRunStep::SourceAlreadyMoved(
            ctx.layout.project_dir.clone().unwrap_or_default(),
        ));
    } else {
        steps.push(DryRunStep::FileMissing(ctx.source.clone()));
        return report;
    }

    let runtime = ctx.profile.runtime().to_string();
    if !pipeline.is_available(ctx.profile) {
        steps.push(DryRunStep::RuntimeMissing(runtime));
        return report;
    }
    steps.push(DryRunStep::RuntimeFound(runtime));

    if let Some(dir) = &ctx.layout.project_dir {
        match pipeline.scaffold_plan(ctx) {
            Some((scaffold, entry)) => {
                steps.push(DryRunStep::Scaffold(scaffold));
                steps.push(DryRunStep::MoveSource { from: ctx.source.clone(), to: entry });
            }
            None => steps.push(DryRunStep::ProjectExists(dir.clone())),
        }
    }
    if let Some(compile) = pipeline.compile_command(ctx) {
        steps.push(DryRunStep::Compile(compile));
    }
    steps.push(DryRunStep::Run(pipeline.run_command(ctx)));
    if ctx.profile.is_compiled() {
        steps.push(DryRunStep::Cleanup(pipeline.cleanup_paths(ctx)));
    }
    report
}

fn write_command(f: &mut fmt::Formatter<'_>, cmd: &CommandSpec) -> fmt::Result {
    match &cmd.cwd {
        Some(dir) => writeln!(f, "  Command: {} (in {})", cmd.display(), dir.display()),
        None => writeln!(f, "  Command: {}", cmd.display()),
    }
}

impl fmt::Display for DryRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dry Run Mode - No execution will occur")?;
        writeln!(f, "{}", "=".repeat(41))?;
        writeln!(f, "File: {}", self.source.display())?;
        writeln!(f, "Language: {}", self.extension)?;
        writeln!(f, "Runtime: {}", self.runtime)?;

        for step in &self.steps {
            match step {
                DryRunStep::FileMissing(path) => writeln!(f, "✗ File not found: {}", path.display())?,
                DryRunStep::FileExists => writeln!(f, "✓ File exists")?,
                DryRunStep::SourceAlreadyMoved(dir) => {
                    writeln!(f, "✓ Source already moved into {}", dir.display())?
                }
                DryRunStep::RuntimeMissing(rt) => {
                    writeln!(f, "✗ Runtime '{rt}' not found (would prompt for installation)")?
                }
                DryRunStep::RuntimeFound(rt) => writeln!(f, "✓ Runtime '{rt}' is installed")?,
                DryRunStep::Scaffold(cmd) => {
                    writeln!(f, "\nProject step:")?;
                    writeln!(f, "  Would create project: {}", cmd.display())?;
                }
                DryRunStep::MoveSource { from, to } => {
                    writeln!(f, "  Would move {} to {}", from.display(), to.display())?
                }
                DryRunStep::ProjectExists(dir) => {
                    writeln!(f, "\nProject step:")?;
                    writeln!(f, "  Using existing project {}", dir.display())?;
                }
                DryRunStep::Compile(cmd) => {
                    writeln!(f, "\nCompilation step:")?;
                    write_command(f, cmd)?;
                }
                DryRunStep::Run(cmd) => {
                    writeln!(f, "\nExecution step:")?;
                    write_command(f, cmd)?;
                }
                DryRunStep::Cleanup(paths) => {
                    writeln!(f, "\nCleanup step:")?;
                    if paths.is_empty() {
                        writeln!(f, "  Nothing to remove (toolchain manages its own output)")?;
                    }
                    for p in paths {
                        writeln!(f, "  Would remove: {}", p.display())?;
                    }
                }
            }
        }

        if self.succeeded() {
            write!(f, "\n✓ Dry run complete")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Platform;
    use crate::engine::consent::FixedConsent;
    use crate::engine::executor::MockExecutor;
    use crate::engine::pipeline::Mode;
    use crate::profile::builtin_profiles;

    #[test]
    fn test_missing_file_stops_before_probe() {
        let table = builtin_profiles(Platform::Linux);
        let mock = MockExecutor::new();
        let consent = FixedConsent(true);
        let pipeline = Pipeline::new(&mock, &consent, Platform::Linux);
        let ctx = InvocationContext::new("fib.cpp", &table, Mode::DryRun).unwrap();

        let report = pipeline.dry_run(&ctx);
        assert_eq!(report.steps, vec![DryRunStep::FileMissing(PathBuf::from("fib.cpp"))]);
        assert!(!report.succeeded());
        assert!(mock.calls().is_empty());
        assert!(report.to_string().contains("✗ File not found: fib.cpp"));
    }

    #[test]
    fn test_missing_runtime_stops_before_compile() {
        let table = builtin_profiles(Platform::Linux);
        let mock = MockExecutor::new().with_path("fib.cpp").missing("g++");
        let consent = FixedConsent(true);
        let pipeline = Pipeline::new(&mock, &consent, Platform::Linux);
        let ctx = InvocationContext::new("fib.cpp", &table, Mode::DryRun).unwrap();

        let report = pipeline.dry_run(&ctx);
        assert_eq!(
            report.steps,
            vec![DryRunStep::FileExists, DryRunStep::RuntimeMissing("g++".into())]
        );
        assert!(report.to_string().contains("would prompt for installation"));
        assert_eq!(mock.spawned().len(), 1);
    }

    #[test]
    fn test_native_report_lists_all_steps() {
        let table = builtin_profiles(Platform::Linux);
        let mock = MockExecutor::new().with_path("fib.cpp");
        let consent = FixedConsent(false);
        let pipeline = Pipeline::new(&mock, &consent, Platform::Linux);
        let ctx = InvocationContext::new("fib.cpp", &table, Mode::DryRun).unwrap();

        let text = pipeline.dry_run(&ctx).to_string();
        assert!(text.contains("  Command: g++ fib.cpp -o fib"));
        assert!(text.contains("  Command: ./fib"));
        assert!(text.contains("  Would remove: ./fib"));
        assert!(text.ends_with("✓ Dry run complete"));
        // only the probe was spawned
        assert_eq!(mock.spawned_argvs(), vec![vec!["g++".to_string(), "--version".to_string()]]);
    }

    #[test]
    fn test_project_report_mentions_scaffold_and_move() {
        let table = builtin_profiles(Platform::Linux);
        let mock = MockExecutor::new().with_path("hello.cs");
        let consent = FixedConsent(false);
        let pipeline = Pipeline::new(&mock, &consent, Platform::Linux);
        let ctx = InvocationContext::new("hello.cs", &table, Mode::DryRun).unwrap();

        let report = pipeline.dry_run(&ctx);
        assert!(report.steps.contains(&DryRunStep::MoveSource {
            from: PathBuf::from("hello.cs"),
            to: PathBuf::from("hello/Program.cs"),
        }));
        let text = report.to_string();
        assert!(text.contains("Would create project: dotnet new console -o hello"));
        assert!(text.contains("  Command: dotnet build (in hello)"));
        assert!(text.contains("Nothing to remove"));
        assert!(!mock.calls().iter().any(|c| matches!(c, crate::engine::executor::MockCall::Rename(..))));
    }

    #[test]
    fn test_interpreted_report_has_no_compile_or_cleanup() {
        let table = builtin_profiles(Platform::Linux);
        let mock = MockExecutor::new().with_path("app.js");
        let consent = FixedConsent(false);
        let pipeline = Pipeline::new(&mock, &consent, Platform::Linux);
        let ctx = InvocationContext::new("app.js", &table, Mode::DryRun).unwrap();

        let report = pipeline.dry_run(&ctx);
        assert!(!report.steps.iter().any(|s| matches!(s, DryRunStep::Compile(_) | DryRunStep::Cleanup(_))));
        assert!(report.to_string().contains("  Command: node app.js"));
    }
}
