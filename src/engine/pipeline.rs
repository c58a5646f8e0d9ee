//! The execution pipeline: detect, install, compile, run, cleanup.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::availability::is_available;
use super::consent::ConsentGate;
use super::dry_run::{self, DryRunReport};
use super::executor::{CommandSpec, Executor};
use super::naming::{self, ProgramLayout};
use crate::bench::{self, BenchmarkRun};
use crate::core::Platform;
use crate::profile::{BuildKind, InstallCommand, LanguageProfile, ProfileTable};
use crate::{RunError, RunResult};

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Timed,
    DryRun,
    Benchmark(usize),
}

/// Everything the pipeline needs for one request.
#[derive(Debug, Clone)]
pub struct InvocationContext<'p> {
    pub source: PathBuf,
    pub extension: String,
    pub profile: &'p LanguageProfile,
    pub layout: ProgramLayout,
    pub mode: Mode,
}

impl<'p> InvocationContext<'p> {
    /// Resolve the profile for `source` from `table` and derive its layout.
    pub fn new(source: impl Into<PathBuf>, table: &'p ProfileTable, mode: Mode) -> RunResult<Self> {
        let source = source.into();
        let extension = naming::extension_of(&source)?;
        let profile = table.lookup(&extension)?;
        Self::with_profile(source, extension, profile, mode)
    }

    pub fn with_profile(
        source: impl Into<PathBuf>,
        extension: impl Into<String>,
        profile: &'p LanguageProfile,
        mode: Mode,
    ) -> RunResult<Self> {
        let source = source.into();
        let layout = naming::resolve(&source, profile)?;
        Ok(InvocationContext { source, extension: extension.into(), profile, layout, mode })
    }

    pub fn program_name(&self) -> &str {
        &self.layout.program_name
    }
}

/// Result of a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Wall-clock time of the run step, when timing was requested.
    pub elapsed: Option<Duration>,
}

/// Result of [`Pipeline::execute`], one variant per mode family.
#[derive(Debug, Clone)]
pub enum Outcome {
    Ran(RunOutcome),
    DryRun(DryRunReport),
    Benchmark(BenchmarkRun),
}

/// Drives external processes for one invocation.
///
/// Sequential and blocking; a hung child blocks the caller. The project
/// working directory is passed per spawn and never changes the process-wide
/// current directory.
pub struct Pipeline<'a> {
    executor: &'a dyn Executor,
    consent: &'a dyn ConsentGate,
    platform: Platform,
}

impl<'a> Pipeline<'a> {
    pub fn new(executor: &'a dyn Executor, consent: &'a dyn ConsentGate, platform: Platform) -> Self {
        Pipeline { executor, consent, platform }
    }

    pub fn executor(&self) -> &dyn Executor {
        self.executor
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Run whatever the context's mode asks for.
    pub fn execute(&self, ctx: &InvocationContext<'_>) -> RunResult<Outcome> {
        match ctx.mode {
            Mode::Normal | Mode::Timed => self.run_once(ctx).map(Outcome::Ran),
            Mode::DryRun => Ok(Outcome::DryRun(self.dry_run(ctx))),
            Mode::Benchmark(runs) => self.run_benchmark(ctx, runs).map(Outcome::Benchmark),
        }
    }

    pub fn is_available(&self, profile: &LanguageProfile) -> bool {
        is_available(self.executor, &profile.detect)
    }

    /// The source must exist, except on a re-run of a project language whose
    /// source was already moved into its project directory.
    pub fn check_source(&self, ctx: &InvocationContext<'_>) -> RunResult<()> {
        if self.source_present(ctx) {
            Ok(())
        } else {
            Err(RunError::SourceNotFound(ctx.source.clone()))
        }
    }

    pub(crate) fn source_present(&self, ctx: &InvocationContext<'_>) -> bool {
        self.executor.exists(&ctx.source)
            || ctx.layout.project_dir.as_deref().is_some_and(|d| self.executor.exists(d))
    }

    /// Detect, and if missing ask for consent, install, and detect once more.
    pub fn ensure_runtime(&self, profile: &LanguageProfile) -> RunResult<()> {
        if self.is_available(profile) {
            return Ok(());
        }
        let runtime = profile.runtime().to_string();
        if !self.consent.confirm_install(&runtime) {
            return Err(RunError::InstallDeclined(runtime));
        }
        let argv = match &profile.install {
            InstallCommand::Command(argv) => argv.clone(),
            InstallCommand::Manual(instructions) => {
                return Err(RunError::InstallUnsupported {
                    runtime,
                    instructions: instructions.clone(),
                });
            }
        };

        info!("installing {runtime}: {}", argv.join(" "));
        self.executor
            .spawn(&CommandSpec::new(argv))
            .map_err(|e| RunError::InstallFailed { runtime: runtime.clone(), detail: e.to_string() })?;

        if !self.is_available(profile) {
            return Err(RunError::InstallFailed {
                runtime,
                detail: "runtime still not found after installation".into(),
            });
        }
        Ok(())
    }

    /// Compile argv for the context, `None` for interpreted languages.
    pub fn compile_command(&self, ctx: &InvocationContext<'_>) -> Option<CommandSpec> {
        let build = ctx.profile.build.as_ref()?;
        let source = ctx.source.to_string_lossy().to_string();
        let name = ctx.program_name();
        let mut argv = naming::expand_program(&build.compile, name);
        let spec = match &build.kind {
            BuildKind::Native => {
                argv.extend([source, "-o".to_string(), name.to_string()]);
                CommandSpec::new(argv)
            }
            BuildKind::ClassBased => {
                argv.push(source);
                CommandSpec::new(argv)
            }
            BuildKind::Project { .. } => CommandSpec::new(argv).in_dir(ctx.layout.project_dir.clone()),
        };
        Some(spec)
    }

    /// Run argv for the context, output inherited.
    pub fn run_command(&self, ctx: &InvocationContext<'_>) -> CommandSpec {
        let name = ctx.program_name();
        let mut argv = naming::expand_program(&ctx.profile.run, name);
        match ctx.profile.build.as_ref().map(|b| &b.kind) {
            None => {
                argv.push(ctx.source.to_string_lossy().to_string());
                CommandSpec::new(argv)
            }
            Some(BuildKind::Native) => CommandSpec::new(argv),
            Some(BuildKind::ClassBased) => {
                argv.push(name.to_string());
                CommandSpec::new(argv)
            }
            Some(BuildKind::Project { .. }) => CommandSpec::new(argv).in_dir(ctx.layout.project_dir.clone()),
        }
    }

    /// Artifacts removed after running; empty unless cleanup-eligible.
    pub fn cleanup_paths(&self, ctx: &InvocationContext<'_>) -> Vec<PathBuf> {
        if ctx.profile.needs_cleanup() {
            naming::artifact_paths(ctx.program_name(), self.platform)
        } else {
            Vec::new()
        }
    }

    /// Scaffold argv and entry-file destination for a project that does not
    /// exist yet.
    pub(crate) fn scaffold_plan(&self, ctx: &InvocationContext<'_>) -> Option<(CommandSpec, PathBuf)> {
        let BuildKind::Project { scaffold, entry_file } = &ctx.profile.build.as_ref()?.kind else {
            return None;
        };
        let dir = ctx.layout.project_dir.as_ref()?;
        if self.executor.exists(dir) {
            return None;
        }
        let mut argv = scaffold.clone();
        argv.push(dir.to_string_lossy().to_string());
        Some((CommandSpec::new(argv), dir.join(entry_file)))
    }

    /// Create the project directory and move the source into it, once.
    pub(crate) fn prepare_project(&self, ctx: &InvocationContext<'_>) -> RunResult<()> {
        let Some((scaffold, entry)) = self.scaffold_plan(ctx) else {
            return Ok(());
        };
        let dir = ctx.layout.project_dir.clone().unwrap_or_default();
        info!("creating project in {}", dir.display());
        self.executor
            .spawn(&scaffold)
            .map_err(|e| RunError::ScaffoldFailed { dir: dir.clone(), detail: e.to_string() })?;
        info!("moving {} to {}", ctx.source.display(), entry.display());
        self.executor
            .rename(&ctx.source, &entry)
            .map_err(|e| RunError::ScaffoldFailed { dir, detail: e.to_string() })
    }

    /// Project preparation and compilation; a no-op for interpreted languages.
    pub(crate) fn compile(&self, ctx: &InvocationContext<'_>) -> RunResult<()> {
        let Some(cmd) = self.compile_command(ctx) else {
            return Ok(());
        };
        self.prepare_project(ctx)?;
        info!("compiling {}", ctx.source.display());
        debug!(argv = ?cmd.argv, cwd = ?cmd.cwd, "compile");
        self.executor.spawn(&cmd).map_err(RunError::CompileFailed)?;
        info!("compilation successful");
        Ok(())
    }

    /// Best-effort artifact removal. Errors are logged, never returned.
    pub(crate) fn cleanup(&self, ctx: &InvocationContext<'_>) {
        for path in self.cleanup_paths(ctx) {
            match self.executor.remove_file(&path) {
                Ok(()) => debug!("removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("cleanup of {} skipped: not present", path.display())
                }
                Err(e) => warn!("failed to remove {}: {e}", path.display()),
            }
        }
    }

    /// Detect, install if needed, compile, run once and clean up.
    pub fn run_once(&self, ctx: &InvocationContext<'_>) -> RunResult<RunOutcome> {
        self.check_source(ctx)?;
        self.ensure_runtime(ctx.profile)?;
        self.compile(ctx)?;

        let cmd = self.run_command(ctx);
        info!("running {}", display_target(ctx));
        debug!(argv = ?cmd.argv, cwd = ?cmd.cwd, "run");
        let start = Instant::now();
        let result = self.executor.spawn(&cmd);
        let elapsed = start.elapsed();

        self.cleanup(ctx);
        if let Err(e) = result {
            warn!("{} exited unsuccessfully", display_target(ctx));
            return Err(RunError::RunFailed(e));
        }
        let timed = ctx.mode == Mode::Timed;
        Ok(RunOutcome { elapsed: timed.then_some(elapsed) })
    }

    /// Report what a run would do without spawning anything but the probe.
    pub fn dry_run(&self, ctx: &InvocationContext<'_>) -> DryRunReport {
        dry_run::simulate(self, ctx)
    }

    /// Compile once, run `runs` times with output discarded, clean up once.
    pub fn run_benchmark(&self, ctx: &InvocationContext<'_>, runs: usize) -> RunResult<BenchmarkRun> {
        bench::run_benchmark(self, ctx, runs)
    }
}

fn display_target(ctx: &InvocationContext<'_>) -> String {
    if ctx.profile.is_compiled() {
        ctx.program_name().to_string()
    } else {
        ctx.source.display().to_string()
    }
}
