//! Process and filesystem seam used by the pipeline.
//!
//! `SystemExecutor` spawns real processes. `MockExecutor` records every call
//! and answers from configuration, so pipeline ordering can be tested without
//! toolchains or filesystem side effects.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::ExitInfo;

/// Where a child's output stream goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Inherit,
    Discard,
}

impl Sink {
    fn to_stdio(self) -> Stdio {
        match self {
            Sink::Inherit => Stdio::inherit(),
            Sink::Discard => Stdio::null(),
        }
    }
}

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub argv: Vec<String>,
    /// Working directory for this spawn only; `None` keeps the caller's.
    pub cwd: Option<PathBuf>,
    pub stdout: Sink,
    pub stderr: Sink,
}

impl CommandSpec {
    /// A command with both streams inherited.
    pub fn new(argv: Vec<String>) -> Self {
        CommandSpec { argv, cwd: None, stdout: Sink::Inherit, stderr: Sink::Inherit }
    }

    pub fn in_dir(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.stdout = Sink::Discard;
        self.stderr = Sink::Discard;
        self
    }

    /// Space-joined argv for messages.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Blocking process spawn plus the filesystem operations the pipeline needs.
pub trait Executor: Send + Sync {
    /// Run a command to completion. `Ok` iff it exited with status 0.
    fn spawn(&self, cmd: &CommandSpec) -> Result<(), ExitInfo>;

    fn exists(&self, path: &Path) -> bool;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// Executor backed by `std::process` and `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn spawn(&self, cmd: &CommandSpec) -> Result<(), ExitInfo> {
        let Some((program, args)) = cmd.argv.split_first() else {
            return Err(ExitInfo::Spawn { program: String::new(), reason: "empty command".into() });
        };
        debug!(argv = ?cmd.argv, cwd = ?cmd.cwd, "spawn");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(cmd.stdout.to_stdio())
            .stderr(cmd.stderr.to_stdio());
        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|e| ExitInfo::Spawn {
            program: program.clone(),
            reason: e.to_string(),
        })?;
        if status.success() { Ok(()) } else { Err(ExitInfo::Status(status.code())) }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// A call observed by [`MockExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Spawn(CommandSpec),
    Rename(PathBuf, PathBuf),
    Remove(PathBuf),
}

/// Scripted executor for tests.
///
/// Every spawn succeeds unless its program (argv[0]) was marked failing or
/// missing. Paths "exist" when registered with `with_path` or created by a
/// rename; `remove_file` on an unknown path reports `NotFound`.
#[derive(Debug, Default)]
pub struct MockExecutor {
    calls: Mutex<Vec<MockCall>>,
    /// program -> number of leading invocations that fail (usize::MAX = always)
    failures: Mutex<HashMap<String, usize>>,
    missing: HashSet<String>,
    paths: Mutex<HashSet<PathBuf>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn lock_mut<T>(m: &mut Mutex<T>) -> &mut T {
    m.get_mut().unwrap_or_else(PoisonError::into_inner)
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` exit with status 1.
    pub fn failing(self, program: &str) -> Self {
        self.failing_times(program, usize::MAX)
    }

    /// Make the first `times` invocations of `program` exit with status 1.
    pub fn failing_times(mut self, program: &str, times: usize) -> Self {
        lock_mut(&mut self.failures).insert(program.to_string(), times);
        self
    }

    /// Make `program` fail to spawn, as if it were not installed.
    pub fn missing(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    /// Register a path as existing.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        lock_mut(&mut self.paths).insert(path.into());
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Spawned commands in order.
    pub fn spawned(&self) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Spawn(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    /// Spawned argvs in order.
    pub fn spawned_argvs(&self) -> Vec<Vec<String>> {
        self.spawned().into_iter().map(|s| s.argv).collect()
    }

    /// Paths passed to `remove_file`, in order.
    pub fn removed(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Remove(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }
}

impl Executor for MockExecutor {
    fn spawn(&self, cmd: &CommandSpec) -> Result<(), ExitInfo> {
        self.record(MockCall::Spawn(cmd.clone()));
        let program = cmd.argv.first().cloned().unwrap_or_default();
        if self.missing.contains(&program) {
            return Err(ExitInfo::Spawn { program, reason: "No such file or directory".into() });
        }
        let mut failures = lock(&self.failures);
        match failures.get_mut(&program) {
            Some(0) | None => Ok(()),
            Some(remaining) => {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                Err(ExitInfo::Status(Some(1)))
            }
        }
    }

    fn exists(&self, path: &Path) -> bool {
        lock(&self.paths).contains(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(MockCall::Rename(from.to_path_buf(), to.to_path_buf()));
        let mut paths = lock(&self.paths);
        paths.remove(from);
        paths.insert(to.to_path_buf());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.record(MockCall::Remove(path.to_path_buf()));
        if lock(&self.paths).remove(path) {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }
}
