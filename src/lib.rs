pub mod bench;
pub mod core;
pub mod engine;
pub mod list_cmd;
pub mod profile;
pub mod run_cmd;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// How an external process invocation ended when it did not succeed.
///
/// A spawn failure (missing executable, permission error) and a non-zero exit
/// are reported through the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitInfo {
    /// The process ran and exited unsuccessfully. `None` when killed by a signal.
    Status(Option<i32>),
    /// The process could not be started at all.
    Spawn { program: String, reason: String },
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitInfo::Status(Some(code)) => write!(f, "exit status: {code}"),
            ExitInfo::Status(None) => write!(f, "terminated by signal"),
            ExitInfo::Spawn { program, reason } => write!(f, "failed to run {program}: {reason}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("unsupported file type: {0:?}")]
    UnsupportedExtension(String),
    #[error("runtime '{0}' not found")]
    RuntimeUnavailable(String),
    #[error("installation of '{0}' declined")]
    InstallDeclined(String),
    #[error("automatic installation of '{runtime}' is not supported: {instructions}")]
    InstallUnsupported { runtime: String, instructions: String },
    #[error("installation of '{runtime}' failed: {detail}")]
    InstallFailed { runtime: String, detail: String },
    #[error("failed to create project in {}: {detail}", .dir.display())]
    ScaffoldFailed { dir: PathBuf, detail: String },
    #[error("compilation failed: {0}")]
    CompileFailed(ExitInfo),
    #[error("execution failed: {0}")]
    RunFailed(ExitInfo),
    #[error("invalid profile for {extension}: {reason}")]
    InvalidProfile { extension: String, reason: String },
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type RunResult<T> = Result<T, RunError>;

// Shared helpers
pub fn now_string() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".to_string())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha256::digest;
    digest(bytes)
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> RunResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| RunError::Message(e.to_string()))?;
    }
    let json = serde_json::to_vec_pretty(value).map_err(|e| RunError::Message(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| RunError::Message(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_info_display() {
        assert_eq!(ExitInfo::Status(Some(2)).to_string(), "exit status: 2");
        let spawn = ExitInfo::Spawn { program: "g++".into(), reason: "not found".into() };
        assert_eq!(spawn.to_string(), "failed to run g++: not found");
    }

    #[test]
    fn test_compile_failed_message_carries_exit_info() {
        let err = RunError::CompileFailed(ExitInfo::Status(Some(1)));
        assert_eq!(err.to_string(), "compilation failed: exit status: 1");
    }

    #[test]
    fn test_sha256_hex_known_value() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json(&path, &serde_json::json!({ "ok": true })).unwrap();
        let back: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back["ok"], true);
    }
}
