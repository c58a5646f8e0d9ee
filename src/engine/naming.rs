//! Program names and artifact paths derived from the source file.

use std::path::{Path, PathBuf};

use crate::core::Platform;
use crate::profile::{BuildKind, LanguageProfile, PROGRAM_PLACEHOLDER};
use crate::{RunError, RunResult};

/// Names and directories derived for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramLayout {
    /// File stem, class name or project directory name.
    pub program_name: String,
    /// Set for project-scaffolding languages: the program name, placed in the
    /// source's directory. Every compile and run step uses it as working
    /// directory.
    pub project_dir: Option<PathBuf>,
}

/// Extension of `source` including the leading dot (`.cpp`).
pub fn extension_of(source: &Path) -> RunResult<String> {
    source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .ok_or_else(|| RunError::UnsupportedExtension(String::new()))
}

fn file_name_of(source: &Path) -> RunResult<&str> {
    source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RunError::Message(format!("invalid source file name: {}", source.display())))
}

fn strip_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// Apply the profile's name rule (default: strip the extension) to the
/// source base name.
pub fn program_name(source: &Path, profile: &LanguageProfile) -> RunResult<String> {
    let file_name = file_name_of(source)?;
    let name = match profile.name_rule {
        Some(rule) => rule(file_name),
        None => strip_extension(file_name),
    };
    if name.is_empty() {
        return Err(RunError::Message(format!(
            "cannot derive a program name from {}",
            source.display()
        )));
    }
    Ok(name)
}

/// Derive the layout for `source` under `profile`.
pub fn resolve(source: &Path, profile: &LanguageProfile) -> RunResult<ProgramLayout> {
    let program_name = program_name(source, profile)?;
    let project_dir = match profile.build.as_ref().map(|b| &b.kind) {
        Some(BuildKind::Project { .. }) => {
            Some(source.parent().unwrap_or(Path::new("")).join(&program_name))
        }
        _ => None,
    };
    Ok(ProgramLayout { program_name, project_dir })
}

/// Paths removed by cleanup: `./<name>`, plus `./<name>.exe` on Windows.
pub fn artifact_paths(program_name: &str, platform: Platform) -> Vec<PathBuf> {
    let base = Path::new(".").join(program_name);
    let mut paths = vec![base];
    if platform.is_windows() {
        paths.push(Path::new(".").join(format!("{program_name}.exe")));
    }
    paths
}

/// Replace the `{program}` placeholder in every token.
pub fn expand_program(argv: &[String], program_name: &str) -> Vec<String> {
    argv.iter()
        .map(|tok| tok.replace(PROGRAM_PLACEHOLDER, program_name))
        .collect()
}
