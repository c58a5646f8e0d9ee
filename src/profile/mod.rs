//! Language profiles: how to detect, install, compile and run one extension.
//!
//! Profiles are plain data. The pipeline never compares extension strings;
//! everything language-specific is expressed through [`BuildKind`] and the
//! `cleanup` capability on [`BuildStrategy`].

pub mod config;
pub mod table;

use std::collections::BTreeMap;
use std::fmt;

use crate::{RunError, RunResult};

pub use config::load_overrides;
pub use table::builtin_profiles;

/// Placeholder in run/compile argv tokens replaced by the program name.
pub const PROGRAM_PLACEHOLDER: &str = "{program}";

/// How a missing toolchain can be installed on the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallCommand {
    /// An argv that installs the toolchain unattended.
    Command(Vec<String>),
    /// Only manual installation is possible; the text says how.
    Manual(String),
}

/// The structural family of a compiled language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildKind {
    /// Produces a standalone executable at `./<program>`.
    Native,
    /// Produces a named unit (a class) that the runtime loads by name.
    ClassBased,
    /// Needs a project directory; compile and run happen inside it.
    Project {
        /// Scaffold argv; the project directory is appended.
        scaffold: Vec<String>,
        /// File name the source is moved to inside a fresh project.
        entry_file: String,
    },
}

/// Compilation settings for a compiled language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStrategy {
    pub compile: Vec<String>,
    pub kind: BuildKind,
    /// Whether the harness deletes the produced binary after running.
    pub cleanup: bool,
}

/// Immutable descriptor for one source-file extension.
#[derive(Clone)]
pub struct LanguageProfile {
    /// Human readable language name.
    pub name: String,
    pub detect: Vec<String>,
    pub install: InstallCommand,
    pub run: Vec<String>,
    /// `None` for interpreted languages.
    pub build: Option<BuildStrategy>,
    /// Derives the program name from the source file name. Defaults to
    /// stripping the extension.
    pub name_rule: Option<fn(&str) -> String>,
}

impl fmt::Debug for LanguageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageProfile")
            .field("name", &self.name)
            .field("detect", &self.detect)
            .field("install", &self.install)
            .field("run", &self.run)
            .field("build", &self.build)
            .field("name_rule", &self.name_rule.is_some())
            .finish()
    }
}

impl LanguageProfile {
    pub fn is_compiled(&self) -> bool {
        self.build.is_some()
    }

    /// The toolchain name shown to users: the first token of the detect argv.
    pub fn runtime(&self) -> &str {
        self.detect.first().map(String::as_str).unwrap_or("")
    }

    /// Whether a compiled artifact must be removed by the harness.
    pub fn needs_cleanup(&self) -> bool {
        self.build.as_ref().is_some_and(|b| b.cleanup)
    }

    /// Check the structural invariants every profile must satisfy.
    pub fn validate(&self, extension: &str) -> RunResult<()> {
        let invalid = |reason: &str| RunError::InvalidProfile {
            extension: extension.to_string(),
            reason: reason.to_string(),
        };
        if self.detect.is_empty() {
            return Err(invalid("detect command is empty"));
        }
        if self.run.is_empty() {
            return Err(invalid("run command is empty"));
        }
        if let Some(build) = &self.build {
            if build.compile.is_empty() {
                return Err(invalid("compiled profile has an empty compile command"));
            }
            if let BuildKind::Project { scaffold, entry_file } = &build.kind {
                if scaffold.is_empty() || entry_file.is_empty() {
                    return Err(invalid("project profile needs a scaffold command and entry file"));
                }
                if build.cleanup {
                    return Err(invalid("project profiles manage their own artifacts"));
                }
            }
            if build.kind == BuildKind::ClassBased && build.cleanup {
                return Err(invalid("class-based profiles manage their own artifacts"));
            }
        }
        if matches!(&self.install, InstallCommand::Command(argv) if argv.is_empty()) {
            return Err(invalid("install command is empty"));
        }
        Ok(())
    }
}

/// Read-only mapping from extension (with leading dot) to profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    profiles: BTreeMap<String, LanguageProfile>,
}

impl ProfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the profile for `extension` after validating it.
    pub fn insert(&mut self, extension: impl Into<String>, profile: LanguageProfile) -> RunResult<()> {
        let extension = extension.into();
        if !extension.starts_with('.') || extension.len() < 2 {
            return Err(RunError::InvalidProfile {
                extension,
                reason: "extension must start with '.'".into(),
            });
        }
        profile.validate(&extension)?;
        self.profiles.insert(extension, profile);
        Ok(())
    }

    pub fn get(&self, extension: &str) -> Option<&LanguageProfile> {
        self.profiles.get(extension)
    }

    /// Look up a profile, failing with `UnsupportedExtension`.
    pub fn lookup(&self, extension: &str) -> RunResult<&LanguageProfile> {
        self.get(extension)
            .ok_or_else(|| RunError::UnsupportedExtension(extension.to_string()))
    }

    /// Profiles sorted by extension.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
