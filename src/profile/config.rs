use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::{BuildKind, BuildStrategy, InstallCommand, LanguageProfile, ProfileTable};
use crate::{RunError, RunResult};

/// File picked up from the current directory when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "polyrun.toml";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawFamily {
    Interpreted,
    Native,
    Class,
    Project,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLanguage {
    name: Option<String>,
    detect: String,
    install: Option<String>,
    manual: Option<String>,
    run: String,
    compile: Option<String>,
    family: Option<RawFamily>,
    cleanup: Option<bool>,
    scaffold: Option<String>,
    entry_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverridesConfig {
    #[serde(default, rename = "language")]
    languages: BTreeMap<String, RawLanguage>,
}

fn split(extension: &str, field: &str, value: &str) -> RunResult<Vec<String>> {
    shlex::split(value).ok_or_else(|| RunError::InvalidProfile {
        extension: extension.to_string(),
        reason: format!("cannot parse {field} command: {value:?}"),
    })
}

fn to_profile(extension: &str, raw: RawLanguage) -> RunResult<LanguageProfile> {
    let invalid = |reason: &str| RunError::InvalidProfile {
        extension: extension.to_string(),
        reason: reason.to_string(),
    };
    let detect = split(extension, "detect", &raw.detect)?;
    let run = split(extension, "run", &raw.run)?;
    let install = match (raw.install, raw.manual) {
        (Some(cmd), None) => InstallCommand::Command(split(extension, "install", &cmd)?),
        (None, Some(text)) => InstallCommand::Manual(text),
        (None, None) => InstallCommand::Manual(format!(
            "Please install {} manually.",
            detect.first().map(String::as_str).unwrap_or("the runtime")
        )),
        (Some(_), Some(_)) => return Err(invalid("set either install or manual, not both")),
    };

    let family = raw.family.unwrap_or(if raw.compile.is_some() {
        RawFamily::Native
    } else {
        RawFamily::Interpreted
    });
    let compile = raw.compile.as_deref().map(|c| split(extension, "compile", c)).transpose()?;

    let build = match family {
        RawFamily::Interpreted => {
            if compile.is_some() {
                return Err(invalid("interpreted family cannot have a compile command"));
            }
            None
        }
        RawFamily::Native | RawFamily::Class | RawFamily::Project => {
            let compile = compile.ok_or_else(|| invalid("compiled family needs a compile command"))?;
            let kind = match family {
                RawFamily::Class => BuildKind::ClassBased,
                RawFamily::Project => BuildKind::Project {
                    scaffold: split(
                        extension,
                        "scaffold",
                        raw.scaffold.as_deref().ok_or_else(|| invalid("project family needs scaffold"))?,
                    )?,
                    entry_file: raw
                        .entry_file
                        .ok_or_else(|| invalid("project family needs entry_file"))?,
                },
                _ => BuildKind::Native,
            };
            let cleanup = raw.cleanup.unwrap_or(kind == BuildKind::Native);
            Some(BuildStrategy { compile, kind, cleanup })
        }
    };

    Ok(LanguageProfile {
        name: raw.name.unwrap_or_else(|| extension.trim_start_matches('.').to_string()),
        detect,
        install,
        run,
        build,
        name_rule: None,
    })
}

/// Parse override profiles from TOML text.
pub fn parse_overrides(text: &str) -> RunResult<Vec<(String, LanguageProfile)>> {
    let cfg: OverridesConfig = toml::from_str(text).map_err(|e| RunError::Message(e.to_string()))?;
    cfg.languages
        .into_iter()
        .map(|(ext, raw)| to_profile(&ext, raw).map(|p| (ext, p)))
        .collect()
}

/// Load overrides from `path` into `table`, replacing built-ins with the same
/// extension. Returns how many profiles were applied.
pub fn load_overrides(table: &mut ProfileTable, path: &Path) -> RunResult<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let overrides = parse_overrides(&text)?;
    let count = overrides.len();
    for (ext, profile) in overrides {
        table.insert(ext, profile)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_native_override() {
        let text = r#"
            [language.".cr"]
            name = "Crystal"
            detect = "crystal --version"
            install = "brew install crystal"
            run = "./{program}"
            compile = "crystal build"
        "#;
        let parsed = parse_overrides(text).unwrap();
        assert_eq!(parsed.len(), 1);
        let (ext, p) = &parsed[0];
        assert_eq!(ext, ".cr");
        assert_eq!(p.name, "Crystal");
        assert_eq!(p.detect, vec!["crystal", "--version"]);
        let build = p.build.as_ref().unwrap();
        assert_eq!(build.kind, BuildKind::Native);
        assert!(build.cleanup);
        assert_eq!(build.compile, vec!["crystal", "build"]);
    }

    #[test]
    fn test_parse_interpreted_with_quoted_args() {
        let text = r#"
            [language.".py"]
            detect = "python3.12 --version"
            manual = "use pyenv"
            run = "python3.12 -X 'dev'"
        "#;
        let (_, p) = parse_overrides(text).unwrap().remove(0);
        assert!(p.build.is_none());
        assert_eq!(p.run, vec!["python3.12", "-X", "dev"]);
        assert_eq!(p.install, InstallCommand::Manual("use pyenv".into()));
    }

    #[test]
    fn test_project_family_requires_scaffold() {
        let text = r#"
            [language.".fsx"]
            detect = "dotnet --version"
            run = "dotnet run"
            compile = "dotnet build"
            family = "project"
        "#;
        assert!(parse_overrides(text).is_err());
    }

    #[test]
    fn test_compiled_family_requires_compile() {
        let text = r#"
            [language.".x"]
            detect = "x --version"
            run = "./{program}"
            family = "native"
        "#;
        assert!(matches!(parse_overrides(text), Err(RunError::InvalidProfile { .. })));
    }

    #[test]
    fn test_unbalanced_quote_is_rejected() {
        let text = r#"
            [language.".x"]
            detect = "x 'oops"
            run = "x"
        "#;
        assert!(parse_overrides(text).is_err());
    }

    #[test]
    fn test_load_overrides_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG);
        std::fs::write(
            &path,
            "[language.\".py\"]\ndetect = \"pypy3 --version\"\nrun = \"pypy3\"\n",
        )
        .unwrap();
        let mut table = crate::profile::builtin_profiles(crate::core::Platform::Linux);
        let before = table.len();
        assert_eq!(load_overrides(&mut table, &path).unwrap(), 1);
        assert_eq!(table.len(), before);
        assert_eq!(table.get(".py").unwrap().runtime(), "pypy3");
    }

    #[test]
    fn test_load_overrides_missing_file() {
        let mut table = ProfileTable::new();
        let err = load_overrides(&mut table, Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
