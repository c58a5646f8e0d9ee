use std::path::Path;

use crate::RunResult;
use crate::core::Platform;
use crate::profile::{LanguageProfile, ProfileTable};
use crate::run_cmd::load_profiles;

fn type_label(profile: &LanguageProfile) -> &'static str {
    if profile.is_compiled() { "Compiled" } else { "Interpreted" }
}

/// Compile command for compiled languages, run command otherwise.
fn command_label(profile: &LanguageProfile) -> String {
    match &profile.build {
        Some(build) => build.compile.join(" "),
        None => profile.run.join(" "),
    }
}

/// Render the language table, sorted by extension.
pub fn render(table: &ProfileTable) -> String {
    let mut out = String::new();
    out.push_str("Supported Languages:\n");
    out.push_str(&"-".repeat(20));
    out.push('\n');
    out.push_str(&format!("{:<10} {:<15} {:<12} {}\n", "Extension", "Runtime", "Type", "Command"));
    out.push_str(&"-".repeat(70));
    out.push('\n');
    for (ext, profile) in table.iter() {
        out.push_str(&format!(
            "{:<10} {:<15} {:<12} {}\n",
            ext,
            profile.runtime(),
            type_label(profile),
            command_label(profile)
        ));
    }
    out.push_str(&format!("\nTotal: {} languages supported", table.len()));
    out
}

pub fn run(config: Option<&Path>) -> RunResult<()> {
    let table = load_profiles(Platform::current(), config)?;
    println!("{}", render(&table));
    Ok(())
}
