//! Built-in language profiles.

use crate::core::Platform;

use super::{BuildKind, BuildStrategy, InstallCommand, LanguageProfile, ProfileTable};

#[derive(Clone, Copy)]
enum Family {
    Interpreted,
    /// Standalone binary; `true` when the harness removes it afterwards.
    Native(bool),
    Class,
    Project,
}

struct Entry {
    ext: &'static str,
    name: &'static str,
    detect: &'static [&'static str],
    /// Debian package name installed with `sudo apt install -y`.
    apt: Option<&'static str>,
    /// Full macOS install argv.
    mac: Option<&'static [&'static str]>,
    /// Instructions when no unattended install exists.
    manual: &'static str,
    run: &'static [&'static str],
    compile: &'static [&'static str],
    family: Family,
}

const NATIVE_RUN: &[&str] = &["./{program}"];

const ENTRIES: &[Entry] = &[
    Entry {
        ext: ".py",
        name: "Python",
        detect: &["python3", "--version"],
        apt: Some("python3"),
        mac: Some(&["brew", "install", "python"]),
        manual: "Please install Python from https://www.python.org/downloads/",
        run: &["python3"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".go",
        name: "Go",
        detect: &["go", "version"],
        apt: Some("golang-go"),
        mac: Some(&["brew", "install", "go"]),
        manual: "Please install Go from https://go.dev/dl",
        run: &["go", "run"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".js",
        name: "JavaScript",
        detect: &["node", "--version"],
        apt: Some("nodejs"),
        mac: Some(&["brew", "install", "node"]),
        manual: "Please install Node.js from https://nodejs.org/en/download/",
        run: &["node"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".rb",
        name: "Ruby",
        detect: &["ruby", "--version"],
        apt: Some("ruby"),
        mac: Some(&["brew", "install", "ruby"]),
        manual: "Please install Ruby from https://rubyinstaller.org/",
        run: &["ruby"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".java",
        name: "Java",
        detect: &["java", "--version"],
        apt: Some("default-jdk"),
        mac: Some(&["brew", "install", "openjdk"]),
        manual: "Please install Java JDK from https://www.oracle.com/java/technologies/downloads/",
        run: &["java"],
        compile: &["javac"],
        family: Family::Class,
    },
    Entry {
        ext: ".cpp",
        name: "C++",
        detect: &["g++", "--version"],
        apt: Some("build-essential"),
        mac: Some(&["xcode-select", "--install"]),
        manual: "Please install MinGW-w64 or Visual Studio with C++ tools.",
        run: NATIVE_RUN,
        compile: &["g++"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".c",
        name: "C",
        detect: &["gcc", "--version"],
        apt: Some("build-essential"),
        mac: Some(&["xcode-select", "--install"]),
        manual: "Please install MinGW-w64 or Visual Studio with C tools.",
        run: NATIVE_RUN,
        compile: &["gcc"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".rs",
        name: "Rust",
        detect: &["rustc", "--version"],
        apt: None,
        mac: None,
        manual: "Please install Rust from https://rustup.rs/ by running: curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh",
        run: NATIVE_RUN,
        compile: &["rustc"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".cs",
        name: "C#",
        detect: &["dotnet", "--version"],
        apt: Some("dotnet-sdk-8.0"),
        mac: Some(&["brew", "install", "dotnet"]),
        manual: "Please install .NET SDK from https://dotnet.microsoft.com/download",
        run: &["dotnet", "run"],
        compile: &["dotnet", "build"],
        family: Family::Project,
    },
    Entry {
        ext: ".sh",
        name: "Bash",
        detect: &["bash", "--version"],
        apt: Some("bash"),
        mac: Some(&["brew", "install", "bash"]),
        manual: "Please install Git Bash from https://gitforwindows.org/",
        run: &["bash"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".pl",
        name: "Perl",
        detect: &["perl", "--version"],
        apt: Some("perl"),
        mac: Some(&["brew", "install", "perl"]),
        manual: "Please install Strawberry Perl from http://strawberryperl.com/",
        run: &["perl"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".php",
        name: "PHP",
        detect: &["php", "--version"],
        apt: Some("php"),
        mac: Some(&["brew", "install", "php"]),
        manual: "Please install PHP from https://windows.php.net/download/",
        run: &["php"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".ts",
        name: "TypeScript",
        detect: &["ts-node", "--version"],
        apt: None,
        mac: None,
        manual: "Please install Node.js and then run: npm install -g ts-node typescript",
        run: &["ts-node"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".lua",
        name: "Lua",
        detect: &["lua", "--version"],
        apt: Some("lua5.3"),
        mac: Some(&["brew", "install", "lua"]),
        manual: "Please install Lua from https://www.lua.org/download.html",
        run: &["lua"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".r",
        name: "R",
        detect: &["Rscript", "--version"],
        apt: Some("r-base"),
        mac: Some(&["brew", "install", "r"]),
        manual: "Please install R from https://cran.r-project.org/bin/windows/base/",
        run: &["Rscript"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".hs",
        name: "Haskell",
        detect: &["ghc", "--version"],
        apt: Some("ghc"),
        mac: Some(&["brew", "install", "ghc"]),
        manual: "Please install GHC from https://www.haskell.org/ghc/download_ghc_9_10_3.html",
        run: NATIVE_RUN,
        compile: &["ghc"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".swift",
        name: "Swift",
        detect: &["swift", "--version"],
        apt: None,
        mac: Some(&["brew", "install", "swift"]),
        manual: "Please install Swift from https://swift.org/download/#releases",
        run: &["swift"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".groovy",
        name: "Groovy",
        detect: &["groovy", "--version"],
        apt: Some("groovy"),
        mac: Some(&["brew", "install", "groovy"]),
        manual: "Please install Groovy from https://groovy-lang.org/download.html",
        run: &["groovy"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".kt",
        name: "Kotlin",
        detect: &["kotlinc", "-version"],
        apt: Some("kotlin"),
        mac: Some(&["brew", "install", "kotlin"]),
        manual: "Please install Kotlin from https://kotlinlang.org/docs/command-line.html",
        run: &["kotlinc", "-script"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".ex",
        name: "Elixir",
        detect: &["elixir", "--version"],
        apt: Some("elixir"),
        mac: Some(&["brew", "install", "elixir"]),
        manual: "Please install Elixir from https://elixir-lang.org/install.html",
        run: &["elixir"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".ml",
        name: "OCaml",
        detect: &["ocamlc", "-version"],
        apt: Some("ocaml"),
        mac: Some(&["brew", "install", "ocaml"]),
        manual: "Please install OCaml from https://ocaml.org/docs/install.html",
        run: NATIVE_RUN,
        compile: &["ocamlc"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".nim",
        name: "Nim",
        detect: &["nim", "--version"],
        apt: Some("nim"),
        mac: Some(&["brew", "install", "nim"]),
        manual: "Please install Nim from https://nim-lang.org/install.html",
        run: NATIVE_RUN,
        compile: &["nim", "c"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".dart",
        name: "Dart",
        detect: &["dart", "--version"],
        apt: Some("dart"),
        mac: Some(&["brew", "install", "dart"]),
        manual: "Please install Dart from https://dart.dev/get-dart",
        run: &["dart"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".raku",
        name: "Raku",
        detect: &["raku", "--version"],
        apt: Some("raku"),
        mac: Some(&["brew", "install", "raku"]),
        manual: "Please install Raku from https://raku.org/downloads/",
        run: &["raku"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".tcl",
        name: "Tcl",
        detect: &["tclsh"],
        apt: Some("tcl"),
        mac: Some(&["brew", "install", "tcl-tk"]),
        manual: "Please install Tcl from https://www.activestate.com/products/tcl/",
        run: &["tclsh"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".vb",
        name: "VB.NET",
        detect: &["vbc", "--version"],
        apt: Some("mono-complete"),
        mac: Some(&["brew", "install", "mono"]),
        manual: "Please install Visual Studio with VB.NET support.",
        run: NATIVE_RUN,
        compile: &["vbc"],
        family: Family::Native(false),
    },
    Entry {
        ext: ".fs",
        name: "F#",
        detect: &["fsharpc", "--version"],
        apt: Some("fsharp"),
        mac: Some(&["brew", "install", "fsharp"]),
        manual: "Please install Visual Studio with F# support.",
        run: NATIVE_RUN,
        compile: &["fsharpc"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".pas",
        name: "Pascal",
        detect: &["fpc", "--version"],
        apt: Some("fpc"),
        mac: Some(&["brew", "install", "fpc"]),
        manual: "Please install Free Pascal from https://www.freepascal.org/download.var",
        run: NATIVE_RUN,
        compile: &["fpc"],
        family: Family::Native(true),
    },
    Entry {
        ext: ".jl",
        name: "Julia",
        detect: &["julia", "--version"],
        apt: Some("julia"),
        mac: Some(&["brew", "install", "julia"]),
        manual: "Please install Julia from https://julialang.org/downloads/",
        run: &["julia"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".scm",
        name: "Scheme",
        detect: &["scheme", "--version"],
        apt: Some("mit-scheme"),
        mac: Some(&["brew", "install", "mit-scheme"]),
        manual: "Please install MIT/GNU Scheme from https://www.gnu.org/software/mit-scheme/",
        run: &["scheme"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".awk",
        name: "Awk",
        detect: &["awk", "--version"],
        apt: Some("gawk"),
        mac: Some(&["brew", "install", "gawk"]),
        manual: "Please install Gawk from http://gnuwin32.sourceforge.net/packages/gawk.htm",
        run: &["awk", "-f"],
        compile: &[],
        family: Family::Interpreted,
    },
    Entry {
        ext: ".asm",
        name: "Assembly (NASM)",
        detect: &["nasm", "--version"],
        apt: Some("nasm"),
        mac: Some(&["brew", "install", "nasm"]),
        manual: "Please install NASM from https://www.nasm.us/pub/nasm/releasebuilds/",
        run: NATIVE_RUN,
        compile: &["nasm", "-f", "elf64"],
        family: Family::Native(false),
    },
    Entry {
        ext: ".zig",
        name: "Zig",
        detect: &["zig", "version"],
        apt: Some("zig"),
        mac: Some(&["brew", "install", "zig"]),
        manual: "Please install Zig from https://ziglang.org/download/",
        run: NATIVE_RUN,
        compile: &["zig", "build-exe"],
        family: Family::Native(true),
    },
];

fn owned(argv: &[&str]) -> Vec<String> {
    argv.iter().map(|s| s.to_string()).collect()
}

/// Java runs a class named after the file.
pub fn class_name_from_file(file_name: &str) -> String {
    file_name.strip_suffix(".java").unwrap_or(file_name).to_string()
}

impl Entry {
    fn install_for(&self, platform: Platform) -> InstallCommand {
        match platform {
            Platform::Linux => match self.apt {
                Some(pkg) => InstallCommand::Command(owned(&["sudo", "apt", "install", "-y", pkg])),
                None => InstallCommand::Manual(self.manual.to_string()),
            },
            Platform::MacOs => match self.mac {
                Some(argv) => InstallCommand::Command(owned(argv)),
                None => InstallCommand::Manual(self.manual.to_string()),
            },
            Platform::Windows => InstallCommand::Manual(self.manual.to_string()),
            Platform::Other if self.apt.is_none() && self.mac.is_none() => {
                InstallCommand::Manual(self.manual.to_string())
            }
            Platform::Other => InstallCommand::Manual(format!(
                "Unsupported OS for automatic {} installation.",
                self.name
            )),
        }
    }

    fn to_profile(&self, platform: Platform) -> LanguageProfile {
        let build = match self.family {
            Family::Interpreted => None,
            Family::Native(cleanup) => Some(BuildStrategy {
                compile: owned(self.compile),
                kind: BuildKind::Native,
                cleanup,
            }),
            Family::Class => Some(BuildStrategy {
                compile: owned(self.compile),
                kind: BuildKind::ClassBased,
                cleanup: false,
            }),
            Family::Project => Some(BuildStrategy {
                compile: owned(self.compile),
                kind: BuildKind::Project {
                    scaffold: owned(&["dotnet", "new", "console", "-o"]),
                    entry_file: "Program.cs".to_string(),
                },
                cleanup: false,
            }),
        };
        let name_rule: Option<fn(&str) -> String> = match self.family {
            Family::Class => Some(class_name_from_file),
            _ => None,
        };
        LanguageProfile {
            name: self.name.to_string(),
            detect: owned(self.detect),
            install: self.install_for(platform),
            run: owned(self.run),
            build,
            name_rule,
        }
    }
}

/// The built-in table with install commands chosen for `platform`.
pub fn builtin_profiles(platform: Platform) -> ProfileTable {
    let mut table = ProfileTable::new();
    for entry in ENTRIES {
        let inserted = table.insert(entry.ext, entry.to_profile(platform));
        debug_assert!(inserted.is_ok(), "invalid built-in profile {}: {inserted:?}", entry.ext);
    }
    table
}
