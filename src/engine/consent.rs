//! Install-consent gate.

use std::io::{self, BufRead, Write};

/// Asks whether a missing toolchain may be installed.
pub trait ConsentGate {
    fn confirm_install(&self, runtime: &str) -> bool;
}

/// Prompts on stdout and reads one line from stdin. Only `y` accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConsent;

impl ConsentGate for StdinConsent {
    fn confirm_install(&self, runtime: &str) -> bool {
        print!("{runtime} not found. Do you want to install it? (y/n): ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        is_yes(&line)
    }
}

/// Always answers the same way (`--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct FixedConsent(pub bool);

impl ConsentGate for FixedConsent {
    fn confirm_install(&self, _runtime: &str) -> bool {
        self.0
    }
}

pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
