//! Engine module: drives external toolchains for one source file.
//!
//! # Architecture
//!
//! - **Executor**: the process and filesystem seam. `SystemExecutor` spawns
//!   real processes; `MockExecutor` records calls for tests.
//! - **ConsentGate**: decides whether a missing toolchain may be installed.
//! - **Pipeline**: composes both into detect, install, compile, run and
//!   cleanup, plus the dry-run and benchmark variants.
//!
//! Language differences live in [`crate::profile`]; nothing here matches on
//! extension strings.

pub mod availability;
pub mod consent;
pub mod dry_run;
pub mod executor;
pub mod naming;
pub mod pipeline;

pub use availability::is_available;
pub use consent::{ConsentGate, FixedConsent, StdinConsent};
pub use dry_run::{DryRunReport, DryRunStep};
pub use executor::{CommandSpec, Executor, MockCall, MockExecutor, Sink, SystemExecutor};
pub use naming::ProgramLayout;
pub use pipeline::{InvocationContext, Mode, Outcome, Pipeline, RunOutcome};
