//! Host facts and report schemas shared by the CLI commands.

pub mod env;
pub mod platform;
pub mod schema;

pub use env::SystemInfo;
pub use platform::Platform;
pub use schema::{BenchReport, CommonMeta, RunReport, SampleRecord, TimingStat};
