// src/spec/mod.rs

//! Task specifications: immutable descriptions of one unit of external work.
//!
//! A [`TaskSpec`] is created by a producer, consumed exactly once by the
//! runner, and never mutated afterwards. All methods are pure queries that
//! stay stable for the lifetime of the task spawned from the spec.

pub mod interp;
pub mod shell;
pub mod sleeper;

pub use interp::InterpreterSpec;
pub use shell::ShellSpec;
pub use sleeper::SleeperSpec;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Contract every unit of work must satisfy.
pub trait TaskSpec: Send + Sync {
    /// The full command line, run through `sh -c`.
    fn command(&self) -> String;

    /// Additional environment variables for the child process.
    fn env(&self) -> &BTreeMap<String, String>;

    /// Working directory the process starts in.
    fn cwd(&self) -> &Path;

    /// Whether this process is meant to run indefinitely.
    ///
    /// Daemon tasks are exempt from timeout enforcement.
    fn is_daemon(&self) -> bool;

    /// Wall-clock runtime budget. Zero means unlimited; ignored for daemons.
    ///
    /// Enforcement is best-effort: the budget is checked once per poll
    /// interval, so a task will always overrun it by up to one interval.
    fn timeout(&self) -> Duration;

    /// Display name used in logs and notifications.
    fn name(&self) -> &str;

    /// Whether the exit code is meaningful for raising error levels.
    fn trust_exit_code(&self) -> bool;
}

/// Quote one argument for inclusion in a `sh -c` command line.
///
/// Wraps the argument in single quotes, escaping embedded single quotes by
/// closing, escaping, and reopening the quoted region.
pub(crate) fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "'\\''"))
}
