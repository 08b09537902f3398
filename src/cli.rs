// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `taskherd`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskherd",
    version,
    about = "Run queued commands as bounded concurrent OS processes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskherd.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Taskherd.toml")]
    pub config: String,

    /// Keep running when the queue drains, waiting for more work.
    ///
    /// Without this flag the runner exits once the queue and the in-flight
    /// set are both empty.
    #[arg(long)]
    pub daemon: bool,

    /// Consume tasks from a shared spool directory instead of the config's
    /// task list. Several runner processes may point at the same spool.
    #[arg(long, value_name = "DIR")]
    pub spool: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKHERD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the runner settings and task list, but don't
    /// execute any commands.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
