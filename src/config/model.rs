// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [runner]
/// wait_us = 100000
/// max_processes = 4
///
/// [task.build]
/// cmd = "make all"
/// cwd = "/path/to/project"
/// timeout_ms = 60000
/// ```
///
/// All sections are optional and have reasonable defaults; the task table
/// may be empty when the runner consumes a spool instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Scheduler settings from `[runner]`.
    #[serde(default)]
    pub runner: RunnerSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskSection>,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Poll interval in microseconds. Must be >= 1.
    #[serde(default = "default_wait_us")]
    pub wait_us: u64,

    /// Concurrency cap. Must be >= 1.
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,

    /// Keep running when the queue drains, waiting for more work.
    ///
    /// The `--daemon` CLI flag also enables this.
    #[serde(default)]
    pub daemon: bool,
}

fn default_wait_us() -> u64 {
    100_000
}

fn default_max_processes() -> usize {
    4
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            wait_us: default_wait_us(),
            max_processes: default_max_processes(),
            daemon: false,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSection {
    /// The command to execute (through `sh -c`).
    pub cmd: String,

    /// Arguments appended to `cmd`, individually shell-quoted.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the process.
    #[serde(default = "default_cwd")]
    pub cwd: PathBuf,

    /// Extra environment variables.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Daemon tasks may run indefinitely and ignore `timeout_ms`.
    #[serde(default)]
    pub daemon: bool,

    /// Wall-clock budget in milliseconds; zero = unlimited.
    #[serde(default)]
    pub timeout_ms: u64,

    /// Whether a non-zero exit code should be treated as a failure.
    #[serde(default = "default_trust_exit_code")]
    pub trust_exit_code: bool,
}

fn default_cwd() -> PathBuf {
    PathBuf::from(".")
}

fn default_trust_exit_code() -> bool {
    true
}
