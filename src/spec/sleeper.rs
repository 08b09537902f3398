// src/spec/sleeper.rs

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::spec::TaskSpec;

/// A do-nothing spec that sleeps for a fixed duration.
///
/// Useful for exercising the runner without side effects.
#[derive(Debug, Clone)]
pub struct SleeperSpec {
    duration: Duration,
    name: String,
    env: BTreeMap<String, String>,
    daemon: bool,
    timeout: Duration,
}

impl SleeperSpec {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            name: format!("sleep({duration:?})"),
            env: BTreeMap::new(),
            daemon: false,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }
}

impl Default for SleeperSpec {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl TaskSpec for SleeperSpec {
    fn command(&self) -> String {
        format!("sleep {}", self.duration.as_secs_f64())
    }

    fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn cwd(&self) -> &Path {
        Path::new("/")
    }

    fn is_daemon(&self) -> bool {
        self.daemon
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn trust_exit_code(&self) -> bool {
        true
    }
}
