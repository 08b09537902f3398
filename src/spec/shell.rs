// src/spec/shell.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::spec::{shell_quote, TaskSpec};

/// A shell command with optional arguments.
///
/// Arguments are appended to the command line individually quoted, so a
/// producer can pass untrusted values without building shell syntax itself.
#[derive(Debug, Clone)]
pub struct ShellSpec {
    cmd: String,
    args: Vec<String>,
    cwd: PathBuf,
    env: BTreeMap<String, String>,
    name: String,
    daemon: bool,
    timeout: Duration,
    trust_exit_code: bool,
}

impl ShellSpec {
    /// Create a spec for `cmd` starting in `cwd`.
    ///
    /// Fails if the command or name is empty, or if `cwd` is not an existing
    /// directory. Defaults: no args, no extra env, not a daemon, no timeout,
    /// trusted exit codes.
    pub fn new(
        cmd: impl Into<String>,
        cwd: impl Into<PathBuf>,
        name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let cmd = cmd.into();
        let cwd = cwd.into();
        let name = name.into();

        if cmd.trim().is_empty() {
            return Err(ConfigError::InvalidSpec(
                "shell spec requires a non-empty command".into(),
            ));
        }
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidSpec(
                "shell spec requires a non-empty name".into(),
            ));
        }
        if !cwd.is_dir() {
            return Err(ConfigError::BadWorkingDir(cwd));
        }

        Ok(Self {
            cmd,
            args: Vec::new(),
            cwd,
            env: BTreeMap::new(),
            name,
            daemon: false,
            timeout: Duration::ZERO,
            trust_exit_code: true,
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }

    pub fn with_trust_exit_code(mut self, trust: bool) -> Self {
        self.trust_exit_code = trust;
        self
    }
}

impl TaskSpec for ShellSpec {
    fn command(&self) -> String {
        let mut cmd = self.cmd.clone();
        for arg in &self.args {
            cmd.push(' ');
            cmd.push_str(&shell_quote(arg));
        }
        cmd.trim().to_string()
    }

    fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn cwd(&self) -> &Path {
        &self.cwd
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
        self.trust_exit_code
    }
}
