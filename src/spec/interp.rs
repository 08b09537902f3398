// src/spec/interp.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;
use crate::spec::{shell_quote, TaskSpec};

/// A script run through an interpreter executable.
///
/// The command line becomes `<interpreter> <script> [args...]`, each part
/// individually quoted. The display name defaults to the script's file name.
#[derive(Debug, Clone)]
pub struct InterpreterSpec {
    interpreter: PathBuf,
    script: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    name: String,
    daemon: bool,
    timeout: Duration,
}

impl InterpreterSpec {
    /// Create a spec running `script` with `interpreter`.
    ///
    /// Fails if the script is not an existing file or the interpreter path
    /// is empty. The process starts in the script's parent directory.
    pub fn new(
        interpreter: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let interpreter = interpreter.into();
        let script = script.into();

        if interpreter.as_os_str().is_empty() {
            return Err(ConfigError::InvalidSpec(
                "interpreter spec requires an interpreter path".into(),
            ));
        }
        if !script.is_file() {
            return Err(ConfigError::InvalidSpec(format!(
                "script {script:?} is not a readable file"
            )));
        }

        let name = script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| script.to_string_lossy().into_owned());

        Ok(Self {
            interpreter,
            script,
            args: Vec::new(),
            env: BTreeMap::new(),
            name,
            daemon: false,
            timeout: Duration::ZERO,
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

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
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
}

impl TaskSpec for InterpreterSpec {
    fn command(&self) -> String {
        let mut cmd = shell_quote(&self.interpreter.to_string_lossy());
        cmd.push(' ');
        cmd.push_str(&shell_quote(&self.script.to_string_lossy()));
        for arg in &self.args {
            cmd.push(' ');
            cmd.push_str(&shell_quote(arg));
        }
        cmd
    }

    fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn cwd(&self) -> &Path {
        self.script.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."))
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn command_quotes_every_part() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("job.sh");
        writeln!(std::fs::File::create(&script)?, "exit 0")?;

        let spec = InterpreterSpec::new("/bin/sh", &script)?.with_args(["a b"]);
        let cmd = spec.command();
        assert!(cmd.starts_with("'/bin/sh' '"));
        assert!(cmd.ends_with("'a b'"));
        assert_eq!(spec.name(), "job.sh");
        Ok(())
    }

    #[test]
    fn rejects_missing_script() {
        assert!(InterpreterSpec::new("/bin/sh", "/no/such/script.sh").is_err());
    }
}
