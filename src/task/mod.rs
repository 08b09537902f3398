// src/task/mod.rs

//! One [`Task`] wraps exactly one OS process spawned from one
//! [`TaskSpec`](crate::spec::TaskSpec) and tracks its lifecycle by sampling.
//!
//! State machine:
//!
//! ```text
//! RUNNING ──poll──▶ COMPLETE            (terminal)
//!    │    ──poll──▶ SIGNALED            (terminal)
//!    │    ──poll──▶ STOPPED ──poll──▶ RUNNING
//!    └─terminate──▶ PENDING_TERMINATION ──poll──▶ SIGNALED / COMPLETE
//! ```
//!
//! Process creation failure is the only fatal error; once the process runs,
//! every anomaly is absorbed into state. The stdio channels are owned by the
//! task and closed exactly once when it is dropped, whatever terminal state
//! was reached. A task that is dropped before being reaped leaves the zombie
//! to the parent's exit, same as the runner it came from.

pub mod wait;

use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::errors::StartError;
use crate::signal::Signal;
use crate::spec::TaskSpec;
use wait::WaitSample;

/// Lifecycle states. `Complete` and `Signaled` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Process is alive (initial state).
    Running,
    /// Process ended because of a delivered signal. Terminal.
    Signaled,
    /// Process is suspended by a signal; it may resume.
    Stopped,
    /// Process exited. Terminal.
    Complete,
    /// Termination was requested; the OS has not confirmed an exit yet.
    PendingTermination,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Signaled)
    }
}

/// Runtime handle to one started OS process plus its observed state.
pub struct Task {
    spec: Box<dyn TaskSpec>,
    child: Child,
    pid: u32,
    started_at: Instant,
    ended_at: Option<Instant>,
    status: TaskStatus,
    exit_code: Option<i32>,
    stop_signal: Option<Signal>,
    term_signal: Option<Signal>,
    /// Set once a waitpid sample has reaped the child; after that, polls
    /// replay the recorded observation instead of sampling again.
    reaped: bool,
}

impl Task {
    /// Start the process described by `spec`.
    ///
    /// The command line runs through `sh -c` with all three stdio channels
    /// piped. On success the task is `Running` with its pid and start time
    /// recorded; on failure no process exists and the spec is lost with the
    /// error.
    pub fn spawn(spec: Box<dyn TaskSpec>) -> Result<Self, StartError> {
        let command = spec.command();

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&command)
            .current_dir(spec.cwd())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in spec.env() {
            cmd.env(key, value);
        }

        let child = cmd.spawn().map_err(|source| StartError {
            name: spec.name().to_string(),
            command: command.clone(),
            cwd: spec.cwd().to_path_buf(),
            source,
        })?;

        let pid = child.id();
        debug!(task = %spec.name(), pid, cmd = %command, "process started");

        Ok(Self {
            spec,
            child,
            pid,
            started_at: Instant::now(),
            ended_at: None,
            status: TaskStatus::Running,
            exit_code: None,
            stop_signal: None,
            term_signal: None,
            reaped: false,
        })
    }

    /// Sample the OS-reported status and fold it into the state machine.
    ///
    /// Idempotent: repeated polls on a terminal task change nothing, and a
    /// latched exit code is never overwritten.
    pub fn poll(&mut self) {
        if self.status.is_terminal() {
            return;
        }

        if self.reaped {
            // The exit was observed while termination was pending; this
            // later poll confirms the terminal state.
            if self.status == TaskStatus::PendingTermination {
                self.status = if self.term_signal.is_some() {
                    TaskStatus::Signaled
                } else {
                    TaskStatus::Complete
                };
            }
            return;
        }

        match wait::sample(self.pid) {
            Ok(WaitSample::Unchanged) => {}
            Ok(WaitSample::Exited(code)) => {
                self.reaped = true;
                self.ended_at = Some(Instant::now());
                if self.exit_code.is_none() {
                    self.exit_code = Some(code);
                }
                if self.status != TaskStatus::PendingTermination {
                    self.status = TaskStatus::Complete;
                }
            }
            Ok(WaitSample::Signaled(signal)) => {
                // A signal death overrides any pending or complete
                // determination from the same sample.
                self.reaped = true;
                self.ended_at = Some(Instant::now());
                self.term_signal = Some(signal);
                self.status = TaskStatus::Signaled;
            }
            Ok(WaitSample::Stopped(signal)) => {
                self.stop_signal = Some(signal);
                self.status = TaskStatus::Stopped;
            }
            Ok(WaitSample::Continued) => {
                if self.status == TaskStatus::Stopped {
                    self.status = TaskStatus::Running;
                }
            }
            Err(err) => {
                // ECHILD and friends: the process is gone and nothing more
                // can be learned. Absorb as completion with no exit code.
                debug!(task = %self.spec.name(), pid = self.pid, error = %err,
                    "status sample failed; treating process as gone");
                self.reaped = true;
                self.ended_at = Some(Instant::now());
                self.status = TaskStatus::Complete;
            }
        }
    }

    /// Request termination with `signal`, without waiting for the exit.
    ///
    /// Only effective while `Running`; returns whether the signal was
    /// dispatched. Confirmation arrives on a later [`poll`](Self::poll).
    pub fn terminate_with(&mut self, signal: Signal) -> bool {
        self.poll();
        if self.status != TaskStatus::Running {
            return false;
        }

        // SAFETY: plain kill(2) on the pid we spawned.
        let sent = unsafe { libc::kill(self.pid as libc::pid_t, signal.as_raw()) } == 0;
        if !sent {
            debug!(task = %self.spec.name(), pid = self.pid, %signal,
                "kill failed; the process may already be gone");
        }
        self.status = TaskStatus::PendingTermination;
        sent
    }

    /// [`terminate_with`](Self::terminate_with) using the default TERM.
    pub fn terminate(&mut self) -> bool {
        self.terminate_with(Signal::Term)
    }

    /// Elapsed wall-clock time since the process was started. Frozen at the
    /// observed end time once the process is gone.
    pub fn runtime(&self) -> Duration {
        match self.ended_at {
            Some(end) => end.duration_since(self.started_at),
            None => self.started_at.elapsed(),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Exit code, once observed. Never reverts to `None` after being set.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn term_signal(&self) -> Option<Signal> {
        self.term_signal
    }

    pub fn stop_signal(&self) -> Option<Signal> {
        self.stop_signal
    }

    pub fn end_time(&self) -> Option<Instant> {
        self.ended_at
    }

    pub fn spec(&self) -> &dyn TaskSpec {
        self.spec.as_ref()
    }

    /// Display name from the spec.
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Take ownership of the child's stdin pipe, if not taken already.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// Take ownership of the child's stdout pipe, if not taken already.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take ownership of the child's stderr pipe, if not taken already.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }
}
