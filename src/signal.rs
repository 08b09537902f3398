// src/signal.rs

//! POSIX signal taxonomy used for task control and classification.
//!
//! Only the signals the orchestrator sends or reports are modelled; anything
//! else observed from the OS is carried as a raw number.

use std::fmt;

/// Signals a task can be sent or terminated/stopped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Hup,
    Int,
    Quit,
    Abrt,
    Kill,
    Alrm,
    Term,
    /// Any other signal reported by the OS.
    Other(i32),
}

impl Signal {
    /// The raw signal number, as passed to kill(2).
    pub fn as_raw(self) -> i32 {
        match self {
            Signal::Hup => libc::SIGHUP,
            Signal::Int => libc::SIGINT,
            Signal::Quit => libc::SIGQUIT,
            Signal::Abrt => libc::SIGABRT,
            Signal::Kill => libc::SIGKILL,
            Signal::Alrm => libc::SIGALRM,
            Signal::Term => libc::SIGTERM,
            Signal::Other(n) => n,
        }
    }

    pub fn from_raw(n: i32) -> Self {
        match n {
            libc::SIGHUP => Signal::Hup,
            libc::SIGINT => Signal::Int,
            libc::SIGQUIT => Signal::Quit,
            libc::SIGABRT => Signal::Abrt,
            libc::SIGKILL => Signal::Kill,
            libc::SIGALRM => Signal::Alrm,
            libc::SIGTERM => Signal::Term,
            other => Signal::Other(other),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Hup => write!(f, "HUP"),
            Signal::Int => write!(f, "INT"),
            Signal::Quit => write!(f, "QUIT"),
            Signal::Abrt => write!(f, "ABRT"),
            Signal::Kill => write!(f, "KILL"),
            Signal::Alrm => write!(f, "ALRM"),
            Signal::Term => write!(f, "TERM"),
            Signal::Other(n) => write!(f, "SIG{n}"),
        }
    }
}
