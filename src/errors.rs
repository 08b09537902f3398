// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Only `ConfigError` is ever fatal, and only before the runner loop starts.
//! `StartError` and `StoreError` are absorbed inside the loop: a task that
//! fails to start is discarded and logged, a failing store is reported to an
//! injectable handler and the queue simply yields nothing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid construction parameters for a runner or a task spec.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("poll interval must be a positive duration")]
    ZeroPollInterval,

    #[error("max_processes must be >= 1")]
    ZeroMaxProcesses,

    #[error("{0}")]
    InvalidSpec(String),

    #[error("working directory {0:?} is not an existing directory")]
    BadWorkingDir(PathBuf),
}

/// The OS refused to create a process for a task.
///
/// This is the only error a task can raise; once a process is running, every
/// later anomaly is absorbed into task state.
#[derive(Debug, Error)]
#[error("could not start process for task '{name}': '{command}' in {cwd:?}")]
pub struct StartError {
    pub name: String,
    pub command: String,
    pub cwd: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A backing-store operation of a distributed queue failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error during {op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("malformed task record '{id}': {reason}")]
    BadRecord { id: String, reason: String },
}

impl StoreError {
    pub(crate) fn io(op: &'static str, source: io::Error) -> Self {
        StoreError::Io { op, source }
    }
}
