// src/runner/notify.rs

//! Terminal-status notification sink.

use crate::task::{Task, TaskStatus};

/// Observer for tasks reaching a terminal state.
///
/// The runner invokes this exactly once per task reaching `Complete` or
/// `Signaled` (never for `Stopped`, which is non-terminal), after the
/// classification has been logged and before the task is evicted from the
/// in-flight set.
pub trait StatusNotifier: Send + Sync {
    /// Report `status` for `task`. Returns whether the update was accepted.
    fn update_status(&self, status: TaskStatus, task: &Task, message: Option<&str>) -> bool;
}

/// Notifier that accepts and discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl StatusNotifier for NullNotifier {
    fn update_status(&self, _status: TaskStatus, _task: &Task, _message: Option<&str>) -> bool {
        true
    }
}
