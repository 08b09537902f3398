// src/queue/mod.rs

//! Pluggable work sources for the runner.
//!
//! Two shapes ship with the crate: [`MemoryQueue`], an unsynchronized FIFO
//! for a single runner, and [`LockingQueue`](locking::LockingQueue), which
//! layers an at-most-once claim protocol over a shared external store so
//! several runner processes can consume one queue.

pub mod locking;
pub mod spool;

pub use locking::{LockingQueue, TaskStore};
pub use spool::{SpoolStore, TaskManifest};

use std::collections::VecDeque;

use crate::spec::TaskSpec;

/// Source of pending task specs.
///
/// `pop_task` must be non-blocking: when nothing can be delivered right now
/// (empty queue, lost claim race, store failure) it returns `None` and the
/// runner simply tries again next iteration.
pub trait TaskQueue: Send {
    /// Whether any tasks are currently available.
    fn has_tasks(&self) -> bool;

    /// Number of remaining tasks (can be zero).
    fn count(&self) -> usize;

    /// Remove and return the next task spec, if any.
    fn pop_task(&mut self) -> Option<Box<dyn TaskSpec>>;
}

/// Strict FIFO held in memory.
///
/// Touched by exactly one runner, so no synchronization is needed.
#[derive(Default)]
pub struct MemoryQueue {
    queue: VecDeque<Box<dyn TaskSpec>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task spec to the back of the queue.
    pub fn push_task(&mut self, spec: Box<dyn TaskSpec>) {
        self.queue.push_back(spec);
    }
}

impl TaskQueue for MemoryQueue {
    fn has_tasks(&self) -> bool {
        !self.queue.is_empty()
    }

    fn count(&self) -> usize {
        self.queue.len()
    }

    fn pop_task(&mut self) -> Option<Box<dyn TaskSpec>> {
        self.queue.pop_front()
    }
}
