// src/queue/locking.rs

//! At-most-once dequeue over a shared store.
//!
//! Multiple runner processes may point a [`LockingQueue`] at the same store.
//! The only synchronization between them is the store's lock records: a
//! claim is an atomic, uniqueness-enforced creation keyed by task id, so of
//! any number of concurrent claimants exactly one succeeds. A failed claim
//! is always safe to skip — the winner will consume that task.

use tracing::warn;

use crate::errors::StoreError;
use crate::queue::TaskQueue;
use crate::spec::TaskSpec;

/// Contract a backing store must satisfy.
///
/// The storage schema is entirely the store's business; the queue only
/// requires that `try_lock` rejects a second creation for the same id
/// atomically, and that `available` yields candidates in a stable order.
pub trait TaskStore: Send {
    /// One stored task as the store represents it.
    type Record;

    /// Number of tasks currently matching the store's "available" predicate.
    fn count_available(&self) -> Result<usize, StoreError>;

    /// Available candidates, ordered by the store's stable criterion
    /// (typically arrival order).
    fn available(&self) -> Result<Vec<Self::Record>, StoreError>;

    /// The unique id of a record, used to key its lock.
    fn task_id(&self, record: &Self::Record) -> String;

    /// Attempt to create the lock record for `task_id`.
    ///
    /// Returns `Ok(false)` when the lock already exists — the expected
    /// outcome of losing a claim race, never an error.
    fn try_lock(&self, task_id: &str) -> Result<bool, StoreError>;

    /// Delete the lock record created by a successful [`try_lock`].
    fn release_lock(&self, task_id: &str) -> Result<(), StoreError>;

    /// Mark the record consumed in the primary store so no later `available`
    /// call returns it.
    fn mark_consumed(&mut self, record: &Self::Record) -> Result<(), StoreError>;

    /// Build the task spec described by the record.
    fn materialize(&self, record: &Self::Record) -> Result<Box<dyn TaskSpec>, StoreError>;
}

/// Handler store failures are funnelled to instead of crashing the runner.
pub type StoreErrorHandler = Box<dyn Fn(&StoreError) + Send>;

/// A [`TaskQueue`] implementing the claim-then-materialize protocol.
pub struct LockingQueue<S: TaskStore> {
    store: S,
    on_error: StoreErrorHandler,
}

impl<S: TaskStore> LockingQueue<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            on_error: Box::new(|err| warn!(error = %err, "task store failure")),
        }
    }

    /// Replace the default (logging) store-error handler.
    pub fn with_error_handler(mut self, handler: StoreErrorHandler) -> Self {
        self.on_error = handler;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn try_pop(&mut self) -> Result<Option<Box<dyn TaskSpec>>, StoreError> {
        let candidates = self.store.available()?;

        for record in &candidates {
            let id = self.store.task_id(record);

            // Losing the race for this candidate is fine; the next one may
            // still be claimable within the same call.
            if !self.store.try_lock(&id)? {
                continue;
            }

            self.store.mark_consumed(record)?;
            self.store.release_lock(&id)?;
            return Ok(Some(self.store.materialize(record)?));
        }

        Ok(None)
    }
}

impl<S: TaskStore> TaskQueue for LockingQueue<S> {
    fn has_tasks(&self) -> bool {
        self.count() > 0
    }

    fn count(&self) -> usize {
        match self.store.count_available() {
            Ok(n) => n,
            Err(err) => {
                (self.on_error)(&err);
                0
            }
        }
    }

    fn pop_task(&mut self) -> Option<Box<dyn TaskSpec>> {
        match self.try_pop() {
            Ok(spec) => spec,
            Err(err) => {
                (self.on_error)(&err);
                None
            }
        }
    }
}
