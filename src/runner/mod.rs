// src/runner/mod.rs

//! The scheduler: a bounded-concurrency poll loop over OS child processes.
//!
//! One runner is one logical thread of control; real parallelism comes from
//! the child processes, never from the loop itself. Each iteration admits
//! specs from the queue while under the concurrency cap, sleeps for the
//! poll interval (the loop's only suspension point), then reconciles every
//! in-flight task against wall-clock time: timeouts are enforced, terminal
//! tasks are reported to the [`StatusNotifier`] exactly once and evicted.

pub mod notify;

pub use notify::{NullNotifier, StatusNotifier};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ConfigError;
use crate::queue::TaskQueue;
use crate::task::{Task, TaskStatus};

/// Validated construction parameters for a [`Runner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How long to sleep between status samples. Must be positive; this
    /// bounds the latency between a process ending and the loop noticing.
    pub poll_interval: Duration,
    /// Hard ceiling on concurrently running tasks. Must be >= 1.
    pub max_processes: usize,
    /// In daemon mode the loop never exits on its own; otherwise it drains
    /// the queue and returns.
    pub daemon: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_processes: 1,
            daemon: true,
        }
    }
}

/// Bounded-concurrency scheduler driving admission and reconciliation.
pub struct Runner {
    id: Uuid,
    queue: Box<dyn TaskQueue>,
    notifier: Arc<dyn StatusNotifier>,
    config: RunnerConfig,
    /// Started but not yet confirmed-terminal tasks. Owned and mutated only
    /// by this runner's own loop.
    in_flight: Vec<Task>,
    peak_in_flight: usize,
    shutdown: Arc<AtomicBool>,
}

impl Runner {
    /// Create a runner over `queue`.
    ///
    /// Fails fast with [`ConfigError`] on a zero poll interval or a zero
    /// concurrency cap; nothing else about construction can fail.
    pub fn new(queue: Box<dyn TaskQueue>, config: RunnerConfig) -> Result<Self, ConfigError> {
        if config.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if config.max_processes == 0 {
            return Err(ConfigError::ZeroMaxProcesses);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            queue,
            notifier: Arc::new(NullNotifier),
            config,
            in_flight: Vec::new(),
            peak_in_flight: 0,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Replace the default no-op notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn StatusNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Opaque identifier of this runner instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Flag that makes [`run`](Self::run) return after its current
    /// iteration. Useful for wiring Ctrl-C to a daemon-mode runner.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Number of tasks currently tracked.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Highest in-flight count observed so far. Never exceeds the cap.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }

    /// Run the scheduling loop.
    ///
    /// Returns when a shutdown is requested, or — outside daemon mode —
    /// once both the queue and the in-flight set are empty.
    pub async fn run(&mut self) {
        info!(
            runner = %self.id,
            daemon = self.config.daemon,
            max_processes = self.config.max_processes,
            poll_interval = ?self.config.poll_interval,
            "runner started"
        );

        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                info!(runner = %self.id, "shutdown requested, stopping runner");
                break;
            }

            self.admit();

            // Nothing running and nothing queued: a non-daemon runner is
            // done without paying one more poll interval.
            if self.drained() {
                break;
            }

            sleep(self.config.poll_interval).await;

            self.reconcile();

            if self.drained() {
                break;
            }
        }

        info!(
            runner = %self.id,
            peak_in_flight = self.peak_in_flight,
            "runner exiting"
        );
    }

    fn drained(&self) -> bool {
        !self.config.daemon && self.in_flight.is_empty() && !self.queue.has_tasks()
    }

    /// Admission: start queued tasks while under the concurrency cap.
    fn admit(&mut self) {
        while self.queue.has_tasks() && self.in_flight.len() < self.config.max_processes {
            let Some(spec) = self.queue.pop_task() else {
                // The queue claimed to have tasks but delivered none (e.g. a
                // lost claim race on a shared store). Try again next round.
                break;
            };

            match Task::spawn(spec) {
                Ok(task) => {
                    info!(
                        runner = %self.id,
                        task = %task.name(),
                        pid = task.pid(),
                        "task started"
                    );
                    self.in_flight.push(task);
                    self.peak_in_flight = self.peak_in_flight.max(self.in_flight.len());
                }
                Err(err) => {
                    // Non-fatal: the spec is discarded, the loop continues.
                    warn!(runner = %self.id, error = %err, "task failed to start; discarding");
                }
            }
        }
    }

    /// Reconciliation: poll every in-flight task, apply timeout policy,
    /// report terminal tasks and evict them.
    fn reconcile(&mut self) {
        debug!(runner = %self.id, in_flight = self.in_flight.len(), "polling in-flight tasks");

        let mut kept = Vec::with_capacity(self.in_flight.len());

        for mut task in std::mem::take(&mut self.in_flight) {
            task.poll();

            match task.status() {
                TaskStatus::Running => {
                    let budget = task.spec().timeout();
                    if !task.spec().is_daemon() && !budget.is_zero() && task.runtime() > budget {
                        warn!(
                            task = %task.name(),
                            pid = task.pid(),
                            budget = ?budget,
                            runtime = ?task.runtime(),
                            "terminating task for exceeding its runtime budget"
                        );
                        task.terminate();
                    }
                    kept.push(task);
                }
                TaskStatus::Stopped => {
                    debug!(
                        task = %task.name(),
                        pid = task.pid(),
                        signal = ?task.stop_signal(),
                        "task stopped; still tracked"
                    );
                    kept.push(task);
                }
                TaskStatus::PendingTermination => {
                    debug!(
                        task = %task.name(),
                        pid = task.pid(),
                        "termination pending; awaiting confirmation"
                    );
                    kept.push(task);
                }
                TaskStatus::Complete => {
                    self.finish_complete(task);
                }
                TaskStatus::Signaled => {
                    self.finish_signaled(task);
                }
            }
        }

        self.in_flight = kept;
    }

    fn finish_complete(&self, task: Task) {
        let code = task.exit_code();
        let failed = task.spec().trust_exit_code() && code.is_some_and(|c| c != 0);

        if failed {
            warn!(
                task = %task.name(),
                pid = task.pid(),
                exit_code = code,
                "task complete with failure exit code"
            );
        } else {
            info!(
                task = %task.name(),
                pid = task.pid(),
                exit_code = code,
                "task complete"
            );
        }

        let message = code.map(|c| format!("exit code: {c}"));
        self.notify(TaskStatus::Complete, &task, message.as_deref());
    }

    fn finish_signaled(&self, task: Task) {
        let message = task.term_signal().map(|sig| format!("terminated by signal {sig}"));
        info!(
            task = %task.name(),
            pid = task.pid(),
            signal = ?task.term_signal(),
            exit_code = task.exit_code(),
            "task terminated by signal"
        );
        self.notify(TaskStatus::Signaled, &task, message.as_deref());
    }

    fn notify(&self, status: TaskStatus, task: &Task, message: Option<&str>) {
        if !self.notifier.update_status(status, task, message) {
            debug!(task = %task.name(), ?status, "status notifier declined the update");
        }
    }
}
