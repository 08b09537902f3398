use std::error::Error;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskherd::{
    MemoryQueue, Runner, RunnerConfig, ShellSpec, Signal, SleeperSpec, StatusNotifier, Task,
    TaskStatus,
};

type TestResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Clone)]
struct Event {
    status: TaskStatus,
    name: String,
    message: Option<String>,
    term_signal: Option<Signal>,
    exit_code: Option<i32>,
}

/// Records every status update it receives.
#[derive(Default)]
struct CountingNotifier {
    events: Mutex<Vec<Event>>,
}

impl CountingNotifier {
    fn events(&self) -> Vec<Event> {
        self.events.lock().expect("notifier lock").clone()
    }
}

impl StatusNotifier for CountingNotifier {
    fn update_status(&self, status: TaskStatus, task: &Task, message: Option<&str>) -> bool {
        self.events.lock().expect("notifier lock").push(Event {
            status,
            name: task.name().to_string(),
            message: message.map(str::to_string),
            term_signal: task.term_signal(),
            exit_code: task.exit_code(),
        });
        true
    }
}

fn fast_config(max_processes: usize) -> RunnerConfig {
    RunnerConfig {
        poll_interval: Duration::from_millis(20),
        max_processes,
        daemon: false,
    }
}

#[tokio::test]
async fn drains_the_queue_without_exceeding_the_cap() -> TestResult {
    let mut queue = MemoryQueue::new();
    for _ in 0..10 {
        queue.push_task(Box::new(SleeperSpec::new(Duration::from_millis(10))));
    }

    let notifier = Arc::new(CountingNotifier::default());
    let mut runner =
        Runner::new(Box::new(queue), fast_config(2))?.with_notifier(notifier.clone());

    runner.run().await;

    let events = notifier.events();
    assert_eq!(events.len(), 10);
    assert!(events.iter().all(|e| e.status == TaskStatus::Complete));
    assert!(runner.peak_in_flight() <= 2);
    assert_eq!(runner.in_flight(), 0);
    Ok(())
}

#[tokio::test]
async fn overrunning_task_is_terminated() -> TestResult {
    let spec = SleeperSpec::new(Duration::from_secs(5)).with_timeout(Duration::from_millis(50));
    let mut queue = MemoryQueue::new();
    queue.push_task(Box::new(spec));

    let notifier = Arc::new(CountingNotifier::default());
    let mut runner =
        Runner::new(Box::new(queue), fast_config(1))?.with_notifier(notifier.clone());

    // Bounded by the timeout plus a few poll intervals, not by the sleep.
    tokio::time::timeout(Duration::from_secs(3), runner.run()).await?;

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Signaled);
    assert_eq!(events[0].term_signal, Some(Signal::Term));
    assert_eq!(events[0].exit_code, None);
    Ok(())
}

#[tokio::test]
async fn empty_queue_returns_immediately() -> TestResult {
    let notifier = Arc::new(CountingNotifier::default());
    let mut runner = Runner::new(Box::new(MemoryQueue::new()), fast_config(1))?
        .with_notifier(notifier.clone());

    tokio::time::timeout(Duration::from_secs(1), runner.run()).await?;

    assert!(notifier.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn daemon_mode_runs_until_shutdown() -> TestResult {
    let config = RunnerConfig {
        poll_interval: Duration::from_millis(10),
        max_processes: 1,
        daemon: true,
    };
    let mut runner = Runner::new(Box::new(MemoryQueue::new()), config)?;
    let shutdown = runner.shutdown_handle();

    let handle = tokio::spawn(async move {
        runner.run().await;
        runner
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());

    shutdown.store(true, Ordering::Relaxed);
    let runner = tokio::time::timeout(Duration::from_secs(2), handle).await??;
    assert_eq!(runner.in_flight(), 0);
    Ok(())
}

#[tokio::test]
async fn start_failure_does_not_stop_the_runner() -> TestResult {
    // A spec whose cwd disappears between validation and spawn.
    let dir = tempfile::tempdir()?;
    let path = dir.path().to_path_buf();
    let bad = ShellSpec::new("true", &path, "bad")?;
    dir.close()?;

    let mut queue = MemoryQueue::new();
    queue.push_task(Box::new(bad));
    queue.push_task(Box::new(ShellSpec::new("true", "/", "good")?));

    let notifier = Arc::new(CountingNotifier::default());
    let mut runner =
        Runner::new(Box::new(queue), fast_config(1))?.with_notifier(notifier.clone());

    runner.run().await;

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "good");
    assert_eq!(events[0].status, TaskStatus::Complete);
    Ok(())
}

#[tokio::test]
async fn nonzero_exit_code_is_reported_in_the_message() -> TestResult {
    let mut queue = MemoryQueue::new();
    queue.push_task(Box::new(ShellSpec::new("exit 7", "/", "failing")?));

    let notifier = Arc::new(CountingNotifier::default());
    let mut runner =
        Runner::new(Box::new(queue), fast_config(1))?.with_notifier(notifier.clone());

    runner.run().await;

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, TaskStatus::Complete);
    assert_eq!(events[0].exit_code, Some(7));
    assert_eq!(events[0].message.as_deref(), Some("exit code: 7"));
    Ok(())
}

#[test]
fn zero_poll_interval_is_rejected() {
    let config = RunnerConfig {
        poll_interval: Duration::ZERO,
        max_processes: 1,
        daemon: false,
    };
    assert!(Runner::new(Box::new(MemoryQueue::new()), config).is_err());
}

#[test]
fn zero_max_processes_is_rejected() {
    let config = RunnerConfig {
        poll_interval: Duration::from_millis(10),
        max_processes: 0,
        daemon: false,
    };
    assert!(Runner::new(Box::new(MemoryQueue::new()), config).is_err());
}
