use std::error::Error;
use std::process::Command;
use std::time::{Duration, Instant};

use taskherd::{ShellSpec, Signal, SleeperSpec, Task, TaskStatus};

type TestResult = Result<(), Box<dyn Error>>;

/// Poll until `pred` holds or the deadline passes.
fn poll_until(task: &mut Task, deadline: Duration, pred: impl Fn(&Task) -> bool) -> bool {
    let start = Instant::now();
    loop {
        task.poll();
        if pred(task) {
            return true;
        }
        if start.elapsed() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn successful_exit_is_complete_with_code_zero() -> TestResult {
    let spec = ShellSpec::new("true", "/", "ok")?;
    let mut task = Task::spawn(Box::new(spec))?;

    assert_eq!(task.status(), TaskStatus::Running);
    assert!(task.pid() > 0);

    assert!(poll_until(&mut task, Duration::from_secs(2), |t| {
        t.status() == TaskStatus::Complete
    }));
    assert_eq!(task.exit_code(), Some(0));
    assert!(task.end_time().is_some());
    Ok(())
}

#[test]
fn repeated_polls_never_change_a_latched_exit_code() -> TestResult {
    let spec = ShellSpec::new("exit 3", "/", "three")?;
    let mut task = Task::spawn(Box::new(spec))?;

    assert!(poll_until(&mut task, Duration::from_secs(2), |t| {
        t.status() == TaskStatus::Complete
    }));
    assert_eq!(task.exit_code(), Some(3));

    for _ in 0..10 {
        task.poll();
        assert_eq!(task.status(), TaskStatus::Complete);
        assert_eq!(task.exit_code(), Some(3));
    }
    Ok(())
}

#[test]
fn terminate_leads_to_signaled_with_term() -> TestResult {
    let spec = SleeperSpec::new(Duration::from_secs(10));
    let mut task = Task::spawn(Box::new(spec))?;

    assert!(task.terminate());
    assert_eq!(task.status(), TaskStatus::PendingTermination);

    assert!(poll_until(&mut task, Duration::from_secs(2), |t| {
        t.status() == TaskStatus::Signaled
    }));
    assert_eq!(task.term_signal(), Some(Signal::Term));
    assert_eq!(task.exit_code(), None);
    Ok(())
}

#[test]
fn terminate_is_a_no_op_once_terminal() -> TestResult {
    let spec = ShellSpec::new("true", "/", "quick")?;
    let mut task = Task::spawn(Box::new(spec))?;

    assert!(poll_until(&mut task, Duration::from_secs(2), |t| {
        t.status() == TaskStatus::Complete
    }));
    assert!(!task.terminate());
    assert_eq!(task.status(), TaskStatus::Complete);
    Ok(())
}

#[test]
fn stop_and_continue_round_trip() -> TestResult {
    let spec = SleeperSpec::new(Duration::from_secs(10));
    let mut task = Task::spawn(Box::new(spec))?;
    let pid = task.pid().to_string();

    Command::new("kill").args(["-STOP", &pid]).status()?;
    assert!(poll_until(&mut task, Duration::from_secs(2), |t| {
        t.status() == TaskStatus::Stopped
    }));
    assert!(task.stop_signal().is_some());

    Command::new("kill").args(["-CONT", &pid]).status()?;
    assert!(poll_until(&mut task, Duration::from_secs(2), |t| {
        t.status() == TaskStatus::Running
    }));

    task.terminate();
    assert!(poll_until(&mut task, Duration::from_secs(2), |t| {
        t.status().is_terminal()
    }));
    Ok(())
}

#[test]
fn spawn_failure_is_a_start_error() -> TestResult {
    // The cwd exists when the spec is built but is gone by spawn time.
    let dir = tempfile::tempdir()?;
    let path = dir.path().to_path_buf();
    let spec = ShellSpec::new("true", &path, "doomed")?;
    dir.close()?;

    let result = Task::spawn(Box::new(spec));
    assert!(result.is_err());
    let err = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(err.contains("doomed"), "unexpected error text: {err}");
    Ok(())
}

#[test]
fn runtime_grows_while_running() -> TestResult {
    let spec = SleeperSpec::new(Duration::from_millis(200));
    let mut task = Task::spawn(Box::new(spec))?;

    std::thread::sleep(Duration::from_millis(20));
    assert!(task.runtime() >= Duration::from_millis(20));

    task.terminate();
    poll_until(&mut task, Duration::from_secs(2), |t| t.status().is_terminal());
    Ok(())
}
