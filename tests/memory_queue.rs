use std::error::Error;

use taskherd::{MemoryQueue, ShellSpec, TaskQueue};

type TestResult = Result<(), Box<dyn Error>>;

fn named_spec(name: &str) -> Box<ShellSpec> {
    Box::new(ShellSpec::new("true", "/", name).expect("valid spec"))
}

#[test]
fn pops_in_fifo_order() -> TestResult {
    let mut queue = MemoryQueue::new();
    queue.push_task(named_spec("A"));
    queue.push_task(named_spec("B"));
    queue.push_task(named_spec("C"));

    assert_eq!(queue.count(), 3);
    assert!(queue.has_tasks());

    let popped: Vec<String> = (0..3)
        .map(|_| queue.pop_task().expect("queue has tasks").name().to_string())
        .collect();
    assert_eq!(popped, ["A", "B", "C"]);

    Ok(())
}

#[test]
fn empty_queue_yields_nothing() {
    let mut queue = MemoryQueue::new();
    assert!(!queue.has_tasks());
    assert_eq!(queue.count(), 0);
    assert!(queue.pop_task().is_none());
}

#[test]
fn count_tracks_pushes_and_pops() {
    let mut queue = MemoryQueue::new();
    queue.push_task(named_spec("A"));
    queue.push_task(named_spec("B"));
    assert_eq!(queue.count(), 2);

    queue.pop_task();
    assert_eq!(queue.count(), 1);
    queue.pop_task();
    assert_eq!(queue.count(), 0);
    assert!(!queue.has_tasks());
}
