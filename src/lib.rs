// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod queue;
pub mod runner;
pub mod signal;
pub mod spec;
pub mod task;

pub use errors::{ConfigError, StartError, StoreError};
pub use queue::{LockingQueue, MemoryQueue, SpoolStore, TaskManifest, TaskQueue, TaskStore};
pub use runner::{NullNotifier, Runner, RunnerConfig, StatusNotifier};
pub use signal::Signal;
pub use spec::{InterpreterSpec, ShellSpec, SleeperSpec, TaskSpec};
pub use task::{Task, TaskStatus};

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::{ConfigFile, TaskSection};
use crate::config::validate::ensure_has_tasks;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the work source (in-memory queue from `[task.*]`, or a shared spool)
/// - the runner
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg, args.spool.as_deref());
        return Ok(());
    }

    let queue: Box<dyn TaskQueue> = match &args.spool {
        Some(dir) => {
            info!(spool = %dir, "consuming tasks from shared spool");
            Box::new(LockingQueue::new(SpoolStore::open(dir)?))
        }
        None => {
            ensure_has_tasks(&cfg)?;
            let mut queue = MemoryQueue::new();
            for (name, section) in &cfg.task {
                queue.push_task(spec_from_section(name, section)?);
            }
            Box::new(queue)
        }
    };

    let runner_cfg = RunnerConfig {
        poll_interval: Duration::from_micros(cfg.runner.wait_us),
        max_processes: cfg.runner.max_processes,
        daemon: args.daemon || cfg.runner.daemon,
    };
    let mut runner = Runner::new(queue, runner_cfg)?;

    // Ctrl-C → graceful stop after the current iteration.
    {
        let shutdown = runner.shutdown_handle();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            shutdown.store(true, Ordering::Relaxed);
        });
    }

    runner.run().await;
    Ok(())
}

/// Build a runnable spec from one `[task.<name>]` section.
fn spec_from_section(name: &str, section: &TaskSection) -> Result<Box<dyn TaskSpec>> {
    let mut spec = ShellSpec::new(&section.cmd, &section.cwd, name)?
        .with_args(section.args.clone())
        .with_daemon(section.daemon)
        .with_timeout(Duration::from_millis(section.timeout_ms))
        .with_trust_exit_code(section.trust_exit_code);
    for (key, value) in &section.env {
        spec = spec.with_env(key, value);
    }
    Ok(Box::new(spec))
}

/// Simple dry-run output: print runner settings and the task list.
fn print_dry_run(cfg: &ConfigFile, spool: Option<&str>) {
    println!("taskherd dry-run");
    println!("  runner.wait_us = {}", cfg.runner.wait_us);
    println!("  runner.max_processes = {}", cfg.runner.max_processes);
    if let Some(dir) = spool {
        println!("  spool = {dir}");
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if !task.args.is_empty() {
            println!("      args: {:?}", task.args);
        }
        println!("      cwd: {}", task.cwd.display());
        if !task.env.is_empty() {
            println!("      env: {:?}", task.env);
        }
        if task.daemon {
            println!("      daemon: true");
        }
        if task.timeout_ms > 0 {
            println!("      timeout_ms: {}", task.timeout_ms);
        }
        if !task.trust_exit_code {
            println!("      trust_exit_code: false");
        }
    }
}
