// src/config/validate.rs

use anyhow::{anyhow, Result};

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `wait_us >= 1`
/// - `max_processes >= 1`
/// - every task has a non-empty `cmd`
///
/// It does **not** require the task table to be non-empty; a spool-fed
/// runner legitimately has no `[task.*]` sections. Use [`ensure_has_tasks`]
/// when the config is the only work source.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_runner_section(cfg)?;
    validate_tasks(cfg)?;
    Ok(())
}

/// Require at least one `[task.<name>]` section.
pub fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(anyhow!(
            "config must contain at least one [task.<name>] section (or pass --spool)"
        ));
    }
    Ok(())
}

fn validate_runner_section(cfg: &ConfigFile) -> Result<()> {
    if cfg.runner.wait_us == 0 {
        return Err(anyhow!("[runner].wait_us must be >= 1 (got 0)"));
    }
    if cfg.runner.max_processes == 0 {
        return Err(anyhow!("[runner].max_processes must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_tasks(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.cmd.trim().is_empty() {
            return Err(anyhow!("task '{}' has an empty `cmd`", name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{RunnerSection, TaskSection};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn task(cmd: &str) -> TaskSection {
        TaskSection {
            cmd: cmd.into(),
            args: vec![],
            cwd: PathBuf::from("."),
            env: BTreeMap::new(),
            daemon: false,
            timeout_ms: 0,
            trust_exit_code: true,
        }
    }

    fn cfg_with(tasks: Vec<(&str, TaskSection)>) -> ConfigFile {
        ConfigFile {
            runner: RunnerSection::default(),
            task: tasks.into_iter().map(|(n, t)| (n.to_string(), t)).collect(),
        }
    }

    #[test]
    fn accepts_defaults_with_one_task() {
        let cfg = cfg_with(vec![("a", task("true"))]);
        assert!(validate_config(&cfg).is_ok());
        assert!(ensure_has_tasks(&cfg).is_ok());
    }

    #[test]
    fn rejects_zero_wait() {
        let mut cfg = cfg_with(vec![("a", task("true"))]);
        cfg.runner.wait_us = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn rejects_zero_cap() {
        let mut cfg = cfg_with(vec![("a", task("true"))]);
        cfg.runner.max_processes = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn rejects_empty_cmd() {
        let cfg = cfg_with(vec![("a", task("  "))]);
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn empty_task_table_is_fine_unless_required() {
        let cfg = cfg_with(vec![]);
        assert!(validate_config(&cfg).is_ok());
        assert!(ensure_has_tasks(&cfg).is_err());
    }
}
