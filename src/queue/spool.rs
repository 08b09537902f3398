// src/queue/spool.rs

//! Filesystem-backed task store.
//!
//! Layout under the spool root:
//!
//! ```text
//! <root>/tasks/<id>.json   pending manifests, id encodes arrival order
//! <root>/locks/<id>.lock   claim records; created with O_EXCL
//! <root>/done/<id>.json    consumed manifests
//! ```
//!
//! Exclusive file creation gives the uniqueness guarantee the locking
//! protocol needs: `create_new` either creates the lock or fails with
//! `AlreadyExists`, atomically, even across independent OS processes
//! sharing the root.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::queue::locking::TaskStore;
use crate::spec::{ShellSpec, TaskSpec};

/// Serialized description of one spooled task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskManifest {
    pub name: String,
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_cwd")]
    pub cwd: PathBuf,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub daemon: bool,
    /// Wall-clock budget in milliseconds; zero = unlimited.
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default = "default_true")]
    pub trust_exit_code: bool,
}

fn default_cwd() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// One pending manifest file.
#[derive(Debug, Clone)]
pub struct SpoolRecord {
    id: String,
    path: PathBuf,
}

impl SpoolRecord {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A [`TaskStore`] over a spool directory shared between runner processes.
pub struct SpoolStore {
    tasks_dir: PathBuf,
    locks_dir: PathBuf,
    done_dir: PathBuf,
}

impl SpoolStore {
    /// Open (creating if needed) the spool directories under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let store = Self {
            tasks_dir: root.join("tasks"),
            locks_dir: root.join("locks"),
            done_dir: root.join("done"),
        };
        for dir in [&store.tasks_dir, &store.locks_dir, &store.done_dir] {
            fs::create_dir_all(dir).map_err(|e| StoreError::io("create spool dirs", e))?;
        }
        Ok(store)
    }

    /// Producer API: append a manifest to the spool.
    ///
    /// The generated id leads with a zero-padded nanosecond timestamp so the
    /// lexicographic candidate order is arrival order. The manifest is
    /// written to a temp name and renamed in, so consumers never observe a
    /// partial file.
    pub fn enqueue(&self, manifest: &TaskManifest) -> Result<String, StoreError> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos();
        let id = format!("{nanos:020}-{}", Uuid::new_v4().simple());

        let body = serde_json::to_vec_pretty(manifest).map_err(|e| StoreError::BadRecord {
            id: id.clone(),
            reason: e.to_string(),
        })?;

        let tmp = self.tasks_dir.join(format!("{id}.tmp"));
        let dest = self.tasks_dir.join(format!("{id}.json"));
        fs::write(&tmp, body).map_err(|e| StoreError::io("write manifest", e))?;
        fs::rename(&tmp, &dest).map_err(|e| StoreError::io("publish manifest", e))?;

        Ok(id)
    }

    fn lock_path(&self, task_id: &str) -> PathBuf {
        self.locks_dir.join(format!("{task_id}.lock"))
    }
}

impl TaskStore for SpoolStore {
    type Record = SpoolRecord;

    fn count_available(&self) -> Result<usize, StoreError> {
        Ok(self.available()?.len())
    }

    fn available(&self) -> Result<Vec<SpoolRecord>, StoreError> {
        let entries = fs::read_dir(&self.tasks_dir).map_err(|e| StoreError::io("list tasks", e))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io("list tasks", e))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let id = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            records.push(SpoolRecord { id, path });
        }

        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn task_id(&self, record: &SpoolRecord) -> String {
        record.id.clone()
    }

    fn try_lock(&self, task_id: &str) -> Result<bool, StoreError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.lock_path(task_id))
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(StoreError::io("create lock", e)),
        }
    }

    fn release_lock(&self, task_id: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.lock_path(task_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io("release lock", e)),
        }
    }

    fn mark_consumed(&mut self, record: &SpoolRecord) -> Result<(), StoreError> {
        let dest = self.done_dir.join(format!("{}.json", record.id));
        fs::rename(&record.path, dest).map_err(|e| StoreError::io("mark consumed", e))
    }

    fn materialize(&self, record: &SpoolRecord) -> Result<Box<dyn TaskSpec>, StoreError> {
        // The manifest has been renamed into done/ by the time we get here.
        let dest = self.done_dir.join(format!("{}.json", record.id));
        let body = fs::read(&dest).map_err(|e| StoreError::io("read manifest", e))?;

        let manifest: TaskManifest =
            serde_json::from_slice(&body).map_err(|e| StoreError::BadRecord {
                id: record.id.clone(),
                reason: e.to_string(),
            })?;

        spec_from_manifest(&manifest).map_err(|reason| StoreError::BadRecord {
            id: record.id.clone(),
            reason,
        })
    }
}

/// Build a runnable spec from a manifest.
pub fn spec_from_manifest(manifest: &TaskManifest) -> Result<Box<dyn TaskSpec>, String> {
    let mut spec = ShellSpec::new(&manifest.cmd, &manifest.cwd, &manifest.name)
        .map_err(|e| e.to_string())?
        .with_args(manifest.args.clone())
        .with_daemon(manifest.daemon)
        .with_timeout(Duration::from_millis(manifest.timeout_ms))
        .with_trust_exit_code(manifest.trust_exit_code);
    for (key, value) in &manifest.env {
        spec = spec.with_env(key, value);
    }
    Ok(Box::new(spec))
}
