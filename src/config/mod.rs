// src/config/mod.rs

//! Configuration loading and validation for taskherd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate runner settings and task commands (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, RunnerSection, TaskSection};
pub use validate::{ensure_has_tasks, validate_config};
