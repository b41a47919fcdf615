// src/config/mod.rs

//! Configuration loading and validation for assetpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the task definitions derived
//!   from it (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate the output layout at startup (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, resolve_config};
pub use model::{
    CacheSection, OutputExtensions, OutputSection, PathClass, PathSet, PipelineConfig,
    RawConfigFile, ScriptSection, Stage, TaskDefinition,
};
pub use validate::validate_definitions;
