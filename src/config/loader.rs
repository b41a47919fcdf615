// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{PipelineConfig, RawConfigFile};
use crate::errors::Result;

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "Assetpipe.toml";

/// Load a configuration file from a given path and return the raw model.
///
/// This only performs TOML deserialization; it does **not** derive task
/// definitions or check the output layout. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file and validate it.
///
/// Relative paths in the file are resolved against the file's directory.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    PipelineConfig::from_raw(config_root_dir(path), raw)
}

/// Resolve the effective configuration for a CLI invocation.
///
/// - An explicit `--config` path must exist.
/// - Otherwise `Assetpipe.toml` in the working directory is used if present.
/// - Otherwise the built-in defaults apply, rooted at the working directory.
pub fn resolve_config(explicit: Option<&str>) -> Result<PipelineConfig> {
    if let Some(path) = explicit {
        info!(config = %path, "loading config");
        return load_and_validate(path);
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        info!(config = %default_path.display(), "loading config");
        return load_and_validate(&default_path);
    }

    debug!("no config file found; using built-in defaults");
    PipelineConfig::from_raw(current_dir(), RawConfigFile::default())
}

/// Figure out the project root for a config path.
///
/// - If the path has a non-empty parent (e.g. "site/Assetpipe.toml"), that
///   directory is the root.
/// - A bare filename falls back to the current working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => current_dir(),
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
