// src/watch/mod.rs

//! File watching and glob routing.
//!
//! This module is responsible for:
//! - Compiling the path globs, finding source files below them and mapping
//!   them to output paths (`patterns`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) that turns
//!   changes into task triggers through the watch bindings.
//!
//! It does not run tasks; it only produces `RuntimeEvent::TaskTriggered`.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{
    build_bindings_from_config, collect_sources, glob_base, SourceFile, WatchBinding,
};
pub use watcher::{spawn_watcher, WatcherHandle};
