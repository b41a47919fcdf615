// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use globset::Glob;
use tracing::warn;

use crate::config::model::{
    derive_task_definitions, OutputExtensions, PathSet, PipelineConfig, RawConfigFile,
    ScriptSection, TaskDefinition,
};
use crate::engine::TaskKind;
use crate::errors::{PipelineError, Result};
use crate::watch::patterns::glob_base;

impl PipelineConfig {
    /// Derive task definitions from `raw` and validate the result.
    pub fn from_raw(root: impl Into<PathBuf>, raw: RawConfigFile) -> Result<Self> {
        let tasks = derive_task_definitions(&raw);
        validate_definitions(&raw.paths, &tasks)?;
        warn_on_detached_entry(&raw.paths, &raw.script);
        Ok(PipelineConfig::new_unchecked(root.into(), raw, tasks))
    }
}

/// Check the invariants every task set must satisfy before anything runs.
///
/// - every task kind is defined exactly once
/// - every path glob compiles
/// - output directories never nest inside each other
/// - tasks sharing an output directory write disjoint file extensions
/// - no output directory lies below an input glob's base directory
pub fn validate_definitions(paths: &PathSet, tasks: &[TaskDefinition]) -> Result<()> {
    ensure_all_tasks_defined(tasks)?;
    validate_globs(paths)?;
    validate_output_layout(tasks)?;
    validate_outputs_outside_inputs(paths, tasks)?;
    Ok(())
}

fn ensure_all_tasks_defined(tasks: &[TaskDefinition]) -> Result<()> {
    for kind in TaskKind::ALL {
        let count = tasks.iter().filter(|t| t.kind == kind).count();
        if count != 1 {
            return Err(PipelineError::ConfigError(format!(
                "task '{kind}' must be defined exactly once (found {count})"
            )));
        }
    }
    Ok(())
}

fn validate_globs(paths: &PathSet) -> Result<()> {
    for pattern in [&paths.scss, &paths.js, &paths.images] {
        Glob::new(pattern)?;
    }
    Ok(())
}

/// Lexical form used for comparing directories: `./a/./b` and `a/b` are the
/// same place.
fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn validate_output_layout(tasks: &[TaskDefinition]) -> Result<()> {
    for (i, a) in tasks.iter().enumerate() {
        let a_dir = normalized(&a.output_dir);
        for b in &tasks[i + 1..] {
            let b_dir = normalized(&b.output_dir);
            if a_dir == b_dir {
                if !extensions_disjoint(&a.output_extensions(), &b.output_extensions()) {
                    return Err(PipelineError::ConfigError(format!(
                        "tasks '{}' and '{}' share output directory {:?} but may write the same file extensions",
                        a.kind, b.kind, a.output_dir
                    )));
                }
            } else if a_dir.starts_with(&b_dir) || b_dir.starts_with(&a_dir) {
                return Err(PipelineError::ConfigError(format!(
                    "output directories of '{}' ({:?}) and '{}' ({:?}) overlap",
                    a.kind, a.output_dir, b.kind, b.output_dir
                )));
            }
        }
    }
    Ok(())
}

/// Two tasks may share a directory only if no file name can come from both.
fn extensions_disjoint(a: &OutputExtensions, b: &OutputExtensions) -> bool {
    match (a, b) {
        (OutputExtensions::Fixed(x), OutputExtensions::Fixed(y)) => {
            x.iter().all(|ext| !y.contains(ext))
        }
        (OutputExtensions::SameAsInput { excluding }, OutputExtensions::Fixed(fixed))
        | (OutputExtensions::Fixed(fixed), OutputExtensions::SameAsInput { excluding }) => {
            fixed.iter().all(|ext| excluding.contains(ext))
        }
        (OutputExtensions::SameAsInput { .. }, OutputExtensions::SameAsInput { .. }) => false,
    }
}

fn validate_outputs_outside_inputs(paths: &PathSet, tasks: &[TaskDefinition]) -> Result<()> {
    for task in tasks {
        let dir = normalized(&task.output_dir);
        for class in crate::config::model::PathClass::ALL {
            let base = glob_base(paths.glob(class));
            if dir.starts_with(&base) {
                return Err(PipelineError::ConfigError(format!(
                    "output directory {:?} of task '{}' lies inside the {} sources ({:?})",
                    task.output_dir,
                    task.kind,
                    class,
                    paths.glob(class)
                )));
            }
        }
    }
    Ok(())
}

/// The bundler always starts from the fixed entry; the script glob only
/// drives the watcher. Say so when the two disagree.
fn warn_on_detached_entry(paths: &PathSet, script: &ScriptSection) {
    let Ok(glob) = Glob::new(&paths.js) else {
        return;
    };
    let entry = script.entry.to_string_lossy().replace('\\', "/");
    if !glob.compile_matcher().is_match(&entry) {
        warn!(
            entry = %entry,
            glob = %paths.js,
            "script entry is not matched by the script glob; edits to it will not trigger a rebuild"
        );
    }
}
