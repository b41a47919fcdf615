// src/tasks/mod.rs

//! The five pipeline tasks and the shared context they run in.
//!
//! Each task is a thin wrapper around an external transform:
//! - [`style`]: `grass` compile, `lightningcss` vendor prefixing, source map
//! - [`script`]: external bundler process, `oxc` minify, `.min` rename
//! - [`image`]: `oxipng` / JPEG re-encode behind the content cache
//! - [`variant`]: `webp` and `ravif` encoders for alternate formats
//!
//! Tasks read and write through [`FileSystem`] and report per-file results
//! in a [`TaskReport`]. Errors that concern one file are recorded in the
//! report; only errors that make the whole task meaningless are returned.

pub mod bundler;
pub mod image;
pub mod script;
pub mod style;
pub mod variant;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::ContentCache;
use crate::config::{PipelineConfig, TaskDefinition};
use crate::engine::TaskKind;
use crate::errors::{PipelineError, Result};
use crate::fs::{FileSystem, RealFileSystem};

pub use bundler::{Bundler, CommandBundler};

/// A file the task could not process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// What a single task run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: TaskKind,
    /// Files written, in processing order.
    pub written: Vec<PathBuf>,
    /// Outputs produced by running a transform.
    pub transformed: usize,
    /// Outputs served from the content cache.
    pub cache_hits: usize,
    /// Sources intentionally not processed (partials, filtered extensions).
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
}

impl TaskReport {
    pub fn new(task: TaskKind) -> Self {
        Self {
            task,
            written: Vec::new(),
            transformed: 0,
            cache_hits: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn fail(&mut self, path: &Path, message: impl Into<String>) {
        let message = message.into();
        warn!(task = %self.task, path = %path.display(), error = %message, "file failed");
        self.failures.push(FileFailure {
            path: path.to_path_buf(),
            message,
        });
    }

    pub fn log_summary(&self) {
        info!(
            task = %self.task,
            written = self.written.len(),
            transformed = self.transformed,
            cache_hits = self.cache_hits,
            skipped = self.skipped,
            failed = self.failures.len(),
            "task finished"
        );
    }
}

/// Everything a task needs to run: config, filesystem, cache and bundler.
///
/// Cheap to clone; all members are shared.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    fs: Arc<dyn FileSystem>,
    cache: Arc<ContentCache>,
    bundler: Arc<dyn Bundler>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.config.root())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        config: Arc<PipelineConfig>,
        fs: Arc<dyn FileSystem>,
        cache: Arc<ContentCache>,
        bundler: Arc<dyn Bundler>,
    ) -> Self {
        Self {
            config,
            fs,
            cache,
            bundler,
        }
    }

    /// Production wiring: real filesystem, configured cache, command bundler.
    pub fn from_config(config: PipelineConfig) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let cache = ContentCache::for_mode(config.cache.storage, config.root(), Arc::clone(&fs));
        let bundler = CommandBundler::new(config.script.bundler.clone());
        Self::new(Arc::new(config), fs, Arc::new(cache), Arc::new(bundler))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn bundler(&self) -> &dyn Bundler {
        self.bundler.as_ref()
    }

    pub fn definition(&self, kind: TaskKind) -> Result<TaskDefinition> {
        self.config
            .task(kind)
            .cloned()
            .ok_or_else(|| PipelineError::ConfigError(format!("no definition for task '{kind}'")))
    }

    /// Absolute output directory of a task.
    pub fn output_dir(&self, def: &TaskDefinition) -> PathBuf {
        self.config.resolve(&def.output_dir)
    }

    /// Run one task to completion.
    ///
    /// Transform-heavy tasks run on the blocking pool; the script task awaits
    /// the bundler process first.
    pub async fn run(&self, kind: TaskKind) -> Result<TaskReport> {
        let def = self.definition(kind)?;
        match kind {
            TaskKind::Js => script::run_script_task(self, &def).await,
            TaskKind::Css => self.run_blocking(def, style::run_style_task).await,
            TaskKind::Images => self.run_blocking(def, image::run_optimize_task).await,
            TaskKind::Webp | TaskKind::Avif => {
                self.run_blocking(def, variant::run_variant_task).await
            }
        }
    }

    async fn run_blocking(
        &self,
        def: TaskDefinition,
        task: fn(&Pipeline, &TaskDefinition) -> Result<TaskReport>,
    ) -> Result<TaskReport> {
        let pipeline = self.clone();
        let kind = def.kind;
        tokio::task::spawn_blocking(move || task(&pipeline, &def))
            .await
            .map_err(|e| PipelineError::Other(anyhow::anyhow!("task '{kind}' panicked: {e}")))?
    }
}

/// Output path for a source: `relative` below `out_dir`, with the extension
/// replaced when `ext` is given.
pub fn output_path(out_dir: &Path, relative: &Path, ext: Option<&str>) -> PathBuf {
    let target = out_dir.join(relative);
    match ext {
        Some(ext) => target.with_extension(ext),
        None => target,
    }
}
