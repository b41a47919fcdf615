// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

use crate::config::{PathClass, PipelineConfig};
use crate::engine::TaskKind;
use crate::fs::FileSystem;
use crate::watch::path_utils::to_slash;

/// Characters that make a path segment a glob rather than a literal.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Literal directory prefix of a glob, e.g. `src/img` for `src/img/**/*`.
///
/// Outputs keep the directory structure below this base, and source
/// discovery only walks below it. A pattern without glob characters is a
/// single file; its base is the parent directory.
pub fn glob_base(pattern: &str) -> PathBuf {
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal = segments
        .iter()
        .take_while(|s| !s.contains(GLOB_META))
        .count();

    let take = if literal == segments.len() {
        literal.saturating_sub(1)
    } else {
        literal
    };

    segments[..take]
        .iter()
        .filter(|s| !s.is_empty() && **s != ".")
        .collect()
}

/// Compile a glob with `*` confined to one path segment.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// A source file found under a glob.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path as returned by the filesystem (root-joined).
    pub path: PathBuf,
    /// Path relative to the glob base; output paths are derived from it.
    pub relative: PathBuf,
}

impl SourceFile {
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Collect all files under `root` matching `pattern`, sorted by path.
pub fn collect_sources(fs: &dyn FileSystem, root: &Path, pattern: &str) -> Result<Vec<SourceFile>> {
    let matcher = compile_glob(pattern)?;
    let base = glob_base(pattern);
    let start = root.join(&base);

    let mut files = Vec::new();
    if !fs.is_dir(&start) {
        return Ok(files);
    }

    let mut stack = vec![start.clone()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                let Some(rel) = path.strip_prefix(root).ok().map(to_slash) else {
                    continue;
                };
                if matcher.is_match(&rel) {
                    let relative = path
                        .strip_prefix(&start)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));
                    files.push(SourceFile { path, relative });
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Compiled watch binding: one path class and the tasks it re-runs.
#[derive(Clone)]
pub struct WatchBinding {
    class: PathClass,
    pattern: String,
    matcher: GlobMatcher,
    tasks: Vec<TaskKind>,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("class", &self.class)
            .field("pattern", &self.pattern)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new(class: PathClass, pattern: &str, tasks: Vec<TaskKind>) -> Result<Self> {
        Ok(Self {
            class,
            pattern: pattern.to_string(),
            matcher: compile_glob(pattern)
                .with_context(|| format!("building watch glob for {class}"))?,
            tasks,
        })
    }

    pub fn class(&self) -> PathClass {
        self.class
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn tasks(&self) -> &[TaskKind] {
        &self.tasks
    }

    /// Returns true if the given path (relative to the project root, forward
    /// slashes) falls under this binding's glob.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

/// Build the watch bindings for a validated config.
///
/// Path classes with no bound task are left out.
pub fn build_bindings_from_config(cfg: &PipelineConfig) -> Result<Vec<WatchBinding>> {
    cfg.bindings()
        .into_iter()
        .filter(|(_, tasks)| !tasks.is_empty())
        .map(|(class, tasks)| WatchBinding::new(class, cfg.paths.glob(class), tasks))
        .collect()
}
