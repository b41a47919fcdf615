// src/watch/path_utils.rs

//! Path helpers shared by source discovery and the watcher.

use std::path::Path;

/// Render a relative path with forward slashes and no leading `./`, the form
/// globs are matched against.
pub fn to_slash(rel: &Path) -> String {
    let s = rel.to_string_lossy().replace('\\', "/");
    s.trim_start_matches("./").to_string()
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Tries a direct `strip_prefix(root)` first. Watch events may carry a
/// different absolute prefix for the same directory (symlinks, macOS
/// `/private/var`), so both sides are canonicalized as a fallback; a path
/// that no longer exists (removal events) only gets the first attempt.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path
        .canonicalize()
        .ok()
        .or_else(|| {
            let parent = path.parent()?.canonicalize().ok()?;
            Some(parent.join(path.file_name()?))
        })?;

    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}
