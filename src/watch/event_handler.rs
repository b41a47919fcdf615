// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TaskKind, TriggerReason};
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchBinding;

/// Whether a notify event can change file contents.
///
/// Access events are dropped: the tasks themselves read sources, and
/// reacting to those reads would re-trigger them forever.
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

/// Tasks bound to a path (relative to the project root), without duplicates,
/// in binding order.
pub fn tasks_for_path(rel_path: &str, bindings: &[WatchBinding]) -> Vec<TaskKind> {
    let mut tasks = Vec::new();
    for binding in bindings.iter().filter(|b| b.matches(rel_path)) {
        for task in binding.tasks() {
            if !tasks.contains(task) {
                tasks.push(*task);
            }
        }
    }
    tasks
}

/// Process a single changed path and trigger every bound task.
///
/// Returns false once the runtime channel is closed, so the caller can stop.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    bindings: &[WatchBinding],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let rel_str = match relative_str(root, path) {
        Some(s) => s,
        None => {
            warn!(
                "could not relativize path {:?} against root {:?}",
                path, root
            );
            return true;
        }
    };

    let tasks = tasks_for_path(&rel_str, bindings);
    if tasks.is_empty() {
        return true;
    }

    debug!(path = %rel_str, ?tasks, "watch match -> triggering tasks");

    for task in tasks {
        if let Err(err) = runtime_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::FileWatch,
            })
            .await
        {
            warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
            return false;
        }
    }

    true
}
