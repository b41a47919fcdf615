// src/engine/oneshot.rs

//! One-shot composite run: start every requested task at once and wait for
//! all of them.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::engine::{TaskKind, TaskOutcome};
use crate::tasks::{Pipeline, TaskReport};

/// Result of one task within a composite run.
#[derive(Debug)]
pub struct TaskResult {
    pub task: TaskKind,
    /// The report, or the task-level error message.
    pub report: std::result::Result<TaskReport, String>,
}

impl TaskResult {
    pub fn outcome(&self) -> TaskOutcome {
        match &self.report {
            Ok(_) => TaskOutcome::Success,
            Err(_) => TaskOutcome::Failed,
        }
    }
}

/// Results of a composite run, in [`TaskKind`] order.
#[derive(Debug, Default)]
pub struct OneShotSummary {
    pub results: Vec<TaskResult>,
}

impl OneShotSummary {
    pub fn get(&self, task: TaskKind) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.task == task)
    }

    /// Tasks that failed outright.
    pub fn failed_tasks(&self) -> Vec<TaskKind> {
        self.results
            .iter()
            .filter(|r| r.outcome() == TaskOutcome::Failed)
            .map(|r| r.task)
            .collect()
    }

    /// Total number of files any task could not process.
    pub fn file_failures(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.report.as_ref().ok())
            .map(|r| r.failures.len())
            .sum()
    }

    /// True if every task ran and every file was processed.
    pub fn is_clean(&self) -> bool {
        self.failed_tasks().is_empty() && self.file_failures() == 0
    }
}

/// Run `tasks` concurrently until every one of them has finished.
///
/// A failing task never cancels its siblings; its error is captured in the
/// summary.
pub async fn run_tasks_concurrently(pipeline: Arc<Pipeline>, tasks: &[TaskKind]) -> OneShotSummary {
    let mut set = JoinSet::new();
    for &task in tasks {
        let pipeline = Arc::clone(&pipeline);
        set.spawn(async move {
            let report = pipeline.run(task).await.map_err(|e| e.to_string());
            TaskResult { task, report }
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => {
                match &result.report {
                    Ok(report) => report.log_summary(),
                    Err(err) => error!(task = %result.task, error = %err, "task failed"),
                }
                results.push(result);
            }
            Err(err) => error!(error = %err, "task join error"),
        }
    }

    results.sort_by_key(|r| r.task);
    info!(
        tasks = results.len(),
        failed = results.iter().filter(|r| r.outcome() == TaskOutcome::Failed).count(),
        "one-shot run complete"
    );
    OneShotSummary { results }
}
