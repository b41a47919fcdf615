// src/exec/task_runner.rs

//! Runs a single scheduled task and reports its completion.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::engine::{RuntimeEvent, ScheduledTask, TaskOutcome};
use crate::tasks::Pipeline;

/// Run one scheduled task against the pipeline and emit `TaskCompleted`.
///
/// A task error is logged here and reported as `TaskOutcome::Failed`; it
/// never propagates into the runtime loop.
pub async fn run_scheduled(
    pipeline: Arc<Pipeline>,
    task: ScheduledTask,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    info!(task = %task.kind, run_id = task.run_id, reason = ?task.reason, "starting task");

    let outcome = match pipeline.run(task.kind).await {
        Ok(report) => {
            report.log_summary();
            TaskOutcome::Success
        }
        Err(err) => {
            error!(task = %task.kind, run_id = task.run_id, error = %err, "task failed");
            TaskOutcome::Failed
        }
    };

    if let Err(err) = runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.kind,
            outcome,
        })
        .await
    {
        warn!(task = %task.kind, error = %err, "failed to send TaskCompleted to runtime");
    }
}
