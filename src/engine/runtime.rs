// src/engine/runtime.rs

//! Async shell around [`CoreRuntime`] for watch mode.

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::core::CoreRuntime;
use crate::engine::{CoreCommand, RuntimeEvent};
use crate::errors::Result;
use crate::exec::ExecutorBackend;

/// Feeds watch-mode events into the core and hands the runs it schedules to
/// an [`ExecutorBackend`].
///
/// The loop ends when the core stops (shutdown, or idle with
/// `exit_when_idle`) or when every sender of the event channel is gone.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    dispatched: u64,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("dispatched", &self.dispatched)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
            dispatched: 0,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "runtime event");
            let step = self.core.step(event);

            for command in step.commands {
                if let CoreCommand::DispatchTasks(tasks) = command {
                    if tasks.is_empty() {
                        continue;
                    }
                    for t in &tasks {
                        debug!(task = %t.kind, run_id = t.run_id, reason = ?t.reason, "dispatching");
                    }
                    self.dispatched += tasks.len() as u64;
                    self.executor.spawn_ready_tasks(tasks).await?;
                }
            }

            if !step.keep_running {
                break;
            }
        }

        info!(
            runs = self.dispatched,
            coalesced = self.core.coalesced_count(),
            "watch runtime stopped"
        );
        Ok(())
    }
}
