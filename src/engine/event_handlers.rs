// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::debug;

use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, ScheduledTask, TaskKind, TaskOutcome, TriggerReason};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// Request that the process exits (used when idle with `exit_when_idle`).
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a task trigger event.
///
/// - An idle task is dispatched immediately with a fresh run id.
/// - A running task gets one follow-up run queued; further triggers while
///   that follow-up is pending are absorbed.
pub fn handle_task_trigger(
    queue: &mut TriggerQueue,
    next_run_id: &mut u64,
    task: TaskKind,
    reason: TriggerReason,
) -> CoreStep {
    if queue.record_trigger(task) {
        let scheduled = schedule(next_run_id, task, reason);
        return CoreStep::continue_with(vec![CoreCommand::DispatchTasks(vec![scheduled])]);
    }

    debug!(task = %task, ?reason, "task running; follow-up run queued");
    CoreStep::continue_with(Vec::new())
}

/// Handle a task completion event.
pub fn handle_task_completion(
    queue: &mut TriggerQueue,
    next_run_id: &mut u64,
    options: &RuntimeOptions,
    task: TaskKind,
    outcome: TaskOutcome,
) -> CoreStep {
    let mut commands = Vec::new();

    debug!(task = %task, ?outcome, "task completed");

    if queue.record_completion(task) {
        let scheduled = schedule(next_run_id, task, TriggerReason::FileWatch);
        commands.push(CoreCommand::DispatchTasks(vec![scheduled]));
    }

    let mut keep_running = true;
    if options.exit_when_idle && queue.is_idle() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        keep_running,
    }
}

fn schedule(next_run_id: &mut u64, kind: TaskKind, reason: TriggerReason) -> ScheduledTask {
    *next_run_id += 1;
    ScheduledTask {
        kind,
        run_id: *next_run_id,
        reason,
    }
}
