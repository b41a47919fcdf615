// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) reads events from channels
//! and hands `ScheduledTask`s to the executor. The core can be tested
//! without Tokio, channels, filesystem or encoders.

use crate::engine::event_handlers::{handle_task_completion, handle_task_trigger, CoreStep};
use crate::engine::queue::{TaskSlot, TriggerQueue};
use crate::engine::{RuntimeEvent, RuntimeOptions, TaskKind};

/// Pure core runtime state.
#[derive(Debug)]
pub struct CoreRuntime {
    queue: TriggerQueue,
    next_run_id: u64,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            queue: TriggerQueue::new(),
            next_run_id: 0,
            options,
        }
    }

    /// True if no task is running or pending.
    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    pub fn state_of(&self, task: TaskKind) -> TaskSlot {
        self.queue.state_of(task)
    }

    pub fn coalesced_count(&self) -> u64 {
        self.queue.coalesced_count()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.queue, &mut self.next_run_id, task, reason)
            }
            RuntimeEvent::TaskCompleted { task, outcome } => handle_task_completion(
                &mut self.queue,
                &mut self.next_run_id,
                &self.options,
                task,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
