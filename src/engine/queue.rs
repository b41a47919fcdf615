// src/engine/queue.rs

use std::collections::BTreeMap;

use crate::engine::TaskKind;

/// Watch-mode state of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSlot {
    #[default]
    Idle,
    Running,
    /// Running, and at least one trigger arrived since the run started.
    RunningWithPending,
}

/// Per-task trigger bookkeeping.
///
/// Runs of the same task are serialized: a trigger for a running task is
/// remembered, and any number of such triggers collapse into exactly one
/// follow-up run. Different tasks are independent of each other.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    slots: BTreeMap<TaskKind, TaskSlot>,
    coalesced: u64,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, task: TaskKind) -> TaskSlot {
        self.slots.get(&task).copied().unwrap_or_default()
    }

    /// Record a trigger. Returns true if the task should be dispatched now.
    pub fn record_trigger(&mut self, task: TaskKind) -> bool {
        let slot = self.slots.entry(task).or_default();
        match *slot {
            TaskSlot::Idle => {
                *slot = TaskSlot::Running;
                true
            }
            TaskSlot::Running => {
                *slot = TaskSlot::RunningWithPending;
                false
            }
            TaskSlot::RunningWithPending => {
                self.coalesced += 1;
                false
            }
        }
    }

    /// Record a completion. Returns true if a follow-up run must start now.
    pub fn record_completion(&mut self, task: TaskKind) -> bool {
        let slot = self.slots.entry(task).or_default();
        match *slot {
            TaskSlot::RunningWithPending => {
                *slot = TaskSlot::Running;
                true
            }
            TaskSlot::Running | TaskSlot::Idle => {
                *slot = TaskSlot::Idle;
                false
            }
        }
    }

    /// True if no task is running and nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.slots.values().all(|s| *s == TaskSlot::Idle)
    }

    /// Tasks currently running (with or without a pending follow-up).
    pub fn running(&self) -> Vec<TaskKind> {
        self.slots
            .iter()
            .filter(|(_, s)| **s != TaskSlot::Idle)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Number of triggers absorbed into an already pending follow-up run.
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}
