// src/engine/mod.rs

//! Orchestration engine for assetpipe.
//!
//! This module ties together:
//! - the one-shot composite run (every requested task concurrently, each
//!   failure isolated to its task)
//! - the per-task trigger queue used in watch mode
//! - the main runtime event loop that reacts to:
//!   - file-watch triggers
//!   - task completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::fmt;

/// A named task of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Css,
    Images,
    Webp,
    Avif,
    Js,
}

impl TaskKind {
    /// Every task, in the order the composite run starts them.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Css,
        TaskKind::Images,
        TaskKind::Webp,
        TaskKind::Avif,
        TaskKind::Js,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Css => "css",
            TaskKind::Images => "images",
            TaskKind::Webp => "webp",
            TaskKind::Avif => "avif",
            TaskKind::Js => "js",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (CLI or test).
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once no task is running or pending.
    pub exit_when_idle: bool,
}

/// A task run handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    /// Monotonic per-runtime run counter, for log correlation.
    pub run_id: u64,
    pub reason: TriggerReason,
}

/// Events flowing into the runtime from watchers, executors, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be run.
    TaskTriggered {
        task: TaskKind,
        reason: TriggerReason,
    },
    /// A task run finished.
    TaskCompleted {
        task: TaskKind,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod oneshot;
pub mod queue;
pub mod runtime;

pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use oneshot::{run_tasks_concurrently, OneShotSummary};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
