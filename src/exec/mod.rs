// src/exec/mod.rs

//! Task execution layer for watch mode.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `PipelineExecutor`, which tests can replace with a fake.
//! - [`task_runner`] runs one scheduled task and reports back to the
//!   runtime via `RuntimeEvent::TaskCompleted`.

pub mod backend;
pub mod task_runner;

pub use backend::{ExecutorBackend, PipelineExecutor};
