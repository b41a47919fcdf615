// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod tasks;
pub mod types;
pub mod watch;

use std::future::Future;
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{resolve_config, PipelineConfig};
use crate::engine::{
    run_tasks_concurrently, CoreRuntime, OneShotSummary, Runtime, RuntimeEvent, RuntimeOptions,
    TaskKind,
};
use crate::exec::PipelineExecutor;
use crate::tasks::Pipeline;
use crate::watch::build_bindings_from_config;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and startup validation
/// - the one-shot concurrent run of the requested tasks
/// - (for `dev`) file watcher, runtime and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(args.config.as_deref())?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let pipeline = Arc::new(Pipeline::from_config(cfg));
    let tasks = args.command.tasks();
    info!(?tasks, "running tasks");

    if args.command.watches() {
        dev_session(pipeline, &tasks, ctrl_c()).await?;
        return Ok(());
    }

    let summary = run_tasks_concurrently(pipeline, &tasks).await;
    print_summary(&summary);

    if !summary.is_clean() {
        bail!(
            "{} task(s) failed, {} file(s) could not be processed",
            summary.failed_tasks().len(),
            summary.file_failures()
        );
    }
    Ok(())
}

/// The `dev` composite: run `tasks` once, concurrently, then watch sources
/// until `shutdown` resolves.
///
/// The watcher is created only after every one-shot task has reported, so
/// changes made during the initial run never trigger a watch-mode run.
pub async fn dev_session<S>(
    pipeline: Arc<Pipeline>,
    tasks: &[TaskKind],
    shutdown: S,
) -> Result<OneShotSummary>
where
    S: Future<Output = ()> + Send + 'static,
{
    let summary = run_tasks_concurrently(Arc::clone(&pipeline), tasks).await;
    print_summary(&summary);

    watch(pipeline, shutdown).await?;
    Ok(summary)
}

/// Watch sources and re-run bound tasks until `shutdown` resolves.
pub async fn watch<S>(pipeline: Arc<Pipeline>, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let bindings = build_bindings_from_config(pipeline.config())?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = PipelineExecutor::new(Arc::clone(&pipeline), rt_tx.clone());
    let _watcher_handle =
        crate::watch::spawn_watcher(pipeline.config().root(), bindings, rt_tx.clone())?;

    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            shutdown.await;
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    println!("[assetpipe] watching for changes (Ctrl+C to stop)");

    let core = CoreRuntime::new(RuntimeOptions::default());
    let runtime = Runtime::new(core, rt_rx, executor);
    runtime.run().await?;
    Ok(())
}

/// Resolves on Ctrl-C. If the signal cannot be installed it never resolves
/// and the process is stopped the hard way.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

fn print_summary(summary: &OneShotSummary) {
    for result in &summary.results {
        match &result.report {
            Ok(report) if report.is_clean() => println!(
                "[assetpipe] {:<6} ok      {} written, {} cached",
                result.task.name(),
                report.written.len(),
                report.cache_hits
            ),
            Ok(report) => println!(
                "[assetpipe] {:<6} partial {} written, {} failed",
                result.task.name(),
                report.written.len(),
                report.failures.len()
            ),
            Err(err) => println!("[assetpipe] {:<6} FAILED  {err}", result.task.name()),
        }
    }
}

/// Dry-run output: paths, task definitions and watch bindings.
fn print_dry_run(cfg: &PipelineConfig) {
    println!("assetpipe dry-run");
    println!("  root = {}", cfg.root().display());
    println!("  cache.storage = {:?}", cfg.cache.storage);
    println!();

    println!("tasks ({}):", cfg.tasks().len());
    for task in cfg.tasks() {
        println!("  - {}", task.kind);
        println!("      input: {} ({})", task.input, cfg.paths.glob(task.input));
        if let Some(ref exts) = task.include_extensions {
            println!("      only: {:?}", exts);
        }
        if !task.exclude_extensions.is_empty() {
            println!("      skip: {:?}", task.exclude_extensions);
        }
        let stages: Vec<String> = task.stages.iter().map(|s| s.to_string()).collect();
        println!("      stages: {}", stages.join(" -> "));
        println!("      output: {}", task.output_dir.display());
    }
    println!();

    println!("watch:");
    for (class, tasks) in cfg.bindings() {
        let names: Vec<&str> = tasks.iter().map(|t| t.name()).collect();
        println!("  {} -> {}", cfg.paths.glob(class), names.join(", "));
    }

    debug!("dry-run complete (no execution)");
}
