// tests/runtime_fake_executor.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use assetpipe::engine::{
    CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TaskKind, TriggerReason,
};
use assetpipe_test_utils::fake_executor::FakeExecutor;
use assetpipe_test_utils::with_timeout;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn runtime_dispatches_triggered_tasks_and_exits_when_idle() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));

    let core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });
    let runtime = Runtime::new(core, rx, executor);

    for task in [TaskKind::Css, TaskKind::Images] {
        tx.send(RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::Manual,
        })
        .await?;
    }

    with_timeout(runtime.run()).await?;

    let executed = executed.lock().unwrap().clone();
    assert_eq!(executed, vec![TaskKind::Css, TaskKind::Images]);
    Ok(())
}

#[tokio::test]
async fn runtime_stops_on_shutdown() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&executed));
    let runtime = Runtime::new(CoreRuntime::new(RuntimeOptions::default()), rx, executor);

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(runtime.run()).await?;

    assert!(executed.lock().unwrap().is_empty());
    Ok(())
}
