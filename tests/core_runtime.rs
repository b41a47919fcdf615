// tests/core_runtime.rs

use assetpipe::engine::queue::TaskSlot;
use assetpipe::engine::{
    CoreCommand, CoreRuntime, RuntimeEvent, RuntimeOptions, ScheduledTask, TaskKind, TaskOutcome,
    TriggerReason,
};

fn trigger(task: TaskKind) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task,
        reason: TriggerReason::FileWatch,
    }
}

fn completed(task: TaskKind) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task,
        outcome: TaskOutcome::Success,
    }
}

fn dispatched(commands: &[CoreCommand]) -> Vec<ScheduledTask> {
    commands
        .iter()
        .flat_map(|c| match c {
            CoreCommand::DispatchTasks(tasks) => tasks.clone(),
            CoreCommand::RequestExit => Vec::new(),
        })
        .collect()
}

#[test]
fn idle_task_is_dispatched_immediately() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());

    let step = core.step(trigger(TaskKind::Css));
    assert!(step.keep_running);
    assert_eq!(
        dispatched(&step.commands),
        vec![ScheduledTask {
            kind: TaskKind::Css,
            run_id: 1,
            reason: TriggerReason::FileWatch,
        }]
    );
    assert_eq!(core.state_of(TaskKind::Css), TaskSlot::Running);
    assert!(!core.is_idle());
}

#[test]
fn triggers_while_running_coalesce_into_one_follow_up() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());

    core.step(trigger(TaskKind::Images));
    for _ in 0..3 {
        let step = core.step(trigger(TaskKind::Images));
        assert!(dispatched(&step.commands).is_empty());
    }
    assert_eq!(core.state_of(TaskKind::Images), TaskSlot::RunningWithPending);
    assert_eq!(core.coalesced_count(), 2);

    let step = core.step(completed(TaskKind::Images));
    let follow_up = dispatched(&step.commands);
    assert_eq!(follow_up.len(), 1);
    assert_eq!(follow_up[0].kind, TaskKind::Images);
    assert_eq!(follow_up[0].run_id, 2);
    assert_eq!(core.state_of(TaskKind::Images), TaskSlot::Running);

    let step = core.step(completed(TaskKind::Images));
    assert!(dispatched(&step.commands).is_empty());
    assert!(core.is_idle());
}

#[test]
fn different_tasks_never_wait_on_each_other() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());

    let mut kinds = Vec::new();
    for task in [TaskKind::Images, TaskKind::Webp, TaskKind::Avif] {
        let step = core.step(trigger(task));
        kinds.extend(dispatched(&step.commands).into_iter().map(|t| t.kind));
    }
    assert_eq!(kinds, vec![TaskKind::Images, TaskKind::Webp, TaskKind::Avif]);
}

#[test]
fn failed_run_still_releases_the_slot() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());

    core.step(trigger(TaskKind::Js));
    core.step(RuntimeEvent::TaskCompleted {
        task: TaskKind::Js,
        outcome: TaskOutcome::Failed,
    });
    assert_eq!(core.state_of(TaskKind::Js), TaskSlot::Idle);

    let step = core.step(trigger(TaskKind::Js));
    assert_eq!(dispatched(&step.commands).len(), 1);
}

#[test]
fn exit_when_idle_requests_exit_after_last_completion() {
    let mut core = CoreRuntime::new(RuntimeOptions {
        exit_when_idle: true,
    });

    core.step(trigger(TaskKind::Css));
    core.step(trigger(TaskKind::Js));

    let step = core.step(completed(TaskKind::Css));
    assert!(step.keep_running);

    let step = core.step(completed(TaskKind::Js));
    assert!(!step.keep_running);
    assert!(step.commands.contains(&CoreCommand::RequestExit));
}

#[test]
fn shutdown_stops_the_loop() {
    let mut core = CoreRuntime::new(RuntimeOptions::default());
    let step = core.step(RuntimeEvent::ShutdownRequested);
    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
}
