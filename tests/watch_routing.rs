// tests/watch_routing.rs

use std::path::{Path, PathBuf};

use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind};
use notify::EventKind;
use tokio::sync::mpsc;

use assetpipe::config::PathClass;
use assetpipe::engine::{RuntimeEvent, TaskKind, TriggerReason};
use assetpipe::fs::mock::MockFileSystem;
use assetpipe::watch::event_handler::{is_relevant, process_file_change, tasks_for_path};
use assetpipe::watch::path_utils::relative_str;
use assetpipe::watch::{build_bindings_from_config, collect_sources, glob_base};
use assetpipe_test_utils::builders::ConfigBuilder;

#[test]
fn glob_base_is_the_literal_prefix() {
    assert_eq!(glob_base("src/img/**/*"), PathBuf::from("src/img"));
    assert_eq!(glob_base("src/scss/**/*.scss"), PathBuf::from("src/scss"));
    assert_eq!(glob_base("./assets/*.png"), PathBuf::from("assets"));
    assert_eq!(glob_base("src/js/app.js"), PathBuf::from("src/js"));
    assert_eq!(glob_base("**/*.js"), PathBuf::new());
}

#[test]
fn bindings_follow_task_inputs() {
    let cfg = ConfigBuilder::new().build("/proj");
    let bindings = build_bindings_from_config(&cfg).unwrap();

    let by_class: Vec<(PathClass, Vec<TaskKind>)> = bindings
        .iter()
        .map(|b| (b.class(), b.tasks().to_vec()))
        .collect();

    assert_eq!(
        by_class,
        vec![
            (PathClass::Styles, vec![TaskKind::Css]),
            (PathClass::Scripts, vec![TaskKind::Js]),
            (
                PathClass::Images,
                vec![TaskKind::Images, TaskKind::Webp, TaskKind::Avif]
            ),
        ]
    );
}

#[test]
fn changed_paths_route_to_bound_tasks() {
    let cfg = ConfigBuilder::new().build("/proj");
    let bindings = build_bindings_from_config(&cfg).unwrap();

    assert_eq!(
        tasks_for_path("src/img/icons/logo.png", &bindings),
        vec![TaskKind::Images, TaskKind::Webp, TaskKind::Avif]
    );
    assert_eq!(tasks_for_path("src/js/lib/util.js", &bindings), vec![TaskKind::Js]);
    // Partials are never compiled alone but still re-run the style task.
    assert_eq!(tasks_for_path("src/scss/_vars.scss", &bindings), vec![TaskKind::Css]);

    assert!(tasks_for_path("public/build/css/app.css", &bindings).is_empty());
    assert!(tasks_for_path("src/scss/notes.md", &bindings).is_empty());
}

#[test]
fn access_events_are_ignored() {
    assert!(!is_relevant(&EventKind::Access(AccessKind::Any)));
    assert!(is_relevant(&EventKind::Create(CreateKind::File)));
    assert!(is_relevant(&EventKind::Modify(ModifyKind::Data(
        DataChange::Content
    ))));
}

#[test]
fn relative_str_uses_forward_slashes() {
    let root = Path::new("/proj");
    assert_eq!(
        relative_str(root, Path::new("/proj/src/scss/app.scss")).as_deref(),
        Some("src/scss/app.scss")
    );
}

#[test]
fn collect_sources_walks_below_the_glob_base() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/src/scss/app.scss", "a {}");
    fs.add_file("/proj/src/scss/parts/_grid.scss", "b {}");
    fs.add_file("/proj/src/scss/README.md", "# styles");
    fs.add_file("/proj/src/js/app.js", "1");

    let sources = collect_sources(&fs, Path::new("/proj"), "src/scss/**/*.scss").unwrap();

    let relative: Vec<&Path> = sources.iter().map(|s| s.relative.as_path()).collect();
    assert_eq!(
        relative,
        vec![Path::new("app.scss"), Path::new("parts/_grid.scss")]
    );
    assert_eq!(sources[1].file_name(), "_grid.scss");
    assert_eq!(sources[0].extension().as_deref(), Some("scss"));
}

#[test]
fn collect_sources_on_missing_base_is_empty() {
    let fs = MockFileSystem::new();
    let sources = collect_sources(&fs, Path::new("/proj"), "src/img/**/*").unwrap();
    assert!(sources.is_empty());
}

#[tokio::test]
async fn file_change_emits_a_trigger_per_bound_task() {
    let cfg = ConfigBuilder::new().build("/proj");
    let bindings = build_bindings_from_config(&cfg).unwrap();
    let (tx, mut rx) = mpsc::channel(16);

    let keep_going = process_file_change(
        Path::new("/proj"),
        Path::new("/proj/src/img/hero.jpg"),
        &bindings,
        &tx,
    )
    .await;
    assert!(keep_going);
    drop(tx);

    let mut triggered = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                assert_eq!(reason, TriggerReason::FileWatch);
                triggered.push(task);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(triggered, vec![TaskKind::Images, TaskKind::Webp, TaskKind::Avif]);
}
