// tests/config_validation.rs

use std::path::Path;

use assetpipe::config::{
    load_and_validate, OutputExtensions, PathClass, PipelineConfig, RawConfigFile, Stage,
};
use assetpipe::engine::TaskKind;
use assetpipe::errors::PipelineError;
use assetpipe::types::{CacheStorageMode, VariantFormat};
use assetpipe_test_utils::builders::ConfigBuilder;

#[test]
fn defaults_produce_five_valid_tasks() {
    let cfg = ConfigBuilder::new().build("/proj");

    let kinds: Vec<TaskKind> = cfg.tasks().iter().map(|t| t.kind).collect();
    assert_eq!(kinds, TaskKind::ALL.to_vec());
    assert_eq!(cfg.root(), Path::new("/proj"));

    let webp = cfg.task(TaskKind::Webp).unwrap();
    assert_eq!(webp.input, PathClass::Images);
    assert_eq!(webp.output_dir, Path::new("public/build/img"));
    assert_eq!(webp.encoding(), Some((VariantFormat::Webp, 50.0)));

    let images = cfg.task(TaskKind::Images).unwrap();
    assert_eq!(images.optimization_level(), Some(3));
    assert!(images.has_stage(&Stage::Cache));

    let js = cfg.task(TaskKind::Js).unwrap();
    assert_eq!(js.rename_suffix(), Some(".min"));
    assert_eq!(js.output_dir, Path::new("public/build/js"));
}

#[test]
fn image_tasks_share_a_directory_with_disjoint_extensions() {
    let cfg = ConfigBuilder::new().build("/proj");
    let images = cfg.task(TaskKind::Images).unwrap();
    let avif = cfg.task(TaskKind::Avif).unwrap();

    assert_eq!(images.output_dir, avif.output_dir);
    assert_eq!(
        images.output_extensions(),
        OutputExtensions::SameAsInput {
            excluding: vec!["webp".to_string(), "avif".to_string()]
        }
    );
    assert_eq!(
        avif.output_extensions(),
        OutputExtensions::Fixed(vec!["avif".to_string()])
    );
}

#[test]
fn extension_filters_are_case_insensitive() {
    let cfg = ConfigBuilder::new().build("/proj");
    let webp = cfg.task(TaskKind::Webp).unwrap();
    let images = cfg.task(TaskKind::Images).unwrap();

    assert!(webp.accepts_extension(Some("JPG")));
    assert!(webp.accepts_extension(Some("jpeg")));
    assert!(!webp.accepts_extension(Some("gif")));
    assert!(!webp.accepts_extension(None));

    assert!(images.accepts_extension(Some("svg")));
    assert!(images.accepts_extension(None));
    assert!(!images.accepts_extension(Some("webp")));
    assert!(!images.accepts_extension(Some("AVIF")));
}

#[test]
fn shared_output_dir_with_overlapping_extensions_is_rejected() {
    let raw = ConfigBuilder::new()
        .css_out("public/build/assets")
        .images_out("public/build/assets")
        .raw();

    match PipelineConfig::from_raw("/proj", raw).unwrap_err() {
        PipelineError::ConfigError(msg) => {
            assert!(msg.contains("share output directory"), "{msg}")
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn nested_output_dirs_are_rejected() {
    let raw = ConfigBuilder::new()
        .css_out("public/build")
        .js_out("public/build/js")
        .raw();

    match PipelineConfig::from_raw("/proj", raw).unwrap_err() {
        PipelineError::ConfigError(msg) => assert!(msg.contains("overlap"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn output_inside_an_input_tree_is_rejected() {
    let raw = ConfigBuilder::new().images_out("src/img/optimized").raw();

    match PipelineConfig::from_raw("/proj", raw).unwrap_err() {
        PipelineError::ConfigError(msg) => assert!(msg.contains("inside"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn invalid_glob_is_rejected() {
    let raw = ConfigBuilder::new().scss_glob("src/[scss/*.scss").raw();

    let err = PipelineConfig::from_raw("/proj", raw).unwrap_err();
    assert!(matches!(err, PipelineError::GlobError(_)), "got {err:?}");
}

#[test]
fn partial_toml_keeps_defaults() {
    let raw: RawConfigFile = toml::from_str(
        r#"
        [paths]
        scss = "styles/**/*.scss"

        [cache]
        storage = "file"
        "#,
    )
    .unwrap();

    assert_eq!(raw.paths.scss, "styles/**/*.scss");
    assert_eq!(raw.paths.js, "src/js/**/*.js");
    assert_eq!(raw.output.css, Path::new("public/build/css"));
    assert_eq!(raw.cache.storage, CacheStorageMode::File);
}

#[test]
fn unknown_keys_are_rejected() {
    let parsed = toml::from_str::<RawConfigFile>(
        r#"
        [paths]
        sass = "src/sass/**/*.sass"
        "#,
    );
    assert!(parsed.is_err());
}

#[test]
fn config_file_directory_is_the_project_root() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("Assetpipe.toml");
    std::fs::write(
        &path,
        r#"
        [script]
        entry = "src/js/main.js"
        "#,
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.root(), tmp.path());
    assert_eq!(cfg.script.entry, Path::new("src/js/main.js"));
    assert_eq!(
        cfg.resolve("public/build/css"),
        tmp.path().join("public/build/css")
    );
}

#[test]
fn unknown_storage_mode_is_rejected() {
    let parsed = toml::from_str::<RawConfigFile>(
        r#"
        [cache]
        storage = "disk"
        "#,
    );
    assert!(parsed.is_err());
}

#[test]
fn current_dir_prefix_does_not_hide_a_shared_output_dir() {
    let raw = ConfigBuilder::new()
        .css_out("./public/build/assets")
        .images_out("public/build/assets")
        .raw();

    match PipelineConfig::from_raw("/proj", raw).unwrap_err() {
        PipelineError::ConfigError(msg) => {
            assert!(msg.contains("share output directory"), "{msg}")
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn current_dir_prefix_does_not_hide_nesting() {
    let raw = ConfigBuilder::new()
        .css_out("./public/build")
        .js_out("public/build/js")
        .raw();

    match PipelineConfig::from_raw("/proj", raw).unwrap_err() {
        PipelineError::ConfigError(msg) => assert!(msg.contains("overlap"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}
