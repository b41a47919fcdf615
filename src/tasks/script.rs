// src/tasks/script.rs

//! Script task: bundle the fixed entry → minify → write `<stem>.min.js`.
//!
//! The script glob only decides when this task re-runs in watch mode; the
//! bundle always starts from the configured entry file.

use std::path::{Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use tracing::{debug, info};

use crate::config::{Stage, TaskDefinition, model::MIN_SUFFIX};
use crate::errors::{PipelineError, Result};
use crate::tasks::{Pipeline, TaskReport};

/// Minified script and its source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifiedScript {
    pub code: String,
    pub map: Option<String>,
}

/// File name of the minified output: `app.js` + `.min` → `app.min.js`.
pub fn minified_file_name(entry: &Path, suffix: &str) -> String {
    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string());
    format!("{stem}{suffix}.js")
}

/// The bundler entry of a script task definition.
pub fn entry_of(def: &TaskDefinition) -> Option<&Path> {
    def.stages.iter().find_map(|s| match s {
        Stage::Bundle { entry } => Some(entry.as_path()),
        _ => None,
    })
}

pub async fn run_script_task(pipeline: &Pipeline, def: &TaskDefinition) -> Result<TaskReport> {
    let mut report = TaskReport::new(def.kind);
    let root = pipeline.config().root();

    let entry_rel = entry_of(def)
        .ok_or_else(|| PipelineError::ConfigError("script task has no bundle stage".to_string()))?;
    let entry = pipeline.config().resolve(entry_rel);
    if !pipeline.fs().is_file(&entry) {
        return Err(PipelineError::BundleError(format!(
            "entry file {:?} does not exist",
            entry
        )));
    }

    let bundle = pipeline.bundler().bundle(&entry, root).await?;
    if bundle.trim().is_empty() {
        return Err(PipelineError::BundleError(format!(
            "bundler produced no output for {:?}",
            entry
        )));
    }
    debug!(bytes = bundle.len(), "bundle ready");

    let suffix = def.rename_suffix().unwrap_or(MIN_SUFFIX).to_string();
    let file_name = minified_file_name(entry_rel, &suffix);
    let js_path = pipeline.output_dir(def).join(&file_name);
    let map_path = PathBuf::from(format!("{}.map", js_path.display()));

    let minify = def.has_stage(&Stage::Minify);
    let name = file_name.clone();
    let minified = tokio::task::spawn_blocking(move || {
        if minify {
            minify_script(&bundle, &name)
        } else {
            Ok(MinifiedScript {
                code: bundle,
                map: None,
            })
        }
    })
    .await
    .map_err(|e| PipelineError::Other(anyhow::anyhow!("minifier panicked: {e}")))?
    .map_err(|message| PipelineError::MinifyError {
        path: entry.clone(),
        message,
    })?;

    let mut code = minified.code;
    if let Some(map) = &minified.map {
        code.push_str(&format!("\n//# sourceMappingURL={file_name}.map\n"));
        pipeline.fs().write(&map_path, map.as_bytes())?;
    }
    pipeline.fs().write(&js_path, code.as_bytes())?;

    info!(output = %js_path.display(), "script bundle written");
    report.transformed += 1;
    report.written.push(js_path);
    if minified.map.is_some() {
        report.written.push(map_path);
    }
    Ok(report)
}

/// Minify a bundled script, producing a source map named after `file_name`.
pub fn minify_script(source: &str, file_name: &str) -> std::result::Result<MinifiedScript, String> {
    let allocator = Allocator::default();
    // Bundles are classic scripts: top-level names are page globals and must
    // survive mangling and dead-code removal.
    let source_type = SourceType::default().with_script(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(err) = ret.errors.first() {
        return Err(err.to_string());
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let out = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: Some(PathBuf::from(file_name)),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    Ok(MinifiedScript {
        code: out.code,
        map: out.map.map(|m| m.to_json_string()),
    })
}
