// src/tasks/style.rs

//! Style task: compile → autoprefix → write CSS and source map.
//!
//! grass emits no source map, so `<name>.css.map` maps the prefixed output
//! back to the compiled intermediate CSS, which is embedded in the map under
//! the name `<name>.css`. SCSS line numbers are not recoverable from it.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;
use tracing::{debug, error};

use crate::config::{Stage, TaskDefinition};
use crate::errors::{PipelineError, Result};
use crate::tasks::{output_path, Pipeline, TaskReport};
use crate::watch::patterns::collect_sources;

/// Compiled stylesheet ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStyle {
    pub css: String,
    pub map: String,
}

/// Browser versions vendor prefixes are generated for.
///
/// Versions are encoded as `major << 16 | minor << 8 | patch`.
pub fn browser_targets() -> Targets {
    let v = |major: u32| major << 16;
    Targets {
        browsers: Some(Browsers {
            android: Some(v(90)),
            chrome: Some(v(90)),
            edge: Some(v(90)),
            firefox: Some(v(78)),
            ios_saf: Some(v(13)),
            opera: Some(v(76)),
            safari: Some(v(13)),
            samsung: Some(v(14)),
            ..Browsers::default()
        }),
        ..Targets::default()
    }
}

/// Partials (`_name.scss`) are only compiled through imports.
pub fn is_partial(file_name: &str) -> bool {
    file_name.starts_with('_')
}

pub fn run_style_task(pipeline: &Pipeline, def: &TaskDefinition) -> Result<TaskReport> {
    let mut report = TaskReport::new(def.kind);
    let root = pipeline.config().root();
    let out_dir = pipeline.output_dir(def);
    let prefix = def.has_stage(&Stage::Autoprefix);

    let sources = collect_sources(pipeline.fs(), root, pipeline.config().paths.glob(def.input))?;
    debug!(count = sources.len(), "style sources");

    for source in sources {
        if is_partial(source.file_name()) || !def.accepts_extension(source.extension().as_deref()) {
            report.skipped += 1;
            continue;
        }

        let css_path = output_path(&out_dir, &source.relative, Some("css"));
        let map_path = css_path.with_extension("css.map");

        let compiled = pipeline
            .fs()
            .read_to_string(&source.path)
            .map_err(PipelineError::from)
            .and_then(|text| compile_stylesheet(&text, &source.path, &source.relative, prefix));

        let compiled = match compiled {
            Ok(c) => c,
            Err(err) => {
                error!(path = %source.path.display(), error = %err, "style compile failed");
                report.fail(&source.path, err.to_string());
                continue;
            }
        };

        let map_name = map_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let css = format!("{}\n/*# sourceMappingURL={map_name} */\n", compiled.css.trim_end());

        if let Err(err) = pipeline
            .fs()
            .write(&css_path, css.as_bytes())
            .and_then(|_| pipeline.fs().write(&map_path, compiled.map.as_bytes()))
        {
            report.fail(&source.path, format!("{err:#}"));
            continue;
        }

        report.transformed += 1;
        report.written.push(css_path);
        report.written.push(map_path);
    }

    Ok(report)
}

/// Compile one style source and apply vendor prefixes.
///
/// `path` locates relative imports; `relative` names the intermediate CSS in
/// the map.
pub fn compile_stylesheet(
    source: &str,
    path: &Path,
    relative: &Path,
    prefix: bool,
) -> Result<CompiledStyle> {
    let css = compile_scss(source, path)?;
    let name = relative
        .with_extension("css")
        .to_string_lossy()
        .replace('\\', "/");
    postprocess_css(&css, &name, prefix).map_err(|message| PipelineError::StyleError {
        path: path.to_path_buf(),
        message,
    })
}

fn compile_scss(source: &str, path: &Path) -> Result<String> {
    let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }

    grass::from_string(source.to_string(), &options).map_err(|e| PipelineError::StyleError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Re-print compiled CSS with prefixes for [`browser_targets`] and a source
/// map. Formatting stays expanded.
///
/// lightningcss inserts vendor prefixes in its `minify` pass; the printer
/// only lowers syntax for the targets. That pass also merges adjacent
/// identical rules and folds longhands into shorthands.
fn postprocess_css(css: &str, name: &str, prefix: bool) -> std::result::Result<CompiledStyle, String> {
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: name.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    if prefix {
        stylesheet
            .minify(MinifyOptions {
                targets: browser_targets(),
                ..MinifyOptions::default()
            })
            .map_err(|e| e.to_string())?;
    }

    let mut source_map = SourceMap::new("/");
    source_map.add_source(name);
    if let Err(e) = source_map.set_source_content(0, css) {
        debug!(error = ?e, "could not embed source content in map");
    }

    let printed = stylesheet
        .to_css(PrinterOptions {
            targets: if prefix { browser_targets() } else { Targets::default() },
            source_map: Some(&mut source_map),
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map = source_map.to_json(None).map_err(|e| format!("{e:?}"))?;

    Ok(CompiledStyle {
        css: printed.code,
        map,
    })
}
