// src/config/model.rs

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::TaskKind;
use crate::types::{CacheStorageMode, VariantFormat};

/// PNG optimization preset handed to the optimizer (0..=6).
pub const OPTIMIZATION_LEVEL: u8 = 3;

/// Quality used by the WebP and AVIF encoders.
pub const VARIANT_QUALITY: f32 = 50.0;

/// Quality used when re-encoding JPEG during optimization.
pub const JPEG_QUALITY: u8 = 75;

/// Suffix inserted before the extension of the minified script.
pub const MIN_SUFFIX: &str = ".min";

/// Source extensions the WebP/AVIF tasks accept.
pub const VARIANT_SOURCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// scss = "src/scss/**/*.scss"
///
/// [output]
/// css = "public/build/css"
///
/// [script]
/// entry = "src/js/app.js"
///
/// [cache]
/// storage = "file"
/// ```
///
/// All sections are optional and default to the conventional layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathSet,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub script: ScriptSection,

    #[serde(default)]
    pub cache: CacheSection,
}

/// `[paths]`: one glob per asset class, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathSet {
    #[serde(default = "default_scss_glob")]
    pub scss: String,

    #[serde(default = "default_js_glob")]
    pub js: String,

    #[serde(default = "default_images_glob")]
    pub images: String,
}

fn default_scss_glob() -> String {
    "src/scss/**/*.scss".to_string()
}

fn default_js_glob() -> String {
    "src/js/**/*.js".to_string()
}

fn default_images_glob() -> String {
    "src/img/**/*".to_string()
}

impl Default for PathSet {
    fn default() -> Self {
        Self {
            scss: default_scss_glob(),
            js: default_js_glob(),
            images: default_images_glob(),
        }
    }
}

impl PathSet {
    pub fn glob(&self, class: PathClass) -> &str {
        match class {
            PathClass::Styles => &self.scss,
            PathClass::Scripts => &self.js,
            PathClass::Images => &self.images,
        }
    }
}

/// Logical asset class, i.e. one member of the [`PathSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathClass {
    Styles,
    Scripts,
    Images,
}

impl PathClass {
    pub const ALL: [PathClass; 3] = [PathClass::Styles, PathClass::Scripts, PathClass::Images];
}

impl fmt::Display for PathClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PathClass::Styles => "scss",
            PathClass::Scripts => "js",
            PathClass::Images => "images",
        };
        f.write_str(s)
    }
}

/// `[output]`: per-asset-class output directories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_css_out")]
    pub css: PathBuf,

    #[serde(default = "default_js_out")]
    pub js: PathBuf,

    #[serde(default = "default_images_out")]
    pub images: PathBuf,
}

fn default_css_out() -> PathBuf {
    PathBuf::from("public/build/css")
}

fn default_js_out() -> PathBuf {
    PathBuf::from("public/build/js")
}

fn default_images_out() -> PathBuf {
    PathBuf::from("public/build/img")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            css: default_css_out(),
            js: default_js_out(),
            images: default_images_out(),
        }
    }
}

/// `[script]`: the fixed bundler entry and the bundler command.
///
/// `bundler` is run through the platform shell; `{entry}` is replaced with
/// the absolute entry path and the bundle is read from stdout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptSection {
    #[serde(default = "default_entry")]
    pub entry: PathBuf,

    #[serde(default = "default_bundler")]
    pub bundler: String,
}

fn default_entry() -> PathBuf {
    PathBuf::from("src/js/app.js")
}

fn default_bundler() -> String {
    "npx --yes esbuild {entry} --bundle --target=es2015 --format=iife".to_string()
}

impl Default for ScriptSection {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            bundler: default_bundler(),
        }
    }
}

/// `[cache]`: image optimization cache storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    #[serde(default)]
    pub storage: CacheStorageMode,
}

/// One transform stage of a task, in pipeline order.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Style-language compile, expanded output.
    Compile,
    Autoprefix,
    Bundle { entry: PathBuf },
    Minify,
    Rename { suffix: String },
    SourceMap,
    Cache,
    Optimize { level: u8 },
    Encode { format: VariantFormat, quality: f32 },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compile => f.write_str("compile(expanded)"),
            Stage::Autoprefix => f.write_str("autoprefix"),
            Stage::Bundle { entry } => write!(f, "bundle(entry={})", entry.display()),
            Stage::Minify => f.write_str("minify"),
            Stage::Rename { suffix } => write!(f, "rename(suffix={suffix})"),
            Stage::SourceMap => f.write_str("sourcemap"),
            Stage::Cache => f.write_str("cache"),
            Stage::Optimize { level } => write!(f, "optimize(level={level})"),
            Stage::Encode { format, quality } => {
                write!(f, "encode(format={}, quality={quality})", format.extension())
            }
        }
    }
}

/// Which file extensions a task writes into its output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputExtensions {
    /// Outputs keep the input extension; inputs with these extensions are skipped.
    SameAsInput { excluding: Vec<String> },
    /// Outputs always carry one of these extensions.
    Fixed(Vec<String>),
}

/// A named task: input glob, optional extension filters, stages and output.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    pub kind: TaskKind,
    pub input: PathClass,
    /// If set, only inputs with one of these extensions are processed.
    pub include_extensions: Option<Vec<String>>,
    /// Inputs with these extensions are ignored.
    pub exclude_extensions: Vec<String>,
    pub stages: Vec<Stage>,
    /// Output directory, relative to the project root.
    pub output_dir: PathBuf,
}

impl TaskDefinition {
    /// Whether a source file with this extension belongs to the task.
    pub fn accepts_extension(&self, ext: Option<&str>) -> bool {
        let ext = ext.map(|e| e.to_ascii_lowercase());
        if let Some(ref e) = ext {
            if self.exclude_extensions.iter().any(|x| x == e) {
                return false;
            }
        }
        match (&self.include_extensions, ext) {
            (None, _) => true,
            (Some(list), Some(e)) => list.iter().any(|x| *x == e),
            (Some(_), None) => false,
        }
    }

    pub fn optimization_level(&self) -> Option<u8> {
        self.stages.iter().find_map(|s| match s {
            Stage::Optimize { level } => Some(*level),
            _ => None,
        })
    }

    pub fn encoding(&self) -> Option<(VariantFormat, f32)> {
        self.stages.iter().find_map(|s| match s {
            Stage::Encode { format, quality } => Some((*format, *quality)),
            _ => None,
        })
    }

    pub fn rename_suffix(&self) -> Option<&str> {
        self.stages.iter().find_map(|s| match s {
            Stage::Rename { suffix } => Some(suffix.as_str()),
            _ => None,
        })
    }

    pub fn has_stage(&self, stage: &Stage) -> bool {
        self.stages.contains(stage)
    }

    pub fn output_extensions(&self) -> OutputExtensions {
        match self.kind {
            TaskKind::Css => OutputExtensions::Fixed(vec!["css".into(), "map".into()]),
            TaskKind::Js => OutputExtensions::Fixed(vec!["js".into(), "map".into()]),
            TaskKind::Images => OutputExtensions::SameAsInput {
                excluding: self.exclude_extensions.clone(),
            },
            TaskKind::Webp | TaskKind::Avif => {
                let ext = self
                    .encoding()
                    .map(|(format, _)| format.extension().to_string())
                    .unwrap_or_default();
                OutputExtensions::Fixed(vec![ext])
            }
        }
    }
}

/// Validated configuration for a project.
///
/// Construct through [`PipelineConfig::from_raw`] (or the loader), which
/// derives the task definitions and checks the output layout.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    root: PathBuf,
    pub paths: PathSet,
    pub output: OutputSection,
    pub script: ScriptSection,
    pub cache: CacheSection,
    tasks: Vec<TaskDefinition>,
}

impl PipelineConfig {
    /// Internal constructor used by validation after checks pass.
    pub(crate) fn new_unchecked(
        root: PathBuf,
        raw: RawConfigFile,
        tasks: Vec<TaskDefinition>,
    ) -> Self {
        Self {
            root,
            paths: raw.paths,
            output: raw.output,
            script: raw.script,
            cache: raw.cache,
            tasks,
        }
    }

    /// Project root all relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path.
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }

    pub fn task(&self, kind: TaskKind) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.kind == kind)
    }

    /// Watch bindings: each path class with the tasks it re-runs.
    pub fn bindings(&self) -> Vec<(PathClass, Vec<TaskKind>)> {
        PathClass::ALL
            .iter()
            .map(|class| {
                let kinds = self
                    .tasks
                    .iter()
                    .filter(|t| t.input == *class)
                    .map(|t| t.kind)
                    .collect();
                (*class, kinds)
            })
            .collect()
    }
}

/// Build the five task definitions for a raw config.
pub fn derive_task_definitions(raw: &RawConfigFile) -> Vec<TaskDefinition> {
    let variant_exts: Vec<String> = [VariantFormat::Webp, VariantFormat::Avif]
        .iter()
        .map(|f| f.extension().to_string())
        .collect();
    let variant_sources: Vec<String> = VARIANT_SOURCE_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect();

    let variant = |kind: TaskKind, format: VariantFormat| TaskDefinition {
        kind,
        input: PathClass::Images,
        include_extensions: Some(variant_sources.clone()),
        exclude_extensions: Vec::new(),
        stages: vec![Stage::Encode {
            format,
            quality: VARIANT_QUALITY,
        }],
        output_dir: raw.output.images.clone(),
    };

    vec![
        TaskDefinition {
            kind: TaskKind::Css,
            input: PathClass::Styles,
            include_extensions: None,
            exclude_extensions: Vec::new(),
            stages: vec![
                Stage::SourceMap,
                Stage::Compile,
                Stage::Autoprefix,
            ],
            output_dir: raw.output.css.clone(),
        },
        TaskDefinition {
            kind: TaskKind::Images,
            input: PathClass::Images,
            include_extensions: None,
            exclude_extensions: variant_exts,
            stages: vec![
                Stage::Cache,
                Stage::Optimize {
                    level: OPTIMIZATION_LEVEL,
                },
            ],
            output_dir: raw.output.images.clone(),
        },
        variant(TaskKind::Webp, VariantFormat::Webp),
        variant(TaskKind::Avif, VariantFormat::Avif),
        TaskDefinition {
            kind: TaskKind::Js,
            input: PathClass::Scripts,
            include_extensions: None,
            exclude_extensions: Vec::new(),
            stages: vec![
                Stage::Bundle {
                    entry: raw.script.entry.clone(),
                },
                Stage::SourceMap,
                Stage::Minify,
                Stage::Rename {
                    suffix: MIN_SUFFIX.to_string(),
                },
            ],
            output_dir: raw.output.js.clone(),
        },
    ]
}
