// src/tasks/image.rs

//! Image optimization task, served through the content cache.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use tracing::debug;

use crate::cache::content_key;
use crate::config::model::{JPEG_QUALITY, OPTIMIZATION_LEVEL};
use crate::config::{Stage, TaskDefinition};
use crate::errors::Result;
use crate::tasks::{output_path, Pipeline, TaskReport};
use crate::watch::patterns::collect_sources;

/// How a file is treated by the optimizer, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimizer {
    Png,
    Jpeg,
    /// Copied verbatim.
    Copy,
}

impl Optimizer {
    pub fn for_extension(ext: Option<&str>) -> Self {
        match ext {
            Some("png") => Optimizer::Png,
            Some("jpg") | Some("jpeg") => Optimizer::Jpeg,
            _ => Optimizer::Copy,
        }
    }
}

pub fn run_optimize_task(pipeline: &Pipeline, def: &TaskDefinition) -> Result<TaskReport> {
    let mut report = TaskReport::new(def.kind);
    let root = pipeline.config().root();
    let out_dir = pipeline.output_dir(def);
    let level = def.optimization_level().unwrap_or(OPTIMIZATION_LEVEL);
    let cached = def.has_stage(&Stage::Cache);

    let sources = collect_sources(pipeline.fs(), root, pipeline.config().paths.glob(def.input))?;

    for source in sources {
        let ext = source.extension();
        if !def.accepts_extension(ext.as_deref()) {
            report.skipped += 1;
            continue;
        }

        let bytes = match pipeline.fs().read(&source.path) {
            Ok(b) => b,
            Err(err) => {
                report.fail(&source.path, format!("{err:#}"));
                continue;
            }
        };

        let optimizer = Optimizer::for_extension(ext.as_deref());
        let target = output_path(&out_dir, &source.relative, None);

        let output = if optimizer == Optimizer::Copy {
            Ok((bytes, false))
        } else if cached {
            let settings = format!("optimize:{optimizer:?}:level={level}:jpeg={JPEG_QUALITY}");
            let key = content_key(&bytes, &settings);
            pipeline
                .cache()
                .get_or_compute(&key, || optimize_bytes(&bytes, optimizer, level))
                .map(|lookup| (lookup.bytes.to_vec(), lookup.hit))
        } else {
            optimize_bytes(&bytes, optimizer, level).map(|b| (b, false))
        };

        let (data, hit) = match output {
            Ok(v) => v,
            Err(message) => {
                report.fail(&source.path, message);
                continue;
            }
        };

        if let Err(err) = pipeline.fs().write(&target, &data) {
            report.fail(&source.path, format!("{err:#}"));
            continue;
        }

        match (optimizer, hit) {
            (Optimizer::Copy, _) => {}
            (_, true) => report.cache_hits += 1,
            (_, false) => report.transformed += 1,
        }
        debug!(path = %target.display(), bytes = data.len(), cache_hit = hit, "image written");
        report.written.push(target);
    }

    Ok(report)
}

/// Optimize one image in memory. Never returns something larger than the
/// input.
pub fn optimize_bytes(
    bytes: &[u8],
    optimizer: Optimizer,
    level: u8,
) -> std::result::Result<Vec<u8>, String> {
    let optimized = match optimizer {
        Optimizer::Png => {
            let options = oxipng::Options::from_preset(level);
            oxipng::optimize_from_memory(bytes, &options).map_err(|e| e.to_string())?
        }
        Optimizer::Jpeg => reencode_jpeg(bytes, JPEG_QUALITY)?,
        Optimizer::Copy => return Ok(bytes.to_vec()),
    };

    if optimized.len() < bytes.len() {
        Ok(optimized)
    } else {
        Ok(bytes.to_vec())
    }
}

fn reencode_jpeg(bytes: &[u8], quality: u8) -> std::result::Result<Vec<u8>, String> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| e.to_string())?
        .to_rgb8();
    let (width, height) = img.dimensions();

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| e.to_string())?;
    Ok(out.into_inner())
}
