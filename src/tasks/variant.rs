// src/tasks/variant.rs

//! WebP / AVIF copies of PNG and JPEG images.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::config::TaskDefinition;
use crate::errors::{PipelineError, Result};
use crate::tasks::{output_path, Pipeline, TaskReport};
use crate::types::VariantFormat;
use crate::watch::patterns::collect_sources;

/// ravif speed (1 = slowest/smallest, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Largest width or height libwebp accepts.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

pub fn run_variant_task(pipeline: &Pipeline, def: &TaskDefinition) -> Result<TaskReport> {
    let mut report = TaskReport::new(def.kind);
    let root = pipeline.config().root();
    let out_dir = pipeline.output_dir(def);
    let (format, quality) = def.encoding().ok_or_else(|| {
        PipelineError::ConfigError(format!("task '{}' has no encode stage", def.kind))
    })?;

    let sources = collect_sources(pipeline.fs(), root, pipeline.config().paths.glob(def.input))?;

    // `a.png` and `a.jpg` both map to `a.<ext>`; the first in sorted order wins.
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for source in sources {
        if !def.accepts_extension(source.extension().as_deref()) {
            report.skipped += 1;
            continue;
        }

        let target = output_path(&out_dir, &source.relative, Some(format.extension()));
        if let Some(first) = claimed.get(&target) {
            let message = format!(
                "{} output {:?} already produced from {:?}",
                format.extension(),
                target,
                first
            );
            report.fail(&source.path, message);
            continue;
        }
        claimed.insert(target.clone(), source.path.clone());

        let encoded = pipeline
            .fs()
            .read(&source.path)
            .map_err(|e| format!("{e:#}"))
            .and_then(|bytes| encode_variant(&bytes, format, quality));

        let data = match encoded {
            Ok(d) => d,
            Err(message) => {
                report.fail(&source.path, message);
                continue;
            }
        };

        if let Err(err) = pipeline.fs().write(&target, &data) {
            report.fail(&source.path, format!("{err:#}"));
            continue;
        }

        debug!(path = %target.display(), bytes = data.len(), "variant written");
        report.transformed += 1;
        report.written.push(target);
    }

    Ok(report)
}

/// Decode any supported raster image and encode it as `format`.
pub fn encode_variant(
    bytes: &[u8],
    format: VariantFormat,
    quality: f32,
) -> std::result::Result<Vec<u8>, String> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| e.to_string())?
        .to_rgba8();
    let (width, height) = img.dimensions();

    match format {
        VariantFormat::Webp => {
            if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
                return Err(format!(
                    "{width}x{height} exceeds the WebP limit of {WEBP_MAX_DIMENSION}px per side"
                ));
            }
            let encoded = webp::Encoder::from_rgba(img.as_raw(), width, height)
                .encode_simple(false, quality)
                .map_err(|e| format!("webp encoder: {e:?}"))?;
            Ok(encoded.to_vec())
        }
        VariantFormat::Avif => {
            let pixels: Vec<ravif::RGBA8> = img
                .pixels()
                .map(|p| ravif::RGBA8::new(p[0], p[1], p[2], p[3]))
                .collect();
            let encoded = ravif::Encoder::new()
                .with_quality(quality)
                .with_alpha_quality(quality)
                .with_speed(AVIF_SPEED)
                .encode_rgba(ravif::Img::new(
                    pixels.as_slice(),
                    width as usize,
                    height as usize,
                ))
                .map_err(|e| e.to_string())?;
            Ok(encoded.avif_file)
        }
    }
}
