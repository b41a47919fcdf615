// tests/image_tasks.rs

mod common;
use crate::common::{init_tracing, jpeg_bytes, png_bytes, write};

use std::error::Error;
use std::fs;

use assetpipe::engine::TaskKind;
use assetpipe::tasks::image::{optimize_bytes, Optimizer};
use assetpipe::tasks::variant::{encode_variant, WEBP_MAX_DIMENSION};
use assetpipe::types::VariantFormat;
use assetpipe_test_utils::builders::PipelineBuilder;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn second_optimize_run_is_served_from_cache() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    let png = png_bytes(32, 32);
    write(root, "src/img/logo.png", &png);
    write(root, "src/img/photos/beach.jpg", jpeg_bytes(32, 24));
    write(root, "src/img/icons/readme.txt", "not an image");
    write(root, "src/img/legacy.webp", "RIFF....WEBP");

    let pipeline = PipelineBuilder::rooted(root).build();

    let first = pipeline.run(TaskKind::Images).await?;
    assert!(first.is_clean(), "{:?}", first.failures);
    assert_eq!(first.transformed, 2);
    assert_eq!(first.cache_hits, 0);
    assert_eq!(first.written.len(), 3);
    assert_eq!(first.skipped, 1);

    let second = pipeline.run(TaskKind::Images).await?;
    assert_eq!(second.transformed, 0);
    assert_eq!(second.cache_hits, 2);
    assert_eq!(pipeline.cache().misses(), 2);
    assert_eq!(pipeline.cache().hits(), 2);

    let out = root.join("public/build/img");
    assert!(fs::read(out.join("logo.png"))?.len() <= png.len());
    assert!(out.join("photos/beach.jpg").is_file());
    assert_eq!(fs::read_to_string(out.join("icons/readme.txt"))?, "not an image");
    assert!(!out.join("legacy.webp").exists());
    Ok(())
}

#[tokio::test]
async fn every_png_and_jpeg_gets_webp_and_avif_counterparts() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    write(root, "src/img/logo.png", png_bytes(16, 16));
    write(root, "src/img/photos/beach.jpeg", jpeg_bytes(16, 16));
    write(root, "src/img/anim.gif", "GIF89a");

    let pipeline = PipelineBuilder::rooted(root).build();
    let out = root.join("public/build/img");

    let webp = pipeline.run(TaskKind::Webp).await?;
    assert!(webp.is_clean(), "{:?}", webp.failures);
    assert_eq!(webp.transformed, 2);
    assert_eq!(webp.skipped, 1);
    for name in ["logo.webp", "photos/beach.webp"] {
        let bytes = fs::read(out.join(name))?;
        assert_eq!(&bytes[0..4], b"RIFF", "{name}");
        assert_eq!(&bytes[8..12], b"WEBP", "{name}");
    }

    let avif = pipeline.run(TaskKind::Avif).await?;
    assert!(avif.is_clean(), "{:?}", avif.failures);
    for name in ["logo.avif", "photos/beach.avif"] {
        let bytes = fs::read(out.join(name))?;
        assert_eq!(&bytes[4..8], b"ftyp", "{name}");
    }
    assert!(!out.join("anim.webp").exists());
    Ok(())
}

#[tokio::test]
async fn colliding_variant_outputs_are_reported() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    write(root, "src/img/hero.jpg", jpeg_bytes(8, 8));
    write(root, "src/img/hero.png", png_bytes(8, 8));

    let pipeline = PipelineBuilder::rooted(root).build();
    let report = pipeline.run(TaskKind::Webp).await?;

    assert_eq!(report.written, vec![root.join("public/build/img/hero.webp")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, root.join("src/img/hero.png"));
    Ok(())
}

#[tokio::test]
async fn corrupt_image_does_not_abort_the_batch() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    write(root, "src/img/broken.png", "definitely not a png");
    write(root, "src/img/ok.png", png_bytes(8, 8));

    let pipeline = PipelineBuilder::rooted(root).build();

    let optimized = pipeline.run(TaskKind::Images).await?;
    assert_eq!(optimized.failures.len(), 1);
    assert_eq!(optimized.transformed, 1);

    let variants = pipeline.run(TaskKind::Webp).await?;
    assert_eq!(variants.failures.len(), 1);
    assert!(root.join("public/build/img/ok.webp").is_file());
    Ok(())
}

#[tokio::test]
async fn oversized_webp_input_fails_alone() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    write(root, "src/img/a_ok.png", png_bytes(8, 8));
    write(root, "src/img/wide.png", png_bytes(16400, 1));

    let pipeline = PipelineBuilder::rooted(root).build();
    let report = pipeline.run(TaskKind::Webp).await?;

    assert_eq!(report.transformed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, root.join("src/img/wide.png"));
    assert!(report.failures[0].message.contains("16400x1"), "{:?}", report.failures);
    assert!(root.join("public/build/img/a_ok.webp").is_file());
    assert!(!root.join("public/build/img/wide.webp").exists());
    Ok(())
}

#[tokio::test]
async fn uppercase_extensions_are_optimized_and_converted() -> TestResult {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let root = tmp.path();
    write(root, "src/img/Logo.PNG", png_bytes(16, 16));
    write(root, "src/img/PHOTO.JPG", jpeg_bytes(16, 16));

    let pipeline = PipelineBuilder::rooted(root).build();
    let out = root.join("public/build/img");

    let optimized = pipeline.run(TaskKind::Images).await?;
    assert!(optimized.is_clean(), "{:?}", optimized.failures);
    assert_eq!(optimized.transformed, 2);
    assert!(out.join("Logo.PNG").is_file());
    assert!(out.join("PHOTO.JPG").is_file());

    let webp = pipeline.run(TaskKind::Webp).await?;
    assert!(webp.is_clean(), "{:?}", webp.failures);
    assert_eq!(webp.transformed, 2);
    for name in ["Logo.webp", "PHOTO.webp"] {
        let bytes = fs::read(out.join(name))?;
        assert_eq!(&bytes[8..12], b"WEBP", "{name}");
    }

    let avif = pipeline.run(TaskKind::Avif).await?;
    assert!(avif.is_clean(), "{:?}", avif.failures);
    assert!(out.join("Logo.avif").is_file());
    assert!(out.join("PHOTO.avif").is_file());
    Ok(())
}

#[test]
fn optimizer_is_chosen_by_extension() {
    assert_eq!(Optimizer::for_extension(Some("png")), Optimizer::Png);
    assert_eq!(Optimizer::for_extension(Some("jpeg")), Optimizer::Jpeg);
    assert_eq!(Optimizer::for_extension(Some("svg")), Optimizer::Copy);
    assert_eq!(Optimizer::for_extension(None), Optimizer::Copy);
}

#[test]
fn optimized_output_is_never_larger() {
    let jpeg = jpeg_bytes(24, 24);
    let out = optimize_bytes(&jpeg, Optimizer::Jpeg, 3).unwrap();
    assert!(out.len() <= jpeg.len());
}

#[test]
fn encode_variant_rejects_undecodable_input() {
    assert!(encode_variant(b"garbage", VariantFormat::Webp, 50.0).is_err());
}

#[test]
fn webp_encoder_rejects_images_past_its_limit() {
    let err = encode_variant(&png_bytes(WEBP_MAX_DIMENSION + 1, 2), VariantFormat::Webp, 50.0)
        .unwrap_err();
    assert!(err.contains("WebP limit"), "{err}");
}
