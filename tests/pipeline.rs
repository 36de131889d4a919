mod common;

use std::path::Path;

use docraster::fade::{self, FadeOptions};
use docraster::tail::{self, TailOptions};
use docraster::{AlphaMode, Background, Direction, Error, PdfDocument, RenderError};
use image::{GenericImageView, Rgb, RgbImage};
use pretty_assertions::assert_eq;

fn dims(path: &Path) -> (u32, u32) {
    image::open(path).unwrap().dimensions()
}

#[test]
fn tail_extracts_last_two_pages_and_merges_both_ways() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("results.pdf");
    common::write_pdf(&pdf, &[(60.0, 60.0), (100.0, 150.0), (80.0, 60.0)]);

    let out_dir = dir.path().join("out");
    let options = TailOptions {
        output_dir: Some(out_dir.clone()),
        scale: 1.0,
        ..Default::default()
    };
    let report = tail::run(&pdf, &options).unwrap();

    assert_eq!(
        report.pages,
        vec![
            out_dir.join("results_from_end_2.png"),
            out_dir.join("results_from_end_1.png"),
        ]
    );
    assert!(report.failed.is_empty());

    let (w2, h2) = dims(&report.pages[0]);
    let (w1, h1) = dims(&report.pages[1]);
    assert!(h2 > h1, "second-to-last page is the taller one");

    let horizontal = out_dir.join("results_merged_horizontal.png");
    let vertical = out_dir.join("results_merged_vertical.png");
    assert_eq!(
        report.merged,
        vec![
            (Direction::Horizontal, horizontal.clone()),
            (Direction::Vertical, vertical.clone()),
        ]
    );
    assert_eq!(dims(&horizontal), (w2 + w1, h2.max(h1)));
    assert_eq!(dims(&vertical), (w2.max(w1), h2 + h1));
}

#[test]
fn tail_on_single_page_document_skips_merge() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("single.pdf");
    common::write_pdf(&pdf, &[(50.0, 40.0)]);

    let report = tail::run(&pdf, &TailOptions::default()).unwrap();

    assert_eq!(report.pages, vec![dir.path().join("single_page_1.png")]);
    assert!(report.merged.is_empty());
    assert!(!dir.path().join("single_merged_horizontal.png").exists());
}

#[test]
fn tail_reports_missing_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let err = tail::run(&dir.path().join("absent.pdf"), &TailOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Render(RenderError::Missing(_))));
}

#[test]
fn page_index_past_the_end_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("two.pdf");
    common::write_pdf(&pdf, &[(50.0, 50.0), (50.0, 50.0)]);

    let doc = PdfDocument::open(&pdf).unwrap();
    assert_eq!(doc.page_count(), 2);
    let err = doc.render_page(2, 1.0).unwrap_err();
    assert!(matches!(
        err,
        RenderError::PageOutOfRange { index: 2, count: 2 }
    ));
}

#[test]
fn merge_files_centers_narrow_image_when_stacking() {
    let dir = tempfile::tempdir().unwrap();
    let top = dir.path().join("top.png");
    let bottom = dir.path().join("bottom.png");
    let out = dir.path().join("stacked.png");
    RgbImage::from_pixel(4, 2, Rgb([255, 0, 0])).save(&top).unwrap();
    RgbImage::from_pixel(10, 3, Rgb([0, 0, 255])).save(&bottom).unwrap();

    tail::merge_files(
        &top,
        &bottom,
        &out,
        Direction::Vertical,
        Background::WHITE,
        AlphaMode::Discard,
    )
    .unwrap();

    let merged = image::open(&out).unwrap().to_rgb8();
    assert_eq!(merged.dimensions(), (10, 5));
    assert_eq!(*merged.get_pixel(2, 0), Rgb([255, 255, 255]));
    assert_eq!(*merged.get_pixel(3, 0), Rgb([255, 0, 0]));
    assert_eq!(*merged.get_pixel(6, 1), Rgb([255, 0, 0]));
    assert_eq!(*merged.get_pixel(7, 1), Rgb([255, 255, 255]));
    assert_eq!(*merged.get_pixel(0, 2), Rgb([0, 0, 255]));
}

#[test]
fn fade_pdf_writes_translucent_png_and_can_drop_intermediate() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("crest.pdf");
    common::write_pdf(&pdf, &[(40.0, 40.0)]);

    let options = FadeOptions {
        dpi: 72,
        keep_intermediate: false,
        ..Default::default()
    };
    let result = fade::fade_pdf(&pdf, &options).unwrap();

    assert_eq!(result.faded, dir.path().join("crest_transparent.png"));
    assert!(result.intermediate.is_none());
    assert!(!dir.path().join("crest.png").exists());

    let faded = image::open(&result.faded).unwrap().to_rgba8();
    assert!(faded.pixels().all(|p| p.0[3] == 25));
}

#[test]
fn fade_pdf_keeps_intermediate_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("crest.pdf");
    common::write_pdf(&pdf, &[(40.0, 40.0)]);

    let options = FadeOptions {
        dpi: 72,
        ..Default::default()
    };
    let result = fade::fade_pdf(&pdf, &options).unwrap();

    let plain = dir.path().join("crest.png");
    assert_eq!(result.intermediate, Some(plain.clone()));
    assert_eq!(dims(&plain), dims(&result.faded));
}

#[test]
fn non_positive_scale_is_rejected_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("scaled.pdf");
    common::write_pdf(&pdf, &[(50.0, 50.0)]);

    let doc = PdfDocument::open(&pdf).unwrap();
    for scale in [0.0, -2.0, f32::NAN, f32::INFINITY, 0.001] {
        let err = doc.render_page(0, scale).unwrap_err();
        assert!(
            matches!(err, RenderError::InvalidScale(_)),
            "scale {scale} gave {err:?}"
        );
    }
    assert!(doc.render_page(0, 1.0).is_ok());
}

#[test]
fn zero_dpi_fails_with_readable_error() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("zero.pdf");
    common::write_pdf(&pdf, &[(50.0, 50.0)]);

    let err = fade::render_to_png(&pdf, 0, 0, None).unwrap_err();
    assert!(matches!(err, Error::Render(RenderError::InvalidScale(_))));
    assert!(!dir.path().join("zero.png").exists());
}
