//! Extract the last two pages of a PDF as PNGs and merge them.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::compose::{AlphaMode, Background, Direction};
use crate::error::{Error, Result};
use crate::render::PdfDocument;

// Render zoom for extracted pages
pub const DEFAULT_SCALE: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct TailOptions {
    /// Directory for all outputs; defaults to the PDF's own directory.
    pub output_dir: Option<PathBuf>,
    pub scale: f32,
    pub background: Background,
    pub alpha: AlphaMode,
}

impl Default for TailOptions {
    fn default() -> Self {
        TailOptions {
            output_dir: None,
            scale: DEFAULT_SCALE,
            background: Background::default(),
            alpha: AlphaMode::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TailReport {
    pub pages: Vec<PathBuf>,
    pub merged: Vec<(Direction, PathBuf)>,
    pub failed: Vec<(Direction, String)>,
}

/// Zero-based indices of the pages to extract from a document of `total` pages.
pub fn select_tail_pages(total: usize) -> Result<Vec<usize>> {
    match total {
        0 => Err(Error::EmptyDocument),
        1 => {
            warn!("document has only 1 page, extracting that page alone");
            Ok(vec![0])
        }
        n => Ok(vec![n - 2, n - 1]),
    }
}

fn page_file_name(stem: &str, position: usize, selected: usize) -> String {
    if selected == 2 {
        format!("{}_from_end_{}.png", stem, 2 - position)
    } else {
        format!("{}_page_1.png", stem)
    }
}

fn merged_file_name(stem: &str, direction: Direction) -> String {
    format!("{}_merged_{}.png", stem, direction)
}

fn output_dir_for(pdf_path: &Path, requested: Option<&Path>) -> PathBuf {
    match requested {
        Some(dir) => dir.to_path_buf(),
        None => match pdf_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Render the tail pages of `pdf_path` into `output_dir` and return the
/// written paths in document order.
pub fn extract_tail_pages(pdf_path: &Path, output_dir: &Path, scale: f32) -> Result<Vec<PathBuf>> {
    let doc = PdfDocument::open(pdf_path)?;
    let selected = select_tail_pages(doc.page_count())?;

    std::fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

    let stem = file_stem(pdf_path);
    let mut saved = Vec::with_capacity(selected.len());

    for (position, &index) in selected.iter().enumerate() {
        let image = doc.render_page(index, scale)?;
        let out = output_dir.join(page_file_name(&stem, position, selected.len()));
        image.save(&out).map_err(|e| Error::image(&out, e))?;

        info!(page = index + 1, path = %out.display(), "saved page");
        saved.push(out);
    }

    info!(count = saved.len(), "extraction finished");
    Ok(saved)
}

/// Load two image files, compose them and save the result to `output`.
pub fn merge_files(
    first: &Path,
    second: &Path,
    output: &Path,
    direction: Direction,
    background: Background,
    alpha: AlphaMode,
) -> Result<()> {
    let a = image::open(first).map_err(|e| Error::image(first, e))?;
    let b = image::open(second).map_err(|e| Error::image(second, e))?;

    let merged = alpha.compose(&a, &b, direction, background)?;
    merged.save(output).map_err(|e| Error::image(output, e))?;

    info!(%direction, path = %output.display(), "saved merged image");
    Ok(())
}

/// Extract the tail pages and, when there are two, write both merge layouts.
///
/// A failed merge is recorded in the report and does not stop the other one.
pub fn run(pdf_path: &Path, options: &TailOptions) -> Result<TailReport> {
    let output_dir = output_dir_for(pdf_path, options.output_dir.as_deref());
    let pages = extract_tail_pages(pdf_path, &output_dir, options.scale)?;

    let mut report = TailReport {
        pages,
        ..Default::default()
    };

    let [first, second] = report.pages.as_slice() else {
        info!("single page extracted, nothing to merge");
        return Ok(report);
    };
    let (first, second) = (first.clone(), second.clone());

    let stem = file_stem(pdf_path);
    for direction in [Direction::Horizontal, Direction::Vertical] {
        let out = output_dir.join(merged_file_name(&stem, direction));
        match merge_files(
            &first,
            &second,
            &out,
            direction,
            options.background,
            options.alpha,
        ) {
            Ok(()) => report.merged.push((direction, out)),
            Err(e) => {
                error!(%direction, "failed to merge pages: {}", e);
                report.failed.push((direction, e.to_string()));
            }
        }
    }

    Ok(report)
}
