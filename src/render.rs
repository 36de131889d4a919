//! PDF page rasterization.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hayro::{InterpreterSettings, Pdf, RenderSettings, render};
use hayro_syntax::LoadPdfError;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::error::{PdfLoadFailure, RenderError};

// PDF user space unit: 1/72 inch
const POINTS_PER_INCH: f32 = 72.0;

/// Render scale for a target resolution (1.0 == 72 dpi).
pub fn dpi_to_scale(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

/// A parsed PDF that pages can be rendered from.
pub struct PdfDocument {
    path: PathBuf,
    pdf: Pdf,
}

impl PdfDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(RenderError::Missing(path));
        }

        let bytes = std::fs::read(&path).map_err(|source| RenderError::Read {
            path: path.clone(),
            source,
        })?;
        let pdf = Pdf::new(Arc::new(bytes)).map_err(|e| RenderError::Load {
            path: path.clone(),
            source: match e {
                LoadPdfError::Encryption => PdfLoadFailure::Encrypted,
                LoadPdfError::Invalid => PdfLoadFailure::Malformed,
            },
        })?;

        debug!(path = %path.display(), pages = pdf.pages().len(), "opened PDF");
        Ok(PdfDocument { path, pdf })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.pdf.pages().len()
    }

    /// Rasterize the zero-based page `index` at `scale`.
    ///
    /// The scaled page must come out between 1 and 65535 pixels on each side.
    pub fn render_page(&self, index: usize, scale: f32) -> Result<DynamicImage, RenderError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RenderError::InvalidScale(scale));
        }

        let count = self.page_count();
        let page = self
            .pdf
            .pages()
            .get(index)
            .ok_or(RenderError::PageOutOfRange { index, count })?;

        let (width, height) = page.render_dimensions();
        if !fits_pixmap(width, scale) || !fits_pixmap(height, scale) {
            return Err(RenderError::InvalidScale(scale));
        }

        let render_settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            ..Default::default()
        };
        let pixmap = render(page, &InterpreterSettings::default(), &render_settings);

        image::load_from_memory_with_format(&pixmap.take_png(), ImageFormat::Png)
            .map_err(|source| RenderError::Decode { index, source })
    }
}

// Pixmap sides are floor(points * scale) stored as u16
fn fits_pixmap(points: f32, scale: f32) -> bool {
    let px = (points * scale).floor();
    px >= 1.0 && px <= u16::MAX as f32
}
