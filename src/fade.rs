//! Render a PDF page to PNG and produce a uniformly translucent copy of it.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::render::{PdfDocument, dpi_to_scale};

pub const DEFAULT_DPI: u32 = 300;
pub const DEFAULT_OPACITY: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct FadeOptions {
    pub dpi: u32,
    pub opacity: f32,
    /// Faded PNG path; defaults to `{base}_transparent.png`.
    pub output: Option<PathBuf>,
    /// Whether the plain intermediate render stays on disk.
    pub keep_intermediate: bool,
}

impl Default for FadeOptions {
    fn default() -> Self {
        FadeOptions {
            dpi: DEFAULT_DPI,
            opacity: DEFAULT_OPACITY,
            output: None,
            keep_intermediate: true,
        }
    }
}

#[derive(Debug)]
pub struct FadeOutput {
    pub faded: PathBuf,
    /// Present only when the intermediate render was kept.
    pub intermediate: Option<PathBuf>,
}

/// `document.pdf` -> `document{suffix}.png`
fn sibling_png(pdf_path: &Path, suffix: &str) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    pdf_path.with_file_name(format!("{}{}.png", stem, suffix))
}

/// Render the zero-based `page` of `pdf_path` at `dpi` into a PNG.
///
/// The output defaults to the PDF path with a `.png` extension.
pub fn render_to_png(
    pdf_path: &Path,
    page: usize,
    dpi: u32,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let doc = PdfDocument::open(pdf_path)?;
    let image = doc.render_page(page, dpi_to_scale(dpi))?;

    let out = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sibling_png(pdf_path, ""));
    image
        .save_with_format(&out, ImageFormat::Png)
        .map_err(|e| Error::image(&out, e))?;

    info!(pdf = %pdf_path.display(), png = %out.display(), dpi, "rendered page");
    Ok(out)
}

/// Copy of `image` with every alpha value set to `trunc(255 * opacity)`.
pub fn fade(image: &DynamicImage, opacity: f32) -> Result<RgbaImage> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(Error::InvalidOpacity(opacity));
    }

    let alpha = (255.0 * opacity) as u8;
    let mut rgba = image.to_rgba8();
    for px in rgba.pixels_mut() {
        px.0[3] = alpha;
    }
    Ok(rgba)
}

/// Render the first page, fade it and write the translucent PNG.
pub fn fade_pdf(pdf_path: &Path, options: &FadeOptions) -> Result<FadeOutput> {
    if !(0.0..=1.0).contains(&options.opacity) {
        return Err(Error::InvalidOpacity(options.opacity));
    }

    let plain_path = sibling_png(pdf_path, "");
    let intermediate = render_to_png(pdf_path, 0, options.dpi, Some(plain_path.as_path()))?;

    let plain = image::open(&intermediate).map_err(|e| Error::image(&intermediate, e))?;
    let faded = fade(&plain, options.opacity)?;

    let out = options
        .output
        .clone()
        .unwrap_or_else(|| sibling_png(pdf_path, "_transparent"));
    faded
        .save_with_format(&out, ImageFormat::Png)
        .map_err(|e| Error::image(&out, e))?;
    info!(path = %out.display(), opacity = options.opacity, "saved translucent PNG");

    // An explicit output equal to the intermediate path has already overwritten it
    let intermediate = if intermediate == out {
        None
    } else if options.keep_intermediate {
        Some(intermediate)
    } else {
        if let Err(e) = std::fs::remove_file(&intermediate) {
            warn!(path = %intermediate.display(), "could not remove intermediate render: {}", e);
        }
        None
    };

    Ok(FadeOutput {
        faded: out,
        intermediate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn fade_sets_uniform_alpha() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])));
        let faded = fade(&img, 0.1).unwrap();

        assert_eq!(faded.dimensions(), (3, 2));
        assert!(faded.pixels().all(|p| p.0 == [10, 20, 30, 25]));

        let opaque = fade(&img, 1.0).unwrap();
        assert!(opaque.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn fade_rejects_out_of_range_opacity() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(1, 1));
        assert!(matches!(fade(&img, 1.5), Err(Error::InvalidOpacity(_))));
        assert!(matches!(fade(&img, -0.1), Err(Error::InvalidOpacity(_))));
        assert!(matches!(fade(&img, f32::NAN), Err(Error::InvalidOpacity(_))));
    }

    #[test]
    fn default_paths_sit_next_to_the_pdf() {
        assert_eq!(
            sibling_png(Path::new("badges/crest.pdf"), "_transparent"),
            PathBuf::from("badges/crest_transparent.png")
        );
        assert_eq!(sibling_png(Path::new("crest.pdf"), ""), PathBuf::from("crest.png"));
    }
}
