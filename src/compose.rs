//! Two-image canvas compositing.
//!
//! Places two decoded rasters side by side or stacked onto a freshly
//! allocated RGB canvas. The geometry lives in [`plan`]; [`compose`] and
//! [`compose_blended`] differ only in how source alpha is treated.

use std::fmt;
use std::str::FromStr;

use image::error::{LimitError, LimitErrorKind};
use image::{DynamicImage, GenericImage, GenericImageView, ImageError, Rgb, RgbImage};
use thiserror::Error;

use crate::color::parse_color;

// Bytes per canvas pixel (RGB, 8-bit)
const CHANNELS: u64 = 3;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("composition failed: {0}")]
    CompositionFailed(#[source] ImageError),
}

/// Placement rule for the second image relative to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Side by side, top-aligned.
    Horizontal,
    /// Stacked, each image horizontally centered.
    Vertical,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Horizontal => "horizontal",
            Direction::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Direction::Horizontal),
            "vertical" => Ok(Direction::Vertical),
            other => Err(ComposeError::InvalidInput(format!(
                "unknown layout direction '{}' (expected 'horizontal' or 'vertical')",
                other
            ))),
        }
    }
}

/// Solid fill for canvas pixels not covered by either image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub Rgb<u8>);

impl Background {
    pub const WHITE: Background = Background(Rgb([255, 255, 255]));
}

impl Default for Background {
    fn default() -> Self {
        Background::WHITE
    }
}

impl FromStr for Background {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
            .map(|rgb| Background(Rgb(rgb)))
            .ok_or_else(|| ComposeError::InvalidInput(format!("unrecognized color '{}'", s)))
    }
}

/// How source alpha is handled when an image is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Alpha is dropped and color channels are copied as-is.
    #[default]
    Discard,
    /// Each pixel is blended over the background by its alpha.
    Blend,
}

impl AlphaMode {
    pub fn compose(
        self,
        first: &DynamicImage,
        second: &DynamicImage,
        direction: Direction,
        background: Background,
    ) -> Result<RgbImage, ComposeError> {
        match self {
            AlphaMode::Discard => compose(first, second, direction, background),
            AlphaMode::Blend => compose_blended(first, second, direction, background),
        }
    }
}

impl FromStr for AlphaMode {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(AlphaMode::Discard),
            "blend" => Ok(AlphaMode::Blend),
            other => Err(ComposeError::InvalidInput(format!(
                "unknown alpha mode '{}' (expected 'discard' or 'blend')",
                other
            ))),
        }
    }
}

/// Canvas size and top-left offsets of both images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub canvas: (u32, u32),
    pub first: (u32, u32),
    pub second: (u32, u32),
}

/// Compute the canvas size and where each image lands on it.
///
/// Rejects zero-sized images with [`ComposeError::InvalidInput`]. A canvas
/// whose dimensions or byte size would overflow is reported as
/// [`ComposeError::CompositionFailed`].
pub fn plan(
    first: (u32, u32),
    second: (u32, u32),
    direction: Direction,
) -> Result<Placement, ComposeError> {
    let (aw, ah) = first;
    let (bw, bh) = second;

    if aw == 0 || ah == 0 {
        return Err(ComposeError::InvalidInput(format!(
            "first image has a zero dimension ({}x{})",
            aw, ah
        )));
    }
    if bw == 0 || bh == 0 {
        return Err(ComposeError::InvalidInput(format!(
            "second image has a zero dimension ({}x{})",
            bw, bh
        )));
    }

    let placement = match direction {
        Direction::Horizontal => {
            let width = aw.checked_add(bw).ok_or_else(too_large)?;
            Placement {
                canvas: (width, ah.max(bh)),
                first: (0, 0),
                second: (aw, 0),
            }
        }
        Direction::Vertical => {
            let width = aw.max(bw);
            let height = ah.checked_add(bh).ok_or_else(too_large)?;
            Placement {
                canvas: (width, height),
                first: ((width - aw) / 2, 0),
                second: ((width - bw) / 2, ah),
            }
        }
    };

    // The whole buffer has to be addressable
    let (cw, ch) = placement.canvas;
    let bytes = (cw as u64)
        .checked_mul(ch as u64)
        .and_then(|px| px.checked_mul(CHANNELS))
        .ok_or_else(too_large)?;
    if usize::try_from(bytes).is_err() {
        return Err(too_large());
    }

    Ok(placement)
}

/// Background-filled canvas, reporting allocation failure instead of aborting.
fn allocate_canvas(
    width: u32,
    height: u32,
    background: Background,
) -> Result<RgbImage, ComposeError> {
    let len = (width as u64)
        .checked_mul(height as u64)
        .and_then(|px| px.checked_mul(CHANNELS))
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(too_large)?;

    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| {
        ComposeError::CompositionFailed(ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::InsufficientMemory,
        )))
    })?;
    for _ in 0..len / CHANNELS as usize {
        buf.extend_from_slice(&background.0.0);
    }

    RgbImage::from_raw(width, height, buf).ok_or_else(too_large)
}

fn too_large() -> ComposeError {
    ComposeError::CompositionFailed(ImageError::Limits(LimitError::from_kind(
        LimitErrorKind::DimensionError,
    )))
}

/// Place `first` and `second` onto a new canvas filled with `background`.
///
/// Any alpha channel in the inputs is discarded; color channels are copied
/// unchanged. Neither input is modified.
pub fn compose(
    first: &DynamicImage,
    second: &DynamicImage,
    direction: Direction,
    background: Background,
) -> Result<RgbImage, ComposeError> {
    let placement = plan(first.dimensions(), second.dimensions(), direction)?;
    let (cw, ch) = placement.canvas;

    let mut canvas = allocate_canvas(cw, ch, background)?;

    let (x, y) = placement.first;
    canvas
        .copy_from(&first.to_rgb8(), x, y)
        .map_err(ComposeError::CompositionFailed)?;

    let (x, y) = placement.second;
    canvas
        .copy_from(&second.to_rgb8(), x, y)
        .map_err(ComposeError::CompositionFailed)?;

    Ok(canvas)
}

/// Same geometry as [`compose`], but each source pixel is blended over the
/// background according to its alpha instead of having alpha dropped.
pub fn compose_blended(
    first: &DynamicImage,
    second: &DynamicImage,
    direction: Direction,
    background: Background,
) -> Result<RgbImage, ComposeError> {
    let placement = plan(first.dimensions(), second.dimensions(), direction)?;
    let (cw, ch) = placement.canvas;

    let mut canvas = allocate_canvas(cw, ch, background)?;
    blend_onto(&mut canvas, first, placement.first, background);
    blend_onto(&mut canvas, second, placement.second, background);

    Ok(canvas)
}

fn blend_onto(canvas: &mut RgbImage, src: &DynamicImage, at: (u32, u32), background: Background) {
    let (ox, oy) = at;
    let Rgb(bg) = background.0;

    for (x, y, px) in src.to_rgba8().enumerate_pixels() {
        let [r, g, b, a] = px.0;
        canvas.put_pixel(
            ox + x,
            oy + y,
            Rgb([over(r, bg[0], a), over(g, bg[1], a), over(b, bg[2], a)]),
        );
    }
}

#[inline]
fn over(src: u8, bg: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
}
