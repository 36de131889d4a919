//! Small document conversion utilities: render PDF pages to PNG, composite
//! two rasters onto one canvas, fade a render for use as a watermark, and
//! convert spreadsheets to CSV.

mod color;
pub mod compose;
pub mod error;
pub mod fade;
pub mod render;
pub mod sheet;
pub mod tail;

pub use compose::{
    AlphaMode, Background, ComposeError, Direction, Placement, compose, compose_blended, plan,
};
pub use error::{Error, PdfLoadFailure, RenderError, Result, SheetError};
pub use render::{PdfDocument, dpi_to_scale};
