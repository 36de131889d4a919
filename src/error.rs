use std::path::PathBuf;

use thiserror::Error;

use crate::compose::ComposeError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PDF {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: PdfLoadFailure,
    },

    #[error("render scale {0} must be positive and keep the page within 1..=65535 pixels")]
    InvalidScale(f32),

    #[error("page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("failed to decode rendered page {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfLoadFailure {
    #[error("document is encrypted")]
    Encrypted,

    #[error("document is malformed")]
    Malformed,
}

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("image error for {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document has no pages")]
    EmptyDocument,

    #[error("opacity must be within 0.0..=1.0, got {0}")]
    InvalidOpacity(f32),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Image {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
