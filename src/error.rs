//! Crate-level error type and `Result` alias for structured error handling.
//! Converts underlying I/O, TIFF, JSON and (optionally) GDAL errors, and provides
//! semantic variants for the band-ratio engine's failure modes.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JPEG encoding error: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),

    #[error("Band shape mismatch: numerator is {a_rows}x{a_cols}, denominator is {b_rows}x{b_cols}")]
    ShapeMismatch {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },

    #[error("No finite ratio values to summarize")]
    EmptyInput,

    #[error("At least two bands are required for a band ratio, image has {bands}")]
    InsufficientBands { bands: usize },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Dimension mismatch: expected {expected} samples, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl Error {
    pub fn shape_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Error::ShapeMismatch {
            a_rows: a.0,
            a_cols: a.1,
            b_rows: b.0,
            b_cols: b.1,
        }
    }
}
