//! Paint error types

use thiserror::Error;

/// Errors raised by surfaces, colors and image codecs
#[derive(Error, Debug)]
pub enum PaintError {
    /// Encoding or decoding an image failed
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// A color string could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// The requested image format is not supported
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for paint operations
pub type Result<T> = std::result::Result<T, PaintError>;
