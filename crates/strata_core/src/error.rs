//! Paint routine error types

use strata_paint::PaintError;
use thiserror::Error;

use crate::shape::{ShapeId, ShapeKind};

/// A paint routine failed to draw one shape
#[derive(Error, Debug)]
pub enum BrushError {
    /// No routine is registered for the shape's kind
    #[error("No paint routine registered for shape kind '{0}'")]
    UnknownKind(ShapeKind),

    /// An `image` shape without image data
    #[error("Shape '{0}' has no image data")]
    MissingImage(ShapeId),

    /// Decoding or drawing failed in the raster layer
    #[error("Paint failed: {0}")]
    Paint(#[from] PaintError),

    /// Failure reported by a custom routine
    #[error("{0}")]
    Failed(String),
}

/// Result type for paint routines
pub type Result<T> = std::result::Result<T, BrushError>;
