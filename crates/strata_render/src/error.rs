//! Painter error types

use strata_core::{BrushError, ShapeId, ShapeKind};
use strata_paint::PaintError;
use thiserror::Error;

/// Painter errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A paint routine failed and error isolation is off
    #[error("Brush error of {kind} shape '{id}': {source}")]
    Brush {
        kind: ShapeKind,
        id: ShapeId,
        #[source]
        source: BrushError,
    },

    /// Raster or encoding failure
    #[error("Paint error: {0}")]
    Paint(#[from] PaintError),

    /// Malformed configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Well-formed configuration with invalid values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `show_loading` named an effect nobody registered
    #[error("Unknown loading effect '{0}'")]
    UnknownEffect(String),
}

/// Result type for painter operations
pub type Result<T> = std::result::Result<T, RenderError>;
