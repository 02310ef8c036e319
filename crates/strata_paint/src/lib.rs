//! Strata Paint
//!
//! Software raster primitives the painter draws with.
//!
//! # Features
//!
//! - Straight-alpha [`Color`] with CSS-style parsing
//! - Geometry primitives and 2D affine transforms
//! - [`Surface`]: a `tiny_skia` pixmap addressed in logical pixels, with a
//!   device-pixel scale, a save/restore drawing state stack and alpha compositing
//! - Frame capture and image encoding (PNG, JPEG, BMP)

pub mod capture;
pub mod color;
pub mod encode;
pub mod error;
pub mod primitives;
pub mod surface;
pub mod transform;

pub use capture::CapturedFrame;
pub use color::Color;
pub use encode::{decode_rgba, encode_rgba, ImageFormat};
pub use error::{PaintError, Result};
pub use primitives::{Point, Rect, Size};
pub use surface::{CompositeOp, DrawState, Surface};
pub use transform::Transform2D;

/// Re-exported so paint routines can hand decoded images to a [`Surface`].
pub use image::{Rgba, RgbaImage};
