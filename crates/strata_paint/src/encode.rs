//! Image encoding and decoding

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{DynamicImage, RgbaImage};

use crate::error::{PaintError, Result};

/// Encoded image formats a surface can be exported to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    #[default]
    Png,
    /// No alpha channel; transparent pixels flatten to black.
    Jpeg,
    Bmp,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
        }
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Accepts bare names (`png`, `jpg`) and MIME types (`image/png`).
impl FromStr for ImageFormat {
    type Err = PaintError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("image/").unwrap_or(&lower);
        match name {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            _ => Err(PaintError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Encode straight-alpha RGBA pixels into `format`.
pub fn encode_rgba(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            rgb.write_to(&mut out, format.codec())?;
        }
        _ => image.write_to(&mut out, format.codec())?,
    }
    Ok(out.into_inner())
}

/// Decode any supported encoded image into straight-alpha RGBA pixels.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}
