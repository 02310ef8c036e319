//! Frame capture for testing and screenshots.
//!
//! Provides functionality to:
//! - Snapshot a surface's raw pixels
//! - Compare snapshots byte-for-byte or by differing pixel count
//! - Convert snapshots to straight-alpha images for encoding

use image::RgbaImage;

/// Raw captured surface data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Raw pixel data (premultiplied RGBA8)
    pub data: Vec<u8>,
    /// Width in physical pixels
    pub width: u32,
    /// Height in physical pixels
    pub height: u32,
}

impl CapturedFrame {
    /// Create a new captured frame.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Get the number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get a pixel at (x, y) as premultiplied RGBA.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Compare with another frame, returning the number of different pixels.
    pub fn diff_pixel_count(&self, other: &CapturedFrame) -> usize {
        if self.width != other.width || self.height != other.height {
            return self.pixel_count().max(other.pixel_count());
        }

        self.data
            .chunks(4)
            .zip(other.data.chunks(4))
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Check if two frames are identical.
    pub fn is_identical_to(&self, other: &CapturedFrame) -> bool {
        self.width == other.width && self.height == other.height && self.data == other.data
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Convert to a straight-alpha image.
    pub fn to_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (dst, src) in out.pixels_mut().zip(self.data.chunks_exact(4)) {
            dst.0 = unpremultiply([src[0], src[1], src[2], src[3]]);
        }
        out
    }
}

pub(crate) fn unpremultiply(px: [u8; 4]) -> [u8; 4] {
    let a = px[3];
    match a {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => {
            let scale = 255.0 / a as f32;
            let ch = |v: u8| (v as f32 * scale).round().min(255.0) as u8;
            [ch(px[0]), ch(px[1]), ch(px[2]), a]
        }
    }
}
