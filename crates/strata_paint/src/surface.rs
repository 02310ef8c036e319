//! Raster drawing surfaces
//!
//! A [`Surface`] wraps a `tiny_skia::Pixmap` (premultiplied RGBA8) and
//! addresses it in logical coordinates. The device pixel ratio is fixed at
//! creation; every drawing call maps logical coordinates through the current
//! transform and then the device scale, the same way a 2D canvas context that
//! was `scale(dpr, dpr)`'d once behaves.
//!
//! Anti-aliasing is off and images are sampled nearest-neighbour, so a pixel
//! is either covered or not. The painter's dirty-level tests compare frames
//! byte for byte and rely on that.

use std::fmt;

use image::RgbaImage;
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use crate::capture::CapturedFrame;
use crate::color::Color;
use crate::encode::{encode_rgba, ImageFormat};
use crate::error::Result;
use crate::primitives::{Point, Rect, Size};
use crate::transform::Transform2D;

/// How source pixels combine with the destination
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeOp {
    /// Porter-Duff source-over (normal blending)
    #[default]
    SourceOver,
    /// Replace the destination entirely; pixels outside the source are
    /// cleared, like canvas `globalCompositeOperation = "copy"`.
    Copy,
}

impl CompositeOp {
    fn blend_mode(self) -> BlendMode {
        match self {
            CompositeOp::SourceOver => BlendMode::SourceOver,
            CompositeOp::Copy => BlendMode::Source,
        }
    }
}

/// Drawing state saved and restored by [`Surface::save`] / [`Surface::restore`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub transform: Transform2D,
    pub global_alpha: f32,
    pub composite: CompositeOp,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform2D::identity(),
            global_alpha: 1.0,
            composite: CompositeOp::SourceOver,
        }
    }
}

/// A raster drawing target
#[derive(Clone)]
pub struct Surface {
    /// Logical size
    size: Size,
    /// Device pixel ratio
    scale: f32,
    pixel_width: u32,
    pixel_height: u32,
    /// `None` when either physical dimension is zero
    pixmap: Option<Pixmap>,
    state: DrawState,
    saved: Vec<DrawState>,
}

fn physical_extent(logical: f32, scale: f32) -> u32 {
    (logical * scale).round().max(0.0) as u32
}

fn to_skia_transform(t: Transform2D) -> Transform {
    Transform::from_row(t.a, t.b, t.c, t.d, t.e, t.f)
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

/// Straight-alpha `color` with `opacity` folded into its alpha
fn to_skia_color(color: Color, opacity: f32) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        (color.a * opacity).clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

/// Premultiplied copy of a straight-alpha image
fn image_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

impl Surface {
    /// Create a transparent surface of `width` x `height` logical pixels.
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let pixel_width = physical_extent(width, scale);
        let pixel_height = physical_extent(height, scale);
        Self {
            size: Size::new(width, height),
            scale,
            pixel_width,
            pixel_height,
            pixmap: Pixmap::new(pixel_width, pixel_height),
            state: DrawState::default(),
            saved: Vec::new(),
        }
    }

    /// Resize in place. Like resizing a canvas element, this discards the
    /// pixel contents and resets the drawing state.
    pub fn resize(&mut self, width: f32, height: f32) {
        *self = Self::new(width, height, self.scale);
    }

    pub fn logical_size(&self) -> Size {
        self.size
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    /// Backing store size in physical pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    /// Raw premultiplied RGBA8 pixels
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.as_ref().map_or(&[], |p| p.data())
    }

    /// Premultiplied RGBA at a physical pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let px = self.pixmap.as_ref()?.pixel(x, y)?;
        Some([px.red(), px.green(), px.blue(), px.alpha()])
    }

    // === Drawing state ===

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn save(&mut self) {
        self.saved.push(self.state);
    }

    /// Pop the last saved state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.state.global_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_composite(&mut self, op: CompositeOp) {
        self.state.composite = op;
    }

    pub fn set_transform(&mut self, transform: Transform2D) {
        self.state.transform = transform;
    }

    /// Multiply `transform` into the current transform (applied first).
    pub fn transform(&mut self, transform: Transform2D) {
        self.state.transform = self.state.transform.then_apply(&transform);
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.transform(Transform2D::translate(x, y));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.transform(Transform2D::rotate(angle));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform(Transform2D::scale(sx, sy));
    }

    // === Erasing and filling ===

    /// Erase every pixel to transparent.
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    /// Cover the whole surface with `color`, ignoring the transform.
    ///
    /// Blends with the current composite mode, so a translucent color keeps
    /// some of what was there before.
    pub fn fill(&mut self, color: Color) {
        let paint = self.solid_paint(color);
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(bounds) = tiny_skia::Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
        else {
            return;
        };
        pixmap.fill_rect(bounds, &paint, Transform::identity(), None);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(rect) = to_skia_rect(rect) else {
            return;
        };
        let paint = self.solid_paint(color);
        let transform = self.device_transform();
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_rect(rect, &paint, transform, None);
        }
    }

    /// Outline `rect` with a stroke of `line_width` centered on its edges.
    pub fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let half = line_width / 2.0;
        let Some(outer) = to_skia_rect(Rect::new(
            rect.x - half,
            rect.y - half,
            rect.width + line_width,
            rect.height + line_width,
        )) else {
            return;
        };
        let inner = to_skia_rect(Rect::new(
            rect.x + half,
            rect.y + half,
            rect.width - line_width,
            rect.height - line_width,
        ));

        let mut builder = PathBuilder::new();
        builder.push_rect(outer);
        if let Some(inner) = inner {
            builder.push_rect(inner);
        }
        let Some(path) = builder.finish() else {
            return;
        };
        self.fill_path(&path, color);
    }

    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.fill_path(&path, color);
        }
    }

    /// Draw `image` stretched into `dest`, through the current transform.
    pub fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        if dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let Some(source) = image_to_pixmap(image) else {
            return;
        };
        let placement = Transform2D::translate(dest.x, dest.y).then_apply(&Transform2D::scale(
            dest.width / image.width() as f32,
            dest.height / image.height() as f32,
        ));
        let transform = to_skia_transform(self.device_transform2d().then_apply(&placement));
        let paint = self.pixmap_paint();
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
        }
    }

    /// Composite another surface onto this one, pixel for pixel, with its
    /// top-left at the origin. Uses the current global alpha and composite
    /// mode; the transform does not apply.
    pub fn draw_surface(&mut self, source: &Surface) {
        if self.state.composite == CompositeOp::Copy {
            self.clear();
        }
        let paint = self.pixmap_paint();
        let (Some(pixmap), Some(source)) = (self.pixmap.as_mut(), source.pixmap.as_ref()) else {
            return;
        };
        pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, Transform::identity(), None);
    }

    // === Export ===

    pub fn capture(&self) -> CapturedFrame {
        CapturedFrame::new(self.pixels().to_vec(), self.pixel_width, self.pixel_height)
    }

    /// Straight-alpha copy of the backing store
    pub fn to_rgba_image(&self) -> RgbaImage {
        self.capture().to_image()
    }

    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        encode_rgba(&self.to_rgba_image(), format)
    }

    // === Rasterization ===

    /// Logical-to-physical transform for the current state
    fn device_transform2d(&self) -> Transform2D {
        Transform2D::scale_uniform(self.scale).then_apply(&self.state.transform)
    }

    fn device_transform(&self) -> Transform {
        to_skia_transform(self.device_transform2d())
    }

    fn solid_paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(to_skia_color(color, self.state.global_alpha));
        paint.blend_mode = self.state.composite.blend_mode();
        paint.anti_alias = false;
        paint
    }

    fn pixmap_paint(&self) -> PixmapPaint {
        PixmapPaint {
            opacity: self.state.global_alpha,
            blend_mode: self.state.composite.blend_mode(),
            quality: FilterQuality::Nearest,
        }
    }

    fn fill_path(&mut self, path: &tiny_skia::Path, color: Color) {
        let paint = self.solid_paint(color);
        let transform = self.device_transform();
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(path, &paint, FillRule::EvenOdd, transform, None);
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("size", &self.size)
            .field("scale", &self.scale)
            .field("pixel_size", &(self.pixel_width, self.pixel_height))
            .field("state", &self.state)
            .field("saved", &self.saved.len())
            .finish()
    }
}
