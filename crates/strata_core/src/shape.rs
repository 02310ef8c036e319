//! Shape model
//!
//! A [`Shape`] is the fixed-schema record the painter traverses: identity,
//! kind, z-level, flags, a local transform and a style. Anything a paint
//! routine needs to draw lives in [`ShapeStyle`].

use std::borrow::Cow;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use strata_paint::{decode_rgba, Color, ImageFormat, PaintError, Point, RgbaImage, Surface, Transform2D};

/// Non-negative integer identifying a layer
pub type ZLevel = u32;

/// Unique shape identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShapeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shape kind, used to look up a paint routine in the registry
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeKind(Cow<'static, str>);

impl ShapeKind {
    pub const RECTANGLE: ShapeKind = ShapeKind(Cow::Borrowed("rectangle"));
    pub const CIRCLE: ShapeKind = ShapeKind(Cow::Borrowed("circle"));
    pub const IMAGE: ShapeKind = ShapeKind(Cow::Borrowed("image"));

    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ShapeKind {
    fn from(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-shape hook that may draw the shape itself.
///
/// Called with `(surface, shape, is_hover)`; returning `true` means the
/// shape is done and the registry routine is skipped.
#[derive(Clone)]
pub struct BrushHook(Rc<dyn Fn(&mut Surface, &Shape, bool) -> bool>);

impl BrushHook {
    pub fn new(hook: impl Fn(&mut Surface, &Shape, bool) -> bool + 'static) -> Self {
        Self(Rc::new(hook))
    }

    pub fn call(&self, surface: &mut Surface, shape: &Shape, is_hover: bool) -> bool {
        (self.0)(surface, shape, is_hover)
    }
}

impl fmt::Debug for BrushHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BrushHook(..)")
    }
}

struct ImageInner {
    format: ImageFormat,
    bytes: Vec<u8>,
    decoded: OnceCell<RgbaImage>,
}

/// Encoded image bytes carried by `image` shapes.
///
/// Cheap to clone. Decoding happens once, on first draw.
#[derive(Clone)]
pub struct ImageData {
    inner: Rc<ImageInner>,
}

impl ImageData {
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self {
            inner: Rc::new(ImageInner {
                format,
                bytes,
                decoded: OnceCell::new(),
            }),
        }
    }

    pub fn format(&self) -> ImageFormat {
        self.inner.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    /// Decoded straight-alpha pixels
    pub fn decoded(&self) -> Result<&RgbaImage, PaintError> {
        if let Some(image) = self.inner.decoded.get() {
            return Ok(image);
        }
        let image = decode_rgba(&self.inner.bytes)?;
        Ok(self.inner.decoded.get_or_init(|| image))
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.inner.format.mime_type(),
            BASE64.encode(&self.inner.bytes)
        )
    }
}

impl PartialEq for ImageData {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.format == other.inner.format && self.inner.bytes == other.inner.bytes)
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("format", &self.inner.format)
            .field("len", &self.inner.bytes.len())
            .finish()
    }
}

/// Drawing parameters read by paint routines
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeStyle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Circle radius
    pub radius: f32,
    pub color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub line_width: f32,
    /// Multiplied into the surface's global alpha
    pub opacity: Option<f32>,
    pub image: Option<ImageData>,
}

impl ShapeStyle {
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn circle(cx: f32, cy: f32, radius: f32) -> Self {
        Self {
            x: cx,
            y: cy,
            radius,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_stroke(mut self, color: Color, line_width: f32) -> Self {
        self.stroke_color = Some(color);
        self.line_width = line_width;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }
}

/// A drawable element
#[derive(Clone, Debug)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub zlevel: ZLevel,
    /// Skipped by every paint pass
    pub invisible: bool,
    /// Eligible for hover drawing
    pub hoverable: bool,
    pub position: Point,
    /// Radians, about the shape origin
    pub rotation: f32,
    pub scale: (f32, f32),
    pub style: ShapeStyle,
    pub on_brush: Option<BrushHook>,
}

impl Shape {
    pub fn new(id: impl Into<ShapeId>, kind: impl Into<ShapeKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            zlevel: 0,
            invisible: false,
            hoverable: true,
            position: Point::ZERO,
            rotation: 0.0,
            scale: (1.0, 1.0),
            style: ShapeStyle::default(),
            on_brush: None,
        }
    }

    pub fn with_zlevel(mut self, zlevel: ZLevel) -> Self {
        self.zlevel = zlevel;
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = (sx, sy);
        self
    }

    pub fn with_on_brush(mut self, hook: BrushHook) -> Self {
        self.on_brush = Some(hook);
        self
    }

    pub fn invisible(mut self, invisible: bool) -> Self {
        self.invisible = invisible;
        self
    }

    pub fn hoverable(mut self, hoverable: bool) -> Self {
        self.hoverable = hoverable;
        self
    }

    /// Local-to-parent transform: translate, then rotate, then scale.
    pub fn transform(&self) -> Transform2D {
        Transform2D::translate(self.position.x, self.position.y)
            .then_apply(&Transform2D::rotate(self.rotation))
            .then_apply(&Transform2D::scale(self.scale.0, self.scale.1))
    }

    /// True when the local transform is the identity
    pub fn needs_transform(&self) -> bool {
        self.position != Point::ZERO || self.rotation != 0.0 || self.scale != (1.0, 1.0)
    }

    /// Apply a partial update. The id is not touched.
    pub fn apply(&mut self, delta: ShapeDelta) {
        if let Some(zlevel) = delta.zlevel {
            self.zlevel = zlevel;
        }
        if let Some(invisible) = delta.invisible {
            self.invisible = invisible;
        }
        if let Some(hoverable) = delta.hoverable {
            self.hoverable = hoverable;
        }
        if let Some(position) = delta.position {
            self.position = position;
        }
        if let Some(rotation) = delta.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = delta.scale {
            self.scale = scale;
        }
        if let Some(style) = delta.style {
            self.style = style;
        }
    }
}

/// Partial update for a stored shape; `None` fields are left alone
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeDelta {
    pub id: ShapeId,
    pub zlevel: Option<ZLevel>,
    pub invisible: Option<bool>,
    pub hoverable: Option<bool>,
    pub position: Option<Point>,
    pub rotation: Option<f32>,
    pub scale: Option<(f32, f32)>,
    /// Replaces the whole style
    pub style: Option<ShapeStyle>,
}

impl ShapeDelta {
    pub fn new(id: impl Into<ShapeId>) -> Self {
        Self {
            id: id.into(),
            zlevel: None,
            invisible: None,
            hoverable: None,
            position: None,
            rotation: None,
            scale: None,
            style: None,
        }
    }

    pub fn zlevel(mut self, zlevel: ZLevel) -> Self {
        self.zlevel = Some(zlevel);
        self
    }

    pub fn invisible(mut self, invisible: bool) -> Self {
        self.invisible = Some(invisible);
        self
    }

    pub fn hoverable(mut self, hoverable: bool) -> Self {
        self.hoverable = Some(hoverable);
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    pub fn rotation(mut self, rotation: f32) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = Some((sx, sy));
        self
    }

    pub fn style(mut self, style: ShapeStyle) -> Self {
        self.style = Some(style);
        self
    }
}
