//! Built-in paint routines
//!
//! All three follow the same shape: save the surface state, apply the shape
//! transform and opacity, draw, restore.

use strata_paint::{Point, Rect, Surface};

use crate::error::BrushError;
use crate::queue::UpdateQueue;
use crate::registry::PaintRoutine;
use crate::shape::Shape;

fn with_shape_state(
    surface: &mut Surface,
    shape: &Shape,
    draw: impl FnOnce(&mut Surface) -> Result<(), BrushError>,
) -> Result<(), BrushError> {
    surface.save();
    if shape.needs_transform() {
        surface.transform(shape.transform());
    }
    if let Some(opacity) = shape.style.opacity {
        let alpha = surface.state().global_alpha * opacity.clamp(0.0, 1.0);
        surface.set_global_alpha(alpha);
    }
    let result = draw(surface);
    surface.restore();
    result
}

/// `style.{x, y, width, height}` filled with `color`, outlined with
/// `stroke_color`
#[derive(Clone, Copy, Debug, Default)]
pub struct RectangleRoutine;

impl PaintRoutine for RectangleRoutine {
    fn brush(
        &self,
        surface: &mut Surface,
        shape: &Shape,
        _is_hover: bool,
        _updates: &mut UpdateQueue,
    ) -> Result<(), BrushError> {
        let style = &shape.style;
        let rect = Rect::new(style.x, style.y, style.width, style.height);
        with_shape_state(surface, shape, |surface| {
            if let Some(color) = style.color {
                surface.fill_rect(rect, color);
            }
            if let Some(stroke) = style.stroke_color {
                surface.stroke_rect(rect, stroke, style.line_width.max(1.0));
            }
            Ok(())
        })
    }
}

/// Disc centered on `style.{x, y}` with `style.radius`
#[derive(Clone, Copy, Debug, Default)]
pub struct CircleRoutine;

impl PaintRoutine for CircleRoutine {
    fn brush(
        &self,
        surface: &mut Surface,
        shape: &Shape,
        _is_hover: bool,
        _updates: &mut UpdateQueue,
    ) -> Result<(), BrushError> {
        let style = &shape.style;
        let Some(color) = style.color else {
            return Ok(());
        };
        with_shape_state(surface, shape, |surface| {
            surface.fill_circle(Point::new(style.x, style.y), style.radius, color);
            Ok(())
        })
    }
}

/// Encoded image at `style.{x, y}`. A zero width or height falls back to the
/// image's own size.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageRoutine;

impl PaintRoutine for ImageRoutine {
    fn brush(
        &self,
        surface: &mut Surface,
        shape: &Shape,
        _is_hover: bool,
        _updates: &mut UpdateQueue,
    ) -> Result<(), BrushError> {
        let style = &shape.style;
        let data = style
            .image
            .as_ref()
            .ok_or_else(|| BrushError::MissingImage(shape.id.clone()))?;
        let image = data.decoded()?;

        let width = if style.width > 0.0 { style.width } else { image.width() as f32 };
        let height = if style.height > 0.0 { style.height } else { image.height() as f32 };
        let dest = Rect::new(style.x, style.y, width, height);

        with_shape_state(surface, shape, |surface| {
            surface.draw_image(image, dest);
            Ok(())
        })
    }
}
