//! Snapshot export
//!
//! Flattens the scene into one offscreen surface and encodes it, or bakes a
//! single shape into an `image` shape.

use strata_core::{ImageData, SceneStore, Shape, ShapeId, ShapeKind, ShapeStyle};
use strata_paint::{Color, ImageFormat, Point, Size, Surface};

use crate::engine::{self, BrushPass};
use crate::error::{RenderError, Result};
use crate::painter::Painter;

impl<S: SceneStore> Painter<S> {
    /// Paint every visible shape, bottom to top, over `background` (white
    /// when `None`) and encode the result. `None` when the surface backend
    /// can't read pixels back.
    pub fn export_image(&mut self, format: ImageFormat, background: Option<Color>) -> Result<Option<Vec<u8>>> {
        if !self.surfaces.strategy().supports_pixel_export() {
            tracing::debug!("export skipped: '{}' surfaces can't be read back", self.surfaces.strategy().name());
            return Ok(None);
        }

        let mut canvas = self.surfaces.create_offscreen();
        canvas.fill(background.unwrap_or(Color::WHITE));

        let mut pass = BrushPass::new(&self.registry, &mut self.updates, self.catch_brush_errors);
        engine::paint_flat(&self.scene, &mut canvas, &mut pass)?;

        Ok(Some(canvas.encode(format)?))
    }

    /// Render `shape` alone, untransformed, into a `width` x `height` PNG and
    /// return an `image` shape with the original transform.
    ///
    /// `shape` is borrowed mutably only while it is drawn; its transform is
    /// restored before returning, even on failure. Returns a clone of the
    /// input when the surface backend can't read pixels back.
    pub fn shape_to_image(
        &mut self,
        id: impl Into<ShapeId>,
        shape: &mut Shape,
        width: f32,
        height: f32,
    ) -> Result<Shape> {
        if !self.surfaces.strategy().supports_pixel_export() {
            return Ok(shape.clone());
        }

        let sprite = sprite_surface(&mut self.sprite, width, height, self.surfaces.device_pixel_ratio());

        let saved = (shape.position, shape.rotation, shape.scale);
        shape.position = Point::ZERO;
        shape.rotation = 0.0;
        shape.scale = (1.0, 1.0);

        let drawn = match self.registry.resolve(&shape.kind) {
            Some(routine) => routine
                .brush(sprite, shape, false, &mut self.updates)
                .map_err(|source| RenderError::Brush {
                    kind: shape.kind.clone(),
                    id: shape.id.clone(),
                    source,
                }),
            None => Ok(()),
        };

        (shape.position, shape.rotation, shape.scale) = saved;
        drawn?;

        let bytes = sprite.encode(ImageFormat::Png)?;
        let mut image = Shape::new(id, ShapeKind::IMAGE)
            .with_zlevel(shape.zlevel)
            .with_style(ShapeStyle::rect(0.0, 0.0, width, height).with_image(ImageData::new(ImageFormat::Png, bytes)));
        image.position = shape.position;
        image.rotation = shape.rotation;
        image.scale = shape.scale;
        Ok(image)
    }
}

/// The reusable sprite surface, cleared and sized to `width` x `height`.
fn sprite_surface(slot: &mut Option<Surface>, width: f32, height: f32, dpr: f32) -> &mut Surface {
    let sprite = slot.get_or_insert_with(|| Surface::new(width, height, dpr));
    if sprite.logical_size() != Size::new(width, height) {
        sprite.resize(width, height);
    } else {
        sprite.clear();
    }
    sprite
}
