//! Clear and composite engine
//!
//! Erases one surface according to its layer configuration. A level with
//! motion blur keeps a private back-buffer holding the previous frame, which
//! is composited back over the cleared surface at the trail alpha. Repeated
//! clears without repainting fade the old content geometrically.

use rustc_hash::FxHashMap;
use strata_paint::{CompositeOp, Surface};

use crate::layers::LayerConfig;
use crate::surfaces::SurfaceId;

/// Back-buffer owner
#[derive(Debug, Default)]
pub struct Compositor {
    back_buffers: FxHashMap<SurfaceId, Surface>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear `surface`, identified as `id`, under `config`.
    pub fn clear_surface(&mut self, id: SurfaceId, surface: &mut Surface, config: Option<&LayerConfig>) {
        let Some(config) = config else {
            surface.clear();
            return;
        };

        let blur = config.motion_blur_enabled();
        if blur {
            self.capture_previous_frame(id, surface);
        }

        match config.clear_color {
            Some(color) => {
                surface.save();
                surface.set_global_alpha(1.0);
                surface.set_composite(CompositeOp::SourceOver);
                surface.fill(color);
                surface.restore();
            }
            None => surface.clear(),
        }

        if blur {
            if let Some(back) = self.back_buffers.get(&id) {
                surface.save();
                surface.set_global_alpha(config.trail_alpha());
                surface.set_composite(CompositeOp::SourceOver);
                surface.draw_surface(back);
                surface.restore();
            }
        }
    }

    /// Overwrite the back-buffer for `id` with the pre-clear contents.
    fn capture_previous_frame(&mut self, id: SurfaceId, surface: &Surface) {
        let back = self.back_buffers.entry(id).or_insert_with(|| {
            tracing::debug!("creating back-buffer for {}", id);
            blank_like(surface)
        });
        if back.pixel_size() != surface.pixel_size() {
            *back = blank_like(surface);
        }

        back.save();
        back.set_composite(CompositeOp::Copy);
        back.draw_surface(surface);
        back.restore();
    }

    pub fn back_buffer(&self, id: SurfaceId) -> Option<&Surface> {
        self.back_buffers.get(&id)
    }

    pub fn back_buffer_count(&self) -> usize {
        self.back_buffers.len()
    }

    /// Drop every back-buffer; they come back lazily at the current size.
    pub fn drop_back_buffers(&mut self) {
        self.back_buffers.clear();
    }
}

fn blank_like(surface: &Surface) -> Surface {
    let size = surface.logical_size();
    Surface::new(size.width, size.height, surface.scale_factor())
}
