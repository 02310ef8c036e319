//! The painter
//!
//! Decides what to clear, what to redraw and onto which surface. Shapes live
//! in the scene store; the painter only reads them, writes back deltas and
//! owns the surfaces they are drawn on.
//!
//! # Frame flow
//!
//! ```text
//! render()  -> ensure levels -> clear every main level -> paint all shapes
//! refresh() -> ensure levels -> clear dirty levels      -> paint dirty shapes
//! update()  -> merge deltas  -> refresh()
//! ```
//!
//! Deltas that paint routines queue during a pass are merged afterwards and
//! get exactly one follow-up refresh. Whatever that follow-up queues waits
//! for the next call.

use strata_core::{DirtySet, SceneStore, ShapeDelta, ShapeRegistry, UpdateQueue};
use strata_paint::{Size, Surface};

use crate::clear::Compositor;
use crate::config::PainterConfig;
use crate::effect::{LoadingEffect, LoadingOptions, OverlayEvent};
use crate::engine::{self, BrushPass, PaintStats};
use crate::error::Result;
use crate::layers::{LayerConfig, LayerConfigStore};
use crate::overlay::OverlayManager;
use crate::surfaces::{HostContainer, SurfaceId, SurfaceRegistry};

pub struct Painter<S: SceneStore> {
    pub(crate) host: Box<dyn HostContainer>,
    pub(crate) scene: S,
    pub(crate) registry: ShapeRegistry,
    pub(crate) surfaces: SurfaceRegistry,
    pub(crate) layers: LayerConfigStore,
    pub(crate) compositor: Compositor,
    pub(crate) updates: UpdateQueue,
    pub(crate) overlay: OverlayManager,
    /// Reused by `shape_to_image`
    pub(crate) sprite: Option<Surface>,
    pub(crate) catch_brush_errors: bool,
}

impl<S: SceneStore> Painter<S> {
    /// Mount a painter in `host`, allocating surfaces for every level the
    /// scene already uses.
    pub fn new(
        host: impl HostContainer + 'static,
        scene: S,
        registry: ShapeRegistry,
        config: PainterConfig,
    ) -> Result<Self> {
        let size = host.content_size();
        let surfaces = SurfaceRegistry::new(
            config.surface_backend.strategy(),
            size,
            config.device_pixel_ratio,
            scene.max_zlevel(),
        );

        let mut layers = LayerConfigStore::new();
        for (id, layer) in config.layer_entries()? {
            layers.configure(id, &layer);
        }

        Ok(Self {
            host: Box::new(host),
            scene,
            registry,
            surfaces,
            layers,
            compositor: Compositor::new(),
            updates: UpdateQueue::new(),
            overlay: OverlayManager::new(config.loading.to_options()),
            sprite: None,
            catch_brush_errors: config.catch_brush_errors,
        })
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Full repaint. Stops a running loading animation first.
    pub fn render(&mut self) -> Result<PaintStats> {
        if self.is_loading() {
            self.hide_loading();
        }
        self.merge_pending();
        self.surfaces.ensure_levels(self.scene.max_zlevel());

        let mut stats = PaintStats {
            levels_cleared: self.clear_main_levels(),
            ..Default::default()
        };
        stats += self.paint(&DirtySet::All)?;
        self.scene.clear_dirty();

        if !self.updates.is_empty() {
            stats += self.refresh_once()?;
        }
        Ok(stats)
    }

    /// Repaint only the levels the scene reports dirty.
    pub fn refresh(&mut self) -> Result<PaintStats> {
        let mut stats = self.refresh_once()?;
        if !self.updates.is_empty() {
            stats += self.refresh_once()?;
        }
        Ok(stats)
    }

    /// Merge `deltas` into the scene, then refresh.
    pub fn update(&mut self, deltas: impl IntoIterator<Item = ShapeDelta>) -> Result<PaintStats> {
        // Queued deltas are older than the caller's
        self.merge_pending();
        for delta in deltas {
            self.scene.merge_shape(delta);
        }
        self.refresh()
    }

    fn refresh_once(&mut self) -> Result<PaintStats> {
        self.merge_pending();
        self.surfaces.ensure_levels(self.scene.max_zlevel());

        let dirty = self.scene.dirty_zlevels();
        let mut stats = PaintStats::default();
        match &dirty {
            DirtySet::All => stats.levels_cleared = self.clear_main_levels(),
            DirtySet::Levels(levels) => {
                for &z in levels {
                    if self.surfaces.contains(SurfaceId::Level(z)) {
                        self.clear_layer(SurfaceId::Level(z));
                        stats.levels_cleared += 1;
                    }
                }
            }
        }

        stats += self.paint(&dirty)?;
        self.scene.clear_dirty();
        Ok(stats)
    }

    fn paint(&mut self, dirty: &DirtySet) -> Result<PaintStats> {
        let mut pass = BrushPass::new(&self.registry, &mut self.updates, self.catch_brush_errors);
        engine::paint_levels(&self.scene, &mut self.surfaces, &mut pass, dirty)?;
        Ok(pass.stats)
    }

    /// Merge deltas queued by paint routines.
    fn merge_pending(&mut self) {
        for delta in self.updates.take() {
            self.scene.merge_shape(delta);
        }
    }

    /// Deltas queued by paint routines and not merged yet
    pub fn pending_updates(&self) -> usize {
        self.updates.len()
    }

    // ========================================================================
    // Clearing
    // ========================================================================

    /// Clear background and every level; the hover overlay is left alone.
    pub fn clear(&mut self) {
        self.clear_main_levels();
    }

    fn clear_main_levels(&mut self) -> usize {
        let ids: Vec<SurfaceId> = self.surfaces.main_ids().collect();
        for &id in &ids {
            self.clear_layer(id);
        }
        ids.len()
    }

    /// Clear one surface according to its layer configuration.
    pub fn clear_layer(&mut self, id: impl Into<SurfaceId>) {
        let id = id.into();
        if id == SurfaceId::Hover {
            self.clear_hover();
            return;
        }
        let Some(surface) = self.surfaces.get_mut(id) else {
            tracing::warn!("can not clear {}: no such surface", id);
            return;
        };
        self.compositor.clear_surface(id, surface, self.layers.get(id));
    }

    pub fn clear_hover(&mut self) {
        self.surfaces.hover_mut().clear();
    }

    /// Merge `config` into the settings for `id`.
    pub fn configure_layer(&mut self, id: impl Into<SurfaceId>, config: LayerConfig) {
        self.layers.configure(id.into(), &config);
    }

    pub fn layer_config(&self, id: impl Into<SurfaceId>) -> Option<&LayerConfig> {
        self.layers.get(id.into())
    }

    // ========================================================================
    // Hover and loading
    // ========================================================================

    /// Redraw the hover set onto the overlay, then empty the set.
    pub fn refresh_hover(&mut self) -> Result<PaintStats> {
        self.clear_hover();
        let mut pass = BrushPass::new(&self.registry, &mut self.updates, self.catch_brush_errors);
        let outcome = engine::paint_hover(&self.scene, self.surfaces.hover_mut(), &mut pass);
        let stats = pass.stats;
        self.scene.discard_hover_shapes();
        outcome.map(|()| stats)
    }

    /// Start a loading animation, replacing any running one. Unset options
    /// come from the configured defaults. The previous animation is taken off
    /// the overlay even when the new one fails to start.
    pub fn show_loading(&mut self, options: LoadingOptions) -> Result<()> {
        if self.is_loading() {
            self.hide_loading();
        }
        let size = self.surfaces.size();
        self.overlay.start(options, size)?;
        self.pump_overlay()?;
        Ok(())
    }

    /// Stop the animation and clear the overlay.
    pub fn hide_loading(&mut self) {
        self.overlay.stop();
        self.clear_hover();
    }

    pub fn is_loading(&self) -> bool {
        self.overlay.is_loading()
    }

    pub fn register_effect(&mut self, name: impl Into<String>, effect: impl LoadingEffect + 'static) {
        self.overlay.register_effect(name, effect);
    }

    /// Replay what effects queued: hover shapes go into the scene, each
    /// repaint request redraws the overlay. Returns the number of repaints.
    pub fn pump_overlay(&mut self) -> Result<usize> {
        let mut repaints = 0;
        for event in self.overlay.drain_events() {
            match event {
                OverlayEvent::AddHover(shape) => self.scene.add_hover(shape),
                OverlayEvent::Repaint => {
                    self.refresh_hover()?;
                    repaints += 1;
                }
            }
        }
        Ok(repaints)
    }

    /// Advance the loading animation one frame and draw it.
    pub fn tick_loading(&mut self) -> Result<usize> {
        if !self.is_loading() {
            return Ok(0);
        }
        self.overlay.tick();
        self.pump_overlay()
    }

    // ========================================================================
    // Size and surfaces
    // ========================================================================

    /// Re-read the host's content size and resize if it changed.
    pub fn resize(&mut self) -> Result<Option<PaintStats>> {
        let size = self.host.content_size();
        self.resize_to(size.width, size.height)
    }

    /// Resize every surface and repaint everything. `None` when the size
    /// didn't change.
    pub fn resize_to(&mut self, width: f32, height: f32) -> Result<Option<PaintStats>> {
        if !self.surfaces.resize_to(width, height) {
            return Ok(None);
        }
        self.compositor.drop_back_buffers();
        self.scene.mark_all_dirty();
        self.refresh().map(Some)
    }

    /// Logical canvas size
    pub fn size(&self) -> Size {
        self.surfaces.size()
    }

    pub fn width(&self) -> f32 {
        self.surfaces.size().width
    }

    pub fn height(&self) -> f32 {
        self.surfaces.size().height
    }

    pub fn hover_surface(&self) -> &Surface {
        self.surfaces.hover()
    }

    pub fn surface(&self, id: impl Into<SurfaceId>) -> Option<&Surface> {
        self.surfaces.get(id.into())
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    /// Every surface flattened in paint order
    pub fn compose(&self) -> Surface {
        self.surfaces.compose()
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ShapeRegistry {
        &mut self.registry
    }

    /// Stop loading and release every surface. Returns the scene.
    pub fn dispose(mut self) -> S {
        if self.is_loading() {
            self.hide_loading();
        }
        let Self {
            scene, surfaces, ..
        } = self;
        surfaces.dispose();
        scene
    }
}

impl<S: SceneStore + std::fmt::Debug> std::fmt::Debug for Painter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Painter")
            .field("scene", &self.scene)
            .field("surfaces", &self.surfaces)
            .field("overlay", &self.overlay)
            .finish()
    }
}
