//! Shape traversal and paint dispatch
//!
//! Free functions over disjoint borrows of the painter, so a traversal can
//! read the scene while writing to surfaces and the update queue.

use std::ops::{AddAssign, ControlFlow};

use strata_core::{BrushError, DirtySet, SceneStore, Shape, ShapeRegistry, ShapeSet, TraversalOrder, UpdateQueue};
use strata_paint::Surface;

use crate::error::{RenderError, Result};
use crate::surfaces::{SurfaceId, SurfaceRegistry};

/// What one render, refresh or update call did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub levels_cleared: usize,
    pub shapes_painted: usize,
    /// Shapes on a dirty level that had no surface
    pub shapes_skipped: usize,
    /// Brush failures isolated and logged
    pub failures: usize,
}

impl AddAssign for PaintStats {
    fn add_assign(&mut self, other: Self) {
        self.levels_cleared += other.levels_cleared;
        self.shapes_painted += other.shapes_painted;
        self.shapes_skipped += other.shapes_skipped;
        self.failures += other.failures;
    }
}

/// Per-traversal dispatch state
pub(crate) struct BrushPass<'a> {
    pub registry: &'a ShapeRegistry,
    pub updates: &'a mut UpdateQueue,
    pub catch_errors: bool,
    pub stats: PaintStats,
}

impl<'a> BrushPass<'a> {
    pub fn new(registry: &'a ShapeRegistry, updates: &'a mut UpdateQueue, catch_errors: bool) -> Self {
        Self {
            registry,
            updates,
            catch_errors,
            stats: PaintStats::default(),
        }
    }

    /// Paint one visible shape: the shape's own hook first, then the
    /// registry routine for its kind.
    pub fn brush(&mut self, surface: &mut Surface, shape: &Shape, is_hover: bool) -> Result<()> {
        if let Some(hook) = &shape.on_brush {
            if hook.call(surface, shape, is_hover) {
                self.stats.shapes_painted += 1;
                return Ok(());
            }
        }

        let result = match self.registry.resolve(&shape.kind) {
            Some(routine) => routine.brush(surface, shape, is_hover, self.updates),
            None => Err(BrushError::UnknownKind(shape.kind.clone())),
        };

        match result {
            Ok(()) => {
                self.stats.shapes_painted += 1;
                Ok(())
            }
            Err(e) if self.catch_errors => {
                tracing::error!(
                    kind = %shape.kind,
                    id = %shape.id,
                    hover = is_hover,
                    "brush error of {}: {}",
                    shape.kind,
                    e
                );
                self.stats.failures += 1;
                Ok(())
            }
            Err(source) => Err(RenderError::Brush {
                kind: shape.kind.clone(),
                id: shape.id.clone(),
                source,
            }),
        }
    }
}

/// Paint every visible shape whose level is in `dirty` onto its level's
/// surface, bottom to top.
pub(crate) fn paint_levels(
    scene: &dyn SceneStore,
    surfaces: &mut SurfaceRegistry,
    pass: &mut BrushPass<'_>,
    dirty: &DirtySet,
) -> Result<()> {
    let mut outcome = Ok(());
    scene.visit_shapes(ShapeSet::Normal, TraversalOrder::Ascending, &mut |shape| {
        if shape.invisible || !dirty.contains(shape.zlevel) {
            return ControlFlow::Continue(());
        }
        let Some(surface) = surfaces.get_mut(SurfaceId::Level(shape.zlevel)) else {
            tracing::warn!(
                zlevel = shape.zlevel,
                id = %shape.id,
                "can not find the surface for z-level {}",
                shape.zlevel
            );
            pass.stats.shapes_skipped += 1;
            return ControlFlow::Continue(());
        };
        match pass.brush(surface, shape, false) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                outcome = Err(e);
                ControlFlow::Break(())
            }
        }
    });
    outcome
}

/// Paint the hover set onto the overlay surface. Shapes that opted out of
/// hover drawing are skipped.
pub(crate) fn paint_hover(scene: &dyn SceneStore, surface: &mut Surface, pass: &mut BrushPass<'_>) -> Result<()> {
    paint_set(scene, ShapeSet::Hover, surface, pass, true)
}

/// Paint every visible shape onto one surface, ignoring levels.
pub(crate) fn paint_flat(scene: &dyn SceneStore, surface: &mut Surface, pass: &mut BrushPass<'_>) -> Result<()> {
    paint_set(scene, ShapeSet::Normal, surface, pass, false)
}

fn paint_set(
    scene: &dyn SceneStore,
    set: ShapeSet,
    surface: &mut Surface,
    pass: &mut BrushPass<'_>,
    is_hover: bool,
) -> Result<()> {
    let mut outcome = Ok(());
    scene.visit_shapes(set, TraversalOrder::Ascending, &mut |shape| {
        if shape.invisible {
            return ControlFlow::Continue(());
        }
        if is_hover && !shape.hoverable {
            pass.stats.shapes_skipped += 1;
            return ControlFlow::Continue(());
        }
        match pass.brush(surface, shape, is_hover) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                outcome = Err(e);
                ControlFlow::Break(())
            }
        }
    });
    outcome
}
