//! Shape registry
//!
//! Maps a [`ShapeKind`] to the routine that knows how to draw it.

use rustc_hash::FxHashMap;
use strata_paint::Surface;

use crate::error::BrushError;
use crate::queue::UpdateQueue;
use crate::routines::{CircleRoutine, ImageRoutine, RectangleRoutine};
use crate::shape::{Shape, ShapeKind};

/// Draws one kind of shape onto a surface.
///
/// `is_hover` is set during the hover pass. Routines that want to change the
/// scene push a delta onto `updates` instead of mutating it directly.
pub trait PaintRoutine {
    fn brush(
        &self,
        surface: &mut Surface,
        shape: &Shape,
        is_hover: bool,
        updates: &mut UpdateQueue,
    ) -> Result<(), BrushError>;
}

impl<F> PaintRoutine for F
where
    F: Fn(&mut Surface, &Shape, bool, &mut UpdateQueue) -> Result<(), BrushError>,
{
    fn brush(
        &self,
        surface: &mut Surface,
        shape: &Shape,
        is_hover: bool,
        updates: &mut UpdateQueue,
    ) -> Result<(), BrushError> {
        self(surface, shape, is_hover, updates)
    }
}

#[derive(Default)]
pub struct ShapeRegistry {
    routines: FxHashMap<ShapeKind, Box<dyn PaintRoutine>>,
}

impl ShapeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the `rectangle`, `circle` and `image` routines
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ShapeKind::RECTANGLE, RectangleRoutine);
        registry.register(ShapeKind::CIRCLE, CircleRoutine);
        registry.register(ShapeKind::IMAGE, ImageRoutine);
        registry
    }

    /// Register a routine, replacing any previous one for `kind`.
    pub fn register(&mut self, kind: impl Into<ShapeKind>, routine: impl PaintRoutine + 'static) {
        let kind = kind.into();
        tracing::debug!("registered paint routine for '{}'", kind);
        self.routines.insert(kind, Box::new(routine));
    }

    pub fn resolve(&self, kind: &ShapeKind) -> Option<&dyn PaintRoutine> {
        self.routines.get(kind).map(|routine| routine.as_ref())
    }

    pub fn contains(&self, kind: &ShapeKind) -> bool {
        self.routines.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

impl std::fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.routines.keys()).finish()
    }
}
