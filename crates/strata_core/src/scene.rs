//! Scene store interface
//!
//! The painter never owns shapes. It reads them through [`SceneStore`],
//! writes back partial updates and manages a separate hover set.

use std::ops::ControlFlow;

use crate::dirty::DirtySet;
use crate::shape::{Shape, ShapeDelta, ZLevel};

/// Which collection a traversal walks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeSet {
    Normal,
    Hover,
}

/// Traversal direction over z-levels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Bottom to top; the paint order
    #[default]
    Ascending,
    /// Top to bottom; the hit-test order
    Descending,
}

/// Storage the painter reads shapes from
pub trait SceneStore {
    /// Highest z-level any normal shape has used
    fn max_zlevel(&self) -> ZLevel;

    /// Walk a shape set in z order. Shapes on the same level keep insertion
    /// order. Returning `ControlFlow::Break` stops the walk early.
    fn visit_shapes(
        &self,
        set: ShapeSet,
        order: TraversalOrder,
        visitor: &mut dyn FnMut(&Shape) -> ControlFlow<()>,
    );

    /// Levels changed since the last [`clear_dirty`](Self::clear_dirty)
    fn dirty_zlevels(&self) -> DirtySet;

    fn clear_dirty(&mut self);

    fn mark_all_dirty(&mut self);

    /// Apply a partial update to a stored shape. Returns `false` when the id
    /// is unknown.
    fn merge_shape(&mut self, delta: ShapeDelta) -> bool;

    fn add_hover(&mut self, shape: Shape);

    fn discard_hover_shapes(&mut self);
}
