//! In-memory scene store

use std::ops::ControlFlow;

use indexmap::IndexMap;

use crate::dirty::DirtySet;
use crate::scene::{SceneStore, ShapeSet, TraversalOrder};
use crate::shape::{Shape, ShapeDelta, ShapeId, ZLevel};

/// A [`SceneStore`] backed by an insertion-ordered map.
///
/// Every mutation marks the touched levels dirty. `max_zlevel` only grows;
/// removing the last shape of the top level keeps its surface around.
#[derive(Debug, Default)]
pub struct MemoryScene {
    shapes: IndexMap<ShapeId, Shape>,
    hover: Vec<Shape>,
    dirty: DirtySet,
    max_zlevel: ZLevel,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a shape by id. Returns the replaced shape.
    pub fn add(&mut self, shape: Shape) -> Option<Shape> {
        self.touch(shape.zlevel);
        let previous = self.shapes.insert(shape.id.clone(), shape);
        if let Some(old) = &previous {
            self.dirty.insert(old.zlevel);
        }
        previous
    }

    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        let removed = self.shapes.shift_remove(id)?;
        self.dirty.insert(removed.zlevel);
        Some(removed)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn hover_len(&self) -> usize {
        self.hover.len()
    }

    pub fn hover_shapes(&self) -> &[Shape] {
        &self.hover
    }

    fn touch(&mut self, zlevel: ZLevel) {
        self.dirty.insert(zlevel);
        self.max_zlevel = self.max_zlevel.max(zlevel);
    }
}

impl SceneStore for MemoryScene {
    fn max_zlevel(&self) -> ZLevel {
        self.max_zlevel
    }

    fn visit_shapes(
        &self,
        set: ShapeSet,
        order: TraversalOrder,
        visitor: &mut dyn FnMut(&Shape) -> ControlFlow<()>,
    ) {
        let mut ordered: Vec<&Shape> = match set {
            ShapeSet::Normal => self.shapes.values().collect(),
            ShapeSet::Hover => self.hover.iter().collect(),
        };
        // Stable, so same-level shapes keep insertion order.
        ordered.sort_by_key(|shape| shape.zlevel);
        if order == TraversalOrder::Descending {
            ordered.reverse();
        }

        for shape in ordered {
            if visitor(shape).is_break() {
                break;
            }
        }
    }

    fn dirty_zlevels(&self) -> DirtySet {
        self.dirty.clone()
    }

    fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    fn mark_all_dirty(&mut self) {
        self.dirty.mark_all();
    }

    fn merge_shape(&mut self, delta: ShapeDelta) -> bool {
        let Some(shape) = self.shapes.get_mut(&delta.id) else {
            tracing::debug!("merge for unknown shape '{}' ignored", delta.id);
            return false;
        };
        let old_level = shape.zlevel;
        shape.apply(delta);
        let new_level = shape.zlevel;

        self.dirty.insert(old_level);
        self.touch(new_level);
        true
    }

    fn add_hover(&mut self, shape: Shape) {
        self.hover.push(shape);
    }

    fn discard_hover_shapes(&mut self) {
        self.hover.clear();
    }
}
