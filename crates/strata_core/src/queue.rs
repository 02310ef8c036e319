//! Deferred shape updates
//!
//! Paint routines can't mutate the scene mid-traversal, so they queue
//! [`ShapeDelta`]s here. The painter merges the queue into the store once the
//! traversal ends.

use crate::shape::ShapeDelta;

#[derive(Debug, Default)]
pub struct UpdateQueue {
    pending: Vec<ShapeDelta>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, delta: ShapeDelta) {
        self.pending.push(delta);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every queued update, oldest first.
    pub fn take(&mut self) -> Vec<ShapeDelta> {
        std::mem::take(&mut self.pending)
    }
}
