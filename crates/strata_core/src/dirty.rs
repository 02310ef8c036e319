//! Dirty z-level tracking

use std::collections::BTreeSet;

use crate::shape::ZLevel;

/// Which levels need repainting
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirtySet {
    /// Every level, including ones that don't exist yet
    All,
    Levels(BTreeSet<ZLevel>),
}

impl Default for DirtySet {
    fn default() -> Self {
        Self::Levels(BTreeSet::new())
    }
}

impl DirtySet {
    pub fn contains(&self, zlevel: ZLevel) -> bool {
        match self {
            Self::All => true,
            Self::Levels(levels) => levels.contains(&zlevel),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Levels(levels) => levels.is_empty(),
        }
    }

    /// No-op once everything is dirty.
    pub fn insert(&mut self, zlevel: ZLevel) {
        if let Self::Levels(levels) = self {
            levels.insert(zlevel);
        }
    }

    pub fn mark_all(&mut self) {
        *self = Self::All;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl FromIterator<ZLevel> for DirtySet {
    fn from_iter<I: IntoIterator<Item = ZLevel>>(iter: I) -> Self {
        Self::Levels(iter.into_iter().collect())
    }
}
