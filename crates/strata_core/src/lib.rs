//! Strata Core
//!
//! The painter's collaborators, as interfaces plus small reference
//! implementations:
//!
//! - **Shapes**: the fixed-schema [`Shape`] record the painter traverses
//! - **Dirty tracking**: [`DirtySet`], either every level or a set of levels
//! - **Scene store**: the [`SceneStore`] trait and the in-memory [`MemoryScene`]
//! - **Shape registry**: kind-to-[`PaintRoutine`] lookup with built-in
//!   `rectangle`, `circle` and `image` routines
//!
//! # Example
//!
//! ```rust
//! use strata_core::{MemoryScene, SceneStore, Shape, ShapeKind, ShapeStyle};
//! use strata_paint::Color;
//!
//! let mut scene = MemoryScene::new();
//! scene.add(
//!     Shape::new("bg", ShapeKind::RECTANGLE)
//!         .with_zlevel(2)
//!         .with_style(ShapeStyle::rect(0.0, 0.0, 10.0, 10.0).with_color(Color::RED)),
//! );
//!
//! assert_eq!(scene.max_zlevel(), 2);
//! assert!(scene.dirty_zlevels().contains(2));
//! ```

pub mod dirty;
pub mod error;
pub mod memory;
pub mod queue;
pub mod registry;
pub mod routines;
pub mod scene;
pub mod shape;

pub use dirty::DirtySet;
pub use error::BrushError;
pub use memory::MemoryScene;
pub use queue::UpdateQueue;
pub use registry::{PaintRoutine, ShapeRegistry};
pub use scene::{SceneStore, ShapeSet, TraversalOrder};
pub use shape::{BrushHook, ImageData, Shape, ShapeDelta, ShapeId, ShapeKind, ShapeStyle, ZLevel};
