//! Strata Render
//!
//! A z-levelled 2D painter. Every z-level gets its own surface, sandwiched
//! between a background surface and a hover overlay; only levels the scene
//! reports dirty are cleared and repainted.
//!
//! # Features
//!
//! - **Surface registry**: lazily grown per-level surfaces, resized in place
//! - **Layer configuration**: persistent clear colors and motion-blur trails
//! - **Incremental refresh**: dirty-level repaint with per-shape error
//!   isolation
//! - **Overlay**: hover repaint and host-ticked loading animations
//! - **Export**: flattened snapshots and single-shape sprites
//!
//! # Example
//!
//! ```rust
//! use strata_core::{MemoryScene, Shape, ShapeKind, ShapeRegistry, ShapeStyle};
//! use strata_paint::Color;
//! use strata_render::{FixedContainer, Painter, PainterConfig, SurfaceId};
//!
//! let mut scene = MemoryScene::new();
//! scene.add(
//!     Shape::new("box", ShapeKind::RECTANGLE)
//!         .with_zlevel(1)
//!         .with_style(ShapeStyle::rect(0.0, 0.0, 4.0, 4.0).with_color(Color::RED)),
//! );
//!
//! let mut painter = Painter::new(
//!     FixedContainer::new(8.0, 8.0),
//!     scene,
//!     ShapeRegistry::with_builtins(),
//!     PainterConfig::default(),
//! )
//! .unwrap();
//!
//! let stats = painter.render().unwrap();
//! assert_eq!(stats.shapes_painted, 1);
//! assert_eq!(painter.surface(SurfaceId::Level(1)).unwrap().pixel(0, 0), Some([255, 0, 0, 255]));
//! ```

pub mod clear;
pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod export;
pub mod layers;
pub mod overlay;
pub mod painter;
pub mod surfaces;

pub use clear::Compositor;
pub use config::{LoadingDefaults, PainterConfig};
pub use effect::{EffectHandle, LoadingEffect, LoadingOptions, OverlayHooks, RingEffect};
pub use engine::PaintStats;
pub use error::{RenderError, Result};
pub use layers::{LayerConfig, LayerConfigStore};
pub use overlay::OverlayManager;
pub use painter::Painter;
pub use surfaces::{
    DirectSurfaceStrategy, FixedContainer, HostContainer, ShimSurfaceStrategy, SurfaceBackend, SurfaceId,
    SurfaceRegistry, SurfaceStrategy,
};
