//! Surface registry
//!
//! One surface per z-level, plus a background surface below them and a
//! hover overlay above them. Surfaces are created once per identity and
//! resized in place.
//!
//! ```text
//!   Hover          <- always topmost, repainted on its own
//!   Level(max)
//!   ...
//!   Level(0)
//!   Background
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strata_core::ZLevel;
use strata_paint::{Size, Surface};

/// Identity of a painter-owned surface.
///
/// The derived ordering is the paint order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceId {
    Background,
    Level(ZLevel),
    Hover,
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => f.write_str("background"),
            Self::Level(z) => write!(f, "level {}", z),
            Self::Hover => f.write_str("hover"),
        }
    }
}

impl From<ZLevel> for SurfaceId {
    fn from(z: ZLevel) -> Self {
        Self::Level(z)
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// How surfaces are created, and what the backend can do with them
pub trait SurfaceStrategy {
    fn name(&self) -> &'static str;

    fn create_surface(&self, size: Size, device_pixel_ratio: f32) -> Surface;

    /// Whether pixels can be read back for export
    fn supports_pixel_export(&self) -> bool {
        true
    }
}

/// Native surfaces at the configured device pixel ratio
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectSurfaceStrategy;

impl SurfaceStrategy for DirectSurfaceStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn create_surface(&self, size: Size, device_pixel_ratio: f32) -> Surface {
        Surface::new(size.width, size.height, device_pixel_ratio)
    }
}

/// Compatibility shim for hosts without a native raster target.
///
/// Surfaces are always 1:1 with logical pixels and can't be exported.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShimSurfaceStrategy;

impl SurfaceStrategy for ShimSurfaceStrategy {
    fn name(&self) -> &'static str {
        "shim"
    }

    fn create_surface(&self, size: Size, _device_pixel_ratio: f32) -> Surface {
        Surface::new(size.width, size.height, 1.0)
    }

    fn supports_pixel_export(&self) -> bool {
        false
    }
}

/// Backend selection, as written in configuration files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceBackend {
    #[default]
    Direct,
    Shim,
}

impl SurfaceBackend {
    pub fn strategy(self) -> Box<dyn SurfaceStrategy> {
        match self {
            Self::Direct => Box::new(DirectSurfaceStrategy),
            Self::Shim => Box::new(ShimSurfaceStrategy),
        }
    }
}

// ============================================================================
// Host container
// ============================================================================

/// Whatever the painter is mounted in.
///
/// `content_size` is the drawable area; padding is already subtracted.
pub trait HostContainer {
    fn content_size(&self) -> Size;
}

impl<T: HostContainer + ?Sized> HostContainer for Rc<T> {
    fn content_size(&self) -> Size {
        (**self).content_size()
    }
}

/// A container with a size set by hand, for headless rendering and tests
#[derive(Debug)]
pub struct FixedContainer {
    size: Cell<Size>,
}

impl FixedContainer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Cell::new(Size::new(width, height)),
        }
    }

    pub fn set_size(&self, width: f32, height: f32) {
        self.size.set(Size::new(width, height));
    }
}

impl HostContainer for FixedContainer {
    fn content_size(&self) -> Size {
        self.size.get()
    }
}

// ============================================================================
// Registry
// ============================================================================

pub struct SurfaceRegistry {
    strategy: Box<dyn SurfaceStrategy>,
    size: Size,
    device_pixel_ratio: f32,
    background: Surface,
    /// Indexed by z-level; always holds `0..=max_level`
    levels: Vec<Surface>,
    hover: Surface,
}

impl SurfaceRegistry {
    /// Allocate background, levels `0..=max_level` and hover.
    pub fn new(
        strategy: Box<dyn SurfaceStrategy>,
        size: Size,
        device_pixel_ratio: f32,
        max_level: ZLevel,
    ) -> Self {
        let background = strategy.create_surface(size, device_pixel_ratio);
        let hover = strategy.create_surface(size, device_pixel_ratio);
        let mut registry = Self {
            strategy,
            size,
            device_pixel_ratio,
            background,
            levels: Vec::new(),
            hover,
        };
        registry.allocate_through(max_level);
        tracing::debug!(
            "surface registry created: {}x{} @{} ({}), levels 0..={}",
            size.width,
            size.height,
            device_pixel_ratio,
            registry.strategy.name(),
            max_level
        );
        registry
    }

    /// Highest allocated z-level
    pub fn max_level(&self) -> ZLevel {
        self.levels.len().saturating_sub(1) as ZLevel
    }

    /// Allocate any missing levels up to `required_max`. Returns how many
    /// surfaces were created; zero when `required_max` is already covered.
    pub fn ensure_levels(&mut self, required_max: ZLevel) -> usize {
        if required_max <= self.max_level() {
            return 0;
        }
        let created = self.allocate_through(required_max);
        tracing::debug!("allocated {} surface(s), max level now {}", created, required_max);
        created
    }

    fn allocate_through(&mut self, max_level: ZLevel) -> usize {
        let target = max_level as usize + 1;
        let mut created = 0;
        while self.levels.len() < target {
            self.levels
                .push(self.strategy.create_surface(self.size, self.device_pixel_ratio));
            created += 1;
        }
        created
    }

    /// Resize every surface when the size actually changed. Returns `false`
    /// (and touches nothing) otherwise.
    pub fn resize_to(&mut self, width: f32, height: f32) -> bool {
        if self.size.width == width && self.size.height == height {
            return false;
        }
        self.size = Size::new(width, height);
        self.background.resize(width, height);
        self.hover.resize(width, height);
        for surface in &mut self.levels {
            surface.resize(width, height);
        }
        tracing::debug!("resized {} surface(s) to {}x{}", self.levels.len() + 2, width, height);
        true
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn strategy(&self) -> &dyn SurfaceStrategy {
        self.strategy.as_ref()
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        match id {
            SurfaceId::Background => Some(&self.background),
            SurfaceId::Level(z) => self.levels.get(z as usize),
            SurfaceId::Hover => Some(&self.hover),
        }
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        match id {
            SurfaceId::Background => Some(&mut self.background),
            SurfaceId::Level(z) => self.levels.get_mut(z as usize),
            SurfaceId::Hover => Some(&mut self.hover),
        }
    }

    pub fn hover(&self) -> &Surface {
        &self.hover
    }

    pub fn hover_mut(&mut self) -> &mut Surface {
        &mut self.hover
    }

    /// Background and every level, bottom to top; hover excluded
    pub fn main_ids(&self) -> impl Iterator<Item = SurfaceId> {
        std::iter::once(SurfaceId::Background)
            .chain((0..self.levels.len() as ZLevel).map(SurfaceId::Level))
    }

    /// Every surface, bottom to top
    pub fn paint_order(&self) -> SmallVec<[SurfaceId; 8]> {
        let mut order: SmallVec<[SurfaceId; 8]> = self.main_ids().collect();
        order.push(SurfaceId::Hover);
        order
    }

    /// A fresh surface matching the registry's size and strategy
    pub fn create_offscreen(&self) -> Surface {
        self.strategy.create_surface(self.size, self.device_pixel_ratio)
    }

    /// Flatten every surface in paint order into one frame.
    pub fn compose(&self) -> Surface {
        let mut frame = self.create_offscreen();
        for id in self.paint_order() {
            if let Some(surface) = self.get(id) {
                frame.draw_surface(surface);
            }
        }
        frame
    }

    pub fn surface_count(&self) -> usize {
        self.levels.len() + 2
    }

    /// Release every surface.
    pub fn dispose(self) {
        tracing::debug!("disposing {} surface(s)", self.surface_count());
    }
}

impl fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRegistry")
            .field("strategy", &self.strategy.name())
            .field("size", &self.size)
            .field("device_pixel_ratio", &self.device_pixel_ratio)
            .field("max_level", &self.max_level())
            .finish()
    }
}
