//! Per-level configuration
//!
//! Each main surface can carry a persistent clear color and a motion-blur
//! trail. Configuration merges: a later call only overrides the fields it
//! sets.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strata_paint::Color;

use crate::surfaces::SurfaceId;

/// Settings for one surface
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Fill color used instead of erasing to transparent
    pub clear_color: Option<Color>,
    pub motion_blur: Option<bool>,
    /// Opacity of the previous frame when motion blur is on
    pub last_frame_alpha: Option<f32>,
}

impl LayerConfig {
    pub const DEFAULT_TRAIL_ALPHA: f32 = 0.7;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = Some(color);
        self
    }

    pub fn with_motion_blur(mut self, enabled: bool) -> Self {
        self.motion_blur = Some(enabled);
        self
    }

    pub fn with_last_frame_alpha(mut self, alpha: f32) -> Self {
        self.last_frame_alpha = Some(alpha);
        self
    }

    /// Copy every field `other` sets over this one.
    pub fn merge(&mut self, other: &LayerConfig) {
        if other.clear_color.is_some() {
            self.clear_color = other.clear_color;
        }
        if other.motion_blur.is_some() {
            self.motion_blur = other.motion_blur;
        }
        if other.last_frame_alpha.is_some() {
            self.last_frame_alpha = other.last_frame_alpha;
        }
    }

    pub fn motion_blur_enabled(&self) -> bool {
        self.motion_blur.unwrap_or(false)
    }

    pub fn trail_alpha(&self) -> f32 {
        self.last_frame_alpha
            .unwrap_or(Self::DEFAULT_TRAIL_ALPHA)
            .clamp(0.0, 1.0)
    }
}

/// Layer configurations keyed by surface
#[derive(Debug, Default)]
pub struct LayerConfigStore {
    configs: FxHashMap<SurfaceId, LayerConfig>,
}

impl LayerConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `config` into the entry for `id`. The hover overlay never takes
    /// configuration; returns `false` for it.
    pub fn configure(&mut self, id: SurfaceId, config: &LayerConfig) -> bool {
        if id == SurfaceId::Hover {
            tracing::warn!("hover surface does not take layer configuration; ignored");
            return false;
        }
        self.configs.entry(id).or_default().merge(config);
        true
    }

    pub fn get(&self, id: SurfaceId) -> Option<&LayerConfig> {
        self.configs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
