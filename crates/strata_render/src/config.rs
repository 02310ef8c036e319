//! Painter configuration file handling
//!
//! ```toml
//! device_pixel_ratio = 2.0
//! catch_brush_errors = true
//! surface_backend = "direct"
//!
//! [loading]
//! effect = "ring"
//! background_color = "rgba(255, 255, 255, 0.8)"
//!
//! [background]
//! clear_color = "#202020"
//!
//! [layers.1]
//! motion_blur = true
//! last_frame_alpha = 0.6
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::ZLevel;
use strata_paint::Color;

use crate::effect::LoadingOptions;
use crate::error::{RenderError, Result};
use crate::layers::LayerConfig;
use crate::surfaces::{SurfaceBackend, SurfaceId};

/// Default file name looked up by [`PainterConfig::load_from_dir`]
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Top-level painter configuration (strata.toml)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PainterConfig {
    /// Physical pixels per logical pixel
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f32,
    /// Log and skip shapes whose paint routine fails, instead of aborting
    #[serde(default = "default_true")]
    pub catch_brush_errors: bool,
    #[serde(default)]
    pub surface_backend: SurfaceBackend,
    #[serde(default)]
    pub loading: LoadingDefaults,
    /// Configuration for the background surface
    #[serde(default)]
    pub background: Option<LayerConfig>,
    /// Initial layer configuration, keyed by z-level
    #[serde(default)]
    pub layers: BTreeMap<String, LayerConfig>,
}

fn default_device_pixel_ratio() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: default_device_pixel_ratio(),
            catch_brush_errors: true,
            surface_backend: SurfaceBackend::default(),
            loading: LoadingDefaults::default(),
            background: None,
            layers: BTreeMap::new(),
        }
    }
}

/// Defaults merged under the options passed to `show_loading`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoadingDefaults {
    #[serde(default = "default_effect")]
    pub effect: String,
    #[serde(default = "default_loading_background")]
    pub background_color: Color,
    #[serde(default = "default_text_color")]
    pub text_color: Color,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_effect() -> String {
    "ring".to_string()
}

fn default_loading_background() -> Color {
    Color::new(1.0, 1.0, 1.0, 0.8)
}

fn default_text_color() -> Color {
    Color::rgb(0.2, 0.2, 0.2)
}

fn default_font_size() -> f32 {
    12.0
}

impl Default for LoadingDefaults {
    fn default() -> Self {
        Self {
            effect: default_effect(),
            background_color: default_loading_background(),
            text_color: default_text_color(),
            font_size: default_font_size(),
        }
    }
}

impl LoadingDefaults {
    pub fn to_options(&self) -> LoadingOptions {
        LoadingOptions {
            background_color: Some(self.background_color),
            text_color: Some(self.text_color),
            font_size: Some(self.font_size),
            effect: Some(self.effect.clone()),
            ..Default::default()
        }
    }
}

impl PainterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load `strata.toml` from a directory, or the defaults when there is
    /// none.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            tracing::debug!("no {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            return Ok(Self::default());
        }
        Self::load(config_path)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RenderError::InvalidConfig(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if !(self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "device_pixel_ratio must be positive, got {}",
                self.device_pixel_ratio
            )));
        }
        self.layer_entries().map(|_| ())
    }

    /// Every configured surface with its settings; `[layers]` keys must be
    /// z-levels.
    pub fn layer_entries(&self) -> Result<Vec<(SurfaceId, LayerConfig)>> {
        let mut entries = Vec::with_capacity(self.layers.len() + 1);
        if let Some(background) = &self.background {
            entries.push((SurfaceId::Background, background.clone()));
        }
        for (key, config) in &self.layers {
            let zlevel: ZLevel = key.trim().parse().map_err(|_| {
                RenderError::InvalidConfig(format!("layer key '{}' is not a z-level", key))
            })?;
            entries.push((SurfaceId::Level(zlevel), config.clone()));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = PainterConfig::from_toml_str("").unwrap();
        assert_eq!(config, PainterConfig::default());
        assert_eq!(config.loading.effect, "ring");
        assert!(config.catch_brush_errors);
    }

    #[test]
    fn test_full_config() {
        let config = PainterConfig::from_toml_str(
            r##"
            device_pixel_ratio = 2.0
            catch_brush_errors = false
            surface_backend = "shim"

            [loading]
            effect = "pulse"
            font_size = 16.0

            [background]
            clear_color = "#202020"

            [layers.3]
            motion_blur = true
            last_frame_alpha = 0.5
            "##,
        )
        .unwrap();

        assert_eq!(config.device_pixel_ratio, 2.0);
        assert!(!config.catch_brush_errors);
        assert_eq!(config.surface_backend, SurfaceBackend::Shim);
        assert_eq!(config.loading.effect, "pulse");
        assert_eq!(config.loading.text_color, default_text_color());

        let entries = config.layer_entries().unwrap();
        assert_eq!(entries[0].0, SurfaceId::Background);
        assert_eq!(entries[1].0, SurfaceId::Level(3));
        assert_eq!(entries[1].1.last_frame_alpha, Some(0.5));
    }

    #[test]
    fn test_bad_layer_key() {
        let err = PainterConfig::from_toml_str("[layers.top]\nmotion_blur = true").unwrap_err();
        assert!(matches!(err, RenderError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_device_pixel_ratio() {
        assert!(PainterConfig::from_toml_str("device_pixel_ratio = 0.0").is_err());
        assert!(matches!(
            PainterConfig::from_toml_str("device_pixel_ratio = \"x\""),
            Err(RenderError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_dir_file_gives_defaults() {
        let dir = std::env::temp_dir().join("strata-config-missing");
        let config = PainterConfig::load_from_dir(&dir).unwrap();
        assert_eq!(config.device_pixel_ratio, 1.0);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = PainterConfig::default();
        config
            .layers
            .insert("2".into(), LayerConfig::new().with_clear_color(Color::RED));
        let text = config.to_toml().unwrap();
        assert_eq!(PainterConfig::from_toml_str(&text).unwrap(), config);
    }
}
