//! Loading effects
//!
//! An effect draws the loading animation by pushing shapes into the hover
//! set and asking for a hover repaint, through [`OverlayHooks`]. The host
//! drives time: every [`LoadingEffect::tick`] advances one frame.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strata_core::{Shape, ShapeKind, ShapeStyle};
use strata_paint::{Color, Size};

/// Options handed to an effect when loading starts
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingOptions {
    pub background_color: Option<Color>,
    pub text: Option<String>,
    pub text_color: Option<Color>,
    pub font_size: Option<f32>,
    /// Registered effect name
    pub effect: Option<String>,
    /// Effect-specific settings
    pub effect_options: serde_json::Value,
    /// 0.0 to 1.0, for effects that show progress
    pub progress: Option<f32>,
    /// Logical canvas size; filled in by the painter
    #[serde(skip)]
    pub canvas_size: Size,
}

impl LoadingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, name: impl Into<String>) -> Self {
        self.effect = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_effect_options(mut self, options: serde_json::Value) -> Self {
        self.effect_options = options;
        self
    }

    /// Fill every unset field from `defaults`.
    pub fn or(mut self, defaults: &LoadingOptions) -> Self {
        self.background_color = self.background_color.or(defaults.background_color);
        self.text = self.text.or_else(|| defaults.text.clone());
        self.text_color = self.text_color.or(defaults.text_color);
        self.font_size = self.font_size.or(defaults.font_size);
        self.effect = self.effect.or_else(|| defaults.effect.clone());
        if self.effect_options.is_null() {
            self.effect_options = defaults.effect_options.clone();
        }
        self.progress = self.progress.or(defaults.progress);
        self
    }
}

/// Identifies one started animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectHandle(u64);

impl EffectHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub(crate) enum OverlayEvent {
    AddHover(Shape),
    Repaint,
}

/// Callbacks an effect uses to reach the painter.
///
/// Events are queued and replayed in order by `Painter::pump_overlay`.
#[derive(Clone, Debug, Default)]
pub struct OverlayHooks {
    events: Rc<RefCell<Vec<OverlayEvent>>>,
}

impl OverlayHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape to the hover set.
    pub fn add_hover(&self, shape: Shape) {
        self.events.borrow_mut().push(OverlayEvent::AddHover(shape));
    }

    /// Ask for the hover surface to be repainted.
    pub fn request_repaint(&self) {
        self.events.borrow_mut().push(OverlayEvent::Repaint);
    }

    pub fn pending(&self) -> usize {
        self.events.borrow().len()
    }

    pub(crate) fn drain(&self) -> Vec<OverlayEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub(crate) fn discard(&self) {
        self.events.borrow_mut().clear();
    }
}

/// A loading animation
pub trait LoadingEffect {
    fn start(&mut self, options: &LoadingOptions, hooks: OverlayHooks) -> EffectHandle;

    /// Advance one frame. Effects that draw once can ignore this.
    fn tick(&mut self, _handle: EffectHandle) {}

    fn stop(&mut self, handle: EffectHandle);
}

// ============================================================================
// Ring
// ============================================================================

struct RingRun {
    handle: EffectHandle,
    hooks: OverlayHooks,
    options: LoadingOptions,
    frame: u32,
}

/// A ring of dots with one highlighted dot that walks around it.
///
/// Effect options: `segments` (default 12) and `color` (CSS color string,
/// default the text color or dark gray). With `progress` set, only that
/// fraction of the ring is drawn.
#[derive(Default)]
pub struct RingEffect {
    next_handle: u64,
    run: Option<RingRun>,
}

impl RingEffect {
    pub const DEFAULT_SEGMENTS: u32 = 12;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    fn emit(run: &RingRun) {
        let options = &run.options;
        let size = options.canvas_size;

        if let Some(background) = options.background_color {
            run.hooks.add_hover(
                Shape::new("loading-background", ShapeKind::RECTANGLE)
                    .with_style(ShapeStyle::rect(0.0, 0.0, size.width, size.height).with_color(background)),
            );
        }

        let segments = options
            .effect_options
            .get("segments")
            .and_then(|v| v.as_u64())
            .map(|n| n.clamp(1, 360) as u32)
            .unwrap_or(Self::DEFAULT_SEGMENTS);
        let color = options
            .effect_options
            .get("color")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<Color>().ok())
            .or(options.text_color)
            .unwrap_or(Color::rgb(0.25, 0.25, 0.25));
        let visible = match options.progress {
            Some(p) => (p.clamp(0.0, 1.0) * segments as f32).round() as u32,
            None => segments,
        };

        let center_x = size.width / 2.0;
        let center_y = size.height / 2.0;
        let ring_radius = size.width.min(size.height) / 6.0;
        let dot_radius = (ring_radius / 5.0).max(1.0);
        let active = run.frame % segments;

        for i in 0..visible {
            let angle = TAU * i as f32 / segments as f32;
            let alpha = if i == active { 1.0 } else { 0.3 };
            run.hooks.add_hover(
                Shape::new(format!("loading-dot-{}", i), ShapeKind::CIRCLE).with_style(
                    ShapeStyle::circle(
                        center_x + ring_radius * angle.cos(),
                        center_y + ring_radius * angle.sin(),
                        dot_radius,
                    )
                    .with_color(color.with_alpha(color.a * alpha)),
                ),
            );
        }
        run.hooks.request_repaint();
    }
}

impl LoadingEffect for RingEffect {
    fn start(&mut self, options: &LoadingOptions, hooks: OverlayHooks) -> EffectHandle {
        self.next_handle += 1;
        let handle = EffectHandle::new(self.next_handle);
        let run = RingRun {
            handle,
            hooks,
            options: options.clone(),
            frame: 0,
        };
        Self::emit(&run);
        self.run = Some(run);
        handle
    }

    fn tick(&mut self, handle: EffectHandle) {
        if let Some(run) = self.run.as_mut().filter(|run| run.handle == handle) {
            run.frame = run.frame.wrapping_add(1);
            Self::emit(run);
        }
    }

    fn stop(&mut self, handle: EffectHandle) {
        if self.run.as_ref().is_some_and(|run| run.handle == handle) {
            self.run = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> LoadingOptions {
        LoadingOptions {
            canvas_size: Size::new(60.0, 60.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_ring_emits_on_start_and_tick() {
        let mut ring = RingEffect::new();
        let hooks = OverlayHooks::new();
        let handle = ring.start(&options(), hooks.clone());

        // 12 dots and one repaint request
        assert_eq!(hooks.pending(), 13);
        ring.tick(handle);
        assert_eq!(hooks.pending(), 26);

        ring.stop(handle);
        ring.tick(handle);
        assert_eq!(hooks.pending(), 26);
        assert!(!ring.is_running());
    }

    #[test]
    fn test_ring_options() {
        let mut ring = RingEffect::new();
        let hooks = OverlayHooks::new();
        let opts = options()
            .with_background_color(Color::WHITE)
            .with_progress(0.5)
            .with_effect_options(json!({ "segments": 4, "color": "#00ff00" }));
        ring.start(&opts, hooks.clone());

        let events = hooks.drain();
        // background, 2 of 4 dots, repaint
        assert_eq!(events.len(), 4);
        match &events[1] {
            OverlayEvent::AddHover(shape) => {
                assert_eq!(shape.style.color.map(|c| c.g), Some(1.0));
                assert_eq!(shape.kind, ShapeKind::CIRCLE);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events[3], OverlayEvent::Repaint));
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut ring = RingEffect::new();
        let first = ring.start(&options(), OverlayHooks::new());
        let second = ring.start(&options(), OverlayHooks::new());
        ring.stop(first);
        assert!(ring.is_running());
        ring.stop(second);
        assert!(!ring.is_running());
    }

    #[test]
    fn test_options_fall_back_to_defaults() {
        let defaults = LoadingOptions::new()
            .with_effect("ring")
            .with_background_color(Color::WHITE);
        let merged = LoadingOptions::new().with_text("Loading").or(&defaults);
        assert_eq!(merged.effect.as_deref(), Some("ring"));
        assert_eq!(merged.background_color, Some(Color::WHITE));
        assert_eq!(merged.text.as_deref(), Some("Loading"));
    }
}
