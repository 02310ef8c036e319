//! Loading overlay state
//!
//! Owns the named loading effects, the configured defaults and the handle
//! of the running animation. Drawing happens in the painter, which replays
//! the hooks' events onto the hover surface.

use rustc_hash::FxHashMap;
use strata_paint::Size;

use crate::effect::{EffectHandle, LoadingEffect, LoadingOptions, OverlayEvent, OverlayHooks, RingEffect};
use crate::error::{RenderError, Result};

struct ActiveLoading {
    effect: String,
    handle: EffectHandle,
}

pub struct OverlayManager {
    effects: FxHashMap<String, Box<dyn LoadingEffect>>,
    defaults: LoadingOptions,
    hooks: OverlayHooks,
    active: Option<ActiveLoading>,
}

impl OverlayManager {
    pub const RING: &'static str = "ring";

    /// A manager with the built-in `ring` effect.
    pub fn new(defaults: LoadingOptions) -> Self {
        let mut manager = Self {
            effects: FxHashMap::default(),
            defaults,
            hooks: OverlayHooks::new(),
            active: None,
        };
        manager.register_effect(Self::RING, RingEffect::new());
        manager
    }

    pub fn register_effect(&mut self, name: impl Into<String>, effect: impl LoadingEffect + 'static) {
        self.effects.insert(name.into(), Box::new(effect));
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    pub fn defaults(&self) -> &LoadingOptions {
        &self.defaults
    }

    pub fn is_loading(&self) -> bool {
        self.active.is_some()
    }

    pub fn hooks(&self) -> &OverlayHooks {
        &self.hooks
    }

    /// Stop whatever runs, then start the effect `options` names (or the
    /// default one).
    pub fn start(&mut self, options: LoadingOptions, canvas_size: Size) -> Result<()> {
        self.stop();

        let mut options = options.or(&self.defaults);
        options.canvas_size = canvas_size;
        let name = options.effect.clone().unwrap_or_else(|| Self::RING.to_string());

        let effect = self
            .effects
            .get_mut(&name)
            .ok_or_else(|| RenderError::UnknownEffect(name.clone()))?;
        let handle = effect.start(&options, self.hooks.clone());
        tracing::debug!("loading started: effect '{}' ({:?})", name, handle);
        self.active = Some(ActiveLoading { effect: name, handle });
        Ok(())
    }

    /// Advance the running effect by one frame.
    pub fn tick(&mut self) {
        let Some(active) = &self.active else {
            return;
        };
        if let Some(effect) = self.effects.get_mut(&active.effect) {
            effect.tick(active.handle);
        }
    }

    /// Stop the running effect and drop frames it queued but nobody drew.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            if let Some(effect) = self.effects.get_mut(&active.effect) {
                effect.stop(active.handle);
            }
            tracing::debug!("loading stopped: effect '{}'", active.effect);
        }
        self.hooks.discard();
    }

    pub(crate) fn drain_events(&self) -> Vec<OverlayEvent> {
        self.hooks.drain()
    }
}

impl std::fmt::Debug for OverlayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayManager")
            .field("effects", &self.effects.keys().collect::<Vec<_>>())
            .field("loading", &self.is_loading())
            .finish()
    }
}
