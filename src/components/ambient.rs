//! Looping ambient effects attached to slot entities.
//!
//! Effects such as `"pulse"` or `"glow"` are toggled by name and run until
//! turned off. Each active effect keeps its own clock (seconds since it was
//! enabled) which [`crate::systems::ambient::ambient_effect_system`] advances
//! every frame, so a renderer can derive the loop phase from it.

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Component, Default)]
pub struct AmbientEffects {
    active: FxHashMap<String, f32>,
}

impl AmbientEffects {
    /// Enable or disable `name`.
    ///
    /// Returns `true` when the set of active effects changed. Enabling an
    /// effect that is already running keeps its clock.
    pub fn set(&mut self, name: &str, enabled: bool) -> bool {
        if enabled {
            if self.active.contains_key(name) {
                return false;
            }
            self.active.insert(name.to_string(), 0.0);
            true
        } else {
            self.active.remove(name).is_some()
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    /// Seconds since `name` was enabled, if active.
    pub fn elapsed(&self, name: &str) -> Option<f32> {
        self.active.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }

    pub fn advance(&mut self, dt: f32) {
        for t in self.active.values_mut() {
            *t += dt;
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
