//! Animation timing configuration resource.
//!
//! Every pause and travel time used by the sequencer is looked up here by a
//! named [`TimingKey`]; nothing in the step logic carries a literal duration.
//! Values have compiled-in defaults and can be retuned from an INI file.
//!
//! # Configuration File Format
//!
//! ```ini
//! [durations]
//! flip = 0.4
//! move = 0.35
//! inter_animation_pause = 0.1
//!
//! [easing]
//! move = cubic_out
//! flip = quad_in_out
//!
//! [layout]
//! discard_fallback_offset = 60
//! ```
//!
//! Durations are in seconds. Missing keys keep their defaults.

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;
use thiserror::Error;

use crate::components::tween::Easing;

const DEFAULT_CONFIG_PATH: &str = "./config.ini";
const DEFAULT_DISCARD_FALLBACK_OFFSET: f32 = 60.0;
const KEY_COUNT: usize = 10;

/// Named durations. The string form is the INI key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimingKey {
    /// Tiny pause between showing an overlay face-down and turning it.
    FlipPause,
    /// Time for the turn itself.
    Flip,
    /// Hold after a card has been revealed.
    FlipSettle,
    /// Travel time of an overlay between two rectangles.
    Move,
    /// Hold once a card lands on the discard pile.
    DiscardSettle,
    /// Pause before the incoming card of a swap starts travelling.
    SwapAnticipation,
    /// Hold after the incoming card of a swap lands in the hand.
    SwapSettle,
    /// Hold after a card drawn from the deck reaches the holding area.
    DrawDeckSettle,
    /// Whole duration of a draw from the discard pile.
    DrawDiscard,
    /// Gap between two queued transitions.
    InterAnimationPause,
}

impl TimingKey {
    pub const ALL: [TimingKey; KEY_COUNT] = [
        TimingKey::FlipPause,
        TimingKey::Flip,
        TimingKey::FlipSettle,
        TimingKey::Move,
        TimingKey::DiscardSettle,
        TimingKey::SwapAnticipation,
        TimingKey::SwapSettle,
        TimingKey::DrawDeckSettle,
        TimingKey::DrawDiscard,
        TimingKey::InterAnimationPause,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimingKey::FlipPause => "flip_pause",
            TimingKey::Flip => "flip",
            TimingKey::FlipSettle => "flip_settle",
            TimingKey::Move => "move",
            TimingKey::DiscardSettle => "discard_settle",
            TimingKey::SwapAnticipation => "swap_anticipation",
            TimingKey::SwapSettle => "swap_settle",
            TimingKey::DrawDeckSettle => "draw_deck_settle",
            TimingKey::DrawDiscard => "draw_discard",
            TimingKey::InterAnimationPause => "inter_animation_pause",
        }
    }

    fn default_seconds(&self) -> f32 {
        match self {
            TimingKey::FlipPause => 0.05,
            TimingKey::Flip => 0.4,
            TimingKey::FlipSettle => 0.2,
            TimingKey::Move => 0.35,
            TimingKey::DiscardSettle => 0.15,
            TimingKey::SwapAnticipation => 0.1,
            TimingKey::SwapSettle => 0.2,
            TimingKey::DrawDeckSettle => 0.1,
            TimingKey::DrawDiscard => 0.3,
            TimingKey::InterAnimationPause => 0.1,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load timing config {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("failed to save timing config {path:?}: {reason}")]
    Save { path: PathBuf, reason: String },
}

/// Read-only timing table used by the sequencer.
///
/// Loaded once at startup; systems only read it.
#[derive(Resource, Debug, Clone)]
pub struct TimingConfig {
    durations: [f32; KEY_COUNT],
    /// Curve for overlay travel.
    pub move_easing: Easing,
    /// Curve a renderer should use when turning a card.
    pub flip_easing: Easing,
    /// Vertical offset (pixels, upwards) of the discard start rectangle when
    /// a discard has no source slot.
    pub discard_fallback_offset: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingConfig {
    /// Create a configuration with the default feel.
    pub fn new() -> Self {
        let mut durations = [0.0; KEY_COUNT];
        for key in TimingKey::ALL {
            durations[key.index()] = key.default_seconds();
        }
        Self {
            durations,
            move_easing: Easing::CubicOut,
            flip_easing: Easing::QuadInOut,
            discard_fallback_offset: DEFAULT_DISCARD_FALLBACK_OFFSET,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a default configuration bound to a custom file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// All durations set to zero. Handy for tests that only care about ordering.
    pub fn instant() -> Self {
        Self {
            durations: [0.0; KEY_COUNT],
            ..Self::new()
        }
    }

    /// Seconds configured for `key`.
    pub fn get(&self, key: TimingKey) -> f32 {
        self.durations[key.index()]
    }

    /// Override one duration. Negative values are clamped to zero.
    pub fn set(&mut self, key: TimingKey, seconds: f32) {
        self.durations[key.index()] = seconds.max(0.0);
    }

    /// Load values from the INI file. Missing values keep their current value.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(|reason| ConfigError::Load {
            path: self.config_path.clone(),
            reason,
        })?;

        for key in TimingKey::ALL {
            match config.getfloat("durations", key.name()) {
                Ok(Some(v)) => self.set(key, v as f32),
                Ok(None) => {}
                Err(e) => warn!("Ignoring durations.{}: {}", key.name(), e),
            }
        }

        if let Some(name) = config.get("easing", "move") {
            match Easing::from_name(&name) {
                Some(e) => self.move_easing = e,
                None => warn!("Unknown easing '{}' for easing.move", name),
            }
        }
        if let Some(name) = config.get("easing", "flip") {
            match Easing::from_name(&name) {
                Some(e) => self.flip_easing = e,
                None => warn!("Unknown easing '{}' for easing.flip", name),
            }
        }
        if let Some(offset) = config
            .getfloat("layout", "discard_fallback_offset")
            .ok()
            .flatten()
        {
            self.discard_fallback_offset = offset as f32;
        }

        info!(
            "Loaded timing config from {:?}: move={}s ({}), flip={}s ({})",
            self.config_path,
            self.get(TimingKey::Move),
            self.move_easing.name(),
            self.get(TimingKey::Flip),
            self.flip_easing.name()
        );

        Ok(())
    }

    /// Save the current values to the INI file.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        for key in TimingKey::ALL {
            config.set("durations", key.name(), Some(self.get(key).to_string()));
        }
        config.set("easing", "move", Some(self.move_easing.name().to_string()));
        config.set("easing", "flip", Some(self.flip_easing.name().to_string()));
        config.set(
            "layout",
            "discard_fallback_offset",
            Some(self.discard_fallback_offset.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| ConfigError::Save {
                path: self.config_path.clone(),
                reason: e.to_string(),
            })?;

        info!("Saved timing config to {:?}", self.config_path);

        Ok(())
    }
}
