//! Tween component for animated rectangle interpolation.
//!
//! [`TweenRect`] moves (and resizes) an entity's
//! [`ScreenRect`](super::screenrect::ScreenRect) from one rectangle to another
//! over a fixed duration using an [`Easing`] curve. Overlays get one each
//! time they travel between slots and named table locations.
//!
//! See [`crate::systems::tween`] for the update system.

use bevy_ecs::prelude::Component;

use crate::components::screenrect::Rect;

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed (no easing).
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
}

impl Easing {
    /// Parse a config name such as `"cubic_out"`.
    pub fn from_name(name: &str) -> Option<Easing> {
        let easing = match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Easing::Linear,
            "quad_in" => Easing::QuadIn,
            "quad_out" => Easing::QuadOut,
            "quad_in_out" => Easing::QuadInOut,
            "cubic_in" => Easing::CubicIn,
            "cubic_out" => Easing::CubicOut,
            "cubic_in_out" => Easing::CubicInOut,
            _ => return None,
        };
        Some(easing)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "quad_in",
            Easing::QuadOut => "quad_out",
            Easing::QuadInOut => "quad_in_out",
            Easing::CubicIn => "cubic_in",
            Easing::CubicOut => "cubic_out",
            Easing::CubicInOut => "cubic_in_out",
        }
    }
}

/// Animates an entity's [`ScreenRect`](super::screenrect::ScreenRect) between two rectangles.
#[derive(Component, Clone, Debug)]
pub struct TweenRect {
    /// Starting rectangle.
    pub from: Rect,
    /// Ending rectangle.
    pub to: Rect,
    /// Duration in seconds.
    pub duration: f32,
    /// Easing function to use.
    pub easing: Easing,
    /// Whether the tween is still running.
    pub playing: bool,
    /// Current time within the tween.
    pub time: f32,
}

impl TweenRect {
    pub fn new(from: Rect, to: Rect, duration: f32) -> Self {
        TweenRect {
            from,
            to,
            duration,
            easing: Easing::Linear,
            playing: true,
            time: 0.0,
        }
    }
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}
