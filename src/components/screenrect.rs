//! Screen-space rectangle component.
//!
//! The [`ScreenRect`] component stores where a card (slot entity or overlay)
//! is drawn, in the rendering surface's pixel coordinates. Entities whose
//! rectangle could not be resolved carry the [`Unplaced`] marker instead of a
//! guessed position; slot entities covered by a running transition carry
//! [`Covered`]. A renderer draws an entity only when it has neither.

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// True when the rectangle covers no area (unmeasured layout).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Same size, shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.left + self.width * 0.5,
            self.top + self.height * 0.5,
        )
    }
}

/// Where an entity is currently drawn.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct ScreenRect {
    pub rect: Rect,
}

impl ScreenRect {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

/// Slot entity whose geometry could not be resolved yet.
#[derive(Component, Clone, Copy, Debug)]
pub struct Unplaced;

/// Slot entity hidden under an overlay while a transition runs.
#[derive(Component, Clone, Copy, Debug)]
pub struct Covered;
