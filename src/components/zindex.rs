//! Z-index component for draw ordering.
//!
//! Slot entities sit at [`ZIndex::SLOT`]; overlays are drawn above them at
//! [`ZIndex::OVERLAY`] so a travelling card is never covered by a hand.

use bevy_ecs::prelude::Component;

/// Rendering order hint. Higher values are drawn later (on top).
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZIndex(pub i32);

impl ZIndex {
    pub const SLOT: ZIndex = ZIndex(0);
    pub const OVERLAY: ZIndex = ZIndex(1000);
}
