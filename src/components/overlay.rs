//! Transient card overlays.
//!
//! An [`Overlay`] is a two-sided stand-in card drawn above the hands while a
//! transition runs, so the persistent slot entity does not have to change
//! until the authoritative state does. Overlays are never indexed by slot and
//! are created/destroyed through [`crate::systems::overlay`].

use bevy_ecs::prelude::Component;

use crate::components::card::CardFace;

/// Front content and orientation of an overlay card.
///
/// The back is derived from `front.deck_id` by the renderer; an overlay with
/// no front shows the default back on both sides.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct Overlay {
    pub front: Option<CardFace>,
    pub face_up: bool,
}

impl Overlay {
    pub fn new(front: Option<CardFace>, face_up: bool) -> Self {
        Self { front, face_up }
    }

    /// The face a viewer currently sees, if any.
    pub fn visible_face(&self) -> Option<CardFace> {
        if self.face_up { self.front } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::card::{Rank, Suit};

    #[test]
    fn test_visible_face_follows_orientation() {
        let face = CardFace::new(Rank::Queen, Suit::Diamonds);
        let mut ov = Overlay::new(Some(face), false);
        assert_eq!(ov.visible_face(), None);
        ov.face_up = true;
        assert_eq!(ov.visible_face(), Some(face));
    }
}
