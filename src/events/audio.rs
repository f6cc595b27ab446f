//! Sound cues emitted by the sequencer.
//!
//! The sequencer writes [`SoundCue`] messages; the
//! [`forward_sound_cues`](crate::systems::audio::forward_sound_cues) system
//! hands them to whatever plays sound (a [`SoundBridge`] channel) without
//! waiting for it. Delivery failures are ignored.
//!
//! [`SoundBridge`]: crate::resources::audio::SoundBridge

use bevy_ecs::message::Message;

/// Named sound effects a transition can request.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// A card turning over.
    Flip,
    /// A card sliding or landing.
    Card,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Flip => "flip",
            SoundCue::Card => "card",
        }
    }
}
