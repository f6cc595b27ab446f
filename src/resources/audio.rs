//! Bridge to the sound player.
//!
//! Sound playback lives outside this crate. The host creates a
//! [`SoundBridge`] with [`setup_sound`] and reads cue names from the returned
//! receiver (typically on its own audio thread). If no bridge is installed,
//! cues are simply dropped.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::events::audio::SoundCue;

#[derive(Resource, Clone)]
pub struct SoundBridge {
    pub tx_cue: Sender<SoundCue>,
}

/// Install a [`SoundBridge`] and the [`Messages<SoundCue>`] mailbox.
///
/// Returns the receiving end for the sound player.
pub fn setup_sound(world: &mut World) -> Receiver<SoundCue> {
    let (tx_cue, rx_cue) = unbounded();
    world.insert_resource(SoundBridge { tx_cue });
    world.init_resource::<Messages<SoundCue>>();
    rx_cue
}
