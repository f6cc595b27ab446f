//! Sound cue forwarding.
//!
//! - [`forward_sound_cues`] pushes this frame's [`SoundCue`] messages to the
//!   [`SoundBridge`](crate::resources::audio::SoundBridge), fire-and-forget.
//! - [`update_sound_cues`] advances the ECS message queue so cues written
//!   this frame become readable.

use bevy_ecs::prelude::*;
use log::trace;

use crate::events::audio::SoundCue;
use crate::resources::audio::SoundBridge;

/// Forward sound cues to the player; ignore send errors (player gone).
pub fn forward_sound_cues(bridge: Option<Res<SoundBridge>>, mut reader: MessageReader<SoundCue>) {
    for cue in reader.read() {
        trace!("sound cue: {}", cue.name());
        if let Some(bridge) = &bridge {
            let _ = bridge.tx_cue.send(*cue);
        }
    }
}

/// Advance the ECS message queue for [`SoundCue`].
pub fn update_sound_cues(mut msgs: ResMut<Messages<SoundCue>>) {
    msgs.update();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::audio::setup_sound;

    #[test]
    fn test_cues_reach_the_bridge() {
        let mut world = World::new();
        let rx = setup_sound(&mut world);
        world.resource_mut::<Messages<SoundCue>>().write(SoundCue::Flip);
        world.resource_mut::<Messages<SoundCue>>().write(SoundCue::Card);

        let mut schedule = Schedule::default();
        schedule.add_systems((update_sound_cues, forward_sound_cues).chain());
        schedule.run(&mut world);

        let got: Vec<SoundCue> = rx.try_iter().collect();
        assert_eq!(got, vec![SoundCue::Flip, SoundCue::Card]);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let mut world = World::new();
        let rx = setup_sound(&mut world);
        drop(rx);
        world.resource_mut::<Messages<SoundCue>>().write(SoundCue::Flip);

        let mut schedule = Schedule::default();
        schedule.add_systems((update_sound_cues, forward_sound_cues).chain());
        schedule.run(&mut world);
    }

    #[test]
    fn test_without_bridge_cues_are_dropped() {
        let mut world = World::new();
        world.init_resource::<Messages<SoundCue>>();
        world.resource_mut::<Messages<SoundCue>>().write(SoundCue::Card);

        let mut schedule = Schedule::default();
        schedule.add_systems(forward_sound_cues);
        schedule.run(&mut world);
    }
}
