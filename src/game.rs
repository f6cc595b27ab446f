//! World and schedule assembly.
//!
//! [`build_world`] inserts every resource the systems expect and
//! [`build_schedule`] registers the per-frame systems in order. A host then
//! calls [`tick`] once per frame with its raw delta.

use bevy_ecs::prelude::*;
use log::info;

use crate::events::audio::SoundCue;
use crate::resources::animationqueue::AnimationQueue;
use crate::resources::geometry::{Geometry, GeometryResolver};
use crate::resources::slotindex::SlotIndex;
use crate::resources::timing::TimingConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::ambient::ambient_effect_system;
use crate::systems::audio::{forward_sound_cues, update_sound_cues};
use crate::systems::sequencer::{animation_queue_system, poll_sequencer_inbox};
use crate::systems::time::update_world_time;
use crate::systems::tween::tween_rect_system;

/// A world with the clock, timing, geometry, slot index, queue and sound
/// mailbox in place. No slot entities yet.
pub fn build_world(timing: TimingConfig, geometry: impl GeometryResolver + 'static) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    world.insert_resource(timing);
    world.insert_resource(Geometry::new(geometry));
    world.insert_resource(SlotIndex::default());
    world.insert_resource(AnimationQueue::new());
    world.init_resource::<Messages<SoundCue>>();
    info!("Card world ready");
    world
}

pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            poll_sequencer_inbox,
            animation_queue_system,
            tween_rect_system,
            ambient_effect_system,
            // sound systems must be together
            update_sound_cues,
            forward_sound_cues,
        )
            .chain(),
    );
    update
}

/// Advance the clock by `dt` seconds and run one frame.
pub fn tick(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
    world.clear_trackers();
}

/// Tick in `dt` steps until the queue is idle or `max_frames` ran.
///
/// Returns the number of frames run.
pub fn run_until_idle(
    world: &mut World,
    schedule: &mut Schedule,
    dt: f32,
    max_frames: usize,
) -> usize {
    let mut frames = 0;
    // one tick even when idle, so handle submissions are picked up
    loop {
        tick(world, schedule, dt);
        frames += 1;
        let animating = world
            .get_resource::<AnimationQueue>()
            .is_some_and(|q| q.is_animating());
        if !animating || frames >= max_frames {
            return frames;
        }
    }
}
