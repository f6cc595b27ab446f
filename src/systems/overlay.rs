//! Overlay lifecycle helpers.
//!
//! Overlays are short-lived card entities drawn above the hands while a
//! transition runs. They are created and destroyed only through these
//! functions; the sequencer keeps the handles it created and destroys any
//! that are left on every exit path of a descriptor.

use bevy_ecs::prelude::*;
use log::trace;

use crate::components::card::CardFace;
use crate::components::overlay::Overlay;
use crate::components::screenrect::{Rect, ScreenRect};
use crate::components::tween::{Easing, TweenRect};
use crate::components::zindex::ZIndex;

/// Opaque reference to a live overlay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverlayHandle(Entity);

impl OverlayHandle {
    pub fn entity(&self) -> Entity {
        self.0
    }
}

/// Spawn a face-down overlay with no front, placed at `rect`.
pub fn create_overlay(world: &mut World, rect: Rect) -> OverlayHandle {
    let entity = world
        .spawn((Overlay::default(), ScreenRect::new(rect), ZIndex::OVERLAY))
        .id();
    trace!("overlay {:?} created at {:?}", entity, rect);
    OverlayHandle(entity)
}

/// Set the front content. Returns `false` if the overlay is gone.
pub fn set_front(world: &mut World, handle: OverlayHandle, front: Option<CardFace>) -> bool {
    match world.get_mut::<Overlay>(handle.0) {
        Some(mut overlay) => {
            overlay.front = front;
            true
        }
        None => false,
    }
}

/// Turn the overlay face-up or face-down. Returns `false` if the overlay is gone.
pub fn set_orientation(world: &mut World, handle: OverlayHandle, face_up: bool) -> bool {
    match world.get_mut::<Overlay>(handle.0) {
        Some(mut overlay) => {
            overlay.face_up = face_up;
            true
        }
        None => false,
    }
}

/// Start moving the overlay to `rect` over `duration` seconds.
///
/// A zero duration places it immediately. Returns `false` if the overlay is gone.
pub fn move_to(
    world: &mut World,
    handle: OverlayHandle,
    rect: Rect,
    duration: f32,
    easing: Easing,
) -> bool {
    let Some(current) = world.get::<ScreenRect>(handle.0).map(|r| r.rect) else {
        return false;
    };
    let mut e = world.entity_mut(handle.0);
    if duration <= 0.0 {
        e.remove::<TweenRect>();
        e.insert(ScreenRect::new(rect));
    } else {
        e.insert(TweenRect::new(current, rect, duration).with_easing(easing));
    }
    true
}

/// Stop any movement and put the overlay exactly on `rect`.
pub fn snap_to(world: &mut World, handle: OverlayHandle, rect: Rect) -> bool {
    if world.get::<Overlay>(handle.0).is_none() {
        return false;
    }
    let mut e = world.entity_mut(handle.0);
    e.remove::<TweenRect>();
    e.insert(ScreenRect::new(rect));
    true
}

/// Despawn the overlay. Returns `false` if it was already gone.
pub fn destroy_overlay(world: &mut World, handle: OverlayHandle) -> bool {
    if world.get::<Overlay>(handle.0).is_none() {
        return false;
    }
    trace!("overlay {:?} destroyed", handle.0);
    world.despawn(handle.0)
}

/// Number of live overlays.
pub fn overlay_count(world: &mut World) -> usize {
    world.query::<&Overlay>().iter(world).count()
}
