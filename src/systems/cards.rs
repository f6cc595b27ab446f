//! Slot entity management.
//!
//! Keeps exactly one persistent entity per [`SlotKey`] for the lifetime of a
//! game session:
//!
//! - [`initialize_cards`] – rebuild every slot entity from a snapshot
//! - [`reconcile_positions`] – re-resolve every slot rectangle
//! - [`lookup`] – read a slot entity's current state
//! - [`set_appearance`] – instant, non-animated state correction
//! - [`set_ambient_effect`] – toggle a looping effect on a slot
//! - [`clear_cards`] – dispose of every slot entity
//!
//! All functions take `&mut World` so the host can call them between frames,
//! the same way the sequencer's exclusive system does.
//!
//! Geometry failures never abort a bulk operation: the affected slot is left
//! [`Unplaced`] and the failure is logged.

use bevy_ecs::prelude::*;
use log::{debug, error, info, warn};

use crate::components::ambient::AmbientEffects;
use crate::components::card::{CardAppearance, CardSlot, CardState, SlotKey};
use crate::components::screenrect::{Covered, Rect, ScreenRect, Unplaced};
use crate::components::zindex::ZIndex;
use crate::resources::geometry::{GeometryError, GeometryResolver, resolve_slot};
use crate::resources::slotindex::SlotIndex;
use crate::snapshot::GameSnapshot;

/// Read-only view of a slot entity.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualEntity {
    pub entity: Entity,
    pub key: SlotKey,
    pub state: CardState,
    /// Last applied rectangle, `None` while unplaced.
    pub rect: Option<Rect>,
    /// Whether a renderer would currently draw it.
    pub visible: bool,
    /// Active ambient effect names, sorted.
    pub effects: Vec<String>,
}

/// Destroy all slot entities and create one per slot in `snapshot`.
pub fn initialize_cards(
    world: &mut World,
    snapshot: &GameSnapshot,
    resolver: &dyn GeometryResolver,
) {
    clear_cards(world);
    world.init_resource::<SlotIndex>();

    for (key, state) in snapshot.slots() {
        let state = if state.is_valid() {
            state
        } else {
            warn!("Slot {} is face-up without a face; showing it face-down", key);
            state.normalized()
        };
        let entity = world
            .spawn((
                CardSlot(key),
                CardAppearance(state),
                ScreenRect::default(),
                AmbientEffects::default(),
                ZIndex::SLOT,
            ))
            .id();
        place(world, entity, key, resolver);
        let replaced = world.resource_mut::<SlotIndex>().insert(key, entity);
        if let Some(old) = replaced {
            warn!("Snapshot lists slot {} twice; keeping the last one", key);
            world.despawn(old);
        }
    }

    let total = world.resource::<SlotIndex>().len();
    let unplaced = world
        .query_filtered::<(), (With<CardSlot>, With<Unplaced>)>()
        .iter(world)
        .count();
    info!(
        "Initialized {} slot entities ({} waiting for layout)",
        total, unplaced
    );
}

/// Re-resolve and apply the rectangle of every slot entity.
///
/// Returns how many were positioned, so the caller can tell a systemic layout
/// failure (zero) from a localized one.
pub fn reconcile_positions(world: &mut World, resolver: &dyn GeometryResolver) -> usize {
    let Some(index) = world.get_resource::<SlotIndex>() else {
        return 0;
    };
    let slots: Vec<(SlotKey, Entity)> = index.iter().collect();

    let mut placed = 0;
    for (key, entity) in &slots {
        if place(world, *entity, *key, resolver) {
            placed += 1;
        }
    }
    if placed < slots.len() {
        debug!("Reconciled {}/{} slot positions", placed, slots.len());
    }
    placed
}

/// Apply the resolved rectangle to one slot entity, or mark it unplaced.
fn place(world: &mut World, entity: Entity, key: SlotKey, resolver: &dyn GeometryResolver) -> bool {
    let resolved = resolve_slot(resolver, key);
    let Ok(mut e) = world.get_entity_mut(entity) else {
        warn!("Slot {} points at a despawned entity; not placed", key);
        return false;
    };
    match resolved {
        Ok(rect) => {
            e.insert(ScreenRect::new(rect));
            e.remove::<Unplaced>();
            true
        }
        Err(err) => {
            match &err {
                GeometryError::Unresolved(_) => debug!("{}", err),
                GeometryError::Resolver { .. } => error!("{}", err),
            }
            e.insert(Unplaced);
            false
        }
    }
}

/// Current view of the slot entity for `key`.
pub fn lookup(world: &World, key: SlotKey) -> Option<VisualEntity> {
    let entity = world.get_resource::<SlotIndex>()?.get(key)?;
    let state = world.get::<CardAppearance>(entity)?.0;
    let unplaced = world.get::<Unplaced>(entity).is_some();
    let covered = world.get::<Covered>(entity).is_some();
    let rect = if unplaced {
        None
    } else {
        world.get::<ScreenRect>(entity).map(|r| r.rect)
    };
    let mut effects: Vec<String> = world
        .get::<AmbientEffects>(entity)
        .map(|fx| fx.names().map(str::to_string).collect())
        .unwrap_or_default();
    effects.sort();

    Some(VisualEntity {
        entity,
        key,
        state,
        rect,
        visible: !unplaced && !covered,
        effects,
    })
}

/// Replace a slot's card state without animating.
///
/// Returns `false` when no entity exists for `key`.
pub fn set_appearance(world: &mut World, key: SlotKey, state: CardState) -> bool {
    let Some(entity) = slot_entity(world, key) else {
        warn!("set_appearance: no entity for slot {}", key);
        return false;
    };
    if world.get::<Covered>(entity).is_some() {
        debug!(
            "set_appearance on {} while a transition covers it; the transition's result lands afterwards",
            key
        );
    }
    match world.get_mut::<CardAppearance>(entity) {
        Some(mut appearance) => {
            appearance.0 = state.normalized();
            true
        }
        None => false,
    }
}

/// Enable or disable a looping effect on a slot. Idempotent.
///
/// Returns `false` when no entity exists for `key`.
pub fn set_ambient_effect(world: &mut World, key: SlotKey, effect: &str, enabled: bool) -> bool {
    let Some(entity) = slot_entity(world, key) else {
        warn!("set_ambient_effect: no entity for slot {}", key);
        return false;
    };
    match world.get_mut::<AmbientEffects>(entity) {
        Some(mut fx) => {
            if fx.set(effect, enabled) {
                debug!(
                    "{} {} on {}",
                    if enabled { "Started" } else { "Stopped" },
                    effect,
                    key
                );
            }
            true
        }
        None => false,
    }
}

/// Despawn every slot entity; the manager returns to its uninitialized state.
pub fn clear_cards(world: &mut World) {
    let entities = match world.get_resource_mut::<SlotIndex>() {
        Some(mut index) => index.drain(),
        None => return,
    };
    let count = entities.len();
    for entity in entities {
        world.despawn(entity);
    }
    if count > 0 {
        info!("Cleared {} slot entities", count);
    }
}

pub(crate) fn slot_entity(world: &World, key: SlotKey) -> Option<Entity> {
    world.get_resource::<SlotIndex>()?.get(key)
}
