//! Slot key to entity index.
//!
//! [`SlotIndex`] maps every [`SlotKey`] to the one persistent entity that
//! draws it. It is only written by [`crate::systems::cards`]; everything else
//! reads it.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::card::SlotKey;

#[derive(Resource, Debug, Default)]
pub struct SlotIndex {
    entities: FxHashMap<SlotKey, Entity>,
}

impl SlotIndex {
    pub fn get(&self, key: SlotKey) -> Option<Entity> {
        self.entities.get(&key).copied()
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.entities.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Keys in a stable (owner, index) order.
    pub fn keys(&self) -> Vec<SlotKey> {
        let mut keys: Vec<SlotKey> = self.entities.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, Entity)> + '_ {
        self.entities.iter().map(|(k, e)| (*k, *e))
    }

    /// Register `entity` for `key`, returning the entity it replaced.
    pub(crate) fn insert(&mut self, key: SlotKey, entity: Entity) -> Option<Entity> {
        self.entities.insert(key, entity)
    }

    /// Empty the index, returning the entities it held.
    pub(crate) fn drain(&mut self) -> Vec<Entity> {
        self.entities.drain().map(|(_, e)| e).collect()
    }
}
