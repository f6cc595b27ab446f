//! Authoritative hand snapshots.
//!
//! A [`GameSnapshot`] is what the host hands over when slot entities must be
//! (re)built: every owner's hand as an ordered list of [`CardState`]s. The
//! position in the list is the slot index.

use serde::{Deserialize, Serialize};

use crate::components::card::{CardState, OwnerId, SlotKey};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandSnapshot {
    pub owner: OwnerId,
    pub slots: Vec<CardState>,
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub hands: Vec<HandSnapshot>,
}

impl GameSnapshot {
    /// Every owner holding `slots` face-down unknown cards.
    pub fn face_down(owners: impl IntoIterator<Item = u32>, slots: usize) -> Self {
        GameSnapshot {
            hands: owners
                .into_iter()
                .map(|owner| HandSnapshot {
                    owner: OwnerId(owner),
                    slots: vec![CardState::unknown(); slots],
                })
                .collect(),
        }
    }

    /// All slots in owner order, then index order.
    pub fn slots(&self) -> impl Iterator<Item = (SlotKey, CardState)> + '_ {
        self.hands.iter().flat_map(|hand| {
            hand.slots.iter().enumerate().map(move |(index, state)| {
                (
                    SlotKey {
                        owner: hand.owner,
                        index,
                    },
                    *state,
                )
            })
        })
    }

    pub fn slot_count(&self) -> usize {
        self.hands.iter().map(|h| h.slots.len()).sum()
    }

    pub fn get(&self, key: SlotKey) -> Option<CardState> {
        self.hands
            .iter()
            .find(|h| h.owner == key.owner)
            .and_then(|h| h.slots.get(key.index).copied())
    }

    pub fn owners(&self) -> impl Iterator<Item = OwnerId> + '_ {
        self.hands.iter().map(|h| h.owner)
    }
}
