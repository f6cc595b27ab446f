//! Scenario files for the demo binary.
//!
//! A scenario is a starting [`GameSnapshot`] plus batches of transitions to
//! enqueue one after another:
//!
//! ```json
//! {
//!   "snapshot": { "hands": [ { "owner": 1, "slots": [ { "faceUp": false } ] } ] },
//!   "batches": [ [ { "type": "Flip", "slot": { "owner": 1, "index": 0 },
//!                    "revealedFace": { "rank": "K", "suit": "spades" } } ] ]
//! }
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::components::card::{CardFace, CardState, OwnerId, Rank, SlotKey, Suit};
use crate::snapshot::{GameSnapshot, HandSnapshot};
use crate::transition::TransitionDescriptor;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub snapshot: GameSnapshot,
    #[serde(default)]
    pub batches: Vec<Vec<TransitionDescriptor>>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ScenarioError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// A shuffled deal: every owner gets `slots` face-down cards, then each
    /// owner flips two, swaps one with a fresh draw and discards it.
    pub fn random_deal(seed: u64, owners: &[u32], slots: usize) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut deck: Vec<CardFace> = Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::SUITED.iter().map(move |&rank| CardFace::new(rank, suit)))
            .chain([CardFace::joker(), CardFace::joker()])
            .collect();
        rng.shuffle(&mut deck);

        let mut hands = Vec::with_capacity(owners.len());
        let mut dealt: Vec<(SlotKey, CardFace)> = Vec::new();
        for &owner in owners {
            let mut hand = Vec::with_capacity(slots);
            for index in 0..slots {
                let face = deck.pop();
                if let Some(face) = face {
                    dealt.push((SlotKey::new(owner, index), face));
                }
                hand.push(CardState::face_down(face));
            }
            hands.push(HandSnapshot {
                owner: OwnerId(owner),
                slots: hand,
            });
        }

        let mut batches = Vec::new();
        let flips: Vec<TransitionDescriptor> = owners
            .iter()
            .flat_map(|&owner| {
                let mut picks: Vec<&(SlotKey, CardFace)> =
                    dealt.iter().filter(|(k, _)| k.owner.0 == owner).collect();
                rng.shuffle(&mut picks);
                picks
                    .into_iter()
                    .take(2)
                    .map(|(slot, face)| TransitionDescriptor::Flip {
                        slot: *slot,
                        revealed_face: *face,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        let flipped: FxHashSet<SlotKey> = flips
            .iter()
            .filter_map(|t| match t {
                TransitionDescriptor::Flip { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        batches.push(flips);

        for &owner in owners {
            let Some(drawn) = deck.pop() else { break };
            let mine: Vec<&(SlotKey, CardFace)> =
                dealt.iter().filter(|(k, _)| k.owner.0 == owner).collect();
            if mine.is_empty() {
                continue;
            }
            let (slot, leaving) = *mine[rng.usize(..mine.len())];
            // a slot flipped in the first batch leaves the hand face up
            let leaving = if flipped.contains(&slot) {
                CardState::face_up(leaving)
            } else {
                CardState::face_down(Some(leaving))
            };
            batches.push(vec![
                TransitionDescriptor::DrawFromDeck {
                    owner: OwnerId(owner),
                },
                TransitionDescriptor::Swap {
                    slot,
                    card_leaving_hand: leaving,
                    card_entering_hand: CardState::face_up(drawn),
                },
            ]);
        }

        Scenario {
            snapshot: GameSnapshot { hands },
            batches,
        }
    }
}
