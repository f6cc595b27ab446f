//! Transition descriptors and their phase sequences.
//!
//! A [`TransitionDescriptor`] describes one compound animation. It only holds
//! slot keys and copied card values, never live entities, so it stays valid
//! however the authoritative state moves on after it was queued.
//!
//! [`TransitionDescriptor::steps`] expands a descriptor into the ordered
//! [`Step`] list the sequencer executes. Steps are either instant (spawn an
//! overlay, turn it, play a sound, commit a slot's state) or timed (wait for a
//! named duration, travel to a rectangle). Geometry is named by a
//! [`RectSource`] and only resolved when the step runs.

use log::warn;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::components::card::{CardFace, CardState, OwnerId, SlotKey};
use crate::events::audio::SoundCue;
use crate::resources::geometry::Location;
use crate::resources::timing::TimingKey;

/// One compound animation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum TransitionDescriptor {
    /// Reveal a face-down slot card.
    Flip {
        slot: SlotKey,
        revealed_face: CardFace,
    },
    /// Replace a hand card: the old one goes to the discard pile, the new one
    /// comes in from the holding area.
    Swap {
        slot: SlotKey,
        card_leaving_hand: CardState,
        card_entering_hand: CardState,
    },
    /// A card travelling to the discard pile, from a slot or from just above it.
    Discard {
        #[serde(default)]
        source_slot: Option<SlotKey>,
        card_discarded: CardFace,
    },
    /// A face-down card travelling from the deck to the holding area.
    DrawFromDeck { owner: OwnerId },
    /// Taking the top discard; occupies the queue for a fixed time.
    DrawFromDiscard { owner: OwnerId },
}

/// Tag of a descriptor, for logs and lifecycle events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Flip,
    Swap,
    Discard,
    DrawFromDeck,
    DrawFromDiscard,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionKind::Flip => "flip",
            TransitionKind::Swap => "swap",
            TransitionKind::Discard => "discard",
            TransitionKind::DrawFromDeck => "draw-from-deck",
            TransitionKind::DrawFromDiscard => "draw-from-discard",
        };
        f.write_str(name)
    }
}

/// Where a step's rectangle comes from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RectSource {
    Slot(SlotKey),
    Location(Location),
    /// The discard rectangle shifted up by the configured fallback offset.
    AboveDiscard,
}

/// Index of an overlay within one descriptor's run.
pub type OverlaySlot = usize;

/// One entry of a phase sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Create an overlay placed at `at`.
    SpawnOverlay {
        overlay: OverlaySlot,
        at: RectSource,
        front: Option<CardFace>,
        face_up: bool,
    },
    /// Hide a slot entity under the overlay drawn on top of it.
    Cover(SlotKey),
    /// Turn an overlay face-up or face-down.
    Turn { overlay: OverlaySlot, face_up: bool },
    /// Timed: travel to a rectangle over [`TimingKey::Move`].
    MoveTo { overlay: OverlaySlot, to: RectSource },
    /// Timed: hold for a named duration.
    Wait(TimingKey),
    Sound(SoundCue),
    DespawnOverlay(OverlaySlot),
    /// Write the slot's final state and uncover it.
    Commit { slot: SlotKey, state: CardState },
}

pub type Steps = SmallVec<[Step; 16]>;

impl TransitionDescriptor {
    pub fn kind(&self) -> TransitionKind {
        match self {
            TransitionDescriptor::Flip { .. } => TransitionKind::Flip,
            TransitionDescriptor::Swap { .. } => TransitionKind::Swap,
            TransitionDescriptor::Discard { .. } => TransitionKind::Discard,
            TransitionDescriptor::DrawFromDeck { .. } => TransitionKind::DrawFromDeck,
            TransitionDescriptor::DrawFromDiscard { .. } => TransitionKind::DrawFromDiscard,
        }
    }

    /// Slot state this transition leaves behind, if it changes one.
    ///
    /// Applied even when the transition is abandoned, so slot entities always
    /// converge to the state the caller described.
    pub fn settled_state(&self) -> Option<(SlotKey, CardState)> {
        match self {
            TransitionDescriptor::Flip {
                slot,
                revealed_face,
            } => Some((*slot, CardState::face_up(*revealed_face))),
            TransitionDescriptor::Swap {
                slot,
                card_entering_hand,
                ..
            } => Some((*slot, card_entering_hand.normalized())),
            _ => None,
        }
    }

    /// Expand into the ordered phase sequence.
    pub fn steps(&self) -> Steps {
        let mut steps = Steps::new();
        match self {
            TransitionDescriptor::Flip {
                slot,
                revealed_face,
            } => {
                steps.push(Step::SpawnOverlay {
                    overlay: 0,
                    at: RectSource::Slot(*slot),
                    front: Some(*revealed_face),
                    face_up: false,
                });
                steps.push(Step::Cover(*slot));
                push_reveal(&mut steps, 0);
                steps.push(Step::DespawnOverlay(0));
                steps.push(Step::Commit {
                    slot: *slot,
                    state: CardState::face_up(*revealed_face),
                });
            }
            TransitionDescriptor::Swap {
                slot,
                card_leaving_hand,
                card_entering_hand,
            } => {
                steps.push(Step::SpawnOverlay {
                    overlay: 0,
                    at: RectSource::Slot(*slot),
                    front: card_leaving_hand.face,
                    face_up: card_leaving_hand.face_up && card_leaving_hand.face.is_some(),
                });
                steps.push(Step::Cover(*slot));
                if !card_leaving_hand.face_up {
                    if card_leaving_hand.face.is_some() {
                        push_reveal(&mut steps, 0);
                    } else {
                        warn!(
                            "Swap on {} leaves a face-down card with no face; skipping the reveal",
                            slot
                        );
                    }
                }
                steps.push(Step::Sound(SoundCue::Card));
                steps.push(Step::MoveTo {
                    overlay: 0,
                    to: RectSource::Location(Location::Discard),
                });
                steps.push(Step::Wait(TimingKey::DiscardSettle));
                steps.push(Step::DespawnOverlay(0));

                let entering = card_entering_hand.normalized();
                if entering.face.is_none() {
                    warn!("Swap on {} brings in a card with no face", slot);
                }
                steps.push(Step::SpawnOverlay {
                    overlay: 1,
                    at: RectSource::Location(Location::Holding),
                    front: entering.face,
                    face_up: entering.face.is_some(),
                });
                steps.push(Step::Wait(TimingKey::SwapAnticipation));
                steps.push(Step::Sound(SoundCue::Card));
                steps.push(Step::MoveTo {
                    overlay: 1,
                    to: RectSource::Slot(*slot),
                });
                steps.push(Step::Wait(TimingKey::SwapSettle));
                steps.push(Step::DespawnOverlay(1));
                steps.push(Step::Commit {
                    slot: *slot,
                    state: entering,
                });
            }
            TransitionDescriptor::Discard {
                source_slot,
                card_discarded,
            } => {
                let at = match source_slot {
                    Some(slot) => RectSource::Slot(*slot),
                    None => RectSource::AboveDiscard,
                };
                steps.push(Step::SpawnOverlay {
                    overlay: 0,
                    at,
                    front: Some(*card_discarded),
                    face_up: true,
                });
                steps.push(Step::Sound(SoundCue::Card));
                steps.push(Step::MoveTo {
                    overlay: 0,
                    to: RectSource::Location(Location::Discard),
                });
                steps.push(Step::Wait(TimingKey::DiscardSettle));
                steps.push(Step::DespawnOverlay(0));
            }
            TransitionDescriptor::DrawFromDeck { .. } => {
                steps.push(Step::SpawnOverlay {
                    overlay: 0,
                    at: RectSource::Location(Location::Deck),
                    front: None,
                    face_up: false,
                });
                steps.push(Step::Sound(SoundCue::Card));
                steps.push(Step::MoveTo {
                    overlay: 0,
                    to: RectSource::Location(Location::Holding),
                });
                steps.push(Step::Wait(TimingKey::DrawDeckSettle));
                steps.push(Step::DespawnOverlay(0));
            }
            TransitionDescriptor::DrawFromDiscard { .. } => {
                steps.push(Step::Wait(TimingKey::DrawDiscard));
            }
        }
        steps
    }
}

/// Pause, turn face-up, settle.
fn push_reveal(steps: &mut Steps, overlay: OverlaySlot) {
    steps.push(Step::Wait(TimingKey::FlipPause));
    steps.push(Step::Sound(SoundCue::Flip));
    steps.push(Step::Turn {
        overlay,
        face_up: true,
    });
    steps.push(Step::Wait(TimingKey::Flip));
    steps.push(Step::Wait(TimingKey::FlipSettle));
}
