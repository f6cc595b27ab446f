//! Card values and the persistent card components.
//!
//! The value types ([`CardFace`], [`CardState`], [`SlotKey`]) are plain data
//! shared by snapshots, transition descriptors and components. The components
//! ([`CardSlot`], [`CardAppearance`]) are attached to the single persistent
//! entity that represents each hand slot.
//!
//! # Related
//!
//! - [`crate::systems::cards`] – creates, updates and disposes slot entities
//! - [`crate::resources::slotindex::SlotIndex`] – `SlotKey` to entity lookup

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card rank. `Joker` is the only rank that carries no suit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "joker")]
    Joker,
}

impl Rank {
    /// The thirteen suited ranks, ace first.
    pub const SUITED: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Joker => "★",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }
}

/// The printed face of a card. Immutable once built.
///
/// `deck_id` only selects the back color when several physical decks are in
/// play; it does not take part in game logic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardFace {
    pub rank: Rank,
    #[serde(default)]
    pub suit: Option<Suit>,
    #[serde(default, rename = "deckId")]
    pub deck_id: u8,
}

impl CardFace {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        CardFace {
            rank,
            suit: Some(suit),
            deck_id: 0,
        }
    }

    pub fn joker() -> Self {
        CardFace {
            rank: Rank::Joker,
            suit: None,
            deck_id: 0,
        }
    }

    pub fn with_deck(mut self, deck_id: u8) -> Self {
        self.deck_id = deck_id;
        self
    }

    pub fn is_joker(&self) -> bool {
        self.rank == Rank::Joker
    }
}

impl fmt::Display for CardFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit {
            Some(suit) => write!(f, "{}{}", self.rank.symbol(), suit.symbol()),
            None => write!(f, "{}", self.rank.symbol()),
        }
    }
}

/// What a slot shows: a face (if known) and whether it is turned up.
///
/// A face-up card always carries a face. The constructors enforce this; a
/// deserialized face-up state without a face is demoted to face-down by
/// [`CardState::normalized`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardState {
    #[serde(default)]
    pub face: Option<CardFace>,
    #[serde(rename = "faceUp")]
    pub face_up: bool,
}

impl Default for CardState {
    fn default() -> Self {
        Self::unknown()
    }
}

impl CardState {
    pub fn face_up(face: CardFace) -> Self {
        CardState {
            face: Some(face),
            face_up: true,
        }
    }

    /// A face-down card whose face may or may not be known to this client.
    pub fn face_down(face: Option<CardFace>) -> Self {
        CardState {
            face,
            face_up: false,
        }
    }

    /// Face-down, face unknown.
    pub fn unknown() -> Self {
        Self::face_down(None)
    }

    pub fn is_valid(&self) -> bool {
        !self.face_up || self.face.is_some()
    }

    pub fn normalized(self) -> Self {
        if self.is_valid() {
            self
        } else {
            Self::unknown()
        }
    }
}

/// Identifies a player (or CPU) owning a hand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u32);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner{}", self.0)
    }
}

/// Stable identity of a hand position for the whole session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub owner: OwnerId,
    pub index: usize,
}

impl SlotKey {
    pub fn new(owner: u32, index: usize) -> Self {
        SlotKey {
            owner: OwnerId(owner),
            index,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.index)
    }
}

/// Tags the persistent entity of a hand slot with its key.
#[derive(Component, Copy, Clone, Debug, PartialEq, Eq)]
pub struct CardSlot(pub SlotKey);

/// The card state as last rendered on a slot entity.
#[derive(Component, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct CardAppearance(pub CardState);
