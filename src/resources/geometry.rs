//! Geometry resolution.
//!
//! Layout is owned by the host: this crate only asks where a hand slot or a
//! named table location currently is. [`GeometryResolver`] is that narrow
//! contract and [`Geometry`] stores the resolver the sequencer consults.
//!
//! A resolver answers `Ok(None)` (or a zero-area rectangle) while layout is
//! not measured yet; [`resolve_slot`] and [`resolve_location`] fold both cases
//! into [`GeometryError::Unresolved`] so callers handle a single error path.
//!
//! [`GridGeometry`] is a self-contained table layout used by the demo binary
//! and by tests.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashSet;
use std::fmt;
use thiserror::Error;

use crate::components::card::SlotKey;
use crate::components::screenrect::Rect;

/// Named table locations a card can travel to or from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Deck,
    Discard,
    /// Where a freshly drawn card is held before it is placed or discarded.
    Holding,
}

impl Location {
    pub fn name(&self) -> &'static str {
        match self {
            Location::Deck => "deck",
            Location::Discard => "discard",
            Location::Holding => "holding",
        }
    }
}

/// What a geometry lookup was about.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeometryTarget {
    Slot(SlotKey),
    Location(Location),
}

impl fmt::Display for GeometryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryTarget::Slot(key) => write!(f, "slot {}", key),
            GeometryTarget::Location(loc) => write!(f, "location {}", loc.name()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// Missing or zero-area rectangle. Expected while layout is settling.
    #[error("{0} is not resolvable yet")]
    Unresolved(GeometryTarget),
    /// The resolver itself failed.
    #[error("geometry resolver failed for {target}: {reason}")]
    Resolver {
        target: GeometryTarget,
        reason: String,
    },
}

/// Resolves slots and table locations to surface rectangles.
pub trait GeometryResolver: Send + Sync {
    fn slot_rect(&self, key: SlotKey) -> Result<Option<Rect>, GeometryError>;
    fn location_rect(&self, location: Location) -> Result<Option<Rect>, GeometryError>;
}

/// Resolve a slot, treating `None` and zero-area answers as unresolved.
pub fn resolve_slot(resolver: &dyn GeometryResolver, key: SlotKey) -> Result<Rect, GeometryError> {
    match resolver.slot_rect(key)? {
        Some(rect) if !rect.is_empty() => Ok(rect),
        _ => Err(GeometryError::Unresolved(GeometryTarget::Slot(key))),
    }
}

/// Resolve a named location, treating `None` and zero-area answers as unresolved.
pub fn resolve_location(
    resolver: &dyn GeometryResolver,
    location: Location,
) -> Result<Rect, GeometryError> {
    match resolver.location_rect(location)? {
        Some(rect) if !rect.is_empty() => Ok(rect),
        _ => Err(GeometryError::Unresolved(GeometryTarget::Location(location))),
    }
}

/// The resolver used by the sequencer.
#[derive(Resource)]
pub struct Geometry(pub Box<dyn GeometryResolver>);

impl Geometry {
    pub fn new(resolver: impl GeometryResolver + 'static) -> Self {
        Geometry(Box::new(resolver))
    }

    pub fn resolver(&self) -> &dyn GeometryResolver {
        self.0.as_ref()
    }
}

/// Table layout with one row of hands per owner.
///
/// Each hand is a grid of `columns` cards per row; owners are stacked
/// vertically below the deck/discard/holding strip. Slots or locations listed
/// in `unmeasured` resolve to `None`, which lets tests and the demo exercise
/// the unresolved-geometry paths.
#[derive(Clone, Debug)]
pub struct GridGeometry {
    pub card_width: f32,
    pub card_height: f32,
    pub gap: f32,
    pub columns: usize,
    /// Card rows reserved per hand.
    pub rows: usize,
    pub origin: (f32, f32),
    /// Owners in the order their hands are stacked.
    pub owners: Vec<u32>,
    pub unmeasured_slots: FxHashSet<SlotKey>,
    pub unmeasured_locations: FxHashSet<Location>,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            card_width: 60.0,
            card_height: 84.0,
            gap: 8.0,
            columns: 3,
            rows: 2,
            origin: (16.0, 16.0),
            owners: Vec::new(),
            unmeasured_slots: FxHashSet::default(),
            unmeasured_locations: FxHashSet::default(),
        }
    }
}

impl GridGeometry {
    pub fn new(owners: impl IntoIterator<Item = u32>) -> Self {
        Self {
            owners: owners.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn unmeasure_slot(&mut self, key: SlotKey) {
        self.unmeasured_slots.insert(key);
    }

    pub fn unmeasure_location(&mut self, location: Location) {
        self.unmeasured_locations.insert(location);
    }

    fn pitch_x(&self) -> f32 {
        self.card_width + self.gap
    }

    fn pitch_y(&self) -> f32 {
        self.card_height + self.gap
    }

    fn hand_height(&self) -> f32 {
        self.rows as f32 * self.pitch_y() + self.gap
    }
}

impl GeometryResolver for GridGeometry {
    fn slot_rect(&self, key: SlotKey) -> Result<Option<Rect>, GeometryError> {
        if self.unmeasured_slots.contains(&key) {
            return Ok(None);
        }
        let Some(row_block) = self.owners.iter().position(|o| *o == key.owner.0) else {
            return Err(GeometryError::Resolver {
                target: GeometryTarget::Slot(key),
                reason: format!("{} has no hand in this layout", key.owner),
            });
        };
        let (ox, oy) = self.origin;
        // the top strip holds deck, discard and holding
        let top = oy + self.pitch_y() + self.gap + row_block as f32 * self.hand_height();
        let col = key.index % self.columns;
        let row = key.index / self.columns;
        Ok(Some(Rect::new(
            ox + col as f32 * self.pitch_x(),
            top + row as f32 * self.pitch_y(),
            self.card_width,
            self.card_height,
        )))
    }

    fn location_rect(&self, location: Location) -> Result<Option<Rect>, GeometryError> {
        if self.unmeasured_locations.contains(&location) {
            return Ok(None);
        }
        let (ox, oy) = self.origin;
        let col = match location {
            Location::Deck => 0,
            Location::Discard => 1,
            Location::Holding => 2,
        };
        Ok(Some(Rect::new(
            ox + col as f32 * self.pitch_x(),
            oy,
            self.card_width,
            self.card_height,
        )))
    }
}
