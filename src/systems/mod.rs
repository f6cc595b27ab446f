//! Engine systems.
//!
//! This module groups the ECS systems and world-level operations that drive
//! slot entities, overlays and the animation queue.
//!
//! Submodules overview
//! - [`ambient`] – advance ambient effect clocks
//! - [`audio`] – forward sound cues to the sound bridge
//! - [`cards`] – create, look up, update and dispose slot entities
//! - [`overlay`] – create, move and destroy overlays
//! - [`sequencer`] – run queued transitions one at a time
//! - [`time`] – update simulation time and delta
//! - [`tween`] – animate screen rectangles over time

pub mod ambient;
pub mod audio;
pub mod cards;
pub mod overlay;
pub mod sequencer;
pub mod time;
pub mod tween;
