//! Deckmotion library.
//!
//! Card-table animation on top of `bevy_ecs`: persistent slot entities kept
//! in sync with authoritative hand snapshots, and a single FIFO sequencer that
//! plays flips, swaps, discards and draws one at a time using short-lived
//! overlay entities.
//!
//! # Project Structure
//!
//! - [`components`] – slot, overlay and tween components
//! - [`events`] – sound cues and transition lifecycle events
//! - [`game`] – world and schedule assembly
//! - [`resources`] – queue, geometry, timing and clock resources
//! - [`scenario`] – JSON scenario files for the demo binary
//! - [`snapshot`] – authoritative hand snapshots
//! - [`systems`] – entity manager, overlay helpers, sequencer and per-frame systems
//! - [`transition`] – transition descriptors and their step sequences

pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod scenario;
pub mod snapshot;
pub mod systems;
pub mod transition;
