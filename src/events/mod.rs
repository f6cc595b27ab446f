//! Event types emitted by the engine.
//!
//! Submodules:
//! - [`audio`] – sound cue messages written by the sequencer
//! - [`transition`] – lifecycle notifications for queued transitions
//!
//! See each submodule for concrete event data and semantics.
pub mod audio;
pub mod transition;
