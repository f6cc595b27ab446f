//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution. Each submodule documents the
//! semantics and intended usage of its resource(s).
//!
//! Overview
//! - `animationqueue` – FIFO of pending transitions, completion handles and stats
//! - `audio` – bridge and channel towards the external sound player
//! - `geometry` – screen rectangles of slots and table locations
//! - `slotindex` – `SlotKey` to slot entity lookup
//! - `timing` – named durations and easing curves, loaded from INI
//! - `worldtime` – simulation time and delta
pub mod animationqueue;
pub mod audio;
pub mod geometry;
pub mod slotindex;
pub mod timing;
pub mod worldtime;
