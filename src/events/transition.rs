//! Transition lifecycle events.
//!
//! The sequencer triggers [`TransitionStarted`] when it pops a descriptor and
//! [`TransitionFinished`] once that descriptor's overlays are gone and its
//! slot state is committed. Exactly one descriptor is between the two at any
//! time, which observers can check with an in-flight counter.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<TransitionFinished>| {
//!     log::info!("{} finished: {:?}", trigger.event().kind, trigger.event().outcome);
//! });
//! ```

use bevy_ecs::prelude::*;

use crate::transition::TransitionKind;

/// How a descriptor's phase sequence ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Every step ran.
    Completed,
    /// Geometry was not resolvable; remaining steps were skipped.
    Abandoned,
    /// A step failed; remaining steps were skipped.
    Failed,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionStarted {
    /// Sequence number assigned at enqueue time.
    pub id: u64,
    pub kind: TransitionKind,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionFinished {
    pub id: u64,
    pub kind: TransitionKind,
    pub outcome: TransitionOutcome,
}
