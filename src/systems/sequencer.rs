//! The drain loop.
//!
//! [`animation_queue_system`] runs once per frame with the frame's delta
//! from [`WorldTime`] as its time budget. It works through the running
//! descriptor's steps, executing instant steps immediately and spending the
//! budget on timed ones; when a descriptor ends it fires that batch's
//! completion, waits the configured inter-animation pause, and pops the next
//! one. Only one descriptor is ever between [`TransitionStarted`] and
//! [`TransitionFinished`].
//!
//! # Exit paths
//!
//! A descriptor ends in one of three ways:
//!
//! - all steps ran (`Completed`)
//! - a rectangle could not be resolved (`Abandoned`)
//! - a step failed, e.g. its slot has no entity (`Failed`)
//!
//! Every path goes through [`finish`]: leftover overlays are destroyed, the
//! covered slot is uncovered, the descriptor's settled slot state is written
//! if a step has not already done so, and the completion fires. A broken
//! descriptor costs at most a skipped animation; it never stalls the queue.
//!
//! Lifecycle events are triggered after the drain for the frame returns, with
//! the [`AnimationQueue`] back in the world, so observers may read it or
//! enqueue follow-up batches.
//!
//! # System Ordering
//!
//! 1. [`poll_sequencer_inbox`] – take batches submitted from other threads
//! 2. [`animation_queue_system`] – advance the running descriptor
//! 3. [`tween_rect_system`](crate::systems::tween::tween_rect_system) – move overlays

use bevy_ecs::prelude::*;
use log::{debug, error, info, warn};
use smallvec::SmallVec;
use thiserror::Error;

use crate::components::card::{CardAppearance, CardState, SlotKey};
use crate::components::screenrect::{Covered, Rect};
use crate::components::tween::Easing;
use crate::events::audio::SoundCue;
use crate::events::transition::{TransitionFinished, TransitionOutcome, TransitionStarted};
use crate::resources::animationqueue::{AnimationQueue, CompletionSink, QueuedTransition};
use crate::resources::geometry::{
    Geometry, GeometryError, GeometryTarget, Location, resolve_location, resolve_slot,
};
use crate::resources::timing::{TimingConfig, TimingKey};
use crate::resources::worldtime::WorldTime;
use crate::systems::cards::slot_entity;
use crate::systems::overlay::{
    OverlayHandle, create_overlay, destroy_overlay, move_to, set_front, set_orientation, snap_to,
};
use crate::transition::{OverlaySlot, RectSource, Step, Steps, TransitionKind};

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("no slot entity for {0}")]
    UnknownSlot(SlotKey),
    #[error("overlay #{0} is not alive")]
    MissingOverlay(OverlaySlot),
}

impl SequenceError {
    fn outcome(&self) -> TransitionOutcome {
        match self {
            SequenceError::Geometry(_) => TransitionOutcome::Abandoned,
            _ => TransitionOutcome::Failed,
        }
    }
}

/// Timed step in progress.
#[derive(Debug, Clone, Copy)]
struct Timed {
    remaining: f32,
    /// Destination to snap to when a move ends.
    snap: Option<(OverlaySlot, Rect)>,
}

/// The descriptor whose steps are running.
#[derive(Debug)]
pub struct ActiveTransition {
    id: u64,
    kind: TransitionKind,
    steps: Steps,
    cursor: usize,
    timed: Option<Timed>,
    overlays: SmallVec<[Option<OverlayHandle>; 2]>,
    covered: Option<SlotKey>,
    settled: Option<(SlotKey, CardState)>,
    completion: Option<CompletionSink>,
}

impl ActiveTransition {
    fn start(queued: QueuedTransition) -> Self {
        let QueuedTransition {
            id,
            descriptor,
            completion,
        } = queued;
        ActiveTransition {
            id,
            kind: descriptor.kind(),
            steps: descriptor.steps(),
            cursor: 0,
            timed: None,
            overlays: SmallVec::new(),
            covered: None,
            settled: descriptor.settled_state(),
            completion,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    fn overlay(&self, slot: OverlaySlot) -> Result<OverlayHandle, SequenceError> {
        self.overlays
            .get(slot)
            .copied()
            .flatten()
            .ok_or(SequenceError::MissingOverlay(slot))
    }

    fn set_overlay(&mut self, slot: OverlaySlot, handle: Option<OverlayHandle>) {
        if self.overlays.len() <= slot {
            self.overlays.resize(slot + 1, None);
        }
        self.overlays[slot] = handle;
    }
}

/// Lifecycle events raised during one drain, triggered once the queue is
/// back in the world.
enum Lifecycle {
    Started(TransitionStarted),
    Finished(TransitionFinished),
}

type Lifecycles = SmallVec<[Lifecycle; 4]>;

enum Progress {
    /// Waiting on a timed step; the frame budget is spent.
    Blocked,
    Finished(TransitionOutcome),
}

/// Take batches submitted through [`SequencerHandle`](crate::resources::animationqueue::SequencerHandle)s.
pub fn poll_sequencer_inbox(mut queue: ResMut<AnimationQueue>) {
    let batches = queue.poll_inbox();
    if batches > 0 {
        debug!("Received {} batches from handles", batches);
    }
}

/// Advance the queue by this frame's delta.
pub fn animation_queue_system(world: &mut World) {
    let dt = world
        .get_resource::<WorldTime>()
        .map(|t| t.delta.max(0.0))
        .unwrap_or(0.0);
    drain_queue(world, dt);
}

/// Advance the queue by `budget` seconds.
///
/// Exposed for hosts that drive the sequencer with their own clock.
pub fn drain_queue(world: &mut World, budget: f32) {
    if !world.contains_resource::<AnimationQueue>() {
        return;
    }
    let events = world.resource_scope(|world, mut queue: Mut<AnimationQueue>| {
        let mut events = Lifecycles::new();
        advance(world, &mut queue, budget, &mut events);
        events
    });
    // observers may read or enqueue on the queue, so it must be reinserted first
    for event in events {
        match event {
            Lifecycle::Started(ev) => world.trigger(ev),
            Lifecycle::Finished(ev) => world.trigger(ev),
        }
    }
}

fn advance(world: &mut World, queue: &mut AnimationQueue, budget: f32, events: &mut Lifecycles) {
    let mut budget = budget;
    loop {
        if let Some(active) = queue.active.as_mut() {
            match run_steps(world, active, &mut budget) {
                Progress::Blocked => return,
                Progress::Finished(outcome) => {
                    if let Some(active) = queue.active.take() {
                        let stats = &mut queue.stats;
                        match outcome {
                            TransitionOutcome::Completed => stats.completed += 1,
                            TransitionOutcome::Abandoned => stats.abandoned += 1,
                            TransitionOutcome::Failed => stats.failed += 1,
                        }
                        events.push(Lifecycle::Finished(finish(world, active, outcome)));
                    }
                    if queue.has_pending() {
                        queue.pause_remaining = timing(world, TimingKey::InterAnimationPause);
                    } else {
                        queue.set_idle();
                        return;
                    }
                }
            }
            continue;
        }

        if queue.pause_remaining > 0.0 {
            if budget < queue.pause_remaining {
                queue.pause_remaining -= budget;
                return;
            }
            budget -= queue.pause_remaining;
            queue.pause_remaining = 0.0;
        }

        match queue.pop_next() {
            Some(next) => {
                let active = ActiveTransition::start(next);
                debug!("Transition #{} ({}) started", active.id, active.kind);
                queue.stats.started += 1;
                events.push(Lifecycle::Started(TransitionStarted {
                    id: active.id,
                    kind: active.kind,
                }));
                queue.active = Some(active);
            }
            None => {
                queue.set_idle();
                return;
            }
        }
    }
}

/// Run steps until one blocks on time or the sequence ends.
fn run_steps(world: &mut World, active: &mut ActiveTransition, budget: &mut f32) -> Progress {
    while active.cursor < active.steps.len() {
        if active.timed.is_none() {
            let step = active.steps[active.cursor].clone();
            let result = run_step(world, active, &step);
            let err = match result {
                Ok(timed) => {
                    active.timed = timed;
                    None
                }
                Err(err) => Some(err),
            };
            if let Some(err) = err {
                let outcome = err.outcome();
                match outcome {
                    TransitionOutcome::Abandoned => warn!(
                        "Transition #{} ({}) abandoned: {}",
                        active.id, active.kind, err
                    ),
                    _ => error!(
                        "Transition #{} ({}) failed: {}",
                        active.id, active.kind, err
                    ),
                }
                return Progress::Finished(outcome);
            }
            if active.timed.is_none() {
                active.cursor += 1;
                continue;
            }
        }

        if let Some(timed) = active.timed.as_mut() {
            if *budget < timed.remaining {
                timed.remaining -= *budget;
                *budget = 0.0;
                return Progress::Blocked;
            }
            *budget -= timed.remaining;
            if let Some((slot, rect)) = timed.snap {
                if let Ok(handle) = active.overlay(slot) {
                    snap_to(world, handle, rect);
                }
            }
            active.timed = None;
            active.cursor += 1;
        }
    }
    Progress::Finished(TransitionOutcome::Completed)
}

/// Execute one step. Timed steps return what is left to wait.
fn run_step(
    world: &mut World,
    active: &mut ActiveTransition,
    step: &Step,
) -> Result<Option<Timed>, SequenceError> {
    match step {
        Step::Wait(key) => {
            return Ok(Some(Timed {
                remaining: timing(world, *key),
                snap: None,
            }));
        }
        Step::MoveTo { overlay, to } => {
            let handle = active.overlay(*overlay)?;
            let rect = resolve(world, *to)?;
            let (duration, easing) = world
                .get_resource::<TimingConfig>()
                .map(|c| (c.get(TimingKey::Move), c.move_easing))
                .unwrap_or((0.0, Easing::Linear));
            if !move_to(world, handle, rect, duration, easing) {
                return Err(SequenceError::MissingOverlay(*overlay));
            }
            return Ok(Some(Timed {
                remaining: duration,
                snap: Some((*overlay, rect)),
            }));
        }
        Step::SpawnOverlay {
            overlay,
            at,
            front,
            face_up,
        } => {
            let rect = resolve(world, *at)?;
            let handle = create_overlay(world, rect);
            active.set_overlay(*overlay, Some(handle));
            set_front(world, handle, *front);
            set_orientation(world, handle, *face_up);
        }
        Step::Cover(slot) => {
            slot_entity_mut(world, *slot)?.insert(Covered);
            active.covered = Some(*slot);
        }
        Step::Turn { overlay, face_up } => {
            let handle = active.overlay(*overlay)?;
            if !set_orientation(world, handle, *face_up) {
                return Err(SequenceError::MissingOverlay(*overlay));
            }
        }
        Step::Sound(cue) => play(world, *cue),
        Step::DespawnOverlay(overlay) => {
            let handle = active.overlay(*overlay)?;
            destroy_overlay(world, handle);
            active.set_overlay(*overlay, None);
        }
        Step::Commit { slot, state } => {
            commit(world, *slot, *state)?;
            if active.covered == Some(*slot) {
                active.covered = None;
            }
            if active.settled.map(|(k, _)| k) == Some(*slot) {
                active.settled = None;
            }
        }
    }
    Ok(None)
}

/// Write a slot's final state and make it visible again.
fn commit(world: &mut World, slot: SlotKey, state: CardState) -> Result<(), SequenceError> {
    let mut e = slot_entity_mut(world, slot)?;
    e.insert(CardAppearance(state));
    e.remove::<Covered>();
    Ok(())
}

/// Common exit path of every descriptor.
fn finish(
    world: &mut World,
    mut active: ActiveTransition,
    outcome: TransitionOutcome,
) -> TransitionFinished {
    for handle in active.overlays.drain(..).flatten() {
        destroy_overlay(world, handle);
    }
    if let Some((slot, state)) = active.settled.take() {
        if let Err(err) = commit(world, slot, state) {
            warn!("Transition #{}: could not settle {}: {}", active.id, slot, err);
        }
    }
    if let Some(slot) = active.covered.take() {
        if let Ok(mut e) = slot_entity_mut(world, slot) {
            e.remove::<Covered>();
        }
    }

    match outcome {
        TransitionOutcome::Completed => {
            debug!("Transition #{} ({}) finished", active.id, active.kind)
        }
        _ => info!(
            "Transition #{} ({}) ended early: {:?}",
            active.id, active.kind, outcome
        ),
    }
    if let Some(completion) = active.completion.take() {
        completion.fire();
    }
    TransitionFinished {
        id: active.id,
        kind: active.kind,
        outcome,
    }
}

/// The live slot entity for `slot`; a stale index entry counts as unknown.
fn slot_entity_mut(
    world: &mut World,
    slot: SlotKey,
) -> Result<EntityWorldMut<'_>, SequenceError> {
    let entity = slot_entity(world, slot).ok_or(SequenceError::UnknownSlot(slot))?;
    world
        .get_entity_mut(entity)
        .map_err(|_| SequenceError::UnknownSlot(slot))
}

fn resolve(world: &World, source: RectSource) -> Result<Rect, SequenceError> {
    let Some(geometry) = world.get_resource::<Geometry>() else {
        let target = match source {
            RectSource::Slot(key) => GeometryTarget::Slot(key),
            RectSource::Location(loc) => GeometryTarget::Location(loc),
            RectSource::AboveDiscard => GeometryTarget::Location(Location::Discard),
        };
        return Err(GeometryError::Resolver {
            target,
            reason: "no geometry resolver installed".into(),
        }
        .into());
    };
    let resolver = geometry.resolver();
    let rect = match source {
        RectSource::Slot(key) => resolve_slot(resolver, key)?,
        RectSource::Location(loc) => resolve_location(resolver, loc)?,
        RectSource::AboveDiscard => {
            let offset = world
                .get_resource::<TimingConfig>()
                .map(|c| c.discard_fallback_offset)
                .unwrap_or(0.0);
            resolve_location(resolver, Location::Discard)?.offset(0.0, -offset)
        }
    };
    Ok(rect)
}

fn timing(world: &World, key: TimingKey) -> f32 {
    world
        .get_resource::<TimingConfig>()
        .map(|c| c.get(key))
        .unwrap_or(0.0)
}

fn play(world: &mut World, cue: SoundCue) {
    if let Some(mut msgs) = world.get_resource_mut::<Messages<SoundCue>>() {
        msgs.write(cue);
    }
}
