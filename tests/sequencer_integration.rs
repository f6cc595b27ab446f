//! Animation queue integration tests driving a full world and schedule.

use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;

use deckmotion::components::card::{CardFace, CardState, OwnerId, Rank, SlotKey, Suit};
use deckmotion::events::audio::SoundCue;
use deckmotion::events::transition::{TransitionFinished, TransitionOutcome, TransitionStarted};
use deckmotion::game::{build_schedule, build_world, run_until_idle, tick};
use deckmotion::resources::animationqueue::{AnimationQueue, Completion, QueueState};
use deckmotion::resources::audio::setup_sound;
use deckmotion::resources::geometry::{GridGeometry, Location};
use deckmotion::resources::timing::{TimingConfig, TimingKey};
use deckmotion::snapshot::GameSnapshot;
use deckmotion::systems::cards::{initialize_cards, lookup};
use deckmotion::systems::overlay::overlay_count;
use deckmotion::transition::{TransitionDescriptor, TransitionKind};

const DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: usize = 100_000;

fn make_world(timing: TimingConfig, grid: GridGeometry) -> (World, Schedule) {
    let mut world = build_world(timing, grid.clone());
    initialize_cards(&mut world, &GameSnapshot::face_down([1, 2], 6), &grid);
    (world, build_schedule())
}

fn default_world() -> (World, Schedule) {
    make_world(TimingConfig::new(), GridGeometry::new([1, 2]))
}

fn face(rank: Rank, suit: Suit) -> CardFace {
    CardFace::new(rank, suit)
}

fn flip(owner: u32, index: usize, revealed: CardFace) -> TransitionDescriptor {
    TransitionDescriptor::Flip {
        slot: SlotKey::new(owner, index),
        revealed_face: revealed,
    }
}

fn enqueue(world: &mut World, batch: Vec<TransitionDescriptor>) -> Completion {
    world.resource_mut::<AnimationQueue>().enqueue(batch, None)
}

/// Records lifecycle events and the highest number of concurrently running transitions.
#[derive(Default)]
struct Monitor {
    running: i32,
    max_running: i32,
    started: Vec<(u64, TransitionKind)>,
    finished: Vec<(u64, TransitionOutcome)>,
}

fn attach_monitor(world: &mut World) -> Arc<Mutex<Monitor>> {
    let monitor = Arc::new(Mutex::new(Monitor::default()));
    let m = monitor.clone();
    world.add_observer(move |trigger: On<TransitionStarted>| {
        let ev = trigger.event();
        let mut m = m.lock().unwrap();
        m.running += 1;
        m.max_running = m.max_running.max(m.running);
        m.started.push((ev.id, ev.kind));
    });
    let m = monitor.clone();
    world.add_observer(move |trigger: On<TransitionFinished>| {
        let ev = trigger.event();
        let mut m = m.lock().unwrap();
        m.running -= 1;
        m.finished.push((ev.id, ev.outcome));
    });
    world.flush();
    monitor
}

#[test]
fn flip_reveals_king_of_spades() {
    let (mut world, mut schedule) = default_world();
    let slot = SlotKey::new(1, 2);
    let king = face(Rank::King, Suit::Spades);
    let done = enqueue(&mut world, vec![flip(1, 2, king)]);

    tick(&mut world, &mut schedule, DT);
    let mid = lookup(&world, slot).unwrap();
    assert!(!mid.visible, "slot is covered while the overlay flips");
    assert_eq!(mid.state, CardState::unknown());
    assert_eq!(overlay_count(&mut world), 1);

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);

    assert!(done.is_complete());
    let view = lookup(&world, slot).unwrap();
    assert_eq!(view.state, CardState::face_up(king));
    assert!(view.visible);
    assert_eq!(overlay_count(&mut world), 0);
}

#[test]
fn swap_replaces_seven_of_clubs_with_ace_of_hearts() {
    let (mut world, mut schedule) = default_world();
    let rx = setup_sound(&mut world);
    let slot = SlotKey::new(1, 0);
    let ace = face(Rank::Ace, Suit::Hearts);
    let done = enqueue(
        &mut world,
        vec![TransitionDescriptor::Swap {
            slot,
            card_leaving_hand: CardState::face_down(Some(face(Rank::Seven, Suit::Clubs))),
            card_entering_hand: CardState::face_up(ace),
        }],
    );

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);

    assert!(done.is_complete());
    assert_eq!(lookup(&world, slot).unwrap().state, CardState::face_up(ace));
    assert!(lookup(&world, slot).unwrap().visible);
    assert_eq!(overlay_count(&mut world), 0);

    let cues: Vec<SoundCue> = rx.try_iter().collect();
    assert_eq!(cues, vec![SoundCue::Flip, SoundCue::Card, SoundCue::Card]);
}

#[test]
fn at_most_one_transition_runs_at_a_time() {
    let (mut world, mut schedule) = default_world();
    let monitor = attach_monitor(&mut world);

    enqueue(
        &mut world,
        vec![
            flip(1, 0, face(Rank::Two, Suit::Hearts)),
            TransitionDescriptor::DrawFromDeck { owner: OwnerId(1) },
            flip(2, 3, face(Rank::Three, Suit::Clubs)),
        ],
    );
    enqueue(
        &mut world,
        vec![TransitionDescriptor::Discard {
            source_slot: None,
            card_discarded: face(Rank::Four, Suit::Spades),
        }],
    );

    for _ in 0..MAX_FRAMES {
        tick(&mut world, &mut schedule, DT);
        assert!(world.resource::<AnimationQueue>().in_flight() <= 1);
        if !world.resource::<AnimationQueue>().is_animating() {
            break;
        }
    }

    let m = monitor.lock().unwrap();
    assert_eq!(m.max_running, 1);
    assert_eq!(m.running, 0);
    let ids: Vec<u64> = m.started.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(m.started[1].1, TransitionKind::DrawFromDeck);
    assert!(m.finished.iter().all(|(_, o)| *o == TransitionOutcome::Completed));
}

#[test]
fn batches_complete_in_enqueue_order() {
    let (mut world, mut schedule) = default_world();
    let order = Arc::new(Mutex::new(Vec::new()));

    for (i, index) in [0usize, 1, 2].into_iter().enumerate() {
        let o = order.clone();
        world.resource_mut::<AnimationQueue>().enqueue(
            vec![
                flip(1, index, face(Rank::Five, Suit::Diamonds)),
                TransitionDescriptor::DrawFromDiscard { owner: OwnerId(1) },
            ],
            Some(Box::new(move || o.lock().unwrap().push(i))),
        );
    }

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn completion_waits_for_the_whole_batch() {
    let (mut world, mut schedule) = default_world();
    let done = enqueue(
        &mut world,
        vec![
            TransitionDescriptor::DrawFromDiscard { owner: OwnerId(1) },
            TransitionDescriptor::DrawFromDiscard { owner: OwnerId(2) },
        ],
    );

    // first descriptor (0.3s) is over, second one not yet
    for _ in 0..30 {
        tick(&mut world, &mut schedule, DT);
    }
    assert_eq!(world.resource::<AnimationQueue>().stats().completed, 1);
    assert!(!done.is_complete());

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);
    assert!(done.is_complete());
}

#[test]
fn empty_batch_completes_before_enqueue_returns() {
    let (mut world, _) = default_world();
    let called = Arc::new(Mutex::new(false));
    let c = called.clone();
    let done = world
        .resource_mut::<AnimationQueue>()
        .enqueue(vec![], Some(Box::new(move || *c.lock().unwrap() = true)));

    assert!(done.is_complete());
    assert!(*called.lock().unwrap());
    assert_eq!(world.resource::<AnimationQueue>().state(), QueueState::Idle);
}

#[test]
fn enqueue_while_draining_appends() {
    let (mut world, mut schedule) = default_world();
    let monitor = attach_monitor(&mut world);
    let first = enqueue(&mut world, vec![flip(1, 0, face(Rank::Six, Suit::Hearts))]);

    for _ in 0..5 {
        tick(&mut world, &mut schedule, DT);
    }
    assert!(world.resource::<AnimationQueue>().is_animating());
    let second = enqueue(&mut world, vec![flip(1, 1, face(Rank::Eight, Suit::Hearts))]);
    assert_eq!(world.resource::<AnimationQueue>().pending_len(), 1);

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);
    assert!(first.is_complete());
    assert!(second.is_complete());
    assert_eq!(monitor.lock().unwrap().max_running, 1);
    assert_eq!(
        lookup(&world, SlotKey::new(1, 1)).unwrap().state,
        CardState::face_up(face(Rank::Eight, Suit::Hearts))
    );
}

#[test]
fn clear_keeps_running_transition_and_drops_backlog() {
    let (mut world, mut schedule) = default_world();
    let dropped_called = Arc::new(Mutex::new(false));
    let c = dropped_called.clone();
    let running = enqueue(&mut world, vec![flip(1, 0, face(Rank::Nine, Suit::Clubs))]);
    world.resource_mut::<AnimationQueue>().enqueue(
        vec![flip(1, 1, face(Rank::Ten, Suit::Clubs))],
        Some(Box::new(move || *c.lock().unwrap() = true)),
    );

    tick(&mut world, &mut schedule, DT);
    assert_eq!(world.resource::<AnimationQueue>().in_flight(), 1);
    world.resource_mut::<AnimationQueue>().clear();

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);

    assert!(running.is_complete());
    assert!(!*dropped_called.lock().unwrap());
    let queue = world.resource::<AnimationQueue>();
    assert!(!queue.is_animating());
    assert_eq!(queue.stats().dropped, 1);
    assert_eq!(queue.stats().started, 1);
    assert_eq!(
        lookup(&world, SlotKey::new(1, 1)).unwrap().state,
        CardState::unknown()
    );
}

#[test]
fn geometry_failure_abandons_without_leaking_overlays() {
    let mut grid = GridGeometry::new([1, 2]);
    grid.unmeasure_location(Location::Discard);
    let (mut world, mut schedule) = make_world(TimingConfig::new(), grid);
    let monitor = attach_monitor(&mut world);
    let slot = SlotKey::new(1, 0);
    let ace = face(Rank::Ace, Suit::Hearts);

    let swap = enqueue(
        &mut world,
        vec![TransitionDescriptor::Swap {
            slot,
            card_leaving_hand: CardState::face_down(Some(face(Rank::Seven, Suit::Clubs))),
            card_entering_hand: CardState::face_up(ace),
        }],
    );
    let next = enqueue(&mut world, vec![flip(2, 0, face(Rank::Jack, Suit::Spades))]);

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);

    assert!(swap.is_complete());
    assert!(next.is_complete(), "queue keeps going after an abandoned transition");
    assert_eq!(overlay_count(&mut world), 0);
    let view = lookup(&world, slot).unwrap();
    assert!(view.visible);
    assert_eq!(view.state, CardState::face_up(ace));

    let m = monitor.lock().unwrap();
    assert_eq!(m.finished[0], (0, TransitionOutcome::Abandoned));
    assert_eq!(m.finished[1], (1, TransitionOutcome::Completed));
    assert_eq!(world.resource::<AnimationQueue>().stats().abandoned, 1);
}

#[test]
fn discard_from_unknown_owner_is_abandoned() {
    let (mut world, mut schedule) = default_world();
    let done = enqueue(
        &mut world,
        vec![TransitionDescriptor::Discard {
            source_slot: Some(SlotKey::new(9, 0)),
            card_discarded: face(Rank::Queen, Suit::Hearts),
        }],
    );
    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);

    assert!(done.is_complete());
    assert_eq!(world.resource::<AnimationQueue>().stats().abandoned, 1);
    assert_eq!(overlay_count(&mut world), 0);
}

#[test]
fn handles_submit_from_other_threads() {
    let (mut world, mut schedule) = default_world();
    let handle = world.resource::<AnimationQueue>().handle();
    let worker = std::thread::spawn(move || {
        handle.enqueue(
            vec![TransitionDescriptor::DrawFromDeck { owner: OwnerId(2) }],
            None,
        )
    });
    let done = worker.join().unwrap();
    assert!(!done.is_complete());

    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);
    assert!(done.is_complete());
    assert_eq!(world.resource::<AnimationQueue>().stats().completed, 1);
}

#[test]
fn instant_timings_finish_in_one_frame() {
    let (mut world, mut schedule) = make_world(TimingConfig::instant(), GridGeometry::new([1, 2]));
    let done = enqueue(
        &mut world,
        vec![
            flip(1, 0, face(Rank::King, Suit::Hearts)),
            flip(1, 1, face(Rank::King, Suit::Clubs)),
            TransitionDescriptor::DrawFromDiscard { owner: OwnerId(1) },
        ],
    );
    tick(&mut world, &mut schedule, 0.0);
    assert!(done.is_complete());
    assert!(!world.resource::<AnimationQueue>().is_animating());
}

#[test]
fn inter_animation_pause_separates_descriptors() {
    let mut timing = TimingConfig::instant();
    timing.set(TimingKey::InterAnimationPause, 0.5);
    let (mut world, mut schedule) = make_world(timing, GridGeometry::new([1, 2]));
    let monitor = attach_monitor(&mut world);
    enqueue(
        &mut world,
        vec![
            TransitionDescriptor::DrawFromDiscard { owner: OwnerId(1) },
            TransitionDescriptor::DrawFromDiscard { owner: OwnerId(1) },
        ],
    );

    tick(&mut world, &mut schedule, 0.25);
    assert_eq!(monitor.lock().unwrap().started.len(), 1);
    tick(&mut world, &mut schedule, 0.25);
    assert_eq!(monitor.lock().unwrap().started.len(), 2);
    assert!(!world.resource::<AnimationQueue>().is_animating());
}

#[test]
fn observers_can_use_the_queue() {
    let (mut world, mut schedule) = default_world();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    world.add_observer(
        move |trigger: On<TransitionFinished>, mut queue: ResMut<AnimationQueue>| {
            let ev = trigger.event();
            s.lock().unwrap().push((ev.id, queue.pending_len()));
            if ev.id == 0 {
                queue.enqueue(
                    vec![TransitionDescriptor::DrawFromDiscard { owner: OwnerId(2) }],
                    None,
                );
            }
        },
    );
    world.add_observer(|_: On<TransitionStarted>, queue: Res<AnimationQueue>| {
        assert_eq!(queue.in_flight(), 1);
    });
    world.flush();

    let done = enqueue(&mut world, vec![flip(1, 2, face(Rank::King, Suit::Spades))]);
    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);

    assert!(done.is_complete());
    assert_eq!(*seen.lock().unwrap(), vec![(0, 0), (1, 0)]);
    let queue = world.resource::<AnimationQueue>();
    assert_eq!(queue.stats().completed, 2);
    assert!(!queue.is_animating());
}

#[test]
fn despawned_slot_entity_fails_the_transition() {
    let (mut world, mut schedule) = default_world();
    let monitor = attach_monitor(&mut world);
    let stale = lookup(&world, SlotKey::new(1, 2)).unwrap().entity;
    world.despawn(stale);

    let broken = enqueue(&mut world, vec![flip(1, 2, face(Rank::King, Suit::Spades))]);
    let next = enqueue(&mut world, vec![flip(1, 3, face(Rank::Two, Suit::Clubs))]);
    run_until_idle(&mut world, &mut schedule, DT, MAX_FRAMES);

    assert!(broken.is_complete());
    assert!(next.is_complete());
    assert_eq!(overlay_count(&mut world), 0);
    let m = monitor.lock().unwrap();
    assert_eq!(m.finished[0], (0, TransitionOutcome::Failed));
    assert_eq!(m.finished[1], (1, TransitionOutcome::Completed));
    assert_eq!(world.resource::<AnimationQueue>().stats().failed, 1);
}
