//! Deckmotion headless demo.
//!
//! Loads a scenario (a starting snapshot plus batches of transitions), builds
//! the slot entities on a grid layout and plays every batch through the
//! animation queue with a fixed frame step. Transitions and sound cues are
//! logged as they happen; the final slot states are printed at the end.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --scenario assets/scenarios/opening.json
//! cargo run -- --seed 42
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bevy_ecs::prelude::*;
use clap::Parser;
use deckmotion::events::transition::{TransitionFinished, TransitionOutcome, TransitionStarted};
use deckmotion::game::{build_schedule, build_world, run_until_idle};
use deckmotion::resources::animationqueue::AnimationQueue;
use deckmotion::resources::audio::setup_sound;
use deckmotion::resources::geometry::GridGeometry;
use deckmotion::resources::slotindex::SlotIndex;
use deckmotion::resources::timing::TimingConfig;
use deckmotion::scenario::Scenario;
use deckmotion::systems::cards::{initialize_cards, lookup};

/// Deckmotion card animation demo
#[derive(Parser)]
#[command(version, about = "Plays card-table transitions headlessly and logs them.")]
struct Cli {
    /// Scenario file (snapshot + batches of transitions).
    #[arg(long, value_name = "PATH", default_value = "assets/scenarios/opening.json")]
    scenario: PathBuf,

    /// Timing configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Frame step in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Ignore the scenario file and play a random deal with this seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Slots per hand for random deals.
    #[arg(long, default_value_t = 6)]
    slots: usize,

    /// Write the effective timing configuration back to `--config` and exit.
    #[arg(long)]
    write_config: bool,
}

const MAX_FRAMES: usize = 1_000_000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut timing = TimingConfig::with_path(&cli.config);
    if let Err(e) = timing.load_from_file() {
        log::warn!("{}; using default timings", e);
    }

    if cli.write_config {
        match timing.save_to_file() {
            Ok(()) => println!("Timing config written to {}", cli.config.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let scenario = match cli.seed {
        Some(seed) => {
            log::info!("Random deal with seed {}", seed);
            Scenario::random_deal(seed, &[1, 2], cli.slots)
        }
        None => match Scenario::load(&cli.scenario) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    };

    let owners: Vec<u32> = scenario.snapshot.owners().map(|o| o.0).collect();
    let columns = scenario
        .snapshot
        .hands
        .iter()
        .map(|h| h.slots.len().div_ceil(2))
        .max()
        .unwrap_or(1)
        .max(3);
    let grid = GridGeometry::new(owners).with_columns(columns);

    let mut world = build_world(timing, grid.clone());
    let rx_cue = setup_sound(&mut world);
    let sound_thread = std::thread::spawn(move || {
        let mut played = 0usize;
        for cue in rx_cue.iter() {
            log::info!("♪ {}", cue.name());
            played += 1;
        }
        played
    });

    initialize_cards(&mut world, &scenario.snapshot, &grid);

    let abandoned = Arc::new(AtomicUsize::new(0));
    world.add_observer(|trigger: On<TransitionStarted>| {
        let ev = trigger.event();
        log::info!("▶ #{} {}", ev.id, ev.kind);
    });
    let counter = abandoned.clone();
    world.add_observer(move |trigger: On<TransitionFinished>| {
        let ev = trigger.event();
        if ev.outcome != TransitionOutcome::Completed {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        log::info!("■ #{} {} ({:?})", ev.id, ev.kind, ev.outcome);
    });
    world.flush();

    let mut schedule = build_schedule();
    for (i, batch) in scenario.batches.into_iter().enumerate() {
        let len = batch.len();
        world.resource_mut::<AnimationQueue>().enqueue(
            batch,
            Some(Box::new(move || {
                log::info!("Batch {} done ({} transitions)", i, len);
            })),
        );
    }
    let frames = run_until_idle(&mut world, &mut schedule, cli.dt, MAX_FRAMES);

    let stats = world.resource::<AnimationQueue>().stats();
    println!(
        "Played {} transitions in {} frames ({} ended early)",
        stats.completed + stats.abandoned + stats.failed,
        frames,
        abandoned.load(Ordering::Relaxed)
    );
    let keys = world.resource::<SlotIndex>().keys();
    for key in keys {
        if let Some(view) = lookup(&world, key) {
            let face = match (view.state.face, view.state.face_up) {
                (Some(face), true) => face.to_string(),
                (Some(_), false) => "▒ (known)".to_string(),
                (None, _) => "▒".to_string(),
            };
            println!("{:<10} {}", key.to_string(), face);
        }
    }

    // drop the bridge so the sound thread sees the channel close
    drop(world);
    match sound_thread.join() {
        Ok(played) => log::info!("{} sound cues played", played),
        Err(_) => log::error!("sound thread panicked"),
    }
}
