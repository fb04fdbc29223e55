//! Headless streaming demo.
//!
//! Walks an observer along +x, keeping the window settled as it moves and
//! logging what the pipeline did. Stands in for the frame loop a renderer
//! would drive.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use glam::{IVec3, Vec3};

use voxelstream::{Block, BlockKind, CHUNK_SIZE, WorldSettings, WorldStreamer, load_settings};

/// Voxel world streaming demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World seed
    #[arg(long)]
    seed: Option<u32>,

    /// Streaming radius in chunks
    #[arg(long)]
    radius: Option<i32>,

    /// Worker thread count (defaults to the CPU count minus a reserve)
    #[arg(long)]
    workers: Option<usize>,

    /// How many chunks the observer walks along +x
    #[arg(long, default_value_t = 8)]
    steps: u32,

    /// Settings file to load; CLI flags override loaded values
    #[arg(long)]
    settings: Option<PathBuf>,
}

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

pub fn run_demo() {
    let args = Args::parse();
    let settings = resolve_settings(&args);

    let mut world = WorldStreamer::new(&settings);
    let mut observer = Vec3::new(8.0, 40.0, 8.0);

    world.update_observer(observer);
    if !world.settle(SETTLE_TIMEOUT) {
        tracing::warn!("initial window did not settle, continuing anyway");
    }
    report(&world, observer, 0);

    for step in 1..=args.steps {
        observer.x += CHUNK_SIZE as f32;
        world.update_observer(observer);
        let settled = world.settle(SETTLE_TIMEOUT);

        let restitched = world.take_restitch_events().len();
        tracing::debug!(step, settled, restitched, "walked one chunk");
        report(&world, observer, step);
    }

    // A block edit under the observer, the way a player interaction lands
    if let Some(hit) = world.raycast(observer, Vec3::NEG_Y, 64) {
        let above = hit.chunk.base() + hit.pos + IVec3::Y;
        world.set_block(above, Block::new(BlockKind::Stone));
        let events = world.take_restitch_events();
        tracing::info!(pos = ?above, restitch_events = events.len(), "placed a block");
    }

    tracing::info!(
        resident = world.resident_count(),
        center = ?world.center(),
        "demo finished"
    );
    world.shutdown();
}

fn resolve_settings(args: &Args) -> WorldSettings {
    let mut settings = match &args.settings {
        Some(path) => match load_settings(path) {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!(?path, %err, "failed to load settings, using defaults");
                WorldSettings::default()
            }
        },
        None => WorldSettings::default(),
    };

    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(radius) = args.radius {
        settings.radius = radius;
    }
    if args.workers.is_some() {
        settings.workers = args.workers;
    }
    settings
}

fn report(world: &WorldStreamer, observer: Vec3, step: u32) {
    let ground = world
        .raycast(observer, Vec3::NEG_Y, 64)
        .map(|hit| (hit.block.kind, hit.distance));
    let solid = world.grid().chunks().filter(|c| !c.is_empty()).count();
    tracing::info!(
        step,
        center = ?world.center(),
        resident = world.resident_count(),
        solid,
        pending = world.pending_count(),
        ?ground,
        "window state"
    );
}
