//! Circle Islands entry point
//!
//! Builds a world from settings and runs the collision pipeline headless,
//! logging frame timing the way a render loop would.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use circle_islands::Settings;
use circle_islands::sim::{FrameStats, World, tick};

#[derive(Parser, Debug)]
#[command(version, about = "Run the circle island settling simulation without a window")]
struct Args {
    /// Settings file (JSON); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,
    /// Override the run seed
    #[arg(long)]
    seed: Option<u64>,
    /// Override the body count
    #[arg(long)]
    bodies: Option<usize>,
    /// Write the final world state as JSON
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(count) = args.bodies {
        settings.body_count = count;
    }
    settings.validate().context("checking settings")?;
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    run(&args).inspect_err(|err| log::error!("{err:#}"))
}

fn run(args: &Args) -> Result<()> {
    let settings = load_settings(args)?;
    log::info!("Circle Islands (headless) starting...");
    let mut world = World::new(settings).context("building world")?;

    let mut totals = FrameStats::default();
    let run_start = Instant::now();
    let mut last = run_start;

    for _ in 0..args.frames {
        let begin = Instant::now();
        let stats = tick(&mut world);
        let update = begin.elapsed();

        let frame_time = begin.duration_since(last).as_secs_f64();
        last = begin;
        if frame_time > 0.0 {
            log::debug!(
                "{:.1} fps; update: {} ns; islands: {}, settled: {}",
                1.0 / frame_time,
                update.as_nanos(),
                stats.islands,
                stats.settled_bodies
            );
        }
        totals.add(&stats);
    }

    let elapsed = run_start.elapsed();
    let frames = args.frames.max(1) as f64;
    log::info!(
        "{} frames in {:.3}s ({:.1} us/frame)",
        args.frames,
        elapsed.as_secs_f64(),
        elapsed.as_secs_f64() * 1e6 / frames
    );
    log::info!(
        "avg per frame: {:.1} candidate pairs, {:.1} overlaps, {:.1} islands, {:.1} settled bodies",
        totals.candidate_pairs as f64 / frames,
        totals.overlaps as f64 / frames,
        totals.islands as f64 / frames,
        totals.settled_bodies as f64 / frames
    );

    if let Some(path) = &args.dump {
        let json = serde_json::to_string_pretty(&world.snapshot())?;
        std::fs::write(path, json)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
        log::info!("Snapshot written to {}", path.display());
    }

    Ok(())
}
