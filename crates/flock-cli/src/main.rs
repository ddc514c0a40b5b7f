//! Flock CLI - headless multithreaded flock simulation.
//!
//! - `flock run` - spawn a flock, drive it for a number of frames
//! - `flock config` - print the default run configuration as YAML

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use flock_core::{ActorId, SplitMix64};
use flock_sim::{FlockConfig, FlockCoordinator, FrameRecorder};

mod scene;
mod spawn;

use scene::Scene;

#[derive(Parser)]
#[command(name = "flock")]
#[command(about = "Headless multithreaded flock simulation", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn a flock and pull frames from it
    Run {
        /// YAML run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames to pull
        #[arg(long, default_value_t = 300)]
        frames: u64,

        /// Override the worker thread count
        #[arg(long)]
        threads: Option<usize>,

        /// Override the population size
        #[arg(long)]
        population: Option<usize>,

        /// Append every frame to this JSONL file
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Print the default configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            config,
            frames,
            threads,
            population,
            record,
        } => {
            let mut config = match config {
                Some(path) => FlockConfig::load(&path)?,
                None => FlockConfig::default(),
            };
            if let Some(threads) = threads {
                config.threads = threads;
            }
            if let Some(population) = population {
                config.population = population;
            }
            run_flock(&config, frames, record)
        }
        Commands::Config => {
            print!("{}", FlockConfig::default().to_yaml()?);
            Ok(())
        }
    }
}

fn run_flock(config: &FlockConfig, frames: u64, record: Option<PathBuf>) -> Result<()> {
    config.validate()?;

    let mut rng = SplitMix64::new(config.seed);
    let transforms = spawn::sphere(&config.spawn, config.population, &mut rng);
    let mut flock = FlockCoordinator::from_transforms(
        transforms,
        config.threads,
        config.parameters.clone(),
        config.seed,
    )?;

    let mut scene = Scene::from_config(config);
    flock.refresh_external(&scene.entities());
    flock.start()?;

    tracing::info!(
        population = config.population,
        workers = flock.worker_count(),
        dangers = scene.danger_count(),
        frames,
        "Flock started"
    );

    let recorder = record.map(FrameRecorder::new);
    let frame_interval = Duration::from_millis(config.frame_interval_ms);
    let refresh_interval = Duration::from_millis(config.refresh_interval_ms);

    let started = Instant::now();
    let mut last_frame = started;
    let mut last_refresh = started;
    let mut damage: BTreeMap<ActorId, f32> = BTreeMap::new();

    for frame in 0..frames {
        thread::sleep(frame_interval);

        let now = Instant::now();
        scene.advance(now.saturating_duration_since(last_frame).as_secs_f32());
        last_frame = now;

        if now.saturating_duration_since(last_refresh) >= refresh_interval {
            flock.refresh_external(&scene.entities());
            last_refresh = now;
        }

        let entries = flock.collect_frame();
        for target in entries.iter().flat_map(|e| &e.attacked_targets) {
            *damage.entry(*target).or_default() += config.parameters.damage_amount;
        }

        if let Some(recorder) = &recorder {
            recorder.record(frame, entries)?;
        }
    }

    for stats in flock.stats() {
        tracing::info!(
            worker = stats.index,
            ticks = stats.ticks,
            agents = stats.agents,
            escaping = stats.escaping,
            last_tick_ms = %format!("{:.3}", stats.last_tick_seconds * 1000.0),
            "Worker summary"
        );
    }
    flock.stop();

    for (target, amount) in &damage {
        tracing::info!(target_id = target.0, damage = %format!("{amount:.3}"), "Damage dealt");
    }
    tracing::info!(
        frames,
        elapsed_s = %format!("{:.2}", started.elapsed().as_secs_f32()),
        recorded = ?recorder.as_ref().map(|r| r.path().display().to_string()),
        "Run complete"
    );

    Ok(())
}
