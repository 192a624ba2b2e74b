#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates a level against an in-memory host.

mod host;
mod render;

use std::{collections::BTreeSet, fs, io, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use canopy_core::{LevelConfig, TriggerKind};
use canopy_level::{LevelEvent, LevelOrchestrator, LevelPhase};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::host::HeadlessHost;

/// Fixed simulation step.
const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);
const MAX_FRAMES: u32 = 100_000;

#[derive(Debug, Parser)]
#[command(name = "canopy")]
#[command(about = "Generates a vertical tree-climb level headlessly")]
struct Cli {
    /// Seed for the level RNG; drawn at random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the level height in rows.
    #[arg(long)]
    height: Option<u32>,
    /// TOML file with level tuning; missing keys keep their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log filter directives.
    #[arg(long, default_value = "canopy=info")]
    log: String,
    /// Prints the committed level as ASCII once it is ready.
    #[arg(long)]
    render: bool,
    /// Number of enemy prototypes the spawner offers.
    #[arg(long, default_value_t = 3)]
    prototypes: usize,
    /// Plays the end-of-level transition after the level is ready.
    #[arg(long)]
    end_level: bool,
}

/// Entry point for the canopy command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(height) = cli.height {
        config.grid.height = height;
    }
    let seed = cli.seed.unwrap_or_else(rand::random);
    tracing::info!(
        seed,
        width = config.grid.width,
        height = config.grid.height,
        "generating level"
    );

    let host = HeadlessHost::new(config.grid.width, config.grid.height, cli.prototypes);
    let mut level = LevelOrchestrator::new(config, host, ChaCha8Rng::seed_from_u64(seed))?;
    let report = level.generate_level()?;

    let mut events = Vec::new();
    let frames = run_frames(&mut level, &mut events, |level| level.is_ready())?;
    summarize(&level, frames);

    if cli.render {
        let stdout = io::stdout();
        render::render(level.host(), &mut stdout.lock()).context("failed to print level")?;
    }

    if cli.end_level {
        level.trigger_end_level()?;
        events.clear();
        let frames = run_frames(&mut level, &mut events, |level| {
            level.phase() == LevelPhase::Idle && level.pending_actions().count() == 0
        })?;
        let host = level.host();
        tracing::info!(
            frames,
            live_enemies = host.live_enemies(),
            transitions_in = host.transitions_in(),
            player = ?host.player().position,
            camera = ?host.camera_bounds(),
            "level cleared"
        );
    }

    tracing::debug!(?report, "done");
    Ok(())
}

fn init_tracing(filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter {filter:?}"))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<LevelConfig> {
    let Some(path) = path else {
        return Ok(LevelConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level config at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse level config at {}", path.display()))
}

/// Steps the level until `done` holds, returning the number of frames used.
fn run_frames<F>(
    level: &mut LevelOrchestrator<HeadlessHost, ChaCha8Rng>,
    events: &mut Vec<LevelEvent>,
    done: F,
) -> Result<u32>
where
    F: Fn(&LevelOrchestrator<HeadlessHost, ChaCha8Rng>) -> bool,
{
    let mut frames = 0;
    while !done(level) {
        if frames == MAX_FRAMES {
            bail!("level did not settle within {MAX_FRAMES} frames");
        }
        level.update(FRAME, events);
        level.host_mut().advance_frame();
        frames += 1;
    }
    for event in events.iter() {
        tracing::debug!(?event, "level event");
    }
    Ok(frames)
}

fn summarize(level: &LevelOrchestrator<HeadlessHost, ChaCha8Rng>, frames: u32) {
    let host = level.host();
    let prototypes: BTreeSet<_> = host.enemies().map(|enemy| enemy.prototype.get()).collect();
    let player = host.player();
    tracing::info!(
        frames,
        tiles_written = host.tiles().sets(),
        enemies_spawned = host.live_enemies(),
        prototypes_used = prototypes.len(),
        "level ready"
    );
    tracing::debug!(
        position = ?player.position,
        velocity = ?player.velocity,
        control = player.control,
        framing = ?host.framing(),
        camera = ?host.camera_bounds(),
        safety_volume = ?host.safety_volume(),
        control_trigger = ?host.trigger(TriggerKind::GivePlayerControl),
        end_trigger = ?host.trigger(TriggerKind::EndLevel),
        "player handed off"
    );
}
