//! # engine_app
//!
//! Runs a level outside the editor (or with editor decoration on).
//!
//! ## Startup Sequence
//!
//! 1. Read the level file named by `--level` (an empty level otherwise).
//! 2. Spawn every listed entity through the factory registry and link
//!    commands between them.
//! 3. Enter the fixed-timestep tick loop.

mod level;
mod tick;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use engine_entity::World;
use engine_factory::FactoryRegistry;
use tracing::info;
use tracing_subscriber::EnvFilter;

use level::Level;
use tick::TickLoop;

#[derive(Parser)]
#[command(name = "engine_app", about = "Spawn a level through the entity factories and run it")]
struct Args {
    /// Level file (JSON)
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Attach editor components to every entity
    #[arg(long)]
    editor: bool,

    /// Number of ticks to run (0 runs forever)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Target ticks per second
    #[arg(long)]
    tick_rate: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();
    let mut level = match &args.level {
        Some(path) => Level::load(path)?,
        None => Level::default(),
    };
    if args.editor {
        level.world.editor_enabled = true;
    }
    if let Some(ticks) = args.ticks {
        level.tick.max_ticks = ticks;
    }
    if let Some(rate) = args.tick_rate {
        level.tick.tick_rate = rate;
    }

    let registry = FactoryRegistry::with_defaults();
    info!(kinds = registry.len(), "factories registered");

    let mut world = World::new(level.world.clone());
    let spawned = level.spawn(&registry, &mut world)?;
    info!(entities = spawned.len(), editor = world.is_editor(), "level loaded");

    let mut tick_loop = TickLoop::new(level.tick.clone(), world)?;
    tick_loop.run();

    info!(
        ticks = tick_loop.tick_id(),
        remaining = tick_loop.world().entity_count(),
        "level finished"
    );
    Ok(())
}
