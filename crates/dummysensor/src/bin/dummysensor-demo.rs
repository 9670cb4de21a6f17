//! Runs a scenario with the dummy sensor system loaded and reports how many
//! messages each sensor topic carried.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use simhost::registry::{self, SystemRegistry};
use simhost::scenario::Scenario;
use simhost::simulation::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Dummy RFID sensor demo.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the scenario JSON file.
    #[arg(short, long, default_value = "demos/warehouse.json")]
    scenario: PathBuf,

    /// Number of ticks to run.
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Pause the simulation once this many ticks have run.
    #[arg(long)]
    pause_at: Option<u64>,

    /// How many ticks to stay paused.
    #[arg(long, default_value_t = 10)]
    pause_for: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut systems = SystemRegistry::new();
    dummysensor::register(&mut systems)?;
    registry::install_global(systems)?;
    let systems = registry::global().context("system registry not installed")?;

    let scenario = Scenario::from_path(&cli.scenario)
        .with_context(|| format!("loading {}", cli.scenario.display()))?;
    let mut sim = Simulation::new(scenario.step_size());
    let spawned = scenario.spawn(sim.world_mut())?;
    info!(
        world = %scenario.world,
        models = spawned.models.len(),
        sensors = spawned.sensors.len(),
        "scenario loaded"
    );

    sim.load_system(systems, dummysensor::ALIAS.as_str())?;

    let resume_at = cli.pause_at.map(|at| at + cli.pause_for);
    for tick in 0..cli.ticks {
        if cli.pause_at == Some(tick) {
            sim.set_paused(true);
        }
        if resume_at == Some(tick) {
            sim.set_paused(false);
        }
        sim.step();
    }

    info!(
        ticks = cli.ticks,
        iterations = sim.info().iterations,
        sim_time = ?sim.sim_time(),
        "run finished"
    );
    for topic in sim.transport().advertised_topics() {
        info!(topic = %topic, published = sim.transport().published(&topic), "topic summary");
    }

    Ok(())
}
