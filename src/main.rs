/*
 * PALS - Parallel Agent Life Simulation
 *
 * Builds the simulation from the command line, runs it on a dedicated
 * thread and, unless running headless, opens the viewer on the main
 * thread. Set RUST_LOG to override the log filter.
 */

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pals::{app, Cli, Simulation, SimulationParams};

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

fn main() -> Result<()> {
    let settings = Cli::parse().into_settings();
    init_tracing(settings.debug);

    info!(?settings, "starting");
    let started = Instant::now();

    let simulation = Arc::new(
        Simulation::new(&settings, SimulationParams::default()).context("failed to create the simulation")?,
    );

    let runner = Arc::clone(&simulation);
    let simulation_thread = thread::Builder::new()
        .name("simulation".into())
        .spawn(move || runner.run())
        .context("failed to start the simulation thread")?;

    if !settings.headless {
        // Takes over the main thread; its exit hook waits for the run to finish
        app::launch(Arc::clone(&simulation), settings.debug);
    }

    simulation_thread
        .join()
        .map_err(|_| anyhow!("simulation thread panicked"))?;

    info!(total_ms = started.elapsed().as_millis() as u64, "total time");
    Ok(())
}
