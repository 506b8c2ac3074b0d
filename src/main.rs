/*!
 * Headless Runner
 *
 * Runs the simulation without a display:
 * - Loads configuration from JSON (or uses defaults)
 * - Drives a compiled-in or subprocess controller
 * - Prints final statistics as JSON
 */

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use os_game_kernel::{
    init_tracing, ExternalInput, GreedyController, Simulation, SimulationConfig,
    SubprocessController,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "os-game",
    version,
    about = "Headless multi-core scheduling simulation driven by a pluggable controller"
)]
struct Opts {
    /// JSON configuration file. Unset fields keep their defaults.
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[clap(short = 't', long, default_value = "6000")]
    ticks: u64,

    /// Simulated milliseconds per tick.
    #[clap(long, default_value = "50")]
    tick_ms: u64,

    /// RNG seed; overrides the configuration file.
    #[clap(short = 's', long, env = "SIM_SEED")]
    seed: Option<u64>,

    /// External controller command and its arguments, spoken to over
    /// JSON lines on stdin/stdout. The built-in greedy policy runs when unset.
    #[clap(long, num_args = 1.., allow_hyphen_values = true)]
    controller: Vec<String>,

    /// Keep running after termination capacity is exhausted.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    ignore_game_over: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };

    let mut builder = Simulation::builder().with_config(config);
    if let Some(seed) = opts.seed {
        builder = builder.with_seed(seed);
    }
    builder = match opts.controller.split_first() {
        Some((program, args)) => {
            let controller = SubprocessController::spawn(program, args)?;
            builder.with_controller(controller)
        }
        None => builder.with_controller(GreedyController::new()),
    };
    let mut simulation = builder.build()?;

    info!(
        run_id = %simulation.run_id(),
        ticks = opts.ticks,
        tick_ms = opts.tick_ms,
        "run started"
    );

    for tick in 0..opts.ticks {
        simulation.update(tick * opts.tick_ms, ExternalInput::none());
        if simulation.is_game_over() && !opts.ignore_game_over {
            break;
        }
    }

    let stats = simulation.stats();
    info!(now = stats.now, game_over = stats.game_over, "run finished");
    println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
    Ok(())
}
