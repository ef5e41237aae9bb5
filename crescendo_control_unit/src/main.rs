//! # Crescendo Control Unit
//!
//! Runs the fixed-tick control loop against the simulated robot.
//!
//! Loads `robot.toml`, optionally replays a scripted operator input file,
//! performs RT setup and ticks until Ctrl-C or the tick limit.

use clap::Parser;
use crescendo_common::robot::config::RobotConfig;
use crescendo_control_unit::config::load_config;
use crescendo_control_unit::cycle::{CycleRunner, Hardware, rt_setup};
use crescendo_hal::{ScriptedInputs, SimRobot};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Crescendo Control Unit: fixed-tick robot control loop
#[derive(Parser, Debug)]
#[command(name = "crescendo_control_unit")]
#[command(version)]
#[command(about = "Fixed-tick state coordination and teleop drive loop")]
struct Args {
    /// Path to the robot configuration TOML.
    #[arg(default_value = "config/robot.toml")]
    config: PathBuf,

    /// Scripted operator input file. Without one the operator is idle.
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Stop after this many ticks (default: run until Ctrl-C).
    #[arg(long)]
    ticks: Option<u64>,

    /// Exit with an error on the first cycle overrun.
    #[arg(long)]
    abort_on_overrun: bool,

    /// CPU core to pin the loop to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level), overriding `log_level`.
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // The config's log level picks the subscriber, so load first and
    // report a load failure once tracing is up.
    let loaded = load_config(&args.config);
    setup_tracing(&args, loaded.as_ref().ok());

    info!("Crescendo Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Crescendo Control Unit shutdown complete");
}

fn run(args: &Args, config: &RobotConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        service = %config.shared.service_name,
        tick_period_us = config.tick_period_us,
        config = %args.config.display(),
        "config OK"
    );

    let inputs = match &args.script {
        Some(path) => {
            let script = ScriptedInputs::load(path)?;
            info!(script = %path.display(), last_step_tick = ?script.last_tick(), "input script loaded");
            script
        }
        None => ScriptedInputs::default(),
    };

    let sim = SimRobot::new(config.tick_period_s());
    let hw = Hardware::simulated(&sim, Box::new(inputs));

    rt_setup(args.cpu_core, args.rt_priority)?;

    let mut runner = CycleRunner::new(config, hw).with_abort_on_overrun(args.abort_on_overrun);
    if let Some(ticks) = args.ticks {
        runner = runner.with_max_ticks(ticks);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        s.store(true, Ordering::SeqCst);
    })?;

    let result = runner.run(&stop);

    let stats = runner.stats();
    let pose = sim.drivebase.borrow().pose;
    info!(
        ticks = stats.cycle_count,
        avg_ns = stats.avg_cycle_ns(),
        min_ns = if stats.cycle_count == 0 { 0 } else { stats.min_cycle_ns },
        max_ns = stats.max_cycle_ns,
        overruns = stats.overruns,
        "cycle statistics"
    );
    info!(
        teleop = ?runner.resolution().teleop,
        mode = ?runner.resolution().mode,
        robot = ?runner.mechanisms().state(),
        x = pose.x,
        y = pose.y,
        heading_deg = pose.heading_deg,
        "final state"
    );

    result.map_err(Into::into)
}

/// `--verbose` wins, then the config's `log_level`, then INFO.
fn setup_tracing(args: &Args, config: Option<&RobotConfig>) {
    let level = if args.verbose {
        "debug"
    } else {
        config.map_or("info", |c| c.shared.log_level.as_directive())
    };

    let filter = EnvFilter::from_default_env().add_directive(
        level
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into()),
    );

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
