//! # Idle Bot Controller
//!
//! Loads the configuration, opens the actuator driver and the operator
//! terminal, and runs the motion state machine until the operator quits
//! (exit 0) or reloads (exit 2). Any fatal error parks the actuator and exits 1.
//!
//! The terminal belongs to the operator screen, so logs go to a file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use clap::Parser;
use idlebot_common::prelude::*;
use idlebot_controller::clock::SystemClock;
use idlebot_controller::config::load_config;
use idlebot_controller::motion::RampEngine;
use idlebot_controller::presentation::TerminalPresenter;
use idlebot_controller::runner::Controller;
use idlebot_hal::DriverRegistry;
use idlebot_hal::drivers::simulation;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Idle Bot controller: interactive servo dwell cycle
#[derive(Parser, Debug)]
#[command(name = "idlebot_controller")]
#[command(version)]
#[command(about = "Cycles a servo between rest and engaged positions under operator control")]
struct Args {
    /// Path to the controller configuration TOML.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the simulation driver regardless of the configuration.
    #[arg(short, long)]
    simulate: bool,

    /// Override the configured driver name.
    #[arg(long, value_name = "NAME", conflicts_with = "simulate")]
    driver: Option<String>,

    /// Log file (the terminal is reserved for the operator screen).
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let code = match run(&args) {
        Ok(kind) => {
            info!("Idle Bot controller exiting: {kind:?}");
            kind.code()
        }
        Err(e) => {
            error!("FATAL: {e}");
            eprintln!("idlebot_controller: {e}");
            EXIT_FAULT
        }
    };
    process::exit(code);
}

fn run(args: &Args) -> Result<ExitKind, Box<dyn std::error::Error>> {
    let loaded = load_config(&args.config)?;
    setup_tracing(args, loaded.config.shared.log_level)?;
    info!(
        "Idle Bot controller v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        loaded.config.shared.service_name
    );
    info!("{}", loaded.describe());

    let driver_name = if args.simulate {
        simulation::DRIVER_NAME
    } else {
        args.driver.as_deref().unwrap_or(&loaded.config.driver.name)
    };
    let registry = DriverRegistry::with_builtin_drivers();
    let mut driver = registry.create_driver(driver_name)?;
    driver.init(&loaded.config.driver)?;
    info!("Driver '{}' v{} ready", driver.name(), driver.version());

    let timing = loaded.config.timing;
    let clock = SystemClock::new();
    let ramp = RampEngine::new(driver, clock, timing.ramp_step(), loaded.profiles);
    let presenter = TerminalPresenter::open()?;

    let mut controller = Controller::new(
        ramp,
        presenter,
        clock,
        StdRng::from_entropy(),
        timing,
        loaded.config.dwell,
    );
    let result = controller.run();
    if let Err(e) = controller.shutdown() {
        warn!("Driver shutdown failed: {e}");
    }
    // Restores the terminal before anything is printed to it.
    drop(controller);

    Ok(result?)
}

/// Setup the file-backed tracing subscriber.
fn setup_tracing(args: &Args, configured: LogLevel) -> std::io::Result<()> {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from(configured)
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)?;

    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    if args.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
