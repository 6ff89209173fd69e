//! # Idle Bot Supervisor
//!
//! Launches the controller and relaunches it every time it exits with the
//! reload code. Any other exit ends supervision with the child's code.
//!
//! The child owns the terminal and disables signal generation on it, so
//! Ctrl-C only reaches the supervisor between runs or when the child lost its
//! terminal. In that case the child is killed and the supervisor exits with
//! the fault code.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use idlebot_common::exit::{EXIT_FAULT, RestartPolicy, SupervisorAction};
use tokio::process::Command;
use tokio::signal;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// File name of the controller binary looked up next to the supervisor.
const CONTROLLER_BIN: &str = "idlebot_controller";

/// Idle Bot supervisor
#[derive(Parser, Debug)]
#[command(name = "idlebot")]
#[command(version)]
#[command(about = "Runs the Idle Bot controller and relaunches it on reload")]
struct Args {
    /// Controller executable (default: idlebot_controller next to this binary).
    #[arg(long, value_name = "PATH")]
    controller: Option<PathBuf>,

    /// Maximum number of relaunches before giving up.
    #[arg(long, value_name = "N")]
    max_reloads: Option<u32>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Arguments forwarded to the controller (after `--`).
    #[arg(last = true)]
    controller_args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Idle Bot supervisor v{} starting", env!("CARGO_PKG_VERSION"));

    let code = match supervise(&args).await {
        Ok(code) => code,
        Err(e) => {
            error!("FATAL: {e}");
            EXIT_FAULT
        }
    };

    info!("Supervisor exiting with code {code}");
    process::exit(code);
}

async fn supervise(args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    let program = resolve_controller(args)?;
    let mut policy = RestartPolicy::new(args.max_reloads);

    loop {
        info!(
            "Launching {} (run #{})",
            program.display(),
            policy.reloads() + 1
        );
        let mut child = Command::new(&program)
            .args(&args.controller_args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("cannot start {}: {e}", program.display()))?;

        let status = tokio::select! {
            status = child.wait() => Some(status?),
            _ = signal::ctrl_c() => None,
        };
        let Some(status) = status else {
            warn!("Received shutdown signal, stopping controller");
            child.kill().await?;
            return Ok(EXIT_FAULT);
        };

        match policy.on_exit(status.code()) {
            SupervisorAction::Relaunch => {
                info!("Controller requested reload ({} so far)", policy.reloads());
            }
            SupervisorAction::Finish(code) => {
                if status.code().is_none() {
                    warn!("Controller terminated by signal ({status})");
                }
                return Ok(code);
            }
        }
    }
}

fn resolve_controller(args: &Args) -> std::io::Result<PathBuf> {
    match &args.controller {
        Some(path) => Ok(path.clone()),
        None => Ok(std::env::current_exe()?.with_file_name(CONTROLLER_BIN)),
    }
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
