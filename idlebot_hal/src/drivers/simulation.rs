//! Simulation driver.
//!
//! Accepts position commands without hardware, validates them like a real
//! board would, and records every command into a shared [`CommandLog`] so the
//! motion that would have happened can be inspected afterwards.

use idlebot_common::consts::{DEFAULT_ACTUATION_RANGE, MAX_CHANNELS};
use idlebot_common::hal::config::DriverConfig;
use idlebot_common::hal::driver::{ServoDriver, ServoError, validate_target};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry name of this driver.
pub const DRIVER_NAME: &str = "simulation";

/// One accepted `set_position` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCommand {
    /// Commanded channel.
    pub channel: u8,
    /// Commanded angle [deg].
    pub angle: i32,
}

/// Shared, clonable handle onto the commands a [`SimulationDriver`] accepted.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Arc<Mutex<Vec<PositionCommand>>>,
}

impl CommandLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: PositionCommand) {
        self.commands.lock().push(command);
    }

    /// Copy of every recorded command, oldest first.
    pub fn snapshot(&self) -> Vec<PositionCommand> {
        self.commands.lock().clone()
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.lock().len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }

    /// Angles commanded to `channel`, oldest first.
    pub fn angles(&self, channel: u8) -> Vec<i32> {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.channel == channel)
            .map(|c| c.angle)
            .collect()
    }

    /// Most recent command, if any.
    pub fn last(&self) -> Option<PositionCommand> {
        self.commands.lock().last().copied()
    }

    /// Forget every recorded command.
    pub fn clear(&self) {
        self.commands.lock().clear();
    }
}

/// Simulation driver implementing the `ServoDriver` trait.
pub struct SimulationDriver {
    initialized: bool,
    actuation_range: i32,
    positions: [Option<i32>; MAX_CHANNELS as usize],
    log: CommandLog,
    accepted: usize,
    fail_after: Option<usize>,
}

impl SimulationDriver {
    /// Create a new simulation driver with a private command log.
    pub fn new() -> Self {
        Self::with_log(CommandLog::new())
    }

    /// Create a simulation driver recording into `log`.
    pub fn with_log(log: CommandLog) -> Self {
        Self {
            initialized: false,
            actuation_range: DEFAULT_ACTUATION_RANGE,
            positions: [None; MAX_CHANNELS as usize],
            log,
            accepted: 0,
            fail_after: None,
        }
    }

    /// Fail every `set_position` once this driver accepted `commands` commands.
    ///
    /// The count is the driver's own; clearing or sharing the log does not
    /// affect it.
    pub fn fail_after(mut self, commands: usize) -> Self {
        self.fail_after = Some(commands);
        self
    }

    /// Handle onto this driver's command log.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// Last angle accepted for `channel`.
    pub fn position(&self, channel: u8) -> Option<i32> {
        self.positions.get(channel as usize).copied().flatten()
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, config: &DriverConfig) -> Result<(), ServoError> {
        self.actuation_range = config.actuation_range;
        self.initialized = true;
        info!(
            "Simulation driver initialized ({} channels, range 0..={}°)",
            MAX_CHANNELS, self.actuation_range
        );
        Ok(())
    }

    fn set_position(&mut self, channel: u8, angle: i32) -> Result<(), ServoError> {
        if !self.initialized {
            return Err(ServoError::NotInitialized);
        }
        validate_target(channel, angle, MAX_CHANNELS, self.actuation_range)?;

        if self.fail_after.is_some_and(|limit| self.accepted >= limit) {
            warn!("Simulated fault on channel {channel}");
            return Err(ServoError::CommunicationError(format!(
                "simulated fault on channel {channel}"
            )));
        }

        debug!("sim: channel {channel} -> {angle}°");
        self.positions[channel as usize] = Some(angle);
        self.log.push(PositionCommand { channel, angle });
        self.accepted += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), ServoError> {
        info!(
            "Shutting down simulation driver after {} commands",
            self.log.len()
        );
        self.initialized = false;
        Ok(())
    }
}

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn ServoDriver> {
    Box::new(SimulationDriver::new())
}
