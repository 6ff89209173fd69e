//! Configuration structures for the motion controller.
//!
//! All config types use `serde::Deserialize` for TOML loading. Optional
//! sections fall back to the defaults in [`crate::consts`]; the actuator table
//! is required.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    DEFAULT_ENGAGED_DWELL_S, DEFAULT_EXIT_GRACE_MS, DEFAULT_INVALID_KEY_HOLD_MS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_RAMP_STEP_MS, DEFAULT_REST_DWELL_S,
    DEFAULT_STOPPED_POLL_MS, MAX_CHANNELS,
};
use crate::hal::config::DriverConfig;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level controller configuration.
///
/// Loaded once at startup. A reload restarts the process, which loads it again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Logging and instance naming.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Poll, ramp and display timings.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Dwell duration ranges.
    #[serde(default)]
    pub dwell: DwellConfig,

    /// Actuator driver selection and calibration.
    #[serde(default)]
    pub driver: DriverConfig,

    /// One entry per controlled channel. The control loop drives the first.
    pub actuators: Vec<ActuatorConfig>,
}

impl ControllerConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.timing.validate()?;
        self.dwell.validate()?;
        self.driver.validate()?;
        validate_actuators(&self.actuators, self.driver.actuation_range)
    }
}

// ─── Timing ─────────────────────────────────────────────────────────

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_ramp_step() -> u64 {
    DEFAULT_RAMP_STEP_MS
}
fn default_stopped_poll() -> u64 {
    DEFAULT_STOPPED_POLL_MS
}
fn default_invalid_key_hold() -> u64 {
    DEFAULT_INVALID_KEY_HOLD_MS
}
fn default_exit_grace() -> u64 {
    DEFAULT_EXIT_GRACE_MS
}

/// Timing constants of the control loop, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Input poll slice inside a dwell.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Delay after every single-degree ramp step.
    #[serde(default = "default_ramp_step")]
    pub ramp_step_ms: u64,

    /// Input poll timeout while STOPPED.
    #[serde(default = "default_stopped_poll")]
    pub stopped_poll_ms: u64,

    /// Display window of the invalid-command annotation.
    #[serde(default = "default_invalid_key_hold")]
    pub invalid_key_hold_ms: u64,

    /// Grace render before QUITTING/RELOADING exits.
    #[serde(default = "default_exit_grace")]
    pub exit_grace_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            ramp_step_ms: default_ramp_step(),
            stopped_poll_ms: default_stopped_poll(),
            invalid_key_hold_ms: default_invalid_key_hold(),
            exit_grace_ms: default_exit_grace(),
        }
    }
}

impl TimingConfig {
    /// Validate that every timing is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("poll_interval_ms", self.poll_interval_ms),
            ("ramp_step_ms", self.ramp_step_ms),
            ("stopped_poll_ms", self.stopped_poll_ms),
            ("invalid_key_hold_ms", self.invalid_key_hold_ms),
            ("exit_grace_ms", self.exit_grace_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "timing.{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    pub fn ramp_step(&self) -> Duration {
        Duration::from_millis(self.ramp_step_ms)
    }

    #[inline]
    pub fn stopped_poll(&self) -> Duration {
        Duration::from_millis(self.stopped_poll_ms)
    }

    #[inline]
    pub fn invalid_key_hold(&self) -> Duration {
        Duration::from_millis(self.invalid_key_hold_ms)
    }

    #[inline]
    pub fn exit_grace(&self) -> Duration {
        Duration::from_millis(self.exit_grace_ms)
    }
}

// ─── Dwell ──────────────────────────────────────────────────────────

/// Half-open range of whole seconds `[min_s, max_s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DwellRange {
    /// Inclusive lower bound [s].
    pub min_s: u32,
    /// Exclusive upper bound [s].
    pub max_s: u32,
}

impl DwellRange {
    pub const fn new(min_s: u32, max_s: u32) -> Self {
        Self { min_s, max_s }
    }

    /// True if `seconds` can be drawn from this range.
    #[inline]
    pub const fn contains(&self, seconds: u32) -> bool {
        seconds >= self.min_s && seconds < self.max_s
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.min_s >= self.max_s {
            return Err(ConfigError::ValidationError(format!(
                "dwell.{name}: empty range [{}, {})",
                self.min_s, self.max_s
            )));
        }
        if self.min_s == 0 {
            return Err(ConfigError::ValidationError(format!(
                "dwell.{name}: min_s must be at least 1"
            )));
        }
        Ok(())
    }
}

fn default_rest_dwell() -> DwellRange {
    DwellRange::new(DEFAULT_REST_DWELL_S.0, DEFAULT_REST_DWELL_S.1)
}
fn default_engaged_dwell() -> DwellRange {
    DwellRange::new(DEFAULT_ENGAGED_DWELL_S.0, DEFAULT_ENGAGED_DWELL_S.1)
}

/// Dwell ranges at both positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DwellConfig {
    /// Dwell at the rest angle.
    #[serde(default = "default_rest_dwell")]
    pub rest: DwellRange,

    /// Dwell at the engage angle.
    #[serde(default = "default_engaged_dwell")]
    pub engaged: DwellRange,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            rest: default_rest_dwell(),
            engaged: default_engaged_dwell(),
        }
    }
}

impl DwellConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rest.validate("rest")?;
        self.engaged.validate("engaged")
    }
}

// ─── Actuators ──────────────────────────────────────────────────────

/// Static configuration of one actuator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActuatorConfig {
    /// Driver channel.
    pub channel: u8,
    /// Resting (neutral) angle [deg].
    pub rest_angle: i32,
    /// Engaged angle [deg].
    pub engage_angle: i32,
}

fn validate_actuators(actuators: &[ActuatorConfig], range: i32) -> Result<(), ConfigError> {
    if actuators.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one [[actuators]] entry is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for actuator in actuators {
        if actuator.channel >= MAX_CHANNELS {
            return Err(ConfigError::ValidationError(format!(
                "actuator channel {} out of range [0, {})",
                actuator.channel, MAX_CHANNELS
            )));
        }
        if !seen.insert(actuator.channel) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate actuator channel {}",
                actuator.channel
            )));
        }
        for (name, angle) in [
            ("rest_angle", actuator.rest_angle),
            ("engage_angle", actuator.engage_angle),
        ] {
            if !(0..=range).contains(&angle) {
                return Err(ConfigError::ValidationError(format!(
                    "actuator {}: {name} {angle} out of range [0, {range}]",
                    actuator.channel
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    const MINIMAL: &str = r#"
[[actuators]]
channel = 0
rest_angle = 135
engage_angle = 75
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ControllerConfig::from_toml(MINIMAL).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.dwell.rest, DwellRange::new(45, 75));
        assert_eq!(config.dwell.engaged, DwellRange::new(5, 10));
        assert_eq!(config.timing.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.timing.ramp_step(), Duration::from_millis(10));
        assert_eq!(config.actuators[0].rest_angle, 135);
    }

    #[test]
    fn actuators_are_required() {
        assert!(ControllerConfig::from_toml("[timing]\npoll_interval_ms = 50").is_err());
    }

    #[test]
    fn empty_actuator_list_rejected() {
        let config = ControllerConfig::from_toml("actuators = []").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn duplicate_channel_rejected() {
        let text = format!("{MINIMAL}{MINIMAL}");
        let config = ControllerConfig::from_toml(&text).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate actuator channel 0"));
    }

    #[test]
    fn angle_outside_actuation_range_rejected() {
        let config = ControllerConfig::from_toml(
            r#"
[[actuators]]
channel = 1
rest_angle = 190
engage_angle = 75
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn channel_beyond_board_rejected() {
        let config = ControllerConfig::from_toml(
            r#"
[[actuators]]
channel = 16
rest_angle = 90
engage_angle = 45
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_dwell_range_rejected() {
        let text = format!("[dwell]\nengaged = {{ min_s = 10, max_s = 10 }}\n{MINIMAL}");
        let config = ControllerConfig::from_toml(&text).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dwell.engaged"));
    }

    #[test]
    fn zero_timing_rejected() {
        let text = format!("[timing]\nramp_step_ms = 0\n{MINIMAL}");
        let config = ControllerConfig::from_toml(&text).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn dwell_range_is_half_open() {
        let range = DwellRange::new(5, 10);
        assert!(range.contains(5));
        assert!(range.contains(9));
        assert!(!range.contains(10));
        assert!(!range.contains(4));
    }

    #[test]
    fn unknown_section_rejected() {
        let text = format!("[network]\nport = 80\n{MINIMAL}");
        assert!(ControllerConfig::from_toml(&text).is_err());
    }
}
