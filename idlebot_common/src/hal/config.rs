//! Driver configuration (`[driver]` section of the controller config).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::consts::{
    DEFAULT_ACTUATION_RANGE, DEFAULT_DRIVER, DEFAULT_I2C_BUS, DEFAULT_MAX_PULSE_US,
    DEFAULT_MIN_PULSE_US, DEFAULT_PCA9685_ADDRESS, DEFAULT_PWM_FREQUENCY_HZ,
};

/// Lowest PWM frequency the PCA9685 prescaler can produce [Hz].
pub const PWM_FREQUENCY_MIN_HZ: u32 = 24;
/// Highest PWM frequency the PCA9685 prescaler can produce [Hz].
pub const PWM_FREQUENCY_MAX_HZ: u32 = 1526;

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}
fn default_i2c_bus() -> PathBuf {
    PathBuf::from(DEFAULT_I2C_BUS)
}
fn default_address() -> u16 {
    DEFAULT_PCA9685_ADDRESS
}
fn default_pwm_frequency() -> u32 {
    DEFAULT_PWM_FREQUENCY_HZ
}
fn default_min_pulse() -> u32 {
    DEFAULT_MIN_PULSE_US
}
fn default_max_pulse() -> u32 {
    DEFAULT_MAX_PULSE_US
}
fn default_actuation_range() -> i32 {
    DEFAULT_ACTUATION_RANGE
}

/// Actuator driver selection and servo calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Registered driver name (`"pca9685"` or `"simulation"`).
    #[serde(default = "default_driver")]
    pub name: String,

    /// Linux I2C character device of the servo board.
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: PathBuf,

    /// 7-bit I2C address of the servo board.
    #[serde(default = "default_address")]
    pub address: u16,

    /// Servo PWM frequency [Hz].
    #[serde(default = "default_pwm_frequency")]
    pub pwm_frequency_hz: u32,

    /// Pulse width commanded for angle 0 [µs].
    #[serde(default = "default_min_pulse")]
    pub min_pulse_us: u32,

    /// Pulse width commanded for `actuation_range` [µs].
    #[serde(default = "default_max_pulse")]
    pub max_pulse_us: u32,

    /// Upper bound of the commandable angle domain [deg].
    #[serde(default = "default_actuation_range")]
    pub actuation_range: i32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: default_driver(),
            i2c_bus: default_i2c_bus(),
            address: default_address(),
            pwm_frequency_hz: default_pwm_frequency(),
            min_pulse_us: default_min_pulse(),
            max_pulse_us: default_max_pulse(),
            actuation_range: default_actuation_range(),
        }
    }
}

impl DriverConfig {
    /// Validate driver parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "driver.name cannot be empty".to_string(),
            ));
        }
        if self.address > 0x7F {
            return Err(ConfigError::ValidationError(format!(
                "driver.address {:#x} is not a 7-bit I2C address",
                self.address
            )));
        }
        if !(PWM_FREQUENCY_MIN_HZ..=PWM_FREQUENCY_MAX_HZ).contains(&self.pwm_frequency_hz) {
            return Err(ConfigError::ValidationError(format!(
                "driver.pwm_frequency_hz {} out of range [{}, {}]",
                self.pwm_frequency_hz, PWM_FREQUENCY_MIN_HZ, PWM_FREQUENCY_MAX_HZ
            )));
        }
        if self.min_pulse_us >= self.max_pulse_us {
            return Err(ConfigError::ValidationError(format!(
                "driver.min_pulse_us {} must be below max_pulse_us {}",
                self.min_pulse_us, self.max_pulse_us
            )));
        }
        let period_us = 1_000_000 / self.pwm_frequency_hz;
        if self.max_pulse_us >= period_us {
            return Err(ConfigError::ValidationError(format!(
                "driver.max_pulse_us {} does not fit in a {}µs PWM period",
                self.max_pulse_us, period_us
            )));
        }
        if self.actuation_range <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "driver.actuation_range {} must be positive",
                self.actuation_range
            )));
        }
        Ok(())
    }
}
