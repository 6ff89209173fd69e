//! System-wide constants for the Idle Bot workspace.
//!
//! Single source of truth for numeric limits and defaults. Every timing
//! default can be overridden from the controller configuration file.

/// Number of PWM channels on a PCA9685 servo board.
pub const MAX_CHANNELS: u8 = 16;

/// Default commanded angle range of a hobby servo [deg].
pub const DEFAULT_ACTUATION_RANGE: i32 = 180;

/// Default wait poll slice [ms].
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default delay between single-degree ramp steps [ms].
pub const DEFAULT_RAMP_STEP_MS: u64 = 10;

/// Default key poll timeout while STOPPED [ms].
pub const DEFAULT_STOPPED_POLL_MS: u64 = 500;

/// Default display window for the invalid-command annotation [ms].
pub const DEFAULT_INVALID_KEY_HOLD_MS: u64 = 500;

/// Default grace period before a terminal state exits [ms].
pub const DEFAULT_EXIT_GRACE_MS: u64 = 1000;

/// Default dwell at rest, uniform integer seconds in `[min, max)`.
pub const DEFAULT_REST_DWELL_S: (u32, u32) = (45, 75);

/// Default dwell engaged, uniform integer seconds in `[min, max)`.
pub const DEFAULT_ENGAGED_DWELL_S: (u32, u32) = (5, 10);

/// Default service name.
pub const DEFAULT_SERVICE_NAME: &str = "idlebot";

/// Default controller configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/idlebot.toml";

/// Default controller log file path.
pub const DEFAULT_LOG_FILE: &str = "idlebot.log";

/// Default actuator driver.
pub const DEFAULT_DRIVER: &str = "pca9685";

/// Default Linux I2C bus device.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Default PCA9685 7-bit bus address.
pub const DEFAULT_PCA9685_ADDRESS: u16 = 0x40;

/// Default servo PWM frequency [Hz].
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 50;

/// Default pulse width at angle 0 [µs].
pub const DEFAULT_MIN_PULSE_US: u32 = 750;

/// Default pulse width at the end of the actuation range [µs].
pub const DEFAULT_MAX_PULSE_US: u32 = 2250;
