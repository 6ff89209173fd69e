//! PCA9685 servo board driver.
//!
//! Talks to the 16-channel, 12-bit PWM controller over any
//! `embedded_hal::i2c::I2c` bus; in production that is the Linux `i2c-dev`
//! character device through `linux_embedded_hal::I2cdev`. Angles map linearly onto pulse widths between
//! `min_pulse_us` and `max_pulse_us` across the configured actuation range.
//!
//! # Register map (subset)
//!
//! | Register | Address | Use |
//! |----------|---------|-----|
//! | MODE1 | 0x00 | sleep / auto-increment / restart |
//! | LED0_ON_L | 0x06 | first channel, 4 bytes per channel |
//! | PRE_SCALE | 0xFE | PWM frequency, writable only while asleep |

use embedded_hal::i2c::I2c;
use idlebot_common::consts::MAX_CHANNELS;
use idlebot_common::hal::config::DriverConfig;
use idlebot_common::hal::driver::{ServoDriver, ServoError, validate_target};
use linux_embedded_hal::I2cdev;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Registry name of this driver.
pub const DRIVER_NAME: &str = "pca9685";

const REG_MODE1: u8 = 0x00;
const REG_LED0_ON_L: u8 = 0x06;
const REG_PRE_SCALE: u8 = 0xFE;

const MODE1_SLEEP: u8 = 0x10;
const MODE1_AUTO_INCREMENT: u8 = 0x20;
const MODE1_RESTART: u8 = 0x80;

/// Internal oscillator frequency [Hz].
const OSCILLATOR_HZ: u64 = 25_000_000;
/// PWM counter resolution.
const PWM_STEPS: u64 = 4096;

/// Opens the I2C bus named by a driver configuration.
pub type BusOpener<I2C> = fn(&DriverConfig) -> Result<I2C, ServoError>;

/// Open the Linux `i2c-dev` character device of `config.i2c_bus`.
pub fn open_linux_bus(config: &DriverConfig) -> Result<I2cdev, ServoError> {
    I2cdev::new(&config.i2c_bus)
        .map_err(|e| ServoError::InitFailed(format!("open {}: {e}", config.i2c_bus.display())))
}

fn injected_bus_only<I2C>(_config: &DriverConfig) -> Result<I2C, ServoError> {
    Err(ServoError::InitFailed(
        "bus was released by shutdown".to_string(),
    ))
}

fn bus_error<E: embedded_hal::i2c::Error>(context: &str, e: E) -> ServoError {
    ServoError::CommunicationError(format!("{context}: {:?}", e.kind()))
}

/// PRE_SCALE value for a PWM frequency, rounded like the datasheet formula.
pub fn prescale_for(frequency_hz: u32) -> u8 {
    let divisor = PWM_STEPS * u64::from(frequency_hz.max(1));
    let rounded = (OSCILLATOR_HZ + divisor / 2) / divisor;
    rounded.saturating_sub(1).clamp(3, 255) as u8
}

/// Pulse width for `angle` under the driver calibration [µs].
pub fn pulse_width_us(angle: i32, config: &DriverConfig) -> u32 {
    let span = u64::from(config.max_pulse_us - config.min_pulse_us);
    let angle = angle.clamp(0, config.actuation_range) as u64;
    let range = config.actuation_range.max(1) as u64;
    config.min_pulse_us + (span * angle / range) as u32
}

/// Counter value at which a pulse of `pulse_us` ends within one PWM period.
pub fn pulse_ticks(pulse_us: u32, frequency_hz: u32) -> u16 {
    let ticks = u64::from(pulse_us) * PWM_STEPS * u64::from(frequency_hz) / 1_000_000;
    ticks.min(PWM_STEPS - 1) as u16
}

/// PCA9685 driver implementing the `ServoDriver` trait.
pub struct Pca9685Driver<I2C = I2cdev> {
    bus: Option<I2C>,
    open: BusOpener<I2C>,
    address: u8,
    config: DriverConfig,
    initialized: bool,
}

impl Pca9685Driver<I2cdev> {
    /// Create a driver that opens its Linux I2C device on `init()`.
    pub fn new() -> Self {
        Self {
            bus: None,
            open: open_linux_bus,
            address: 0,
            config: DriverConfig::default(),
            initialized: false,
        }
    }
}

impl Default for Pca9685Driver<I2cdev> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I2C: I2c> Pca9685Driver<I2C> {
    /// Create a driver on an already opened bus.
    pub fn with_bus(bus: I2C) -> Self {
        Self {
            bus: Some(bus),
            open: injected_bus_only::<I2C>,
            address: 0,
            config: DriverConfig::default(),
            initialized: false,
        }
    }

    fn write(&mut self, context: &str, bytes: &[u8]) -> Result<(), ServoError> {
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(ServoError::NotInitialized)?;
        bus.write(address, bytes).map_err(|e| bus_error(context, e))
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, ServoError> {
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(ServoError::NotInitialized)?;
        let mut value = [0u8; 1];
        bus.write_read(address, &[reg], &mut value)
            .map_err(|e| bus_error("register read", e))?;
        Ok(value[0])
    }

    fn program_frequency(&mut self) -> Result<(), ServoError> {
        let prescale = prescale_for(self.config.pwm_frequency_hz);

        let mode1 = self.read_register(REG_MODE1)?;
        let awake = (mode1 & !MODE1_RESTART & !MODE1_SLEEP) | MODE1_AUTO_INCREMENT;

        self.write("sleep", &[REG_MODE1, awake | MODE1_SLEEP])?;
        self.write("PRE_SCALE", &[REG_PRE_SCALE, prescale])?;
        self.write("wake", &[REG_MODE1, awake])?;
        // Oscillator needs 500µs to stabilise before RESTART.
        thread::sleep(Duration::from_millis(1));
        self.write("restart", &[REG_MODE1, awake | MODE1_RESTART])?;

        debug!(
            "PCA9685 prescale={prescale} for {}Hz",
            self.config.pwm_frequency_hz
        );
        Ok(())
    }
}

impl<I2C: I2c + Send> ServoDriver for Pca9685Driver<I2C> {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, config: &DriverConfig) -> Result<(), ServoError> {
        config
            .validate()
            .map_err(|e| ServoError::ConfigError(e.to_string()))?;
        self.address = u8::try_from(config.address).map_err(|_| {
            ServoError::ConfigError(format!("address {:#x} out of range", config.address))
        })?;
        self.config = config.clone();

        if self.bus.is_none() {
            self.bus = Some((self.open)(config)?);
        }
        self.program_frequency()?;
        self.initialized = true;

        info!(
            "PCA9685 initialized on {} @ {:#04x}, {}Hz, pulse {}..{}µs over {}°",
            config.i2c_bus.display(),
            config.address,
            config.pwm_frequency_hz,
            config.min_pulse_us,
            config.max_pulse_us,
            config.actuation_range
        );
        Ok(())
    }

    fn set_position(&mut self, channel: u8, angle: i32) -> Result<(), ServoError> {
        if !self.initialized {
            return Err(ServoError::NotInitialized);
        }
        validate_target(channel, angle, MAX_CHANNELS, self.config.actuation_range)?;

        let pulse = pulse_width_us(angle, &self.config);
        let off = pulse_ticks(pulse, self.config.pwm_frequency_hz);
        let [off_l, off_h] = off.to_le_bytes();
        let reg = REG_LED0_ON_L + 4 * channel;

        self.write(&format!("channel {channel}"), &[reg, 0, 0, off_l, off_h])
    }

    fn shutdown(&mut self) -> Result<(), ServoError> {
        // Outputs keep their last pulse so the servo holds its position.
        info!("Shutting down PCA9685 driver");
        self.bus = None;
        self.initialized = false;
        Ok(())
    }
}

/// Factory function to create a PCA9685 driver instance.
pub fn create_driver() -> Box<dyn ServoDriver> {
    Box::new(Pca9685Driver::new())
}
