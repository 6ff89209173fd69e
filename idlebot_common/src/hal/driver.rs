//! Actuator driver trait and error types.
//!
//! This module defines:
//! - `ServoDriver` trait - Interface for pluggable actuator drivers
//! - `ServoError` enum - Error types for driver operations
//! - `DriverFactory` type alias - Factory function type

use crate::consts::MAX_CHANNELS;
use crate::hal::config::DriverConfig;
use thiserror::Error;

/// Error types for actuator driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServoError {
    /// Driver initialization failed.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Bus or device communication error.
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Driver not found in the registry.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Channel outside the driver's channel range.
    #[error("Invalid channel {channel} (driver has {count} channels)")]
    InvalidChannel {
        /// Requested channel.
        channel: u8,
        /// Number of channels the driver exposes.
        count: u8,
    },

    /// Angle outside the configured actuation range.
    #[error("Angle {angle}° out of range [0, {range}]")]
    AngleOutOfRange {
        /// Requested angle.
        angle: i32,
        /// Configured actuation range.
        range: i32,
    },

    /// `set_position` called before `init`.
    #[error("Driver not initialized")]
    NotInitialized,
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn ServoDriver>;

/// Trait defining the interface for actuator drivers.
///
/// The controller commands positions through this trait only; it is the single
/// component permitted to touch hardware state.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the first command
/// 2. `set_position()` - Called for every ramp step and every reset jump
/// 3. `shutdown()` - Called once when the controller exits
pub trait ServoDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation", "pca9685").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver (open the bus, program the PWM frequency).
    fn init(&mut self, config: &DriverConfig) -> Result<(), ServoError>;

    /// Command `channel` to `angle` degrees. Synchronous; returns once the
    /// command has been handed to the hardware.
    fn set_position(&mut self, channel: u8, angle: i32) -> Result<(), ServoError>;

    /// Release the hardware.
    fn shutdown(&mut self) -> Result<(), ServoError>;

    /// Number of addressable channels.
    fn channel_count(&self) -> u8 {
        MAX_CHANNELS
    }
}

impl<D: ServoDriver + ?Sized> ServoDriver for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn version(&self) -> &'static str {
        (**self).version()
    }

    fn init(&mut self, config: &DriverConfig) -> Result<(), ServoError> {
        (**self).init(config)
    }

    fn set_position(&mut self, channel: u8, angle: i32) -> Result<(), ServoError> {
        (**self).set_position(channel, angle)
    }

    fn shutdown(&mut self) -> Result<(), ServoError> {
        (**self).shutdown()
    }

    fn channel_count(&self) -> u8 {
        (**self).channel_count()
    }
}

/// Check a position command against the channel count and actuation range.
pub fn validate_target(
    channel: u8,
    angle: i32,
    channel_count: u8,
    actuation_range: i32,
) -> Result<(), ServoError> {
    if channel >= channel_count {
        return Err(ServoError::InvalidChannel {
            channel,
            count: channel_count,
        });
    }
    if !(0..=actuation_range).contains(&angle) {
        return Err(ServoError::AngleOutOfRange {
            angle,
            range: actuation_range,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestDriver {
        initialized: bool,
        last: Option<(u8, i32)>,
    }

    impl ServoDriver for TestDriver {
        fn name(&self) -> &'static str {
            "test"
        }

        fn version(&self) -> &'static str {
            "0.1.0"
        }

        fn init(&mut self, _config: &DriverConfig) -> Result<(), ServoError> {
            self.initialized = true;
            Ok(())
        }

        fn set_position(&mut self, channel: u8, angle: i32) -> Result<(), ServoError> {
            self.last = Some((channel, angle));
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), ServoError> {
            self.initialized = false;
            Ok(())
        }
    }

    #[test]
    fn test_servo_error_display() {
        let err = ServoError::InitFailed("no bus".to_string());
        assert!(err.to_string().contains("no bus"));

        let err = ServoError::AngleOutOfRange {
            angle: 200,
            range: 180,
        };
        assert!(err.to_string().contains("200"));
    }

    #[test]
    fn boxed_driver_delegates() {
        let mut driver: Box<dyn ServoDriver> = Box::new(TestDriver {
            initialized: false,
            last: None,
        });
        driver.init(&DriverConfig::default()).unwrap();
        driver.set_position(3, 90).unwrap();
        assert_eq!(driver.name(), "test");
        assert_eq!(driver.channel_count(), MAX_CHANNELS);
    }

    #[test]
    fn validate_target_bounds() {
        assert!(validate_target(0, 0, 16, 180).is_ok());
        assert!(validate_target(15, 180, 16, 180).is_ok());
        assert_eq!(
            validate_target(16, 90, 16, 180),
            Err(ServoError::InvalidChannel {
                channel: 16,
                count: 16
            })
        );
        assert!(matches!(
            validate_target(0, -1, 16, 180),
            Err(ServoError::AngleOutOfRange { .. })
        ));
        assert!(matches!(
            validate_target(0, 181, 16, 180),
            Err(ServoError::AngleOutOfRange { .. })
        ));
    }
}
