//! Actuator driver implementations.
//!
//! - [`simulation`] - Software driver for development and testing
//! - [`pca9685`] - 16-channel PWM servo board on a Linux I2C bus
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `ServoDriver` trait from `idlebot_common::hal::driver`
//! 3. Register the factory in `DriverRegistry::with_builtin_drivers()`

pub mod pca9685;
pub mod simulation;
