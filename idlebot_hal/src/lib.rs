//! # Idle Bot HAL Library
//!
//! Actuator drivers with a pluggable driver architecture. Drivers implement
//! the `ServoDriver` trait defined in `idlebot_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations (simulation, PCA9685)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │  idlebot_controller  │───►│  DriverRegistry  │───►│  ServoDriver     │
//! │  (ramp engine)       │    │  name → factory  │    │  (trait object)  │
//! └──────────────────────┘    └──────────────────┘    └────────┬─────────┘
//!                                                              │
//!                                   ┌──────────────────────────┴───┐
//!                                   ▼                              ▼
//!                          SimulationDriver               Pca9685Driver
//!                          (command log)                  (/dev/i2c-N)
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::pca9685::Pca9685Driver;
pub use crate::drivers::simulation::{CommandLog, PositionCommand, SimulationDriver};
