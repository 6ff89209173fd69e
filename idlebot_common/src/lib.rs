//! Idle Bot Common Library
//!
//! Shared types for every crate of the Idle Bot workspace: the supervisor,
//! the HAL drivers and the motion controller.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide constants and defaults
//! - [`controller`] - Controller configuration (timing, dwell, actuators)
//! - [`hal`] - Actuator driver contract and driver configuration
//! - [`exit`] - Process exit codes and the reload restart policy
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use idlebot_common::config::{ConfigLoader, SharedConfig};
//! use idlebot_common::exit::ExitKind;
//! ```

pub mod config;
pub mod consts;
pub mod controller;
pub mod exit;
pub mod hal;
pub mod prelude;
