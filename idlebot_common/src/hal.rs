//! Actuator driver contract and driver configuration.
//!
//! The controller only ever talks to hardware through [`driver::ServoDriver`];
//! concrete drivers live in the `idlebot_hal` crate.

pub mod config;
pub mod driver;
