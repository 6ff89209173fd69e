//! Motion module root.
//!
//! Tracked actuator positions and the ramp engine that is their only writer.

pub mod profile;
pub mod ramp;

pub use profile::{ActuatorProfile, Target};
pub use ramp::RampEngine;
