//! Controller shared types.
//!
//! Configuration consumed by the motion controller: timing constants, dwell
//! ranges and the per-channel actuator table.

pub mod config;
