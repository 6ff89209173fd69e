//! # Idle Bot Controller Library
//!
//! Supervisory controller for a single servo-driven mechanism that cycles
//! between a resting and an engaged angle on randomized dwell intervals while
//! staying steerable from an operator terminal.
//!
//! ## Layers
//!
//! 1. **Actuator** - [`ServoDriver`](idlebot_common::hal::driver::ServoDriver)
//!    implementations from `idlebot_hal`
//! 2. **Motion** - [`motion::RampEngine`] owns every [`motion::ActuatorProfile`]
//!    and is the only writer of the tracked angles
//! 3. **Wait** - [`wait::wait_or_command`] races a dwell countdown against
//!    operator keys
//! 4. **State** - [`state::machine::MotionStateMachine`] is pure and emits
//!    [`state::Effect`]s as data
//! 5. **Runner** - [`runner::Controller`] executes effects against the layers
//!    above and renders through a [`presentation::Presenter`]
//!
//! Everything runs on one thread. The only suspension points are the
//! per-degree ramp delay and the wait poll slice, both routed through a
//! [`clock::Clock`] so the whole machine runs headless under test.

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod motion;
pub mod presentation;
pub mod runner;
pub mod state;
pub mod wait;
