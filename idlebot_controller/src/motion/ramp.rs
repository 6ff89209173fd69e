//! Motion ramp engine.
//!
//! Moves one channel toward a target one degree at a time, commanding the
//! driver after every step and pausing `step_delay` between steps. The tracked
//! angle is updated after each accepted command, so a failed step leaves it at
//! the last angle the hardware actually received.
//!
//! Ramps are not preemptible. Keys pressed during a ramp stay queued in the
//! input source and are classified at the next wait.

use std::time::Duration;

use idlebot_common::hal::driver::{ServoDriver, ServoError};
use tracing::{debug, info, warn};

use super::profile::{ActuatorProfile, Target};
use crate::clock::Clock;

/// Owner of every [`ActuatorProfile`] and of the driver that moves them.
pub struct RampEngine<D: ServoDriver, C: Clock> {
    driver: D,
    clock: C,
    step_delay: Duration,
    profiles: Vec<ActuatorProfile>,
}

impl<D: ServoDriver, C: Clock> RampEngine<D, C> {
    /// Take ownership of an initialized driver and the configured profiles.
    pub fn new(driver: D, clock: C, step_delay: Duration, profiles: Vec<ActuatorProfile>) -> Self {
        Self {
            driver,
            clock,
            step_delay,
            profiles,
        }
    }

    /// All profiles in configuration order.
    #[inline]
    pub fn profiles(&self) -> &[ActuatorProfile] {
        &self.profiles
    }

    /// Profile at `index`.
    #[inline]
    pub fn profile(&self, index: usize) -> Option<&ActuatorProfile> {
        self.profiles.get(index)
    }

    /// Underlying driver.
    #[inline]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Underlying driver, mutably (shutdown).
    #[inline]
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Ramp profile `index` to `target_angle`.
    ///
    /// Returns the number of single-degree steps commanded, which is
    /// `|target - current|`. Already at target: returns `Ok(0)` without
    /// touching the driver.
    ///
    /// # Errors
    ///
    /// The first driver error aborts the ramp.
    pub fn ramp_to(&mut self, index: usize, target_angle: i32) -> Result<u32, ServoError> {
        let configured = self.profiles.len();
        let Some(profile) = self.profiles.get_mut(index) else {
            return Err(ServoError::ConfigError(format!(
                "no actuator profile #{index} ({configured} configured)"
            )));
        };

        let start = profile.current_angle;
        if start == target_angle {
            debug!("ch{}: already at {target_angle}°", profile.channel());
            return Ok(0);
        }

        debug!(
            "ch{}: ramp {start}° -> {target_angle}°",
            profile.channel()
        );
        let direction = (target_angle - start).signum();
        let mut steps = 0u32;
        while profile.current_angle != target_angle {
            let next = profile.current_angle + direction;
            self.driver.set_position(profile.channel(), next)?;
            profile.current_angle = next;
            steps += 1;
            self.clock.sleep(self.step_delay);
        }

        info!(
            "ch{}: reached {target_angle}° in {steps} steps",
            profile.channel()
        );
        Ok(steps)
    }

    /// Ramp profile `index` to one of its named targets.
    pub fn ramp_to_target(&mut self, index: usize, target: Target) -> Result<u32, ServoError> {
        let angle = self
            .profiles
            .get(index)
            .map(|p| p.angle_for(target))
            .ok_or_else(|| ServoError::ConfigError(format!("no actuator profile #{index}")))?;
        self.ramp_to(index, angle)
    }

    /// Jump every profile straight to its rest angle, without ramping.
    ///
    /// Every channel is attempted even if an earlier one fails; the first
    /// error is returned.
    pub fn reset_all_to_rest(&mut self) -> Result<(), ServoError> {
        let mut first_error = None;
        for profile in &mut self.profiles {
            match self.driver.set_position(profile.channel(), profile.rest_angle()) {
                Ok(()) => profile.current_angle = profile.rest_angle(),
                Err(e) => {
                    warn!("ch{}: reset to rest failed: {e}", profile.channel());
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                debug!("All {} channel(s) at rest", self.profiles.len());
                Ok(())
            }
        }
    }
}
