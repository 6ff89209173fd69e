//! Per-channel actuator profile.

use idlebot_common::controller::config::ActuatorConfig;

/// Named position an actuator can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Resting (neutral) angle.
    Rest,
    /// Engaged angle.
    Engaged,
}

/// One controlled channel and the last angle commanded to it.
///
/// `current_angle` starts at the rest angle and is only ever written by
/// [`RampEngine`](super::RampEngine) after the driver accepted the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorProfile {
    channel: u8,
    rest_angle: i32,
    engage_angle: i32,
    pub(super) current_angle: i32,
}

impl ActuatorProfile {
    /// Profile at rest.
    pub const fn new(channel: u8, rest_angle: i32, engage_angle: i32) -> Self {
        Self {
            channel,
            rest_angle,
            engage_angle,
            current_angle: rest_angle,
        }
    }

    /// Driver channel.
    #[inline]
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Resting angle [deg].
    #[inline]
    pub const fn rest_angle(&self) -> i32 {
        self.rest_angle
    }

    /// Engaged angle [deg].
    #[inline]
    pub const fn engage_angle(&self) -> i32 {
        self.engage_angle
    }

    /// Last angle sent to the driver [deg].
    #[inline]
    pub const fn current_angle(&self) -> i32 {
        self.current_angle
    }

    /// Angle of a named target.
    pub const fn angle_for(&self, target: Target) -> i32 {
        match target {
            Target::Rest => self.rest_angle,
            Target::Engaged => self.engage_angle,
        }
    }

    /// True if the last commanded angle is the rest angle.
    #[inline]
    pub const fn is_at_rest(&self) -> bool {
        self.current_angle == self.rest_angle
    }
}

impl From<&ActuatorConfig> for ActuatorProfile {
    fn from(config: &ActuatorConfig) -> Self {
        Self::new(config.channel, config.rest_angle, config.engage_angle)
    }
}
