//! State machine module root.
//!
//! [`ControlState`] is the controller's mode. The machine in [`machine`]
//! decides transitions and returns the side effects to perform as
//! [`Effect`] values; it never touches the actuator or the terminal itself.

pub mod machine;

use idlebot_common::exit::ExitKind;

use crate::command::{CommandSet, ENGAGED_HELP, REST_HELP, STOPPED_HELP};
use crate::motion::Target;

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlState {
    /// Idle, actuator parked, waiting for `run`.
    Stopped,
    /// Ramping to the rest angle.
    RunningToRest,
    /// Dwelling at rest.
    DwellAtRest,
    /// Ramping to the engage angle.
    RunningToEngaged,
    /// Dwelling engaged.
    DwellEngaged,
    /// Terminal: final exit.
    Quitting,
    /// Terminal: exit for relaunch.
    Reloading,
}

impl ControlState {
    /// No transition leaves a terminal state.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Quitting | Self::Reloading)
    }

    /// Status line shown in this state.
    pub const fn status(self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::RunningToRest => "RUNNING: Servo to NEUTRAL...",
            Self::DwellAtRest => "RUNNING: Servo NEUTRAL",
            Self::RunningToEngaged => "RUNNING: Servo to ENGAGED...",
            Self::DwellEngaged => "RUNNING: Servo ENGAGED",
            Self::Quitting => "QUITTING...",
            Self::Reloading => "RELOADING...",
        }
    }

    /// Help text of the states that read operator keys.
    pub const fn help(self) -> Option<&'static str> {
        match self {
            Self::Stopped => Some(STOPPED_HELP),
            Self::DwellAtRest => Some(REST_HELP),
            Self::DwellEngaged => Some(ENGAGED_HELP),
            _ => None,
        }
    }

    /// Commands accepted in this state. Empty while ramping or exiting.
    pub fn allowed_commands(self) -> CommandSet {
        self.help().map(CommandSet::from_help).unwrap_or_default()
    }
}

/// Which dwell to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DwellKind {
    /// Dwell at the rest angle.
    Rest,
    /// Dwell at the engage angle.
    Engaged,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Jump every actuator to rest. Runs before the next state is entered.
    ResetAllToRest,
    /// Ramp the driven actuator; completion feeds back `RampComplete`.
    RampTo(Target),
    /// Interruptible dwell; feeds back `DwellElapsed` or a command.
    Dwell(DwellKind),
    /// Grace render, then end the run.
    Exit(ExitKind),
}

impl Effect {
    /// True for effects that must complete before the next state is entered.
    #[inline]
    pub const fn precedes_entry(self) -> bool {
        matches!(self, Self::ResetAllToRest)
    }
}
