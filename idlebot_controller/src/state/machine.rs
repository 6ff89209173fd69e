//! Motion state machine transitions.
//!
//! STOPPED → RUNNING_TO_REST → DWELL_AT_REST → RUNNING_TO_ENGAGED →
//! DWELL_ENGAGED → RUNNING_TO_REST → … until `stop`, `quit` or `reload`.
//!
//! Leaving DWELL_ENGAGED on an operator command always parks the actuator
//! first (`ResetAllToRest`). Leaving DWELL_AT_REST does not, the actuator is
//! already there. QUITTING and RELOADING accept nothing.

use idlebot_common::exit::ExitKind;

use super::{ControlState, DwellKind, Effect};
use crate::command::Command;
use crate::motion::Target;

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Operator command that passed the state's allow-list.
    Command(Command),
    /// The requested ramp finished.
    RampComplete,
    /// The dwell ran its full duration.
    DwellElapsed,
    /// No key during a STOPPED poll.
    PollTimeout,
}

/// An accepted transition and the effects it requests, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State left.
    pub from: ControlState,
    /// State entered.
    pub next: ControlState,
    /// Effects to run. Those with [`Effect::precedes_entry`] run before `next` is entered.
    pub effects: &'static [Effect],
}

/// Result of a transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition accepted.
    Ok(Transition),
    /// Transition rejected, state unchanged.
    Rejected(&'static str),
}

const NONE: &[Effect] = &[];
const RAMP_TO_REST: &[Effect] = &[Effect::RampTo(Target::Rest)];
const RAMP_TO_ENGAGED: &[Effect] = &[Effect::RampTo(Target::Engaged)];
const DWELL_REST: &[Effect] = &[Effect::Dwell(DwellKind::Rest)];
const DWELL_ENGAGED: &[Effect] = &[Effect::Dwell(DwellKind::Engaged)];
const QUIT: &[Effect] = &[Effect::Exit(ExitKind::Quit)];
const RELOAD: &[Effect] = &[Effect::Exit(ExitKind::Reload)];
const PARK: &[Effect] = &[Effect::ResetAllToRest];
const PARK_AND_QUIT: &[Effect] = &[Effect::ResetAllToRest, Effect::Exit(ExitKind::Quit)];
const PARK_AND_RELOAD: &[Effect] = &[Effect::ResetAllToRest, Effect::Exit(ExitKind::Reload)];

/// Holder of the current [`ControlState`].
#[derive(Debug, Clone)]
pub struct MotionStateMachine {
    state: ControlState,
}

impl MotionStateMachine {
    /// Machine in STOPPED.
    pub const fn new() -> Self {
        Self {
            state: ControlState::Stopped,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> ControlState {
        self.state
    }

    /// Decide the transition for `event` without changing state.
    pub fn plan(&self, event: ControlEvent) -> TransitionResult {
        use Command::*;
        use ControlEvent::{Command as Cmd, DwellElapsed, PollTimeout, RampComplete};
        use ControlState::*;

        let (next, effects) = match (self.state, event) {
            (Stopped, Cmd(Run)) => (RunningToRest, RAMP_TO_REST),
            (Stopped, Cmd(Quit)) => (Quitting, QUIT),
            (Stopped, Cmd(Reload)) => (Reloading, RELOAD),
            (Stopped, PollTimeout) => (Stopped, NONE),

            (RunningToRest, RampComplete) => (DwellAtRest, DWELL_REST),

            // At rest already: no park needed.
            (DwellAtRest, Cmd(Stop)) => (Stopped, NONE),
            (DwellAtRest, Cmd(Quit)) => (Quitting, QUIT),
            (DwellAtRest, Cmd(Reload)) => (Reloading, RELOAD),
            (DwellAtRest, DwellElapsed | Cmd(Engage)) => (RunningToEngaged, RAMP_TO_ENGAGED),

            (RunningToEngaged, RampComplete) => (DwellEngaged, DWELL_ENGAGED),

            (DwellEngaged, Cmd(Stop)) => (Stopped, PARK),
            (DwellEngaged, Cmd(Quit)) => (Quitting, PARK_AND_QUIT),
            (DwellEngaged, Cmd(Reload)) => (Reloading, PARK_AND_RELOAD),
            (DwellEngaged, DwellElapsed | Cmd(Neutral)) => (RunningToRest, RAMP_TO_REST),

            _ => return TransitionResult::Rejected(invalid_transition_reason(self.state)),
        };

        TransitionResult::Ok(Transition {
            from: self.state,
            next,
            effects,
        })
    }

    /// Enter the state of a transition previously returned by [`plan`](Self::plan).
    #[inline]
    pub fn commit(&mut self, transition: &Transition) {
        self.state = transition.next;
    }

    /// Plan and commit in one step.
    pub fn handle_event(&mut self, event: ControlEvent) -> TransitionResult {
        let result = self.plan(event);
        if let TransitionResult::Ok(transition) = &result {
            self.commit(transition);
        }
        result
    }
}

impl Default for MotionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_transition_reason(state: ControlState) -> &'static str {
    use ControlState::*;
    match state {
        Stopped => "Stopped: only run, quit, reload or poll timeout allowed",
        RunningToRest | RunningToEngaged => "Ramping: only ramp completion allowed",
        DwellAtRest => "DwellAtRest: only stop, quit, reload, engage or dwell elapsed allowed",
        DwellEngaged => "DwellEngaged: only stop, quit, reload, neutral or dwell elapsed allowed",
        Quitting | Reloading => "Terminal state: no transitions allowed",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
