//! Controller runner: executes state machine effects.
//!
//! The loop asks the [`MotionStateMachine`] for a transition, runs the
//! effects that must finish before entry (`ResetAllToRest`), commits the new
//! state, then runs the entry effects. Ramps feed back `RampComplete`, dwells
//! feed back `DwellElapsed` or the accepted command, and STOPPED polls the
//! presenter for keys. An `Exit` effect ends the run.
//!
//! ## Fatal path
//!
//! Any actuator or presenter error aborts the loop. The runner then jumps
//! every actuator to rest (best effort), draws a `FAULT` frame when it can,
//! and returns the error so the binary exits with the fault code.

use idlebot_common::controller::config::{DwellConfig, DwellRange, TimingConfig};
use idlebot_common::exit::ExitKind;
use idlebot_common::hal::driver::{ServoDriver, ServoError};
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::command::KeyInput;
use crate::error::ControllerError;
use crate::motion::RampEngine;
use crate::presentation::{INVALID_KEY, Presenter, STATUS_FAULT};
use crate::state::machine::{ControlEvent, MotionStateMachine, TransitionResult};
use crate::state::{ControlState, DwellKind, Effect};
use crate::wait::{DwellScreen, WaitOutcome, WaitTiming, wait_or_command};

/// Profile driven by the control loop. Further profiles are only parked.
pub const DRIVEN_PROFILE: usize = 0;

enum Flow {
    Continue(Option<ControlEvent>),
    Exit(ExitKind),
}

/// The interactive controller.
pub struct Controller<D, P, C, R>
where
    D: ServoDriver,
    P: Presenter,
    C: Clock,
    R: Rng,
{
    machine: MotionStateMachine,
    ramp: RampEngine<D, C>,
    presenter: P,
    clock: C,
    rng: R,
    timing: TimingConfig,
    dwell: DwellConfig,
}

impl<D, P, C, R> Controller<D, P, C, R>
where
    D: ServoDriver,
    P: Presenter,
    C: Clock,
    R: Rng,
{
    /// Assemble a controller in STOPPED.
    pub fn new(
        ramp: RampEngine<D, C>,
        presenter: P,
        clock: C,
        rng: R,
        timing: TimingConfig,
        dwell: DwellConfig,
    ) -> Self {
        Self {
            machine: MotionStateMachine::new(),
            ramp,
            presenter,
            clock,
            rng,
            timing,
            dwell,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> ControlState {
        self.machine.state()
    }

    /// Ramp engine (tracked angles and driver).
    #[inline]
    pub fn ramp(&self) -> &RampEngine<D, C> {
        &self.ramp
    }

    /// Presenter.
    #[inline]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Shut the driver down. Call after [`run`](Self::run).
    pub fn shutdown(&mut self) -> Result<(), ServoError> {
        self.ramp.driver_mut().shutdown()
    }

    /// Park the actuator, then run until the operator quits or reloads.
    ///
    /// # Errors
    ///
    /// Actuator or presenter failure. The actuator has been sent to rest
    /// (best effort) before the error is returned.
    pub fn run(&mut self) -> Result<ExitKind, ControllerError> {
        info!(
            "Controller starting with {} actuator(s)",
            self.ramp.profiles().len()
        );
        match self.run_loop() {
            Ok(kind) => {
                info!("Controller finished: {kind:?}");
                Ok(kind)
            }
            Err(e) => {
                self.emergency_stop(&e);
                Err(e)
            }
        }
    }

    fn run_loop(&mut self) -> Result<ExitKind, ControllerError> {
        self.ramp.reset_all_to_rest()?;

        let mut pending = None;
        loop {
            let event = match pending.take() {
                Some(event) => event,
                None => match self.poll_stopped()? {
                    Some(event) => event,
                    None => continue,
                },
            };

            let transition = match self.machine.plan(event) {
                TransitionResult::Ok(transition) => transition,
                TransitionResult::Rejected(reason) => {
                    warn!("Event {event:?} rejected in {:?}: {reason}", self.state());
                    continue;
                }
            };

            for &effect in transition.effects.iter().filter(|e| e.precedes_entry()) {
                self.execute(effect)?;
            }
            self.machine.commit(&transition);
            if transition.from != transition.next {
                info!("{:?} -> {:?} on {event:?}", transition.from, transition.next);
            }

            for &effect in transition.effects.iter().filter(|e| !e.precedes_entry()) {
                match self.execute(effect)? {
                    Flow::Continue(next) => pending = next,
                    Flow::Exit(kind) => return Ok(kind),
                }
            }
        }
    }

    /// One STOPPED poll. `None` means nothing to feed the machine.
    fn poll_stopped(&mut self) -> Result<Option<ControlEvent>, ControllerError> {
        let state = self.state();
        if state != ControlState::Stopped {
            // Every other live state is entered with an effect that yields the next event.
            warn!("No pending event in {state:?}, polling keys");
        }

        self.presenter.render_stopped(None)?;
        let Some(key) = self.presenter.get_key(self.timing.stopped_poll())? else {
            return Ok(Some(ControlEvent::PollTimeout));
        };

        match state.allowed_commands().classify(key) {
            KeyInput::Accepted(command) => Ok(Some(ControlEvent::Command(command))),
            KeyInput::Invalid(key) => {
                debug!("Invalid key {key:?} while stopped");
                self.presenter.render_stopped(Some(INVALID_KEY))?;
                self.clock.sleep(self.timing.invalid_key_hold());
                Ok(None)
            }
        }
    }

    fn execute(&mut self, effect: Effect) -> Result<Flow, ControllerError> {
        match effect {
            Effect::ResetAllToRest => {
                info!("Parking all actuators at rest");
                self.ramp.reset_all_to_rest()?;
                Ok(Flow::Continue(None))
            }
            Effect::RampTo(target) => {
                self.presenter.render_transitioning(self.state().status())?;
                self.ramp.ramp_to_target(DRIVEN_PROFILE, target)?;
                Ok(Flow::Continue(Some(ControlEvent::RampComplete)))
            }
            Effect::Dwell(kind) => {
                let range = match kind {
                    DwellKind::Rest => self.dwell.rest,
                    DwellKind::Engaged => self.dwell.engaged,
                };
                let seconds = draw_dwell(&mut self.rng, range);
                let state = self.state();
                let screen = DwellScreen {
                    status: state.status(),
                    help: state.help().unwrap_or_default(),
                };
                info!("Dwelling {seconds}s ({kind:?})");
                let outcome = wait_or_command(
                    &mut self.presenter,
                    &self.clock,
                    &WaitTiming::from(&self.timing),
                    &screen,
                    seconds,
                )?;
                let event = match outcome {
                    WaitOutcome::TimedOut => ControlEvent::DwellElapsed,
                    WaitOutcome::CommandAccepted(command) => ControlEvent::Command(command),
                };
                Ok(Flow::Continue(Some(event)))
            }
            Effect::Exit(kind) => {
                self.presenter.render_transitioning(self.state().status())?;
                self.clock.sleep(self.timing.exit_grace());
                Ok(Flow::Exit(kind))
            }
        }
    }

    fn emergency_stop(&mut self, cause: &ControllerError) {
        error!("Fatal error in {:?}: {cause}", self.state());
        match self.ramp.reset_all_to_rest() {
            Ok(()) => info!("Emergency park complete"),
            Err(e) => error!("Emergency park failed: {e}"),
        }
        if let Err(e) = self.presenter.render_transitioning(STATUS_FAULT) {
            warn!("Could not render fault frame: {e}");
        }
    }
}

/// Uniform whole seconds in `[min_s, max_s)`.
pub fn draw_dwell<R: Rng + ?Sized>(rng: &mut R, range: DwellRange) -> u32 {
    if range.min_s >= range.max_s {
        return range.min_s;
    }
    rng.gen_range(range.min_s..range.max_s)
}
