//! Shared harness: a controller wired to headless collaborators.

use std::time::Duration;

use idlebot_common::hal::driver::ServoDriver;
use idlebot_controller::clock::{Clock, ManualClock};
use idlebot_controller::config::{LoadedConfig, load_config_from_str};
use idlebot_controller::motion::RampEngine;
use idlebot_controller::presentation::scripted::DEFAULT_HORIZON;
use idlebot_controller::presentation::{Frame, ScriptedPresenter};
use idlebot_controller::runner::Controller;
use idlebot_hal::{CommandLog, SimulationDriver};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const DESK_TOML: &str = r#"
[shared]
service_name = "idlebot-test"

[driver]
name = "simulation"

[[actuators]]
channel = 0
rest_angle = 135
engage_angle = 75
"#;

pub type TestController = Controller<SimulationDriver, ScriptedPresenter, ManualClock, StdRng>;

pub struct Harness {
    pub controller: TestController,
    pub log: CommandLog,
    pub clock: ManualClock,
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Controller on `DESK_TOML` with keys `(millis, key)` and dwell seed `seed`.
pub fn harness(keys: &[(u64, char)], seed: u64) -> Harness {
    harness_with(
        load_config_from_str(DESK_TOML).unwrap(),
        SimulationDriver::new(),
        keys,
        seed,
        DEFAULT_HORIZON,
    )
}

pub fn harness_with(
    loaded: LoadedConfig,
    mut driver: SimulationDriver,
    keys: &[(u64, char)],
    seed: u64,
    input_horizon: Duration,
) -> Harness {
    driver.init(&loaded.config.driver).unwrap();
    let log = driver.log();
    let clock = ManualClock::new();

    let mut presenter = ScriptedPresenter::new(clock.clone()).with_horizon(input_horizon);
    for &(at, key) in keys {
        presenter.push_key(ms(at), key);
    }

    let timing = loaded.config.timing;
    let ramp = RampEngine::new(driver, clock.clone(), timing.ramp_step(), loaded.profiles);
    let controller = Controller::new(
        ramp,
        presenter,
        clock.clone(),
        StdRng::seed_from_u64(seed),
        timing,
        loaded.config.dwell,
    );
    Harness {
        controller,
        log,
        clock,
    }
}

impl Harness {
    pub fn frames(&self) -> &[(Duration, Frame)] {
        self.controller.presenter().frames()
    }

    /// First time a frame with `status` was rendered.
    pub fn first_status(&self, status: &str) -> Option<Duration> {
        self.frames()
            .iter()
            .find(|(_, f)| f.status() == status)
            .map(|(t, _)| *t)
    }

    /// Total seconds of the first dwell shown with `status`.
    pub fn dwell_seconds(&self, status: &str) -> Option<u32> {
        self.dwell_totals(status).first().copied()
    }

    pub fn current_angle(&self) -> i32 {
        self.controller.ramp().profile(0).unwrap().current_angle()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Totals of every dwell started with `status`, in order.
    pub fn dwell_totals(&self, status: &str) -> Vec<u32> {
        self.frames()
            .iter()
            .filter(|(_, f)| f.status() == status)
            .filter_map(|(_, f)| f.info())
            .filter(|info| info.starts_with("Sleeping 1 of "))
            .filter_map(|info| info.split_whitespace().nth(3)?.parse().ok())
            .collect()
    }
}
