//! Integration test: fatal paths park the actuator and surface the error.

use std::time::Duration;

use idlebot_common::hal::driver::ServoError;
use idlebot_controller::config::load_config_from_str;
use idlebot_controller::error::ControllerError;
use idlebot_controller::presentation::STATUS_FAULT;
use idlebot_controller::presentation::scripted::DEFAULT_HORIZON;
use idlebot_controller::state::ControlState;
use idlebot_hal::SimulationDriver;

use super::support::{DESK_TOML, harness_with, ms};

#[test]
fn driver_fault_mid_ramp_is_fatal() {
    let loaded = load_config_from_str(DESK_TOML).unwrap();
    // Boot park + 10 ramp steps succeed, the 11th command fails.
    let driver = SimulationDriver::new().fail_after(11);
    let mut h = harness_with(loaded, driver, &[(100, 'r'), (1_000, 'e')], 1, DEFAULT_HORIZON);

    let err = h.controller.run().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Actuator(ServoError::CommunicationError(_))
    ));

    // The tracked angle is the last one the driver accepted.
    assert_eq!(h.current_angle(), 125);
    assert_eq!(h.log.len(), 11);
    assert_eq!(
        h.controller.presenter().last_frame().unwrap().status(),
        STATUS_FAULT
    );
}

#[test]
fn lost_terminal_while_engaged_parks_actuator() {
    // Input closes at 2 s, inside the engaged dwell that starts at 1.6 s.
    let loaded = load_config_from_str(DESK_TOML).unwrap();
    let mut h = harness_with(
        loaded,
        SimulationDriver::new(),
        &[(100, 'r'), (1_000, 'e')],
        2,
        ms(2_000),
    );

    let err = h.controller.run().unwrap_err();
    assert!(matches!(err, ControllerError::Presentation(_)));
    assert_eq!(h.controller.state(), ControlState::DwellEngaged);
    assert_eq!(h.now(), ms(2_000));
    assert_eq!(h.current_angle(), 135);
    assert_eq!(h.log.last().unwrap().angle, 135);
}

#[test]
fn invalid_configuration_never_reaches_the_driver() {
    let text = DESK_TOML.replace("engage_angle = 75", "engage_angle = 181");
    assert!(load_config_from_str(&text).is_err());

    let text = DESK_TOML.replace("[driver]", "[timing]\npoll_interval_ms = 0\n\n[driver]");
    assert!(load_config_from_str(&text).is_err());
}

#[test]
fn boot_park_failure_is_fatal() {
    let loaded = load_config_from_str(DESK_TOML).unwrap();
    let driver = SimulationDriver::new().fail_after(0);
    let mut h = harness_with(loaded, driver, &[], 3, DEFAULT_HORIZON);

    assert!(matches!(
        h.controller.run(),
        Err(ControllerError::Actuator(_))
    ));
    assert_eq!(h.now(), Duration::ZERO);
    assert!(h.log.is_empty());
}
