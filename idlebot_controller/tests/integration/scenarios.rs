//! Integration test: operator scenarios end to end.

use idlebot_common::exit::{EXIT_QUIT, EXIT_RELOAD, ExitKind};
use idlebot_controller::presentation::{Frame, INVALID_KEY};
use idlebot_controller::state::ControlState;

use super::support::{harness, ms};

const NEUTRAL: &str = "RUNNING: Servo NEUTRAL";
const ENGAGED: &str = "RUNNING: Servo ENGAGED";
const TO_ENGAGED: &str = "RUNNING: Servo to ENGAGED...";
const TO_NEUTRAL: &str = "RUNNING: Servo to NEUTRAL...";

// ── Stop while resting ─────────────────────────────────────────────

#[test]
fn run_then_stop_at_rest_needs_no_park() {
    let mut h = harness(&[(100, 'r'), (10_100, 's'), (11_000, 'q')], 1);

    let kind = h.controller.run().unwrap();
    assert_eq!(kind, ExitKind::Quit);
    assert_eq!(kind.code(), EXIT_QUIT);

    // Boot park only: the ramp to rest is a no-op and stopping at rest does not re-park.
    assert_eq!(h.log.angles(0), vec![135]);
    assert_eq!(h.current_angle(), 135);

    assert_eq!(h.first_status(TO_NEUTRAL), Some(ms(100)));
    assert_eq!(h.first_status(NEUTRAL), Some(ms(100)));
    let dwell = h.dwell_seconds(NEUTRAL).unwrap();
    assert!((45..75).contains(&dwell), "rest dwell {dwell}");

    assert!(
        h.frames()
            .iter()
            .any(|(t, f)| *t == ms(10_100) && *f == Frame::Stopped { error: None })
    );
    // Quit at 11 s plus the 1 s grace period.
    assert_eq!(h.now(), ms(12_000));
}

// ── Leaving the engaged dwell ──────────────────────────────────────

#[test]
fn quit_while_engaged_jumps_to_rest() {
    let mut h = harness(&[(100, 'r'), (1_000, 'e'), (3_000, 'q')], 2);

    assert_eq!(h.controller.run().unwrap(), ExitKind::Quit);

    let angles = h.log.angles(0);
    assert_eq!(angles.len(), 1 + 60 + 1);
    assert_eq!(angles[1], 134);
    assert_eq!(angles[60], 75);
    // Single jump back, no intermediate degrees.
    assert_eq!(angles[61], 135);
    assert_eq!(h.current_angle(), 135);

    assert_eq!(h.first_status(TO_ENGAGED), Some(ms(1_000)));
    assert_eq!(h.first_status(ENGAGED), Some(ms(1_600)));
    assert_eq!(h.first_status("QUITTING..."), Some(ms(3_000)));
    assert_eq!(h.now(), ms(4_000));
}

#[test]
fn reload_while_engaged_parks_and_requests_relaunch() {
    let mut h = harness(&[(100, 'r'), (1_000, 'e'), (2_000, 'l')], 3);

    let kind = h.controller.run().unwrap();
    assert_eq!(kind, ExitKind::Reload);
    assert_eq!(kind.code(), EXIT_RELOAD);
    assert_eq!(h.controller.state(), ControlState::Reloading);
    assert_eq!(h.log.last().unwrap().angle, 135);
    assert_eq!(h.current_angle(), 135);
}

#[test]
fn stop_while_engaged_parks_before_stopped_screen() {
    let mut h = harness(&[(100, 'r'), (1_000, 'e'), (3_000, 's'), (4_000, 'q')], 4);

    h.controller.run().unwrap();

    let angles = h.log.angles(0);
    assert_eq!(angles.len(), 62);
    assert_eq!(&angles[60..], &[75, 135]);
    let stopped_again = h
        .frames()
        .iter()
        .find(|(t, f)| *t >= ms(1_000) && matches!(f, Frame::Stopped { .. }))
        .map(|(t, _)| *t);
    assert_eq!(stopped_again, Some(ms(3_000)));
    // Quitting from STOPPED adds no further command.
    assert_eq!(h.log.len(), 62);
}

// ── Skip commands ──────────────────────────────────────────────────

#[test]
fn neutral_ramps_back_instead_of_jumping() {
    let mut h = harness(&[(100, 'r'), (1_000, 'E'), (2_000, 'N'), (3_000, 'q')], 5);

    assert_eq!(h.controller.run().unwrap(), ExitKind::Quit);

    let angles = h.log.angles(0);
    assert_eq!(angles.len(), 1 + 60 + 60);
    assert!(angles[61..].windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(angles.last(), Some(&135));
    assert!(
        h.frames()
            .iter()
            .any(|(t, f)| *t == ms(2_000) && f.status() == TO_NEUTRAL)
    );
}

#[test]
fn keys_pressed_mid_ramp_are_handled_at_next_dwell() {
    // 's' arrives while ramping to engaged (1.0 s .. 1.6 s).
    let mut h = harness(&[(100, 'r'), (1_000, 'e'), (1_200, 's'), (5_000, 'q')], 6);

    h.controller.run().unwrap();

    let stopped_again = h
        .frames()
        .iter()
        .find(|(t, f)| *t >= ms(1_000) && matches!(f, Frame::Stopped { .. }))
        .map(|(t, _)| *t);
    assert_eq!(stopped_again, Some(ms(1_600)));
    assert_eq!(h.log.len(), 62);
    assert_eq!(h.current_angle(), 135);
}

// ── Invalid keys ───────────────────────────────────────────────────

#[test]
fn invalid_key_at_rest_keeps_remaining_time() {
    let mut h = harness(&[(100, 'r'), (5_000, 'x'), (400_000, 'q')], 7);

    h.controller.run().unwrap();

    let errors: Vec<_> = h.controller.presenter().error_frames().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, ms(5_000));
    assert_eq!(errors[0].1.status(), NEUTRAL);
    assert_eq!(errors[0].1.error(), Some(INVALID_KEY));

    // The rest dwell ends `duration + 0.5 s` after it started.
    let dwell = u64::from(h.dwell_seconds(NEUTRAL).unwrap());
    assert_eq!(h.first_status(TO_ENGAGED), Some(ms(100 + dwell * 1_000 + 500)));
    assert_eq!(h.current_angle(), 135);
}

// ── Autonomous cycling ─────────────────────────────────────────────

#[test]
fn autonomous_cycle_respects_dwell_ranges() {
    let mut h = harness(&[(0, 'r'), (300_000, 'q')], 8);

    assert_eq!(h.controller.run().unwrap(), ExitKind::Quit);

    let rest = h.dwell_totals(NEUTRAL);
    let engaged = h.dwell_totals(ENGAGED);
    assert!(rest.len() >= 3, "rest dwells: {rest:?}");
    assert!(engaged.len() >= 3, "engaged dwells: {engaged:?}");
    assert!(rest.iter().all(|s| (45..75).contains(s)), "{rest:?}");
    assert!(engaged.iter().all(|s| (5..10).contains(s)), "{engaged:?}");

    // Ramps move one degree at a time; only a final park may jump.
    let angles = h.log.angles(0);
    let body = &angles[1..angles.len() - 1];
    assert!(body.windows(2).all(|w| (w[1] - w[0]).abs() == 1));
    assert!(angles.iter().all(|a| (75..=135).contains(a)));
    assert_eq!(h.current_angle(), 135);
}

#[test]
fn quit_always_leaves_actuator_at_rest() {
    for seed in 0..20 {
        let quit_at = 20_000 + seed * 7_919;
        let mut h = harness(&[(0, 'r'), (quit_at, 'q')], seed);
        assert_eq!(h.controller.run().unwrap(), ExitKind::Quit, "seed {seed}");
        assert_eq!(h.current_angle(), 135, "seed {seed}");
        assert_eq!(h.log.last().unwrap().angle, 135, "seed {seed}");
    }
}
