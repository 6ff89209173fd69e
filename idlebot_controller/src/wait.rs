//! Interruptible wait primitive.
//!
//! A dwell polls the presenter in slices of at most `poll_interval`, so the
//! progress line can be redrawn once per second while keys are still picked
//! up promptly. A key in the allow-list ends the wait at once. Any other key
//! shows `INVALID KEY` for `invalid_key_hold` and polling resumes. The hold
//! itself is not counted as elapsed time, so the remaining wait is unchanged
//! and the total wall-clock time is `duration + hold * invalid_keys`.
//!
//! Keys are checked before expiry is declared: a key returned by the final
//! slice still preempts.

use std::time::Duration;

use idlebot_common::controller::config::TimingConfig;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::command::{Command, CommandSet, KeyInput};
use crate::error::PresentError;
use crate::presentation::{INVALID_KEY, Presenter};

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full duration elapsed.
    TimedOut,
    /// An allowed command arrived first.
    CommandAccepted(Command),
}

/// Poll granularity and invalid-key penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTiming {
    /// Longest single `get_key` slice.
    pub poll_interval: Duration,
    /// Display window of the invalid-key annotation.
    pub invalid_key_hold: Duration,
}

impl From<&TimingConfig> for WaitTiming {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            poll_interval: timing.poll_interval(),
            invalid_key_hold: timing.invalid_key_hold(),
        }
    }
}

/// What to show while waiting.
#[derive(Debug, Clone, Copy)]
pub struct DwellScreen<'a> {
    /// Status line.
    pub status: &'a str,
    /// Help text; also defines the allowed keys.
    pub help: &'a str,
}

/// Progress line for a dwell, e.g. `Sleeping 3 of 50 Seconds`.
///
/// The counter is one-based and capped at `total_s`.
pub fn progress_text(elapsed: Duration, total_s: u32) -> String {
    let shown = elapsed.as_secs().saturating_add(1).min(u64::from(total_s));
    format!("Sleeping {shown} of {total_s} Seconds")
}

/// Wait `duration_s` seconds or until an allowed command arrives.
///
/// # Errors
///
/// Presenter failures end the wait.
pub fn wait_or_command<P, C>(
    presenter: &mut P,
    clock: &C,
    timing: &WaitTiming,
    screen: &DwellScreen<'_>,
    duration_s: u32,
) -> Result<WaitOutcome, PresentError>
where
    P: Presenter + ?Sized,
    C: Clock,
{
    let allowed = CommandSet::from_help(screen.help);
    let total = Duration::from_secs(u64::from(duration_s));
    let start = clock.now();
    let mut held = Duration::ZERO;
    let mut invalid_keys = 0u32;
    let mut shown_second = None;

    debug!("Dwell {duration_s}s, allowed: {}", allowed.help_text());

    loop {
        let elapsed = clock.now().saturating_sub(start).saturating_sub(held);
        if elapsed >= total {
            info!("Dwell of {duration_s}s elapsed ({invalid_keys} invalid key(s))");
            return Ok(WaitOutcome::TimedOut);
        }

        let second = elapsed.as_secs();
        let progress = progress_text(elapsed, duration_s);
        if shown_second != Some(second) {
            presenter.render_running(screen.status, Some(&progress), None, Some(screen.help))?;
            shown_second = Some(second);
        }

        let slice = timing.poll_interval.min(total - elapsed);
        let Some(key) = presenter.get_key(slice)? else {
            continue;
        };

        match allowed.classify(key) {
            KeyInput::Accepted(command) => {
                info!("Command {command} accepted after {elapsed:?} of {duration_s}s");
                return Ok(WaitOutcome::CommandAccepted(command));
            }
            KeyInput::Invalid(key) => {
                invalid_keys += 1;
                debug!("Invalid key {key:?} during dwell");
                presenter.render_running(
                    screen.status,
                    Some(&progress),
                    Some(INVALID_KEY),
                    Some(screen.help),
                )?;
                let hold_start = clock.now();
                clock.sleep(timing.invalid_key_hold);
                held += clock.now().saturating_sub(hold_start);
                // Redraw to clear the annotation.
                shown_second = None;
            }
        }
    }
}
