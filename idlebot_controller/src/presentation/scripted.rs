//! Headless presenter driven by a key script on a [`ManualClock`].
//!
//! `get_key` advances virtual time: to the next scripted key if it falls
//! inside the timeout, otherwise by the whole timeout. Once the script is
//! exhausted and the clock passes the horizon, input reports
//! [`PresentError::Closed`] so a run can never spin forever.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

use super::{Frame, Presenter};
use crate::clock::{Clock, ManualClock};
use crate::error::PresentError;

/// Default virtual time after which an exhausted script closes input.
pub const DEFAULT_HORIZON: Duration = Duration::from_secs(3600);

/// Key replay plus frame recorder.
#[derive(Debug)]
pub struct ScriptedPresenter {
    clock: ManualClock,
    keys: VecDeque<(Duration, char)>,
    frames: Vec<(Duration, Frame)>,
    horizon: Duration,
}

impl ScriptedPresenter {
    /// Presenter with an empty script.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            keys: VecDeque::new(),
            frames: Vec::new(),
            horizon: DEFAULT_HORIZON,
        }
    }

    /// Add a key press at virtual time `at`.
    pub fn key_at(mut self, at: Duration, key: char) -> Self {
        self.push_key(at, key);
        self
    }

    /// Close input after `horizon` once the script is exhausted.
    pub fn with_horizon(mut self, horizon: Duration) -> Self {
        self.horizon = horizon;
        self
    }

    /// Add a key press at virtual time `at`, keeping the script ordered.
    pub fn push_key(&mut self, at: Duration, key: char) {
        let pos = self.keys.partition_point(|&(t, _)| t <= at);
        self.keys.insert(pos, (at, key));
    }

    /// Every rendered frame with its render time.
    pub fn frames(&self) -> &[(Duration, Frame)] {
        &self.frames
    }

    /// Most recent frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last().map(|(_, frame)| frame)
    }

    /// Frames carrying an error annotation.
    pub fn error_frames(&self) -> impl Iterator<Item = &(Duration, Frame)> {
        self.frames.iter().filter(|(_, f)| f.error().is_some())
    }

    /// Keys not yet delivered.
    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }
}

impl Presenter for ScriptedPresenter {
    fn render(&mut self, frame: &Frame) -> Result<(), PresentError> {
        trace!("frame @{:?}: {frame:?}", self.clock.now());
        self.frames.push((self.clock.now(), frame.clone()));
        Ok(())
    }

    fn get_key(&mut self, timeout: Duration) -> Result<Option<char>, PresentError> {
        let now = self.clock.now();
        if self.keys.is_empty() && now >= self.horizon {
            return Err(PresentError::Closed);
        }

        let deadline = now + timeout;
        match self.keys.front() {
            Some(&(at, key)) if at <= deadline => {
                self.keys.pop_front();
                self.clock.advance_to(at);
                Ok(Some(key))
            }
            _ => {
                self.clock.advance_to(deadline);
                Ok(None)
            }
        }
    }
}
