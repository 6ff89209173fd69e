//! Presentation adapter contract.
//!
//! The controller describes every screen as a [`Frame`] and hands it to a
//! [`Presenter`], which also supplies operator keys. The terminal
//! implementation draws to `/dev/tty`; the scripted one records frames and
//! replays keys against a virtual clock.

pub mod scripted;
pub mod terminal;

use std::time::Duration;

use crate::error::PresentError;

pub use scripted::ScriptedPresenter;
pub use terminal::TerminalPresenter;

/// Error annotation for a key outside the current allow-list.
pub const INVALID_KEY: &str = "INVALID KEY";

/// Status of the frame drawn after a fatal error.
pub const STATUS_FAULT: &str = "FAULT";

/// One screen worth of controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// STOPPED screen, optionally annotated with an error.
    Stopped {
        /// Transient error annotation.
        error: Option<String>,
    },
    /// Dwell screen.
    Running {
        /// Status line.
        status: String,
        /// Progress line.
        info: Option<String>,
        /// Transient error annotation.
        error: Option<String>,
        /// Allowed commands.
        help: Option<String>,
    },
    /// Status-only screen for ramps and exits.
    Transitioning {
        /// Status line.
        status: String,
    },
}

impl Frame {
    /// Error annotation carried by this frame.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Stopped { error } | Self::Running { error, .. } => error.as_deref(),
            Self::Transitioning { .. } => None,
        }
    }

    /// Status line carried by this frame.
    pub fn status(&self) -> &str {
        match self {
            Self::Stopped { .. } => crate::state::ControlState::Stopped.status(),
            Self::Running { status, .. } | Self::Transitioning { status } => status,
        }
    }

    /// Info line carried by this frame.
    pub fn info(&self) -> Option<&str> {
        match self {
            Self::Running { info, .. } => info.as_deref(),
            _ => None,
        }
    }
}

/// Renders frames and reads operator keys.
pub trait Presenter {
    /// Draw `frame`, replacing whatever was shown.
    fn render(&mut self, frame: &Frame) -> Result<(), PresentError>;

    /// Wait up to `timeout` for one key. `Ok(None)` means no key arrived.
    fn get_key(&mut self, timeout: Duration) -> Result<Option<char>, PresentError>;

    /// Draw the STOPPED screen.
    fn render_stopped(&mut self, error: Option<&str>) -> Result<(), PresentError> {
        self.render(&Frame::Stopped {
            error: error.map(str::to_owned),
        })
    }

    /// Draw a dwell screen.
    fn render_running(
        &mut self,
        status: &str,
        info: Option<&str>,
        error: Option<&str>,
        help: Option<&str>,
    ) -> Result<(), PresentError> {
        self.render(&Frame::Running {
            status: status.to_owned(),
            info: info.map(str::to_owned),
            error: error.map(str::to_owned),
            help: help.map(str::to_owned),
        })
    }

    /// Draw a status-only screen.
    fn render_transitioning(&mut self, status: &str) -> Result<(), PresentError> {
        self.render(&Frame::Transitioning {
            status: status.to_owned(),
        })
    }
}
