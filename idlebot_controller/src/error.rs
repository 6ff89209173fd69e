//! Controller error types.

use idlebot_common::hal::driver::ServoError;
use thiserror::Error;

/// Failure of the operator terminal.
#[derive(Debug, Error)]
pub enum PresentError {
    /// Terminal read, write or mode switch failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input source is gone (end of file or script exhausted).
    #[error("operator input closed")]
    Closed,
}

/// Fatal controller error. Any of these ends the run with the fault exit code.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The actuator driver rejected a command.
    #[error("actuator fault: {0}")]
    Actuator(#[from] ServoError),

    /// The terminal failed.
    #[error("presentation fault: {0}")]
    Presentation(#[from] PresentError),
}
