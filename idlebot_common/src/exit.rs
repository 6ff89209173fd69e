//! Process exit protocol between the controller and its supervisor.
//!
//! The controller reports how it ended through its exit code. The supervisor
//! relaunches it on [`EXIT_RELOAD`] and finishes on anything else.

/// Normal operator quit.
pub const EXIT_QUIT: i32 = 0;

/// Fatal error (actuator or terminal failure).
pub const EXIT_FAULT: i32 = 1;

/// Operator requested a reload; the supervisor restarts the controller.
pub const EXIT_RELOAD: i32 = 2;

/// How a controller run ended under operator control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitKind {
    /// Final termination.
    Quit,
    /// Restart requested.
    Reload,
}

impl ExitKind {
    /// Process exit code for this outcome.
    pub const fn code(self) -> i32 {
        match self {
            Self::Quit => EXIT_QUIT,
            Self::Reload => EXIT_RELOAD,
        }
    }
}

/// What the supervisor does after a child exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorAction {
    /// Launch the controller again.
    Relaunch,
    /// Stop supervising and exit with this code.
    Finish(i32),
}

/// Relaunch bookkeeping for the supervisor.
#[derive(Debug, Clone)]
pub struct RestartPolicy {
    max_reloads: Option<u32>,
    reloads: u32,
}

impl RestartPolicy {
    /// `max_reloads = None` relaunches without limit.
    pub const fn new(max_reloads: Option<u32>) -> Self {
        Self {
            max_reloads,
            reloads: 0,
        }
    }

    /// Number of relaunches granted so far.
    #[inline]
    pub const fn reloads(&self) -> u32 {
        self.reloads
    }

    /// Decide the next step from a child exit code (`None` = killed by signal).
    pub fn on_exit(&mut self, code: Option<i32>) -> SupervisorAction {
        match code {
            Some(EXIT_RELOAD) => {
                if self.max_reloads.is_some_and(|max| self.reloads >= max) {
                    tracing::warn!("Reload limit ({}) reached", self.reloads);
                    return SupervisorAction::Finish(EXIT_FAULT);
                }
                self.reloads += 1;
                SupervisorAction::Relaunch
            }
            Some(code) => SupervisorAction::Finish(code),
            None => SupervisorAction::Finish(EXIT_FAULT),
        }
    }
}
