//! ANSI terminal presenter on `/dev/tty`.
//!
//! The terminal is switched to non-canonical, no-echo, no-signal mode so
//! single keys arrive immediately and Ctrl-C is an ordinary (invalid) key:
//! the operator has to quit, which guarantees the actuator is parked before
//! the process exits. The original mode is restored on drop.
//!
//! Screen layout (rows from the top):
//!
//! ```text
//!  0-2   inverse header, centered title
//!  6     STATUS
//!  9     INFO (dwell) or HELP (stopped)
//!  12    HELP (dwell) or COMMAND (stopped)
//!  15    COMMAND (dwell)
//!  -4..-2 inverse footer, UTC time left, version right
//! ```

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd};
use std::time::Duration;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::sys::termios::{self, InputFlags, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use tracing::{debug, warn};

use super::{Frame, Presenter, STATUS_FAULT};
use crate::command::STOPPED_HELP;
use crate::error::PresentError;
use crate::state::ControlState;

/// Controlling terminal device.
pub const TTY_PATH: &str = "/dev/tty";

/// Title in the header bar.
pub const TITLE: &str = "IDLE BOT";

const FALLBACK_SIZE: (u16, u16) = (24, 80);
const ESC: u8 = 0x1b;

const RESET: &str = "\x1b[0m";
const INVERSE: &str = "\x1b[7m";
const RED_BOLD: &str = "\x1b[1;31m";
const GREEN_BOLD: &str = "\x1b[1;32m";
const BLUE_BOLD: &str = "\x1b[1;34m";
const CLEAR: &str = "\x1b[2J";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

nix::ioctl_read_bad!(
    /// `TIOCGWINSZ`: read the terminal window size.
    window_size,
    nix::libc::TIOCGWINSZ,
    nix::libc::winsize
);

/// Presenter owning the controlling terminal.
pub struct TerminalPresenter {
    tty: File,
    original: Termios,
    pending: VecDeque<u8>,
}

impl TerminalPresenter {
    /// Open [`TTY_PATH`] and switch it to single-key mode.
    pub fn open() -> Result<Self, PresentError> {
        let tty = OpenOptions::new().read(true).write(true).open(TTY_PATH)?;
        let original = termios::tcgetattr(tty.as_fd()).map_err(io::Error::from)?;

        let mut raw = original.clone();
        raw.local_flags
            .remove(LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG);
        raw.input_flags.remove(InputFlags::IXON | InputFlags::ICRNL);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        termios::tcsetattr(tty.as_fd(), SetArg::TCSANOW, &raw).map_err(io::Error::from)?;

        let mut presenter = Self {
            tty,
            original,
            pending: VecDeque::new(),
        };
        presenter.write_all(&format!("{HIDE_CURSOR}{CLEAR}"))?;
        debug!("Terminal {TTY_PATH} in single-key mode");
        Ok(presenter)
    }

    fn write_all(&mut self, text: &str) -> io::Result<()> {
        self.tty.write_all(text.as_bytes())?;
        self.tty.flush()
    }

    fn size(&self) -> (u16, u16) {
        let mut ws = nix::libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        // SAFETY: `ws` is a valid, writable winsize and the fd is open for the call.
        match unsafe { window_size(self.tty.as_raw_fd(), &mut ws) } {
            Ok(_) if ws.ws_row > 0 && ws.ws_col > 0 => (ws.ws_row, ws.ws_col),
            _ => FALLBACK_SIZE,
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, frame: &Frame) -> Result<(), PresentError> {
        let (rows, cols) = self.size();
        let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let screen = compose(frame, rows, cols, &stamp);
        self.write_all(&screen)?;
        Ok(())
    }

    fn get_key(&mut self, timeout: Duration) -> Result<Option<char>, PresentError> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Some(char::from(byte)));
        }

        let mut fds = [PollFd::new(self.tty.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(poll_millis(timeout))) {
            Ok(0) | Err(Errno::EINTR) => return Ok(None),
            Ok(_) => {}
            Err(e) => return Err(io::Error::from(e).into()),
        }

        let mut buf = [0u8; 32];
        let n = match self.tty.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match buf[..n] {
            [] => Err(PresentError::Closed),
            // Escape sequences (arrows, function keys) count as one key.
            [ESC, ..] => Ok(Some(char::from(ESC))),
            [first, ref rest @ ..] => {
                self.pending.extend(rest.iter().copied());
                Ok(Some(char::from(first)))
            }
        }
    }
}

/// `poll(2)` timeout for `timeout`, rounded up to whole milliseconds.
///
/// A non-zero remainder under 1 ms must still block, or the last slice of a
/// wait turns into a busy loop of zero-timeout polls.
fn poll_millis(timeout: Duration) -> u16 {
    let partial = u128::from(timeout.subsec_nanos() % 1_000_000 != 0);
    u16::try_from(timeout.as_millis() + partial).unwrap_or(u16::MAX)
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(self.tty.as_fd(), SetArg::TCSANOW, &self.original) {
            warn!("Failed to restore terminal mode: {e}");
        }
        if let Err(e) = self.write_all(&format!("{RESET}{CLEAR}\x1b[H{SHOW_CURSOR}")) {
            warn!("Failed to clear terminal: {e}");
        }
    }
}

// ─── Layout ─────────────────────────────────────────────────────────

const STATUS_ROW: u16 = 6;
const ROW_GAP: u16 = 3;

/// Render `frame` as one ANSI string for a `rows` x `cols` screen.
pub fn compose(frame: &Frame, rows: u16, cols: u16, timestamp: &str) -> String {
    let width = usize::from(cols);
    let mut out = String::new();
    out.push_str(RESET);
    out.push_str(CLEAR);

    // Header.
    for row in 0..3 {
        bar(&mut out, row, width, "", "");
    }
    let title_col = width.saturating_sub(TITLE.len()) / 2;
    goto(&mut out, 1, title_col);
    let _ = write!(out, "{INVERSE}{TITLE}{RESET}");

    // Body.
    let status_color = if is_alert(frame) { RED_BOLD } else { GREEN_BOLD };
    line(&mut out, STATUS_ROW, "  STATUS: ", status_color, frame.status(), width);

    match frame {
        Frame::Stopped { error } => {
            let help_row = STATUS_ROW + ROW_GAP;
            help_line(&mut out, help_row, STOPPED_HELP, width);
            command_line(&mut out, help_row + ROW_GAP, error.as_deref(), width);
        }
        Frame::Running {
            info, error, help, ..
        } => {
            let info_row = STATUS_ROW + ROW_GAP;
            line(&mut out, info_row, "  INFO: ", "", info.as_deref().unwrap_or(""), width);
            let help_row = info_row + ROW_GAP;
            help_line(&mut out, help_row, help.as_deref().unwrap_or(""), width);
            command_line(&mut out, help_row + ROW_GAP, error.as_deref(), width);
        }
        Frame::Transitioning { .. } => {}
    }

    // Footer.
    let version = format!("Version {}  ", env!("CARGO_PKG_VERSION"));
    let footer_top = rows.saturating_sub(4);
    bar(&mut out, footer_top, width, "", "");
    bar(&mut out, footer_top + 1, width, &format!("  {timestamp}"), &version);
    bar(&mut out, footer_top + 2, width, "", "");

    out
}

fn is_alert(frame: &Frame) -> bool {
    match frame {
        Frame::Stopped { .. } => true,
        Frame::Running { .. } => false,
        Frame::Transitioning { status } => [
            ControlState::Quitting.status(),
            ControlState::Reloading.status(),
            STATUS_FAULT,
        ]
        .contains(&status.as_str()),
    }
}

fn goto(out: &mut String, row: u16, col: usize) {
    let _ = write!(out, "\x1b[{};{}H", u32::from(row) + 1, col + 1);
}

fn fit(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Full-width inverse bar with left and right aligned text.
fn bar(out: &mut String, row: u16, width: usize, left: &str, right: &str) {
    let left = fit(left, width);
    let room = width.saturating_sub(left.chars().count());
    let right = fit(right, room);
    let pad = room.saturating_sub(right.chars().count());
    goto(out, row, 0);
    let _ = write!(out, "{INVERSE}{left}{:pad$}{right}{RESET}", "");
}

fn line(out: &mut String, row: u16, tag: &str, color: &str, text: &str, width: usize) {
    goto(out, row, 0);
    let text = fit(text, width.saturating_sub(tag.len()));
    let _ = write!(out, "{tag}{color}{text}{RESET}");
}

fn help_line(out: &mut String, row: u16, help: &str, width: usize) {
    const TAG: &str = "  HELP: ";
    goto(out, row, 0);
    out.push_str(TAG);
    let mut in_key = false;
    for ch in help.chars().take(width.saturating_sub(TAG.len())) {
        match ch {
            '(' => {
                out.push(ch);
                out.push_str(BLUE_BOLD);
                in_key = true;
            }
            ')' => {
                out.push_str(RESET);
                out.push(ch);
                in_key = false;
            }
            _ => out.push(ch),
        }
    }
    if in_key {
        out.push_str(RESET);
    }
}

fn command_line(out: &mut String, row: u16, error: Option<&str>, width: usize) {
    line(out, row, "  COMMAND: ", RED_BOLD, error.unwrap_or(""), width);
}
