//! Operator command vocabulary and context allow-lists.
//!
//! Each context advertises its commands as help text such as
//! `(E)ngage, (S)top, Re(L)oad, (Q)uit`. The parenthesised letters are the
//! accepted keys, matched case-insensitively. [`CommandSet::from_help`] derives
//! the allow-list from that text so the help line and the accepted keys can
//! never drift apart.

use heapless::Vec;
use std::fmt;

/// Help text shown while stopped.
pub const STOPPED_HELP: &str = "(R)un, Re(L)oad, (Q)uit";

/// Help text shown while dwelling at rest.
pub const REST_HELP: &str = "(E)ngage, (S)top, Re(L)oad, (Q)uit";

/// Help text shown while dwelling engaged.
pub const ENGAGED_HELP: &str = "(N)eutral, (S)top, Re(L)oad, (Q)uit";

/// Capacity of a [`CommandSet`]; one slot per [`Command`] variant.
pub const MAX_COMMANDS: usize = Command::ALL.len();

/// An operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Leave STOPPED and start cycling.
    Run,
    /// Return to STOPPED.
    Stop,
    /// Park and exit for good.
    Quit,
    /// Park and exit so the supervisor relaunches.
    Reload,
    /// Cut the rest dwell short and engage now.
    Engage,
    /// Cut the engaged dwell short and return to rest now.
    Neutral,
}

impl Command {
    /// Every command, in a stable order.
    pub const ALL: [Command; 6] = [
        Command::Run,
        Command::Stop,
        Command::Quit,
        Command::Reload,
        Command::Engage,
        Command::Neutral,
    ];

    /// Lowercase key bound to this command.
    pub const fn key(self) -> char {
        match self {
            Self::Run => 'r',
            Self::Stop => 's',
            Self::Quit => 'q',
            Self::Reload => 'l',
            Self::Engage => 'e',
            Self::Neutral => 'n',
        }
    }

    /// Help label with the key in parentheses.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Run => "(R)un",
            Self::Stop => "(S)top",
            Self::Quit => "(Q)uit",
            Self::Reload => "Re(L)oad",
            Self::Engage => "(E)ngage",
            Self::Neutral => "(N)eutral",
        }
    }

    /// Command bound to `key`, ignoring case.
    pub fn from_key(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of one keypress against a [`CommandSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// The key maps to an allowed command.
    Accepted(Command),
    /// The key is not allowed here.
    Invalid(char),
}

/// Fixed-capacity allow-list of commands, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    commands: Vec<Command, MAX_COMMANDS>,
}

impl CommandSet {
    /// Empty set: every key is invalid.
    pub const fn empty() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Set holding `commands`, duplicates dropped.
    pub fn new(commands: &[Command]) -> Self {
        let mut set = Self::empty();
        for &command in commands {
            set.insert(command);
        }
        set
    }

    /// Allow-list advertised by a help text.
    ///
    /// Every character inside parentheses is a key; keys without a bound
    /// command are ignored.
    pub fn from_help(help: &str) -> Self {
        let mut set = Self::empty();
        let mut in_key = false;
        for ch in help.chars() {
            match ch {
                '(' => in_key = true,
                ')' => in_key = false,
                _ if in_key => {
                    if let Some(command) = Command::from_key(ch) {
                        set.insert(command);
                    }
                }
                _ => {}
            }
        }
        set
    }

    fn insert(&mut self, command: Command) {
        if !self.contains(command) {
            // Capacity equals the number of variants, so a deduplicated push always fits.
            let _ = self.commands.push(command);
        }
    }

    /// True if `command` is allowed.
    pub fn contains(&self, command: Command) -> bool {
        self.commands.contains(&command)
    }

    /// Allowed commands in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Command> + '_ {
        self.commands.iter().copied()
    }

    /// Number of allowed commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if nothing is allowed.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Comma-separated help labels, e.g. `(R)un, Re(L)oad, (Q)uit`.
    pub fn help_text(&self) -> String {
        self.iter()
            .map(Command::label)
            .collect::<std::vec::Vec<_>>()
            .join(", ")
    }

    /// Classify a keypress, ignoring case.
    pub fn classify(&self, key: char) -> KeyInput {
        match Command::from_key(key) {
            Some(command) if self.contains(command) => KeyInput::Accepted(command),
            _ => KeyInput::Invalid(key),
        }
    }
}
