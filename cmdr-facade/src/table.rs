//! Named command tables that split input lines and invoke substrate handlers.

use std::cell::RefCell;
use std::rc::Rc;

use cmdr_common::error::{CmdrError, CmdrResult};
use cmdr_core::containers::HotMap;
use cmdr_core::host::{Caller, CommandSubstrate, ConsoleExec, SubstrateHandler};

use crate::protocol::{UsageParam, parse_usage, split_arguments};

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// A handler ran.
    Handled,
    /// The line was blank.
    Empty,
    /// The line did not start with the table's prefix.
    NotACommand,
    /// No command with this name is registered.
    UnknownCommand(String),
    /// The line carried more tokens than the command's usage accepts.
    TooManyArguments {
        /// Command name.
        name: String,
        /// Usage pattern of the command.
        usage: String,
    },
}

impl LineOutcome {
    /// Feedback line for the caller, if the outcome warrants one.
    #[must_use]
    pub fn feedback(&self) -> Option<String> {
        match self {
            Self::Handled | Self::Empty | Self::NotACommand => None,
            Self::UnknownCommand(name) => Some(format!("Unknown command {name}.")),
            Self::TooManyArguments { usage, .. } => {
                Some(format!("Too many arguments! Usage: {usage}"))
            }
        }
    }
}

/// One row of a help listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Command name.
    pub name: String,
    /// Usage pattern.
    pub usage: String,
    /// Help text.
    pub description: String,
}

struct TableEntry {
    usage: String,
    description: String,
    params: Rc<[UsageParam]>,
    handler: SubstrateHandler,
}

/// Command registry for one front-end (client chat or server console).
pub struct CommandTable {
    prefix: String,
    entries: RefCell<HotMap<String, TableEntry>>,
}

impl CommandTable {
    /// Creates an empty table. Lines must start with `prefix`; an empty prefix accepts any line.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: RefCell::new(HotMap::new()),
        }
    }

    /// Prefix lines must start with.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no command is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Every registered command, sorted by name.
    #[must_use]
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        let mut entries = self
            .entries
            .borrow()
            .iter()
            .map(|(name, entry)| HelpEntry {
                name: name.clone(),
                usage: entry.usage.clone(),
                description: entry.description.clone(),
            })
            .collect::<Vec<_>>();
        entries.sort_by(|left, right| left.name.cmp(&right.name));
        entries
    }

    /// Splits `line` and runs the matching handler.
    ///
    /// The handler is taken out of the table before it runs, so it may register, remove, or
    /// execute commands on this same table.
    pub fn handle_line(&self, caller: Caller, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Empty;
        }
        let Some(body) = line.strip_prefix(self.prefix.as_str()) else {
            return LineOutcome::NotACommand;
        };
        let (name, remainder) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));

        let found = self.entries.borrow().get(name).map(|entry| {
            (
                Rc::clone(&entry.params),
                Rc::clone(&entry.handler),
                entry.usage.clone(),
            )
        });
        let Some((params, handler, usage)) = found else {
            tracing::debug!(?caller, command = name, "unknown command");
            return LineOutcome::UnknownCommand(name.to_owned());
        };
        let Ok(tokens) = split_arguments(&params, remainder) else {
            return LineOutcome::TooManyArguments {
                name: name.to_owned(),
                usage,
            };
        };
        tracing::trace!(?caller, command = name, tokens = tokens.len(), "dispatching line");
        handler(caller, &tokens);
        LineOutcome::Handled
    }
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("prefix", &self.prefix)
            .field("commands", &self.len())
            .finish()
    }
}

impl CommandSubstrate for CommandTable {
    fn register(
        &self,
        name: &str,
        usage: &str,
        description: &str,
        handler: SubstrateHandler,
    ) -> CmdrResult<()> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CmdrError::Substrate(format!("invalid command name \"{name}\"")));
        }
        let params = parse_usage(usage)?;
        self.entries.borrow_mut().insert(
            name.to_owned(),
            TableEntry {
                usage: usage.to_owned(),
                description: description.to_owned(),
                params: params.into(),
                handler,
            },
        );
        Ok(())
    }

    fn remove_command(&self, name: &str) {
        self.entries.borrow_mut().remove(name);
    }
}

impl ConsoleExec for CommandTable {
    fn exec_console(&self, line: &str) -> CmdrResult<()> {
        match self.handle_line(Caller::Console, line) {
            LineOutcome::Handled => Ok(()),
            LineOutcome::Empty => Err(CmdrError::Substrate("empty command line".to_owned())),
            LineOutcome::NotACommand => Err(CmdrError::Substrate(format!(
                "console lines must start with \"{}\"",
                self.prefix
            ))),
            LineOutcome::UnknownCommand(name) => {
                Err(CmdrError::Substrate(format!("unknown command {name}")))
            }
            outcome @ LineOutcome::TooManyArguments { .. } => Err(CmdrError::Substrate(
                outcome.feedback().unwrap_or_default(),
            )),
        }
    }
}
