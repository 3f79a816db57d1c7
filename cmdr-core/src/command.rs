//! Command model shared by the registrars and command implementations.

use std::fmt;
use std::rc::Rc;

use cmdr_common::error::{CmdrError, CmdrResult};
use thiserror::Error;

use crate::containers::HotMap;
use crate::host::ConsoleExec;
use crate::permission::Permission;
use crate::player::Player;

/// Closed set of argument kinds understood by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// Free text. As the last argument it receives the rest of the line.
    String,
    /// Signed integer.
    Number,
    /// Yes/no word.
    Boolean,
    /// Player picked by fuzzy name, or from a menu when omitted.
    Player,
    /// Player named exactly; ambiguous names are rejected.
    ExactPlayer,
    /// Player picked by fuzzy name, never from a menu.
    NamedPlayer,
}

impl ArgKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::String,
        Self::Number,
        Self::Boolean,
        Self::Player,
        Self::ExactPlayer,
        Self::NamedPlayer,
    ];

    /// Type name used in argument declarations.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Player => "player",
            Self::ExactPlayer => "exactPlayer",
            Self::NamedPlayer => "namedPlayer",
        }
    }

    /// Looks up a kind by its declared type name (case-sensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Whether an omitted argument of this kind may be resolved through a menu.
    #[must_use]
    pub const fn is_menu_resolvable(self) -> bool {
        matches!(self, Self::Player)
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed form of one `name:type?` argument spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    /// Argument name, unique within a command.
    pub name: String,
    /// Declared kind.
    pub kind: ArgKind,
    /// Whether the argument may be omitted.
    pub is_optional: bool,
}

/// Resolved value of one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// `string` argument.
    Text(String),
    /// `number` argument.
    Number(i64),
    /// `boolean` argument.
    Boolean(bool),
    /// `player`, `exactPlayer`, or `namedPlayer` argument.
    Player(Player),
    /// Optional argument that was not supplied.
    Absent,
}

/// Argument values keyed by argument name.
///
/// Menu-resolved arguments are missing from the map until their selection arrives; once the
/// resolution chain completes, every declared argument has an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArgs {
    values: HotMap<String, ArgValue>,
}

impl ResolvedArgs {
    /// Creates an empty argument map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces one value.
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw value lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Whether `name` has an entry (including `Absent`).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no entry exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text value of a `string` argument.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Integer value of a `number` argument.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Value of a `boolean` argument.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ArgValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    /// Player snapshot of a player-kind argument.
    #[must_use]
    pub fn player(&self, name: &str) -> Option<&Player> {
        match self.values.get(name) {
            Some(ArgValue::Player(player)) => Some(player),
            _ => None,
        }
    }

    /// Whether `name` is an optional argument the caller left out.
    #[must_use]
    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Absent))
    }
}

/// Failure raised by a command handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Normal-but-failed execution; the message is shown to the caller as a failure notice.
    #[error("{0}")]
    Command(String),
    /// Any other fault; the caller sees a generic notice and the detail is logged.
    #[error("{0}")]
    Unexpected(String),
}

impl HandlerError {
    /// Wraps an arbitrary error as an unexpected failure.
    #[must_use]
    pub fn unexpected(error: impl fmt::Display) -> Self {
        Self::Unexpected(error.to_string())
    }
}

impl From<CmdrError> for HandlerError {
    fn from(error: CmdrError) -> Self {
        Self::unexpected(error)
    }
}

/// Result type returned by command handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Aborts a handler with a user-facing failure message.
///
/// # Errors
///
/// Always returns `HandlerError::Command`.
pub fn fail<T>(message: impl Into<String>) -> Result<T, HandlerError> {
    Err(HandlerError::Command(message.into()))
}

/// Sink-specific routing of handler output, supplied by each registrar.
pub trait OutputRoute {
    /// Failure notice.
    fn fail(&self, message: &str);
    /// Success notice.
    fn success(&self, message: &str);
    /// Unformatted line.
    fn plain(&self, message: &str);
}

/// Everything a command implementation receives for one invocation.
pub struct CommandContext<'a> {
    /// Tokens as split by the substrate.
    pub raw_args: &'a [String],
    /// Resolved argument values.
    pub args: &'a ResolvedArgs,
    /// Invoking player; `None` for console commands.
    pub sender: Option<&'a Player>,
    route: &'a dyn OutputRoute,
    console: Option<&'a dyn ConsoleExec>,
}

impl<'a> CommandContext<'a> {
    /// Assembles a context. Registrars and tests are the only callers.
    #[must_use]
    pub fn new(
        raw_args: &'a [String],
        args: &'a ResolvedArgs,
        sender: Option<&'a Player>,
        route: &'a dyn OutputRoute,
        console: Option<&'a dyn ConsoleExec>,
    ) -> Self {
        Self {
            raw_args,
            args,
            sender,
            route,
            console,
        }
    }

    /// Sends a failure notice to the invoking sink.
    pub fn fail(&self, message: impl AsRef<str>) {
        self.route.fail(message.as_ref());
    }

    /// Sends a success notice to the invoking sink.
    pub fn success(&self, message: impl AsRef<str>) {
        self.route.success(message.as_ref());
    }

    /// Sends an unformatted line to the invoking sink.
    pub fn output(&self, message: impl AsRef<str>) {
        self.route.plain(message.as_ref());
    }

    /// Runs `line` through the console command pipeline before returning.
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::InvalidState` when no console pipeline is attached, or the
    /// substrate's error for unknown commands and usage mismatches.
    pub fn exec_console(&self, line: &str) -> CmdrResult<()> {
        let Some(console) = self.console else {
            return Err(CmdrError::InvalidState("console pipeline is not attached"));
        };
        console.exec_console(line)
    }
}

/// Handler callback shared by both registrars.
pub type CommandHandler = Rc<dyn Fn(&CommandContext<'_>) -> HandlerResult>;

/// One interactive command table entry.
#[derive(Clone)]
pub struct CommandDefinition {
    /// Command name as typed after the prefix.
    pub name: &'static str,
    /// Ordered `name:type?` argument specs.
    pub args: Vec<&'static str>,
    /// Help text.
    pub description: &'static str,
    /// Capability required to run the command.
    pub permission: Permission,
    /// Denial message overriding the permission's default.
    pub custom_unauthorized_message: Option<&'static str>,
    /// Hidden commands are left out of listings and deny like unknown commands.
    pub hidden: bool,
    /// Implementation.
    pub handler: CommandHandler,
}

impl CommandDefinition {
    /// Creates a visible command without a custom denial message.
    #[must_use]
    pub fn new<F>(
        name: &'static str,
        args: &[&'static str],
        description: &'static str,
        permission: Permission,
        handler: F,
    ) -> Self
    where
        F: Fn(&CommandContext<'_>) -> HandlerResult + 'static,
    {
        Self {
            name,
            args: args.to_vec(),
            description,
            permission,
            custom_unauthorized_message: None,
            hidden: false,
            handler: Rc::new(handler),
        }
    }

    /// Overrides the denial message.
    #[must_use]
    pub fn with_unauthorized_message(mut self, message: &'static str) -> Self {
        self.custom_unauthorized_message = Some(message);
        self
    }

    /// Marks the command hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("description", &self.description)
            .field("permission", &self.permission.name())
            .field(
                "custom_unauthorized_message",
                &self.custom_unauthorized_message,
            )
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

/// One console command table entry. Console input is trusted, so there is no permission.
#[derive(Clone)]
pub struct ConsoleCommandDefinition {
    /// Command name.
    pub name: &'static str,
    /// Ordered `name:type?` argument specs.
    pub args: Vec<&'static str>,
    /// Help text.
    pub description: &'static str,
    /// Implementation.
    pub handler: CommandHandler,
}

impl ConsoleCommandDefinition {
    /// Creates a console command.
    #[must_use]
    pub fn new<F>(
        name: &'static str,
        args: &[&'static str],
        description: &'static str,
        handler: F,
    ) -> Self
    where
        F: Fn(&CommandContext<'_>) -> HandlerResult + 'static,
    {
        Self {
            name,
            args: args.to_vec(),
            description,
            handler: Rc::new(handler),
        }
    }
}

impl fmt::Debug for ConsoleCommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleCommandDefinition")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
