//! Collaborator contracts the engine consumes from its host.
//!
//! The host owns the line substrate, the menu widget, the output transport, and the log sink.
//! Everything is single-threaded: handlers are `Rc`-shared and callbacks are not `Send`.

use std::rc::Rc;

use cmdr_common::error::CmdrResult;
use cmdr_common::ids::PlayerId;

/// Who issued a command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    /// A connected player.
    Player(PlayerId),
    /// The server console.
    Console,
}

/// Callback the substrate invokes with the caller and the already split argument tokens.
pub type SubstrateHandler = Rc<dyn Fn(Caller, &[String])>;

/// Line-oriented command registry owned by the front-end.
pub trait CommandSubstrate {
    /// Registers a command. An existing registration of the same name is replaced.
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::Substrate` when the usage pattern cannot be interpreted.
    fn register(
        &self,
        name: &str,
        usage: &str,
        description: &str,
        handler: SubstrateHandler,
    ) -> CmdrResult<()>;

    /// Removes a command. Removing an unknown name is a no-op.
    fn remove_command(&self, name: &str);
}

/// Synchronous entry into the console command pipeline.
pub trait ConsoleExec {
    /// Runs one console line as if it had been typed at the console.
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::Substrate` when the line names an unknown command or does not fit
    /// the command's usage.
    fn exec_console(&self, line: &str) -> CmdrResult<()>;
}

/// One selection prompt shown to a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRequest {
    /// Menu title.
    pub title: String,
    /// Menu body text.
    pub prompt: String,
    /// Player who must answer.
    pub requester: PlayerId,
    /// Rendered option labels, in presentation order.
    pub options: Vec<String>,
    /// Whether the player may dismiss the menu.
    pub allow_cancel: bool,
}

/// Answer to a [`ChoiceRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Index into [`ChoiceRequest::options`].
    Chosen(usize),
    /// The player dismissed the menu.
    Cancelled,
}

/// At-most-once continuation handed to the menu collaborator.
pub type ChoiceCallback = Box<dyn FnOnce(MenuOutcome)>;

/// Interactive selection widget.
pub trait MenuPresenter {
    /// Shows `request` and arranges for `on_chosen` to run once the player answers.
    ///
    /// The callback may run synchronously inside this call or on a later event.
    fn present_choices(&self, request: ChoiceRequest, on_chosen: ChoiceCallback);
}

/// Transport for lines addressed to one player.
pub trait OutputSink {
    /// Sends one formatted line.
    fn send_line(&self, recipient: PlayerId, text: &str);
}

/// Severity of a console log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Normal output.
    Info,
    /// Expected command failure.
    Warn,
    /// Validation errors and unexpected failures.
    Error,
}

/// Process-wide log sink used by the console registrar.
pub trait LogSink {
    /// Writes one line at `level`.
    fn log(&self, level: LogLevel, message: &str);
}

/// Log sink that forwards console output to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!(target: "cmdr::console", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "cmdr::console", "{message}"),
            LogLevel::Error => tracing::error!(target: "cmdr::console", "{message}"),
        }
    }
}
