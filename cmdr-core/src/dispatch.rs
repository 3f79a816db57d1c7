//! Command registration and dispatch pipeline.
//!
//! Registration parses every argument spec once and installs one substrate handler per command.
//! Each invocation then runs: permission gate, argument resolver, interactive resolution chain,
//! guarded handler call. The console registrar runs the same pipeline without the permission
//! gate and without menus, and routes all output to the log sink.

use std::rc::{Rc, Weak};

use cmdr_common::config::EngineConfig;
use cmdr_common::ids::PlayerId;

use crate::host::{ConsoleExec, LogSink, MenuPresenter, OutputSink};
use crate::player::PlayerDirectory;

#[path = "dispatch/arg_spec.rs"]
mod arg_spec;
#[path = "dispatch/usage.rs"]
mod usage;
#[path = "dispatch/resolve.rs"]
mod resolve;
#[path = "dispatch/chain.rs"]
mod chain;
#[path = "dispatch/guard.rs"]
mod guard;
#[path = "dispatch/registrar.rs"]
mod registrar;

pub use arg_spec::{parse_arg_spec, parse_arg_specs};
pub use chain::{ChainCompletion, resolve_chain};
pub use registrar::{CommandListing, Dispatcher};
pub use resolve::{Resolution, parse_boolean, resolve_args};
pub use usage::usage_pattern;

/// Host collaborators shared by every installed command.
///
/// Cloning is cheap: every field is reference counted.
#[derive(Clone)]
pub struct DispatchServices {
    /// Engine settings.
    pub config: Rc<EngineConfig>,
    /// Identity lookups and live roster.
    pub players: Rc<dyn PlayerDirectory>,
    /// Selection widget used by the resolution chain.
    pub menus: Rc<dyn MenuPresenter>,
    /// Transport for lines addressed to players.
    pub output: Rc<dyn OutputSink>,
    /// Process-wide log sink used by console commands.
    pub log: Rc<dyn LogSink>,
    /// Console pipeline for `exec_console`. Held weakly because the console table owns the
    /// handlers that hold these services.
    pub console: Option<Weak<dyn ConsoleExec>>,
}

impl DispatchServices {
    /// Bundles collaborators without a console pipeline attached.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        players: Rc<dyn PlayerDirectory>,
        menus: Rc<dyn MenuPresenter>,
        output: Rc<dyn OutputSink>,
        log: Rc<dyn LogSink>,
    ) -> Self {
        Self {
            config: Rc::new(config),
            players,
            menus,
            output,
            log,
            console: None,
        }
    }

    /// Attaches the console pipeline used by `CommandContext::exec_console`.
    #[must_use]
    pub fn with_console(mut self, console: &Rc<dyn ConsoleExec>) -> Self {
        self.console = Some(Rc::downgrade(console));
        self
    }

    /// Sends a failure notice to one player.
    pub fn send_fail(&self, recipient: PlayerId, message: &str) {
        let line = format!("{}{message}", self.config.fail_prefix);
        self.output.send_line(recipient, &line);
    }

    /// Sends a success notice to one player.
    pub fn send_success(&self, recipient: PlayerId, message: &str) {
        let line = format!("{}{message}", self.config.success_prefix);
        self.output.send_line(recipient, &line);
    }

    fn console_pipeline(&self) -> Option<Rc<dyn ConsoleExec>> {
        self.console.as_ref().and_then(Weak::upgrade)
    }
}

impl std::fmt::Debug for DispatchServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchServices")
            .field("config", &self.config)
            .field("console_attached", &self.console_pipeline().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "dispatch/testkit.rs"]
mod testkit;
