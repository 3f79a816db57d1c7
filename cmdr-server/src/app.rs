//! Process composition root for `cmdr-server`.

mod bootstrap;
mod commands;
mod menus;
mod roster;
mod transcript;

use std::cell::RefCell;
use std::rc::Rc;

use cmdr_common::config::ServerConfig;
use cmdr_common::error::CmdrResult;
use cmdr_core::containers::HotMap;
use cmdr_core::host::{Caller, ConsoleExec, LogLevel, LogSink, MenuOutcome, TracingLogSink};
use cmdr_core::player::PlayerDirectory;
use cmdr_core::{DispatchServices, Dispatcher, Permission, Player};
use cmdr_facade::{FacadeModule, LineOutcome};

use crate::ingress::{InputEvent, parse_input_line};
use commands::CommandEnv;
use menus::{MenuAnswer, PendingMenus};
use roster::Roster;
use transcript::Transcript;

/// Composition container: command tables, dispatcher, and the demo host collaborators.
pub struct ServerApp {
    /// Process configuration.
    pub config: ServerConfig,
    /// Client and console command tables.
    pub facade: FacadeModule,
    /// Connected players.
    pub roster: Rc<Roster>,
    /// Open selection menus.
    pub menus: Rc<PendingMenus>,
    /// Lines delivered to players.
    pub transcript: Rc<Transcript>,
    /// Registrar bound to both tables.
    pub dispatcher: Dispatcher,
    log: Rc<dyn LogSink>,
}

impl ServerApp {
    /// Creates the composition with console output going to `tracing`.
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::InvalidConfig` for invalid config and `CmdrError::MalformedSpec`
    /// when a demo command declares a bad argument spec.
    pub fn new(config: ServerConfig) -> CmdrResult<Self> {
        Self::with_log_sink(config, Rc::new(TracingLogSink))
    }

    /// Creates the composition with an explicit console log sink.
    ///
    /// # Errors
    ///
    /// Same as [`ServerApp::new`].
    pub fn with_log_sink(config: ServerConfig, log: Rc<dyn LogSink>) -> CmdrResult<Self> {
        config.validate()?;
        let facade = FacadeModule::from_config(&config);
        let roster = Rc::new(Roster::default());
        let transcript = Rc::new(Transcript::new(
            Rc::clone(&roster),
            config.echo_transcript,
        ));
        let menus = Rc::new(PendingMenus::new(Rc::clone(&transcript)));

        let console_exec: Rc<dyn ConsoleExec> = facade.console.clone();
        let services = DispatchServices::new(
            config.engine.clone(),
            roster.clone(),
            menus.clone(),
            transcript.clone(),
            Rc::clone(&log),
        )
        .with_console(&console_exec);
        let dispatcher = Dispatcher::new(services);

        let env = Rc::new(CommandEnv {
            roster: Rc::clone(&roster),
            menus: Rc::clone(&menus),
            transcript: Rc::clone(&transcript),
            dispatcher: dispatcher.clone(),
            console_table: Rc::downgrade(&facade.console),
            votes: RefCell::new(HotMap::new()),
        });
        dispatcher.register(commands::client_commands(&env), facade.client.as_ref())?;
        dispatcher.register_console(commands::console_commands(&env), facade.console.as_ref())?;

        for seed in &config.seed_players {
            roster.join(&seed.name, seed.rank);
        }

        Ok(Self {
            config,
            facade,
            roster,
            menus,
            transcript,
            dispatcher,
            log,
        })
    }

    /// Human-readable startup summary.
    #[must_use]
    pub fn startup_summary(&self) -> String {
        format!(
            "cmdr-server bootstrap: client_commands={}, console_commands={}, players_online={}, prefix={:?}",
            self.facade.client.len(),
            self.facade.console.len(),
            self.roster.len(),
            self.config.client_command_prefix,
        )
    }

    /// Classifies and processes one raw input line.
    pub fn handle_line(&self, line: &str) {
        self.handle_event(parse_input_line(line));
    }

    /// Processes one input event to completion.
    pub(crate) fn handle_event(&self, event: InputEvent) {
        match event {
            InputEvent::Player { name, line } => {
                if let Some(player) = self.find_player(&name) {
                    self.player_line(&player, &line);
                }
            }
            InputEvent::Choose { name, option } => {
                self.answer_menu(&name, MenuOutcome::Chosen(option));
            }
            InputEvent::Cancel { name } => self.answer_menu(&name, MenuOutcome::Cancelled),
            InputEvent::Console(line) => self.console_line(&line),
            InputEvent::Malformed(message) => self.log.log(LogLevel::Error, &message),
        }
    }

    fn find_player(&self, name: &str) -> Option<Player> {
        let player = self.roster.lookup_by_name(name);
        if player.is_none() {
            self.log.log(
                LogLevel::Error,
                &format!("No connected player matches \"{name}\"."),
            );
        }
        player
    }

    fn player_line(&self, player: &Player, line: &str) {
        let services = self.dispatcher.services();
        match self.facade.client.handle_line(Caller::Player(player.id), line) {
            LineOutcome::Handled | LineOutcome::Empty => {}
            LineOutcome::NotACommand => self.chat(player, line),
            LineOutcome::UnknownCommand(name) => {
                tracing::debug!(player = %player.name, command = %name, "unknown client command");
                services
                    .output
                    .send_line(player.id, &services.config.unknown_command_notice);
            }
            outcome @ LineOutcome::TooManyArguments { .. } => {
                if let Some(feedback) = outcome.feedback() {
                    services.send_fail(player.id, &feedback);
                }
            }
        }
    }

    fn chat(&self, player: &Player, text: &str) {
        if let Err(denial) = Permission::chat().authorize(player) {
            self.dispatcher
                .services()
                .send_fail(player.id, &denial.user_message());
            return;
        }
        self.transcript
            .broadcast(&format!("[coral][[{}[coral]]:[white] {text}", player.name));
    }

    fn console_line(&self, line: &str) {
        match self.facade.console.handle_line(Caller::Console, line) {
            LineOutcome::Handled | LineOutcome::Empty => {}
            LineOutcome::NotACommand => {}
            LineOutcome::UnknownCommand(name) => self.log.log(
                LogLevel::Error,
                &format!("Unknown command {name}. Type 'help' for a list of commands."),
            ),
            outcome @ LineOutcome::TooManyArguments { .. } => {
                if let Some(feedback) = outcome.feedback() {
                    self.log.log(LogLevel::Error, &feedback);
                }
            }
        }
    }

    fn answer_menu(&self, name: &str, outcome: MenuOutcome) {
        let Some(player) = self.find_player(name) else {
            return;
        };
        let complaint = match self.menus.answer(player.id, outcome) {
            MenuAnswer::Delivered => return,
            MenuAnswer::NoMenu => "You have no open menu.",
            MenuAnswer::OutOfRange => "That option is not in the menu.",
            MenuAnswer::NotCancellable => "This menu cannot be dismissed.",
        };
        self.dispatcher.services().send_fail(player.id, complaint);
    }
}

impl std::fmt::Debug for ServerApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerApp")
            .field("config", &self.config)
            .field("facade", &self.facade)
            .field("roster", &self.roster)
            .field("menus", &self.menus)
            .finish_non_exhaustive()
    }
}

/// Starts `cmdr-server`: reads input lines from stdin until it closes.
///
/// # Errors
///
/// Returns `CmdrError::Io` when the runtime cannot start, or a configuration or registration
/// error from [`ServerApp::new`].
pub fn run() -> CmdrResult<()> {
    bootstrap::run_server()
}

#[cfg(test)]
mod app_tests;
