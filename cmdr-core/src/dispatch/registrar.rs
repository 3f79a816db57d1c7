use std::cell::RefCell;
use std::rc::Rc;

use cmdr_common::error::{CmdrError, CmdrResult};
use cmdr_common::ids::PlayerId;

use super::guard::run_guarded;
use super::{DispatchServices, parse_arg_specs, resolve_args, resolve_chain, usage_pattern};
use crate::command::{
    ArgumentDescriptor, CommandContext, CommandDefinition, ConsoleCommandDefinition,
    HandlerError, OutputRoute, ResolvedArgs,
};
use crate::containers::HotMap;
use crate::host::{Caller, CommandSubstrate, LogLevel};
use crate::permission::Permission;
use crate::player::Player;

/// Help-listing view of one registered interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandListing {
    /// Command name.
    pub name: String,
    /// Usage pattern, e.g. `[target] <reason...>`.
    pub usage: String,
    /// Help text.
    pub description: String,
    /// Required capability.
    pub permission: Permission,
    /// Whether the command is hidden from listings.
    pub hidden: bool,
}

/// Binds command tables to front-end substrates.
///
/// Both registrars are idempotent per name: registering a name again replaces the previous
/// substrate entry in place.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    services: DispatchServices,
    listings: Rc<RefCell<HotMap<String, CommandListing>>>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given collaborators.
    #[must_use]
    pub fn new(services: DispatchServices) -> Self {
        Self {
            services,
            listings: Rc::new(RefCell::new(HotMap::new())),
        }
    }

    /// Collaborators shared by installed commands.
    #[must_use]
    pub fn services(&self) -> &DispatchServices {
        &self.services
    }

    /// Registers interactive commands on the client substrate.
    ///
    /// Every argument spec of every command is parsed before the substrate is touched, so a
    /// malformed spec leaves the substrate unchanged. Commands are then installed in order; each
    /// one replaces a previous registration of its name in place. When the substrate rejects a
    /// command, the commands before it in the batch stay installed and listed, while the rejected
    /// name keeps its previous registration and listing. Returns the number of installed commands.
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::MalformedSpec` for the first invalid argument spec, or the
    /// substrate's error when it rejects a registration.
    pub fn register<I>(&self, commands: I, substrate: &dyn CommandSubstrate) -> CmdrResult<usize>
    where
        I: IntoIterator<Item = CommandDefinition>,
    {
        let prepared = self.prepare(commands)?;
        let installed = prepared.len();
        for Prepared {
            definition,
            descriptors,
            usage,
        } in prepared
        {
            let name = definition.name;
            let description = definition.description;
            let listing = CommandListing {
                name: name.to_owned(),
                usage: usage.clone(),
                description: description.to_owned(),
                permission: definition.permission.clone(),
                hidden: definition.hidden,
            };
            let command = Rc::new(InteractiveCommand {
                definition,
                descriptors,
                services: self.services.clone(),
            });
            substrate.register(
                name,
                &usage,
                description,
                Rc::new(move |caller: Caller, raw_args: &[String]| {
                    command.invoke(caller, raw_args);
                }),
            )?;
            self.listings.borrow_mut().insert(name.to_owned(), listing);
            tracing::debug!(command = name, %usage, "registered interactive command");
        }
        Ok(installed)
    }

    /// Registers console commands on the console substrate.
    ///
    /// Console commands never present menus and have no permission gate; all of their output
    /// goes to the log sink. Parsing and replacement follow [`Dispatcher::register`].
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::MalformedSpec` for the first invalid argument spec, or the
    /// substrate's error when it rejects a registration.
    pub fn register_console<I>(
        &self,
        commands: I,
        substrate: &dyn CommandSubstrate,
    ) -> CmdrResult<usize>
    where
        I: IntoIterator<Item = ConsoleCommandDefinition>,
    {
        let prepared = self.prepare(commands)?;
        let installed = prepared.len();
        for Prepared {
            definition,
            descriptors,
            usage,
        } in prepared
        {
            let name = definition.name;
            let description = definition.description;
            let command = Rc::new(ConsoleCommand {
                definition,
                descriptors,
                services: self.services.clone(),
            });
            substrate.register(
                name,
                &usage,
                description,
                Rc::new(move |_caller: Caller, raw_args: &[String]| command.invoke(raw_args)),
            )?;
            tracing::debug!(command = name, %usage, "registered console command");
        }
        Ok(installed)
    }

    /// Parses the argument specs of a whole batch and builds each usage pattern.
    fn prepare<D, I>(&self, commands: I) -> CmdrResult<Vec<Prepared<D>>>
    where
        D: DeclaredArgs,
        I: IntoIterator<Item = D>,
    {
        commands
            .into_iter()
            .map(|definition| {
                let descriptors = parse_arg_specs(definition.arg_specs())?;
                let usage =
                    usage_pattern(&descriptors, &self.services.config.rest_of_line_marker);
                Ok(Prepared {
                    definition,
                    descriptors,
                    usage,
                })
            })
            .collect()
    }

    /// Interactive commands `caller` may run, excluding hidden ones, sorted by name.
    #[must_use]
    pub fn visible_commands(&self, caller: &Player) -> Vec<CommandListing> {
        let mut listings = self
            .listings
            .borrow()
            .values()
            .filter(|listing| !listing.hidden && listing.permission.check(caller))
            .cloned()
            .collect::<Vec<_>>();
        listings.sort_by(|left, right| left.name.cmp(&right.name));
        listings
    }
}

/// Definitions that declare `name:type?` argument specs.
trait DeclaredArgs {
    fn arg_specs(&self) -> &[&'static str];
}

impl DeclaredArgs for CommandDefinition {
    fn arg_specs(&self) -> &[&'static str] {
        &self.args
    }
}

impl DeclaredArgs for ConsoleCommandDefinition {
    fn arg_specs(&self) -> &[&'static str] {
        &self.args
    }
}

struct Prepared<D> {
    definition: D,
    descriptors: Vec<ArgumentDescriptor>,
    usage: String,
}

struct InteractiveCommand {
    definition: CommandDefinition,
    descriptors: Vec<ArgumentDescriptor>,
    services: DispatchServices,
}

impl InteractiveCommand {
    fn invoke(self: &Rc<Self>, caller: Caller, raw_args: &[String]) {
        let Caller::Player(player_id) = caller else {
            tracing::warn!(
                command = self.definition.name,
                "interactive command invoked without a player; ignoring"
            );
            return;
        };
        let Some(sender) = self.services.players.get(player_id) else {
            tracing::warn!(
                command = self.definition.name,
                player_id,
                "command sender is no longer connected"
            );
            return;
        };

        if let Err(denial) = self.definition.permission.authorize(&sender) {
            self.deny(&sender, &denial);
            return;
        }

        let resolution = match resolve_args(
            raw_args,
            &self.descriptors,
            self.services.players.as_ref(),
            true,
        ) {
            Ok(resolution) => resolution,
            Err(error) => {
                self.services.send_fail(player_id, &error.user_message());
                return;
            }
        };

        let command = Rc::clone(self);
        let raw_args = raw_args.to_vec();
        resolve_chain(
            resolution.args,
            resolution.unresolved,
            player_id,
            self.services.clone(),
            Box::new(move |args| {
                // Menus may have taken a while; prefer the sender's current state.
                let sender = command.services.players.get(player_id).unwrap_or(sender);
                command.run_handler(&sender, &raw_args, &args);
            }),
        );
    }

    fn deny(&self, sender: &Player, denial: &CmdrError) {
        tracing::debug!(
            command = self.definition.name,
            player = %sender.name,
            permission = self.definition.permission.name(),
            "{denial}"
        );
        if let Some(message) = self.definition.custom_unauthorized_message {
            self.services.send_fail(sender.id, message);
        } else if self.definition.hidden {
            self.services
                .output
                .send_line(sender.id, &self.services.config.unknown_command_notice);
        } else {
            self.services.send_fail(sender.id, &denial.user_message());
        }
    }

    fn run_handler(&self, sender: &Player, raw_args: &[String], args: &ResolvedArgs) {
        let route = PlayerRoute {
            services: &self.services,
            recipient: sender.id,
        };
        let console = self.services.console_pipeline();
        let context = CommandContext::new(raw_args, args, Some(sender), &route, console.as_deref());
        match run_guarded(&self.definition.handler, &context) {
            Ok(()) => {}
            Err(HandlerError::Command(message)) => route.fail(&message),
            Err(HandlerError::Unexpected(detail)) => {
                tracing::error!(
                    command = self.definition.name,
                    player = %sender.name,
                    "unexpected command failure: {detail}"
                );
                let config = &self.services.config;
                self.services
                    .output
                    .send_line(sender.id, &config.unexpected_error_notice);
                if Permission::see_error_messages(config.error_detail_rank).check(sender) {
                    self.services.output.send_line(sender.id, &detail);
                }
            }
        }
    }
}

struct ConsoleCommand {
    definition: ConsoleCommandDefinition,
    descriptors: Vec<ArgumentDescriptor>,
    services: DispatchServices,
}

impl ConsoleCommand {
    fn invoke(&self, raw_args: &[String]) {
        let log = self.services.log.as_ref();
        let resolution = match resolve_args(
            raw_args,
            &self.descriptors,
            self.services.players.as_ref(),
            false,
        ) {
            Ok(resolution) => resolution,
            Err(error) => {
                log.log(LogLevel::Error, &error.user_message());
                return;
            }
        };

        let route = LogRoute { services: &self.services };
        let console = self.services.console_pipeline();
        let context = CommandContext::new(
            raw_args,
            &resolution.args,
            None,
            &route,
            console.as_deref(),
        );
        match run_guarded(&self.definition.handler, &context) {
            Ok(()) => {}
            Err(HandlerError::Command(message)) => log.log(LogLevel::Warn, &message),
            Err(HandlerError::Unexpected(detail)) => {
                log.log(LogLevel::Error, &self.services.config.console_error_notice);
                log.log(LogLevel::Error, &detail);
            }
        }
    }
}

struct PlayerRoute<'a> {
    services: &'a DispatchServices,
    recipient: PlayerId,
}

impl OutputRoute for PlayerRoute<'_> {
    fn fail(&self, message: &str) {
        self.services.send_fail(self.recipient, message);
    }

    fn success(&self, message: &str) {
        self.services.send_success(self.recipient, message);
    }

    fn plain(&self, message: &str) {
        self.services.output.send_line(self.recipient, message);
    }
}

struct LogRoute<'a> {
    services: &'a DispatchServices,
}

impl OutputRoute for LogRoute<'_> {
    fn fail(&self, message: &str) {
        self.services.log.log(LogLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.services.log.log(LogLevel::Info, message);
    }

    fn plain(&self, message: &str) {
        self.services.log.log(LogLevel::Info, message);
    }
}
