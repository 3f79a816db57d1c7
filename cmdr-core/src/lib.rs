//! Core command engine: argument specs, permissions, argument resolution, and dispatch.
//!
//! Front-ends plug in through the collaborator traits in [`host`]; the registrars in
//! [`dispatch`] turn a command table into substrate handlers that run the full pipeline.

pub mod command;
pub mod containers;
pub mod dispatch;
pub mod host;
pub mod permission;
pub mod player;

pub use command::{
    ArgKind, ArgValue, ArgumentDescriptor, CommandContext, CommandDefinition, CommandHandler,
    ConsoleCommandDefinition, HandlerError, HandlerResult, ResolvedArgs, fail,
};
pub use dispatch::{CommandListing, DispatchServices, Dispatcher};
pub use permission::{Permission, PermissionCheck};
pub use player::{Player, PlayerDirectory};
