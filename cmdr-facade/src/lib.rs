//! Line-oriented front-end substrate: usage patterns, argument splitting, and command tables.

pub mod protocol;
pub mod table;

use std::rc::Rc;

use cmdr_common::config::ServerConfig;

pub use table::{CommandTable, HelpEntry, LineOutcome};

/// Facade subsystem bootstrap module: the client and console command tables.
#[derive(Debug, Clone)]
pub struct FacadeModule {
    /// Commands typed by players, behind the client prefix.
    pub client: Rc<CommandTable>,
    /// Commands typed at the server console, without a prefix.
    pub console: Rc<CommandTable>,
}

impl FacadeModule {
    /// Builds empty command tables from process config.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            client: Rc::new(CommandTable::new(config.client_command_prefix.clone())),
            console: Rc::new(CommandTable::new("")),
        }
    }
}
