//! Runtime configuration shared by the engine and the server composition root.

use crate::error::{CmdrError, CmdrResult};
use crate::ids::Rank;

/// Output and resolution settings used by the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Prefix prepended to failure notices sent to a player.
    pub fail_prefix: String,
    /// Prefix prepended to success notices sent to a player.
    pub success_prefix: String,
    /// Notice sent to a player when a handler fails unexpectedly.
    pub unexpected_error_notice: String,
    /// Line logged by the console registrar when a handler fails unexpectedly.
    pub console_error_notice: String,
    /// Notice sent instead of a denial message for hidden commands.
    pub unknown_command_notice: String,
    /// Title of the player-selection menu.
    pub player_menu_title: String,
    /// Minimum rank that sees raw error detail after an unexpected handler failure.
    pub error_detail_rank: Rank,
    /// Marker appended inside the brackets of a trailing rest-of-line argument in usage text.
    pub rest_of_line_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fail_prefix: "[scarlet]\u{26a0} [yellow]".to_owned(),
            success_prefix: "[#48e076]".to_owned(),
            unexpected_error_notice: "[scarlet]\u{274c} An error occurred while executing the command!"
                .to_owned(),
            console_error_notice: "An error occurred while executing the command!".to_owned(),
            unknown_command_notice: "[scarlet]Unknown command. Check [lightgray]/help[scarlet]."
                .to_owned(),
            player_menu_title: "Select a player".to_owned(),
            error_detail_rank: Rank::Admin,
            rest_of_line_marker: "...".to_owned(),
        }
    }
}

/// Players created at startup by the demo server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlayer {
    /// Display name, may contain color tags.
    pub name: String,
    /// Initial rank.
    pub rank: Rank,
}

/// Bootstrap configuration used by `cmdr-server` during process startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Engine settings.
    pub engine: EngineConfig,
    /// Prefix every client command line must start with.
    pub client_command_prefix: String,
    /// Players joined before the first input line is read.
    pub seed_players: Vec<SeedPlayer>,
    /// Whether lines sent to players are echoed to stdout.
    pub echo_transcript: bool,
    /// Default `tracing` filter directive.
    pub log_filter: String,
}

/// Environment variable overriding [`ServerConfig::log_filter`].
pub const LOG_FILTER_ENV: &str = "CMDR_LOG";

impl ServerConfig {
    /// Applies supported environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(filter) = std::env::var(LOG_FILTER_ENV)
            && !filter.trim().is_empty()
        {
            self.log_filter = filter;
        }
        self
    }

    /// Checks settings the server cannot run without.
    ///
    /// # Errors
    ///
    /// Returns `CmdrError::InvalidConfig` when the client prefix is empty or contains
    /// whitespace, or when the rest-of-line marker is empty.
    pub fn validate(&self) -> CmdrResult<()> {
        if self.client_command_prefix.is_empty() {
            return Err(CmdrError::InvalidConfig("client command prefix must not be empty"));
        }
        if self.client_command_prefix.chars().any(char::is_whitespace) {
            return Err(CmdrError::InvalidConfig(
                "client command prefix must not contain whitespace",
            ));
        }
        if self.engine.rest_of_line_marker.is_empty() {
            return Err(CmdrError::InvalidConfig("rest-of-line marker must not be empty"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            client_command_prefix: "/".to_owned(),
            seed_players: vec![
                SeedPlayer {
                    name: "[gold]Admiral".to_owned(),
                    rank: Rank::Admin,
                },
                SeedPlayer {
                    name: "Bob".to_owned(),
                    rank: Rank::Player,
                },
            ],
            echo_transcript: true,
            log_filter: "info".to_owned(),
        }
    }
}
