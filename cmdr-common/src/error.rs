//! Shared error model for cross-crate APIs.

use thiserror::Error;

/// Unified result type used by all public interfaces in `cmdr`.
pub type CmdrResult<T> = Result<T, CmdrError>;

/// Error categories produced by registration, resolution, and the line substrate.
///
/// Handler-raised failures are not part of this enum; they travel as `HandlerError` in
/// `cmdr-core` and are caught by the dispatcher.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CmdrError {
    /// A declared argument spec does not follow the `name:type?` mini-language.
    #[error("bad arg string {spec}: {reason}")]
    MalformedSpec {
        /// The offending spec string.
        spec: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Caller input failed type or lookup rules. The message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    /// Caller lacks the capability required by a command. The message is shown verbatim.
    #[error("{0}")]
    PermissionDenied(String),

    /// An argument kind reached interactive resolution although it cannot be picked from a menu.
    #[error("unable to resolve argument {0} interactively")]
    UnresolvableArgument(String),

    /// The line substrate rejected a registration or an input line.
    #[error("command substrate error: {0}")]
    Substrate(String),

    /// Configuration is invalid for the requested operation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Runtime state does not allow this operation.
    #[error("invalid runtime state: {0}")]
    InvalidState(&'static str),

    /// Terminal or stream I/O failed.
    #[error("io error: {0}")]
    Io(String),
}

impl CmdrError {
    /// Returns the text a caller should see for this error.
    ///
    /// Validation and permission failures already carry user-facing prose; every other
    /// category falls back to its display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::PermissionDenied(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for CmdrError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
