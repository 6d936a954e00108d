// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::PropertyError;

/// Terminal failure of a command invocation.
///
/// Handlers record one of these on their execution context; the dispatcher
/// turns it into `success = false` plus a diagnostic for the invoking client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Name (command or property) not registered.
    #[error("unknown {what}: '{name}'")]
    Unknown { what: &'static str, name: String },

    /// Transient absence of a value; callers degrade gracefully.
    #[error("'{0}' is unavailable")]
    Unavailable(String),

    /// Malformed command arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Handler-specific failure with a descriptive message.
    #[error("{0}")]
    OperationFailed(String),

    /// API used in an order the protocol does not allow.
    #[error("protocol misuse: {0}")]
    ProtocolMisuse(String),

    /// Cooperative cancellation was observed by the handler.
    #[error("command was aborted")]
    Aborted,
}

impl CommandError {
    pub fn unknown_command(name: impl Into<String>) -> Self {
        CommandError::Unknown {
            what: "command",
            name: name.into(),
        }
    }

    pub fn unknown_property(name: impl Into<String>) -> Self {
        CommandError::Unknown {
            what: "property",
            name: name.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        CommandError::OperationFailed(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CommandError::InvalidArgument(message.into())
    }

    /// Maps a property failure on `name` to the command taxonomy.
    pub fn from_property(name: &str, err: &PropertyError) -> Self {
        match err {
            PropertyError::Unknown => CommandError::unknown_property(name),
            PropertyError::Unavailable => CommandError::Unavailable(name.to_string()),
            PropertyError::Error(msg) => {
                CommandError::failed(format!("failed to set property '{}': {}", name, msg))
            }
            PropertyError::NotImplemented => {
                CommandError::failed(format!("property '{}' does not support this action", name))
            }
        }
    }
}

/// Failure while substituting `${...}` references in a string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpandError {
    #[error("unbalanced '${{' in '{0}'")]
    Unbalanced(String),

    #[error("unknown property '{0}' in expansion")]
    UnknownProperty(String),

    #[error("broken escape sequence in '{0}'")]
    BrokenEscape(String),

    #[error("property references nested too deeply in '{0}'")]
    TooDeep(String),
}

impl From<ExpandError> for CommandError {
    fn from(e: ExpandError) -> Self {
        CommandError::InvalidArgument(e.to_string())
    }
}
