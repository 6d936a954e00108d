// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for command dispatch.

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

/// Command about to run.
///
/// # Log Level
/// `debug!` - High-frequency dispatch event
pub struct CommandStarted<'a> {
    pub command: &'a str,
    pub sender: Option<&'a str>,
    pub args: usize,
}

impl Display for CommandStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Run command: {} (sender={}, {} args)",
            self.command,
            self.sender.unwrap_or("-"),
            self.args
        )
    }
}

impl StructuredLog for CommandStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            command = self.command,
            sender = self.sender,
            args = self.args,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "command",
            span_name = name,
            command = self.command,
            sender = self.sender,
        )
    }
}

/// Command reached its terminal state.
///
/// # Log Level
/// `debug!` on success, `warn!` on failure
pub struct CommandCompleted<'a> {
    pub command: &'a str,
    pub success: bool,
    pub error: Option<&'a dyn std::error::Error>,
}

impl Display for CommandCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match (self.success, self.error) {
            (true, _) => write!(f, "Command '{}' completed", self.command),
            (false, Some(e)) => write!(f, "Command '{}' failed: {}", self.command, e),
            (false, None) => write!(f, "Command '{}' failed", self.command),
        }
    }
}

impl StructuredLog for CommandCompleted<'_> {
    fn log(&self) {
        if self.success {
            tracing::debug!(command = self.command, success = true, "{}", self);
        } else {
            tracing::warn!(
                command = self.command,
                success = false,
                error = %self.error.map(|e| e.to_string()).unwrap_or_default(),
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "command_completed",
            span_name = name,
            command = self.command,
            success = self.success,
        )
    }
}

/// Command handed to the worker pool.
pub struct CommandQueued<'a> {
    pub command: &'a str,
    pub outstanding: usize,
}

impl Display for CommandQueued<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Command '{}' queued on worker pool ({} outstanding)",
            self.command, self.outstanding
        )
    }
}

impl StructuredLog for CommandQueued<'_> {
    fn log(&self) {
        tracing::debug!(
            command = self.command,
            outstanding = self.outstanding,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "command_queued",
            span_name = name,
            command = self.command,
            outstanding = self.outstanding,
        )
    }
}

/// Worker pool refused a job.
///
/// # Log Level
/// `error!` - The command fails immediately
pub struct CommandQueueFailed<'a> {
    pub command: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CommandQueueFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not queue command '{}': {}", self.command, self.error)
    }
}

impl StructuredLog for CommandQueueFailed<'_> {
    fn log(&self) {
        tracing::error!(command = self.command, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "command_queue_failed",
            span_name = name,
            command = self.command,
            error = %self.error,
        )
    }
}

/// A child process could not be started.
///
/// # Log Level
/// `warn!`
pub struct SubprocessSpawnFailed<'a> {
    pub program: &'a str,
    pub error: &'a std::io::Error,
}

impl Display for SubprocessSpawnFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not start '{}': {}", self.program, self.error)
    }
}

impl StructuredLog for SubprocessSpawnFailed<'_> {
    fn log(&self) {
        tracing::warn!(program = self.program, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("subprocess_spawn_failed", span_name = name, program = self.program)
    }
}
