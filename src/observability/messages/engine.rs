// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

/// Engine constructed and ready to dispatch.
///
/// # Log Level
/// `info!`
pub struct EngineStarted {
    pub properties: usize,
    pub commands: usize,
    pub worker_threads: usize,
}

impl Display for EngineStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Engine started: {} properties, {} commands, {} worker threads",
            self.properties, self.commands, self.worker_threads
        )
    }
}

impl StructuredLog for EngineStarted {
    fn log(&self) {
        tracing::info!(
            properties = self.properties,
            commands = self.commands,
            worker_threads = self.worker_threads,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("engine", span_name = name, worker_threads = self.worker_threads)
    }
}

pub struct ShutdownStarted {
    pub outstanding: usize,
    pub pending: usize,
}

impl Display for ShutdownStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Shutting down: waiting for {} worker jobs, cancelling {} pending commands",
            self.outstanding, self.pending
        )
    }
}

impl StructuredLog for ShutdownStarted {
    fn log(&self) {
        tracing::info!(outstanding = self.outstanding, pending = self.pending, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("shutdown", span_name = name, outstanding = self.outstanding)
    }
}

/// Shutdown gave up before workers drained.
///
/// # Log Level
/// `warn!`
pub struct ShutdownTimedOut {
    pub outstanding: usize,
}

impl Display for ShutdownTimedOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Shutdown timed out with {} worker jobs still running", self.outstanding)
    }
}

impl StructuredLog for ShutdownTimedOut {
    fn log(&self) {
        tracing::warn!(outstanding = self.outstanding, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("shutdown_timeout", span_name = name, outstanding = self.outstanding)
    }
}

/// Lifecycle event fanned out to observers.
///
/// # Log Level
/// `trace!` - Very high frequency (ticks)
pub struct EventDispatched<'a> {
    pub event: &'a str,
    pub observers: usize,
}

impl Display for EventDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Event '{}' notified {} observers", self.event, self.observers)
    }
}

impl StructuredLog for EventDispatched<'_> {
    fn log(&self) {
        tracing::trace!(event = self.event, observers = self.observers, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("event", span_name = name, event = self.event)
    }
}
