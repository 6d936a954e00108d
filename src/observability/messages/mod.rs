// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are grouped by subsystem:
//!
//! * `command` - command lifecycle events
//! * `property` - property and option events
//! * `hook` - hook protocol events
//! * `engine` - engine lifecycle and notifications

use tracing::Span;

pub mod command;
pub mod engine;
pub mod hook;
pub mod property;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Build a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
