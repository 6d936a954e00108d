// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the dispatch core.
//!
//! Log lines are built from message structs rather than ad-hoc strings. Each
//! message implements `Display` for the human-readable text and
//! [`messages::StructuredLog`] to emit itself with typed `tracing` fields at
//! the level appropriate for the event.
//!
//! # Architecture
//!
//! * `messages::command` - command dispatch, worker queueing, completion
//! * `messages::property` - property writes and option bridge
//! * `messages::hook` - hook registration and the hook handshake
//! * `messages::engine` - engine lifecycle and event fan-out
//!
//! # Usage
//!
//! ```rust
//! use playcore::observability::messages::{command::CommandQueued, StructuredLog};
//!
//! CommandQueued { command: "subprocess", outstanding: 1 }.log();
//! ```

pub mod messages;

/// Install a `tracing` subscriber honouring `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
