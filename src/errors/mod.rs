// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the dispatch core.
//!
//! Accessor and handler failures never unwind across the dispatch boundary.
//! They travel as values: property accessors return [`PropertyError`], command
//! handlers record a [`CommandError`] on their execution context, and hook
//! misuse is reported through [`HookError`].

mod command;
mod config;
mod hook;
mod property;

pub use command::{CommandError, ExpandError};
pub use config::{ConfigError, OptionError};
pub use hook::{ClientError, HookError, PoolError};
pub use property::{PropertyError, PropertyStatus};
