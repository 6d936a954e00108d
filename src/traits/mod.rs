// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Seams of the dispatch core.
//!
//! Properties and commands are capability objects looked up by name; external
//! collaborators (clients, the scheduler, subprocess execution, media access)
//! are reached only through the narrow traits in [`services`].

mod accessor;
mod handler;
pub mod services;

pub use accessor::PropertyAccessor;
pub use handler::CommandHandler;
pub use services::{
    ClientBus, MediaBackend, Scheduler, SubprocessOutcome, SubprocessRequest, SubprocessRunner,
};
