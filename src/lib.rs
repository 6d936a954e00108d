// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // default collaborators
pub mod commands;   // command table + dispatch
pub mod config;     // option store, loader
pub mod engine;     // core lock, worker pool, public facade
pub mod errors;     // error handling
pub mod events;     // client hub + change routing
pub mod hooks;      // hook handshake
pub mod observability;
pub mod player;     // playback state the core reads
pub mod properties; // property registry + builtin accessors
pub mod traits;     // collaborator seams
pub mod utils;
