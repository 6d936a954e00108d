// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod abort;
pub mod builder;
pub mod core;
pub mod facade;
pub mod pending;
pub mod wake;
pub mod worker_pool;
#[cfg(test)]
pub(crate) mod testing;

pub use abort::{AbortHandle, AbortRegistry};
pub use builder::EngineBuilder;
pub use self::core::{Core, CoreGuard, CoreLock, Services};
pub use facade::Engine;
pub use pending::PendingOps;
pub use wake::WakeSignal;
pub use worker_pool::{Job, Ticket, WorkerPool};
