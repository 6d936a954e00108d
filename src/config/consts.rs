// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default number of worker threads for commands that run off the core thread.
pub const DEFAULT_WORKER_THREADS: usize = 4;
/// Upper bound on worker threads accepted from configuration.
pub const MAX_WORKER_THREADS: usize = 64;
/// Default number of jobs that may wait for a free worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
/// Default on-screen message duration in milliseconds.
pub const DEFAULT_OSD_DURATION_MS: u64 = 1000;
/// Default capture limit for subprocess stdout/stderr (64 MiB).
pub const DEFAULT_CAPTURE_SIZE: i64 = 64 * 1024 * 1024;
/// Minimum interval between two accepted auto-repeated seek invocations.
pub const SEEK_REPEAT_INTERVAL_MS: u64 = 100;
/// Nesting limit when expanding `${...}` property references.
pub const MAX_EXPANSION_DEPTH: usize = 8;
/// How long `shutdown` waits for outstanding worker jobs by default.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;
