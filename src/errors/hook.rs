// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Hook protocol misuse. Reported to the caller and logged, never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HookError {
    #[error("invalid hook API usage: client '{client}' has no active hook with id {seq}")]
    InvalidAck { client: String, seq: i64 },

    #[error("hook commands can be used from the client API only")]
    NoSender,
}

/// Delivery failure towards an external client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("client '{0}' does not exist")]
    NotFound(String),

    #[error("client '{0}' disconnected")]
    Gone(String),
}

/// Worker pool admission failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("worker pool is shut down")]
    Closed,

    #[error("worker pool queue is full ({0} jobs pending)")]
    Full(usize),
}
