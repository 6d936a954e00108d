// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Failure outcome of a property action.
///
/// `Unknown` and `Unavailable` are deliberately distinct: the former drives
/// user-visible "unknown property" diagnostics, the latter is an expected,
/// transient absence of a value (e.g. no file loaded) and stays silent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// No descriptor matches the requested name.
    #[error("unknown property")]
    Unknown,

    /// The property exists but has no value right now.
    #[error("property unavailable")]
    Unavailable,

    /// The operation was attempted and failed.
    #[error("property operation failed: {0}")]
    Error(String),

    /// The property does not support the requested action.
    #[error("action not implemented by this property")]
    NotImplemented,
}

impl PropertyError {
    /// Shorthand for `PropertyError::Error` with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        PropertyError::Error(message.into())
    }

    /// Projection onto the flat return-code protocol.
    pub fn status(&self) -> PropertyStatus {
        match self {
            PropertyError::Unknown => PropertyStatus::Unknown,
            PropertyError::Unavailable => PropertyStatus::Unavailable,
            PropertyError::Error(_) => PropertyStatus::Error,
            PropertyError::NotImplemented => PropertyStatus::NotImplemented,
        }
    }
}

/// Flat return code of the property protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyStatus {
    Ok,
    Unknown,
    Unavailable,
    Error,
    NotImplemented,
}

impl PropertyStatus {
    pub fn of<T>(result: &Result<T, PropertyError>) -> Self {
        match result {
            Ok(_) => PropertyStatus::Ok,
            Err(e) => e.status(),
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertyStatus::Ok => "ok",
            PropertyStatus::Unknown => "unknown",
            PropertyStatus::Unavailable => "unavailable",
            PropertyStatus::Error => "error",
            PropertyStatus::NotImplemented => "not-implemented",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_projection_table() {
        let cases: Vec<(Result<(), PropertyError>, PropertyStatus)> = vec![
            (Ok(()), PropertyStatus::Ok),
            (Err(PropertyError::Unknown), PropertyStatus::Unknown),
            (Err(PropertyError::Unavailable), PropertyStatus::Unavailable),
            (Err(PropertyError::failed("x")), PropertyStatus::Error),
            (Err(PropertyError::NotImplemented), PropertyStatus::NotImplemented),
        ];
        for (result, expected) in cases {
            assert_eq!(PropertyStatus::of(&result), expected);
        }
    }
}
