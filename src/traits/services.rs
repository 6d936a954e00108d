// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::errors::ClientError;
use crate::events::ClientEvent;
use crate::player::{Track, TrackKind};

/// Wakes whatever loop drives the core so it re-checks state.
pub trait Scheduler: Send + Sync {
    fn wake(&self);
}

/// Message delivery towards external clients (scripts, remote control).
pub trait ClientBus: Send + Sync {
    /// Deliver to one client. Fails if it is unknown or disconnected.
    fn send(&self, client: &str, reply_id: u64, event: ClientEvent) -> Result<(), ClientError>;

    /// Deliver to every connected client.
    fn broadcast(&self, event: &ClientEvent);

    fn exists(&self, client: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubprocessRequest {
    pub args: Vec<String>,
    pub capture_stdout: bool,
    pub capture_stderr: bool,
    /// Per-stream capture limit in bytes; output beyond it is discarded.
    pub capture_size: i64,
    pub env: Vec<(String, String)>,
    pub stdin_data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubprocessOutcome {
    pub status: i64,
    pub killed_by_us: bool,
    /// `None` on success, otherwise `"init"`, `"killed"` or a description.
    pub error: Option<String>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl SubprocessOutcome {
    pub fn to_node(&self, request: &SubprocessRequest) -> Value {
        let mut node = json!({
            "status": self.status,
            "killed_by_us": self.killed_by_us,
            "error_string": self.error.clone().unwrap_or_default(),
        });
        if request.capture_stdout {
            node["stdout"] = Value::String(String::from_utf8_lossy(&self.stdout).into_owned());
        }
        if request.capture_stderr {
            node["stderr"] = Value::String(String::from_utf8_lossy(&self.stderr).into_owned());
        }
        node
    }
}

/// Blocking process execution, used only by subprocess-style commands.
pub trait SubprocessRunner: Send + Sync {
    /// Runs to completion or until `cancel` fires, then kills the process.
    fn run(&self, request: &SubprocessRequest, cancel: &CancellationToken) -> SubprocessOutcome;

    /// Starts a process and forgets about it.
    fn spawn_detached(&self, args: &[String]) -> Result<(), String>;
}

/// Access to media the core cannot open itself.
pub trait MediaBackend: Send + Sync {
    /// Opens an external track. May block; callers release the core lock.
    fn open_track(&self, url: &str, kind: TrackKind, cancel: &CancellationToken) -> Result<Track, String>;

    /// Forwards a runtime command to a filter in the audio chain.
    fn filter_command(&self, label: &str, command: &str, argument: &str) -> Result<(), String>;
}
