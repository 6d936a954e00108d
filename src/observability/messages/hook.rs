// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the hook handshake.

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

/// Handler registered for a hook type.
///
/// # Log Level
/// `info!` - Rare, operationally relevant
pub struct HookRegistered<'a> {
    pub client: &'a str,
    pub hook: &'a str,
    pub priority: i32,
    pub seq: i64,
}

impl Display for HookRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Hook '{}' registered by '{}' (priority={}, id={})",
            self.hook, self.client, self.priority, self.seq
        )
    }
}

impl StructuredLog for HookRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            hook = self.hook,
            client = self.client,
            priority = self.priority,
            seq = self.seq,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "hook_registered",
            span_name = name,
            hook = self.hook,
            client = self.client,
        )
    }
}

/// Legacy registration path was used.
pub struct LegacyHookApi<'a> {
    pub client: &'a str,
}

impl Display for LegacyHookApi<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Client '{}' uses the deprecated hook-add/hook-ack commands",
            self.client
        )
    }
}

impl StructuredLog for LegacyHookApi<'_> {
    fn log(&self) {
        tracing::warn!(client = self.client, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("legacy_hook_api", span_name = name, client = self.client)
    }
}

/// A handler was notified and is now active.
///
/// # Log Level
/// `debug!`
pub struct HookDispatched<'a> {
    pub client: &'a str,
    pub hook: &'a str,
    pub seq: i64,
}

impl Display for HookDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Running hook: {}/{} (id={})", self.client, self.hook, self.seq)
    }
}

impl StructuredLog for HookDispatched<'_> {
    fn log(&self) {
        tracing::debug!(hook = self.hook, client = self.client, seq = self.seq, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("hook_dispatched", span_name = name, hook = self.hook, seq = self.seq)
    }
}

/// Notification could not be delivered; the handler was dropped.
///
/// # Log Level
/// `warn!`
pub struct HookHandlerDropped<'a> {
    pub client: &'a str,
    pub hook: &'a str,
    pub reason: &'a str,
}

impl Display for HookHandlerDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropping hook '{}' of client '{}': {}",
            self.hook, self.client, self.reason
        )
    }
}

impl StructuredLog for HookHandlerDropped<'_> {
    fn log(&self) {
        tracing::warn!(hook = self.hook, client = self.client, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("hook_dropped", span_name = name, hook = self.hook, client = self.client)
    }
}

/// Every handler of a hook type has run.
pub struct HookRunFinished<'a> {
    pub hook: &'a str,
}

impl Display for HookRunFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Hook '{}' finished", self.hook)
    }
}

impl StructuredLog for HookRunFinished<'_> {
    fn log(&self) {
        tracing::debug!(hook = self.hook, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("hook_finished", span_name = name, hook = self.hook)
    }
}

/// Acknowledgment for a pair that is not active.
///
/// # Log Level
/// `error!` - Client bug, not fatal
pub struct HookMisuse<'a> {
    pub client: &'a str,
    pub seq: i64,
}

impl Display for HookMisuse<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invalid hook API usage: '{}' acknowledged inactive hook id {}",
            self.client, self.seq
        )
    }
}

impl StructuredLog for HookMisuse<'_> {
    fn log(&self) {
        tracing::error!(client = self.client, seq = self.seq, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("hook_misuse", span_name = name, client = self.client, seq = self.seq)
    }
}
