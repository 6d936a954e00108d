// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hook registry: handlers run one at a time per hook type, ordered by
//! `(priority, seq)`, each waiting for its client's acknowledgment.

use crate::errors::{ClientError, HookError};
use crate::events::ClientEvent;
use crate::observability::messages::{hook::*, StructuredLog};
use crate::traits::ClientBus;

#[derive(Debug, Clone, PartialEq)]
pub struct HookHandler {
    pub client: String,
    pub hook: String,
    /// Chosen by the client, echoed back in the notification.
    pub user_id: u64,
    /// Lower runs first.
    pub priority: i32,
    /// Registration order; tie-break and acknowledgment key.
    pub seq: i64,
    pub active: bool,
    pub legacy: bool,
}

/// Result of advancing a hook type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookProgress {
    /// A handler was notified and now holds the hook.
    Dispatched { client: String, seq: i64 },
    /// No handler of this type is left to run.
    Finished,
}

#[derive(Debug, Default)]
pub struct HookRegistry {
    handlers: Vec<HookHandler>,
    next_seq: i64,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns its sequence number.
    pub fn add(&mut self, client: &str, hook: &str, user_id: u64, priority: i32, legacy: bool) -> i64 {
        if legacy {
            LegacyHookApi { client }.log();
        }
        self.next_seq += 1;
        let seq = self.next_seq;
        let pos = self
            .handlers
            .partition_point(|h| (h.priority, h.seq) < (priority, seq));
        self.handlers.insert(
            pos,
            HookHandler {
                client: client.to_string(),
                hook: hook.to_string(),
                user_id,
                priority,
                seq,
                active: false,
                legacy,
            },
        );
        HookRegistered {
            client,
            hook,
            priority,
            seq,
        }
        .log();
        seq
    }

    pub fn handlers(&self) -> &[HookHandler] {
        &self.handlers
    }

    pub fn active(&self, hook: &str) -> Option<&HookHandler> {
        self.handlers.iter().find(|h| h.hook == hook && h.active)
    }

    /// Begins processing `hook` from its first handler.
    /// A hook that is already running is left alone.
    pub fn start(&mut self, hook: &str, bus: &dyn ClientBus) -> HookProgress {
        if let Some(h) = self.active(hook) {
            return HookProgress::Dispatched {
                client: h.client.clone(),
                seq: h.seq,
            };
        }
        self.run_next(hook, 0, bus)
    }

    /// Acknowledges the active handler `(client, seq)` and moves on.
    pub fn ack(&mut self, client: &str, seq: i64, bus: &dyn ClientBus) -> Result<HookProgress, HookError> {
        let pos = self
            .handlers
            .iter()
            .position(|h| h.client == client && h.seq == seq && h.active)
            .ok_or_else(|| {
                HookMisuse { client, seq }.log();
                HookError::InvalidAck {
                    client: client.to_string(),
                    seq,
                }
            })?;
        self.handlers[pos].active = false;
        let hook = self.handlers[pos].hook.clone();
        Ok(self.run_next(&hook, pos + 1, bus))
    }

    /// True when no handler of `hook` is active. Handlers whose client has
    /// vanished are dropped on the way.
    pub fn is_drained(&mut self, hook: &str, bus: &dyn ClientBus) -> bool {
        let Some(pos) = self.handlers.iter().position(|h| h.hook == hook && h.active) else {
            return true;
        };
        if bus.exists(&self.handlers[pos].client) {
            return false;
        }
        let gone = self.handlers.remove(pos);
        HookHandlerDropped {
            client: &gone.client,
            hook: &gone.hook,
            reason: "client disappeared while running the hook",
        }
        .log();
        true
    }

    /// Forgets all handlers of a disconnected client.
    pub fn remove_client(&mut self, client: &str) -> usize {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.client != client);
        before - self.handlers.len()
    }

    fn run_next(&mut self, hook: &str, mut index: usize, bus: &dyn ClientBus) -> HookProgress {
        loop {
            let Some(pos) = self.handlers[index.min(self.handlers.len())..]
                .iter()
                .position(|h| h.hook == hook)
                .map(|p| p + index)
            else {
                HookRunFinished { hook }.log();
                return HookProgress::Finished;
            };
            match self.invoke(pos, bus) {
                Ok(()) => {
                    let h = &self.handlers[pos];
                    return HookProgress::Dispatched {
                        client: h.client.clone(),
                        seq: h.seq,
                    };
                }
                Err(e) => {
                    let dropped = self.handlers.remove(pos);
                    HookHandlerDropped {
                        client: &dropped.client,
                        hook: &dropped.hook,
                        reason: &e.to_string(),
                    }
                    .log();
                    index = pos;
                }
            }
        }
    }

    fn invoke(&mut self, pos: usize, bus: &dyn ClientBus) -> Result<(), ClientError> {
        debug_assert!(
            !self
                .handlers
                .iter()
                .any(|h| h.active && h.hook == self.handlers[pos].hook),
            "more than one active handler for a hook type"
        );
        let handler = &mut self.handlers[pos];
        handler.active = true;
        HookDispatched {
            client: &handler.client,
            hook: &handler.hook,
            seq: handler.seq,
        }
        .log();
        if handler.legacy {
            let args = vec![
                "hook_run".to_string(),
                handler.user_id.to_string(),
                handler.seq.to_string(),
            ];
            bus.send(&handler.client, 0, ClientEvent::ClientMessage { args })
        } else {
            let event = ClientEvent::Hook {
                name: handler.hook.clone(),
                id: handler.seq,
            };
            bus.send(&handler.client, handler.user_id, event)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ClientHandle, ClientHub};

    fn hook_id(client: &mut ClientHandle) -> Option<(u64, i64)> {
        client.try_next().and_then(|env| match env.event {
            ClientEvent::Hook { id, .. } => Some((env.reply_id, id)),
            _ => None,
        })
    }

    #[test]
    fn test_delivery_order_by_priority_then_sequence() {
        let hub = ClientHub::new();
        let _c = hub.connect("c");
        let mut reg = HookRegistry::new();
        reg.add("c", "on_load", 0, 5, false);
        reg.add("c", "on_load", 0, 1, false);
        reg.add("c", "on_load", 0, 5, false);

        let order: Vec<(i32, i64)> = reg.handlers().iter().map(|h| (h.priority, h.seq)).collect();
        assert_eq!(order, vec![(1, 2), (5, 1), (5, 3)]);

        let mut seen = Vec::new();
        let mut progress = reg.start("on_load", &hub);
        while let HookProgress::Dispatched { client, seq } = progress {
            seen.push(seq);
            progress = reg.ack(&client, seq, &hub).unwrap();
        }
        assert_eq!(seen, vec![2, 1, 3]);
    }

    #[test]
    fn test_second_handler_waits_for_first_ack() {
        let hub = ClientHub::new();
        let mut a = hub.connect("scriptA");
        let mut b = hub.connect("scriptB");
        let mut reg = HookRegistry::new();
        let seq_a = reg.add("scriptA", "on_load", 7, 0, false);
        let seq_b = reg.add("scriptB", "on_load", 7, 1, false);

        reg.start("on_load", &hub);
        assert_eq!(hook_id(&mut a), Some((7, seq_a)));
        assert_eq!(hook_id(&mut b), None);
        assert!(!reg.is_drained("on_load", &hub));
        assert_eq!(reg.active("on_load").map(|h| h.client.as_str()), Some("scriptA"));

        reg.ack("scriptA", seq_a, &hub).unwrap();
        assert_eq!(hook_id(&mut b), Some((7, seq_b)));

        assert_eq!(reg.ack("scriptB", seq_b, &hub), Ok(HookProgress::Finished));
        assert!(reg.is_drained("on_load", &hub));
    }

    #[test]
    fn test_invalid_and_double_ack_are_errors() {
        let hub = ClientHub::new();
        let _c = hub.connect("c");
        let mut reg = HookRegistry::new();
        let seq = reg.add("c", "on_unload", 0, 0, false);

        assert!(matches!(reg.ack("c", seq, &hub), Err(HookError::InvalidAck { .. })));
        reg.start("on_unload", &hub);
        assert!(reg.ack("c", seq, &hub).is_ok());
        assert!(matches!(reg.ack("c", seq, &hub), Err(HookError::InvalidAck { .. })));
        assert!(matches!(reg.ack("other", 99, &hub), Err(HookError::InvalidAck { .. })));
    }

    #[test]
    fn test_gone_client_is_skipped_on_delivery() {
        let hub = ClientHub::new();
        drop(hub.connect("gone"));
        let mut live = hub.connect("live");
        let mut reg = HookRegistry::new();
        reg.add("gone", "on_load", 0, 0, false);
        let seq = reg.add("live", "on_load", 0, 0, false);

        let progress = reg.start("on_load", &hub);
        assert_eq!(progress, HookProgress::Dispatched { client: "live".into(), seq });
        assert_eq!(reg.handlers().len(), 1);
        assert!(hook_id(&mut live).is_some());
    }

    #[test]
    fn test_no_handlers_finishes_immediately() {
        let hub = ClientHub::new();
        let mut reg = HookRegistry::new();
        assert_eq!(reg.start("on_load", &hub), HookProgress::Finished);
        assert!(reg.is_drained("on_load", &hub));
    }

    #[test]
    fn test_vanished_active_client_counts_as_drained() {
        let hub = ClientHub::new();
        let client = hub.connect("c");
        let mut reg = HookRegistry::new();
        reg.add("c", "on_load", 0, 0, false);
        reg.start("on_load", &hub);
        assert!(!reg.is_drained("on_load", &hub));
        drop(client);
        assert!(reg.is_drained("on_load", &hub));
        assert!(reg.handlers().is_empty());
    }

    #[test]
    fn test_legacy_shape() {
        let hub = ClientHub::new();
        let mut c = hub.connect("c");
        let mut reg = HookRegistry::new();
        let seq = reg.add("c", "on_load", 42, 0, true);
        reg.start("on_load", &hub);
        let env = c.try_next().unwrap();
        assert_eq!(
            env.event,
            ClientEvent::ClientMessage {
                args: vec!["hook_run".into(), "42".into(), seq.to_string()]
            }
        );
    }
}
