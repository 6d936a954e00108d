// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::events::{property_event_mask, ClientEvent, EventKind, EventMask};
use crate::observability::messages::{engine::EventDispatched, StructuredLog};
use crate::traits::ClientBus;

/// One client's subscription to a property.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub client: String,
    pub reply_id: u64,
    pub name: String,
    /// Registry id of the property, `None` if the name is unknown.
    pub id: Option<usize>,
    pub mask: EventMask,
}

/// Fans lifecycle events and property writes out to observing clients.
#[derive(Debug, Default)]
pub struct NotificationRouter {
    observations: Vec<Observation>,
}

impl NotificationRouter {
    pub fn observe(&mut self, client: &str, reply_id: u64, name: &str, id: Option<usize>) {
        self.observations.push(Observation {
            client: client.to_string(),
            reply_id,
            name: name.to_string(),
            id,
            mask: property_event_mask(name),
        });
    }

    /// Removes the subscriptions of `client` with `reply_id`.
    pub fn unobserve(&mut self, client: &str, reply_id: u64) -> usize {
        let before = self.observations.len();
        self.observations
            .retain(|o| !(o.client == client && o.reply_id == reply_id));
        before - self.observations.len()
    }

    pub fn drop_client(&mut self, client: &str) {
        self.observations.retain(|o| o.client != client);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Notifies observers whose mask contains `kind`.
    pub fn on_event(&mut self, kind: EventKind, bus: &dyn ClientBus) -> usize {
        let delivered = self.deliver(bus, |o| o.mask.contains(kind));
        EventDispatched {
            event: kind.name(),
            observers: delivered,
        }
        .log();
        delivered
    }

    /// Notifies observers of a property that was just written.
    pub fn on_property(&mut self, name: &str, id: Option<usize>, bus: &dyn ClientBus) -> usize {
        self.deliver(bus, |o| match (id, o.id) {
            (Some(a), Some(b)) => a == b,
            _ => o.name == name,
        })
    }

    fn deliver<F>(&mut self, bus: &dyn ClientBus, matches: F) -> usize
    where
        F: Fn(&Observation) -> bool,
    {
        let mut delivered = 0;
        self.observations.retain(|o| {
            if !matches(o) {
                return true;
            }
            let event = ClientEvent::PropertyChange { name: o.name.clone() };
            match bus.send(&o.client, o.reply_id, event) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ClientHub;

    #[test]
    fn test_event_reaches_observers_by_mask() {
        let hub = ClientHub::new();
        let mut client = hub.connect("ui");
        let mut router = NotificationRouter::default();
        router.observe("ui", 1, "time-pos", Some(3));
        router.observe("ui", 2, "pause", Some(4));

        assert_eq!(router.on_event(EventKind::Tick, &hub), 1);
        let got = client.drain();
        assert_eq!(got[0].reply_id, 1);
        assert_eq!(got[0].event, ClientEvent::PropertyChange { name: "time-pos".into() });

        // "*" events hit everyone.
        assert_eq!(router.on_event(EventKind::FileLoaded, &hub), 2);
    }

    #[test]
    fn test_property_change_matches_by_id() {
        let hub = ClientHub::new();
        let mut client = hub.connect("ui");
        let mut router = NotificationRouter::default();
        router.observe("ui", 1, "options/volume", Some(7));

        assert_eq!(router.on_property("volume", Some(7), &hub), 1);
        assert_eq!(router.on_property("mute", Some(8), &hub), 0);
        assert_eq!(client.drain().len(), 1);
    }

    #[test]
    fn test_disconnected_observers_are_pruned() {
        let hub = ClientHub::new();
        let mut router = NotificationRouter::default();
        drop(hub.connect("gone"));
        router.observe("gone", 1, "pause", Some(0));
        assert_eq!(router.on_property("pause", Some(0), &hub), 0);
        assert!(router.is_empty());
    }

    #[test]
    fn test_unobserve() {
        let mut router = NotificationRouter::default();
        router.observe("ui", 1, "pause", None);
        router.observe("ui", 2, "pause", None);
        assert_eq!(router.unobserve("ui", 1), 1);
        assert_eq!(router.len(), 1);
    }
}
