// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process client hub backed by unbounded tokio channels.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::errors::ClientError;
use crate::events::EventKind;
use crate::traits::ClientBus;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Lifecycle { kind: EventKind, payload: Option<Value> },
    /// Legacy message shape; hook notifications use `["hook_run", user_id, seq]`.
    ClientMessage { args: Vec<String> },
    Hook { name: String, id: i64 },
    PropertyChange { name: String },
}

/// One delivered event plus the correlation id chosen by the receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub reply_id: u64,
    pub event: ClientEvent,
}

/// Registry of connected clients.
#[derive(Debug, Default)]
pub struct ClientHub {
    clients: Mutex<HashMap<String, mpsc::UnboundedSender<Envelope>>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, replacing an older connection with the same name.
    pub fn connect(&self, name: &str) -> ClientHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.lock().insert(name.to_string(), tx);
        ClientHandle {
            name: name.to_string(),
            rx,
        }
    }

    pub fn disconnect(&self, name: &str) -> bool {
        self.clients.lock().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.clients.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl ClientBus for ClientHub {
    fn send(&self, client: &str, reply_id: u64, event: ClientEvent) -> Result<(), ClientError> {
        let mut clients = self.clients.lock();
        let tx = clients
            .get(client)
            .ok_or_else(|| ClientError::NotFound(client.to_string()))?;
        if tx.send(Envelope { reply_id, event }).is_err() {
            clients.remove(client);
            return Err(ClientError::Gone(client.to_string()));
        }
        Ok(())
    }

    fn broadcast(&self, event: &ClientEvent) {
        self.clients.lock().retain(|_, tx| {
            tx.send(Envelope {
                reply_id: 0,
                event: event.clone(),
            })
            .is_ok()
        });
    }

    fn exists(&self, client: &str) -> bool {
        self.clients
            .lock()
            .get(client)
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }
}

/// Receiving end held by a client. Dropping it disconnects the client.
#[derive(Debug)]
pub struct ClientHandle {
    name: String,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl ClientHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    pub fn try_next(&mut self) -> Option<Envelope> {
        match self.rx.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Everything currently queued.
    pub fn drain(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
