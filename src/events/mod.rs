// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lifecycle events, external clients and property-change fan-out.

mod clients;
mod kinds;
mod router;

pub use clients::{ClientEvent, ClientHandle, ClientHub, Envelope};
pub use kinds::{match_property, property_event_mask, EventKind, EventMask};
pub use router::{NotificationRouter, Observation};
