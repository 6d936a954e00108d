// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ordered, acknowledgment-driven interception points for external clients.

mod registry;

pub use registry::{HookHandler, HookProgress, HookRegistry};
