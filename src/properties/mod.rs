// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Property Registry and the action protocol.
//!
//! Every piece of reflectable engine state is a named property answering the
//! same [`PropertyAction`] requests. Explicit descriptors come from
//! [`builtin_properties`]; every remaining option gets a generated descriptor
//! backed by [`generic_option`].
//!
//! # Lookup
//!
//! A request for `a/b/c` resolves to the longest registered prefix (`a` or
//! `a/b`) and is re-issued as a `KeyAction` carrying the remainder, so list
//! and map properties can address their members.

mod action;
mod bridge;
mod builtin;
mod dispatch;
mod expand;
pub mod helpers;
mod registry;

pub use action::{PropertyAction, PropertyReply, PropertyResult};
pub use bridge::generic_option;
pub use builtin::builtin_properties;
pub use dispatch::{alias, deprecated_alias, dispatch, property_do};
pub use expand::{expand_escaped_string, expand_string, property_string, unescape};
pub use registry::{PropertyDescriptor, PropertyRegistry};
