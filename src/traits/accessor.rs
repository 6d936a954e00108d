// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Core;
use crate::properties::{PropertyAction, PropertyDescriptor, PropertyResult};

/// Single entry point of a property: every action goes through `access`.
///
/// Accessors answer `Err(PropertyError::NotImplemented)` for actions they do
/// not handle; the dispatcher derives the missing ones from `Get`,
/// `GetType` and `Set` where it can.
pub trait PropertyAccessor: Send + Sync {
    fn access(&self, prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult;
}

impl<F> PropertyAccessor for F
where
    F: Fn(&PropertyDescriptor, &PropertyAction, &mut Core) -> PropertyResult + Send + Sync,
{
    fn access(&self, prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
        self(prop, action, core)
    }
}
