// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tracing::warn;

use crate::config::OptionType;
use crate::engine::Core;
use crate::errors::{PropertyError, PropertyStatus};
use crate::observability::messages::{property::PropertySet, StructuredLog};
use crate::properties::{PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult};
use crate::traits::PropertyAccessor;

/// Runs `action` on the property at `path` without change notification.
///
/// Actions the accessor does not implement are derived from `Get`,
/// `GetType` and `Set` where possible.
pub fn dispatch(core: &mut Core, path: &str, action: &PropertyAction) -> PropertyResult {
    let registry = Arc::clone(&core.properties);
    let (desc, key) = registry.resolve(path).ok_or(PropertyError::Unknown)?;
    match call(desc, key, action.clone(), core) {
        Err(PropertyError::NotImplemented) => fallback(desc, key, action, core),
        other => other,
    }
}

/// [`dispatch`] plus change notification after a successful write.
pub fn property_do(core: &mut Core, path: &str, action: &PropertyAction) -> PropertyResult {
    let result = dispatch(core, path, action);
    if action.is_set() {
        PropertySet {
            property: path,
            action: action.name(),
            status: PropertyStatus::of(&result),
        }
        .log();
        if result.is_ok() {
            core.notify_property(path);
        }
    }
    result
}

fn call(desc: &PropertyDescriptor, key: Option<&str>, action: PropertyAction, core: &mut Core) -> PropertyResult {
    match key {
        Some(key) => desc.call(&PropertyAction::key(key, action), core),
        None => desc.call(&action, core),
    }
}

fn type_of(desc: &PropertyDescriptor, key: Option<&str>, core: &mut Core) -> Result<OptionType, PropertyError> {
    call(desc, key, PropertyAction::GetType, core)?.into_type()
}

fn constricted_type_of(desc: &PropertyDescriptor, key: Option<&str>, core: &mut Core) -> Result<OptionType, PropertyError> {
    match call(desc, key, PropertyAction::GetConstrictedType, core) {
        Err(PropertyError::NotImplemented) => type_of(desc, key, core),
        other => other?.into_type(),
    }
}

fn option_failure(e: crate::errors::OptionError) -> PropertyError {
    PropertyError::failed(e.to_string())
}

fn fallback(desc: &PropertyDescriptor, key: Option<&str>, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match action {
        PropertyAction::GetConstrictedType => Ok(PropertyReply::Type(type_of(desc, key, core)?)),
        PropertyAction::GetNode => {
            let value = call(desc, key, PropertyAction::Get, core)?;
            Ok(PropertyReply::Node(value.into_node()?))
        }
        PropertyAction::Print => {
            let ty = type_of(desc, key, core)?;
            let value = call(desc, key, PropertyAction::Get, core)?.into_value()?;
            Ok(PropertyReply::Text(ty.print(&value)))
        }
        PropertyAction::SetString(text) => {
            let ty = type_of(desc, key, core)?;
            let value = ty.parse(text).map_err(option_failure)?;
            call(desc, key, PropertyAction::Set(value), core)
        }
        PropertyAction::SetNode(node) => {
            let ty = type_of(desc, key, core)?;
            let value = ty.from_node(node).map_err(option_failure)?;
            call(desc, key, PropertyAction::Set(value), core)
        }
        PropertyAction::Switch { inc, wrap } => {
            let ty = constricted_type_of(desc, key, core)?;
            let current = call(desc, key, PropertyAction::Get, core)?.into_value()?;
            let next = ty.add(&current, *inc, *wrap).map_err(option_failure)?;
            call(desc, key, PropertyAction::Set(next), core)
        }
        PropertyAction::Multiply(factor) => {
            let ty = type_of(desc, key, core)?;
            let current = call(desc, key, PropertyAction::Get, core)?.into_value()?;
            let next = ty.multiply(&current, *factor).map_err(option_failure)?;
            call(desc, key, PropertyAction::Set(next), core)
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

fn forward(target: &str, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match action {
        PropertyAction::KeyAction { key, action } => {
            property_do(core, &format!("{}/{}", target, key), action)
        }
        other => property_do(core, target, other),
    }
}

/// Redirects every action to another property.
pub fn alias(target: &str) -> impl PropertyAccessor {
    let target = target.to_string();
    move |_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core| forward(&target, action, core)
}

/// Like [`alias`], but warns the first time each name is used.
pub fn deprecated_alias(target: &str) -> impl PropertyAccessor {
    let target = target.to_string();
    move |prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core| {
        if core.warned_deprecated.insert(prop.name.clone()) {
            warn!(
                property = %prop.name,
                replacement = %target,
                "Warning: property '{}' was replaced with '{}' and might be removed in the future.",
                prop.name,
                target
            );
        }
        forward(&target, action, core)
    }
}
