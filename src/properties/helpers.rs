// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Building blocks shared by the builtin accessors: read-only scalars,
//! fixed sets of named sub-properties, and indexed lists.

use serde_json::{Map, Value};

use crate::config::{OptionType, OptionValue};
use crate::errors::PropertyError;
use crate::properties::{PropertyAction, PropertyReply, PropertyResult};

/// Splits `a/b/c` into `("a", "b/c")`; the remainder is empty when there
/// is no separator.
pub fn split_path(key: &str) -> (&str, &str) {
    key.split_once('/').unwrap_or((key, ""))
}

/// Natural type of a value with no range attached.
pub fn type_of_value(value: &OptionValue) -> OptionType {
    match value {
        OptionValue::Flag(_) => OptionType::flag(),
        OptionValue::Int(_) => OptionType::int64(),
        OptionValue::Double(_) => OptionType::double(),
        OptionValue::Time(_) => OptionType::time(),
        OptionValue::Str(_) | OptionValue::Choice(_) => OptionType::string(),
        OptionValue::StringList(_) => OptionType::string_list(),
        OptionValue::KeyValueList(_) => OptionType::key_value_list(),
        OptionValue::Node(_) => OptionType::node(),
    }
}

/// Read-only access to a plain value.
pub fn ro(action: &PropertyAction, value: OptionValue) -> PropertyResult {
    match action {
        PropertyAction::Get => Ok(PropertyReply::Value(value)),
        PropertyAction::GetType => Ok(PropertyReply::Type(type_of_value(&value))),
        _ => Err(PropertyError::NotImplemented),
    }
}

pub fn ro_flag(action: &PropertyAction, value: bool) -> PropertyResult {
    ro(action, OptionValue::Flag(value))
}

pub fn ro_int(action: &PropertyAction, value: i64) -> PropertyResult {
    ro(action, OptionValue::Int(value))
}

pub fn ro_double(action: &PropertyAction, value: f64) -> PropertyResult {
    ro(action, OptionValue::Double(value))
}

pub fn ro_str(action: &PropertyAction, value: &str) -> PropertyResult {
    ro(action, OptionValue::str(value))
}

/// Like [`ro_str`], but a missing value is `Unavailable`.
pub fn ro_opt_str(action: &PropertyAction, value: Option<&str>) -> PropertyResult {
    match value {
        Some(v) => ro_str(action, v),
        None => Err(PropertyError::Unavailable),
    }
}

pub fn ro_node(action: &PropertyAction, value: Value) -> PropertyResult {
    match action {
        PropertyAction::Get | PropertyAction::GetNode => Ok(PropertyReply::Node(value)),
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::node())),
        _ => Err(PropertyError::NotImplemented),
    }
}

/// One named member of a structured property.
#[derive(Debug, Clone)]
pub struct SubProp {
    pub name: &'static str,
    /// `None` marks the member unavailable.
    pub value: Option<OptionValue>,
}

impl SubProp {
    pub fn new(name: &'static str, value: OptionValue) -> Self {
        Self {
            name,
            value: Some(value),
        }
    }

    pub fn str(name: &'static str, value: impl Into<String>) -> Self {
        Self::new(name, OptionValue::Str(value.into()))
    }

    pub fn opt(name: &'static str, value: Option<OptionValue>) -> Self {
        Self { name, value }
    }
}

fn sub_map(props: &[SubProp]) -> Value {
    let map: Map<String, Value> = props
        .iter()
        .filter_map(|p| p.value.as_ref().map(|v| (p.name.to_string(), v.to_node())))
        .collect();
    Value::Object(map)
}

/// Structured property made of a fixed set of members.
pub fn read_sub(action: &PropertyAction, props: &[SubProp]) -> PropertyResult {
    match action {
        PropertyAction::Get | PropertyAction::GetNode => Ok(PropertyReply::Node(sub_map(props))),
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::node())),
        PropertyAction::Print => {
            let text = props
                .iter()
                .filter_map(|p| {
                    p.value
                        .as_ref()
                        .map(|v| format!("{}={}", p.name, type_of_value(v).print(v)))
                })
                .collect::<Vec<_>>()
                .join("\n");
            Ok(PropertyReply::Text(text))
        }
        PropertyAction::KeyAction { key, action } => {
            let (head, rest) = split_path(key);
            let prop = props
                .iter()
                .find(|p| p.name == head)
                .ok_or(PropertyError::Unknown)?;
            let value = prop.value.clone().ok_or(PropertyError::Unavailable)?;
            if !rest.is_empty() {
                return Err(PropertyError::Unknown);
            }
            match action.as_ref() {
                PropertyAction::Get => Ok(PropertyReply::Value(value)),
                PropertyAction::GetNode => Ok(PropertyReply::Node(value.to_node())),
                PropertyAction::GetType => Ok(PropertyReply::Type(type_of_value(&value))),
                _ => Err(PropertyError::NotImplemented),
            }
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

/// List property of `count` items, each answered by `item(index, action)`.
///
/// Supports `count`, `N` and `N/<sub-path>` keys.
pub fn read_list<F>(action: &PropertyAction, count: usize, mut item: F) -> PropertyResult
where
    F: FnMut(usize, &PropertyAction) -> PropertyResult,
{
    match action {
        PropertyAction::Get | PropertyAction::GetNode => {
            let mut items = Vec::with_capacity(count);
            for n in 0..count {
                items.push(item(n, &PropertyAction::Get)?.into_node()?);
            }
            Ok(PropertyReply::Node(Value::Array(items)))
        }
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::node())),
        PropertyAction::Print => {
            let mut lines = Vec::with_capacity(count);
            for n in 0..count {
                let text = match item(n, &PropertyAction::Print) {
                    Ok(reply) => reply.into_text()?,
                    Err(PropertyError::NotImplemented) => {
                        item(n, &PropertyAction::Get)?.into_node()?.to_string()
                    }
                    Err(e) => return Err(e),
                };
                lines.push(text);
            }
            Ok(PropertyReply::Text(lines.join("\n")))
        }
        PropertyAction::KeyAction { key, action } => {
            let (head, rest) = split_path(key);
            if head == "count" {
                if !rest.is_empty() {
                    return Err(PropertyError::Unknown);
                }
                return match action.as_ref() {
                    PropertyAction::Print => Ok(PropertyReply::Text(count.to_string())),
                    other => ro_int(other, count as i64),
                };
            }
            let index: usize = head.parse().map_err(|_| PropertyError::Unknown)?;
            if index >= count {
                return Err(PropertyError::Unknown);
            }
            if rest.is_empty() {
                item(index, action)
            } else {
                item(index, &PropertyAction::key(rest, action.as_ref().clone()))
            }
        }
        _ => Err(PropertyError::NotImplemented),
    }
}
