// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::config::{OptionType, OptionValue};
use crate::errors::PropertyError;

/// Request sent to a property accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyAction {
    Get,
    /// Current value as a structured node.
    GetNode,
    Set(OptionValue),
    GetType,
    /// Type with the range the value is currently allowed to take.
    GetConstrictedType,
    /// Human-readable rendering of the current value.
    Print,
    /// Directional step used by `add` and `cycle`.
    Switch { inc: f64, wrap: bool },
    Multiply(f64),
    SetString(String),
    SetNode(Value),
    /// Sub-addressed access: `key` is the path below the property.
    KeyAction {
        key: String,
        action: Box<PropertyAction>,
    },
}

impl PropertyAction {
    pub fn key(key: impl Into<String>, action: PropertyAction) -> Self {
        PropertyAction::KeyAction {
            key: key.into(),
            action: Box::new(action),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyAction::Get => "get",
            PropertyAction::GetNode => "get-node",
            PropertyAction::Set(_) => "set",
            PropertyAction::GetType => "get-type",
            PropertyAction::GetConstrictedType => "get-constricted-type",
            PropertyAction::Print => "print",
            PropertyAction::Switch { .. } => "switch",
            PropertyAction::Multiply(_) => "multiply",
            PropertyAction::SetString(_) => "set-string",
            PropertyAction::SetNode(_) => "set-node",
            PropertyAction::KeyAction { .. } => "key-action",
        }
    }

    /// Whether a successful run of this action changed the property.
    pub fn is_set(&self) -> bool {
        match self {
            PropertyAction::Set(_)
            | PropertyAction::Switch { .. }
            | PropertyAction::SetString(_)
            | PropertyAction::SetNode(_)
            | PropertyAction::Multiply(_) => true,
            PropertyAction::KeyAction { action, .. } => action.is_set(),
            _ => false,
        }
    }
}

/// Successful outcome of a property action.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyReply {
    Done,
    Value(OptionValue),
    Node(Value),
    Type(OptionType),
    Text(String),
}

fn unexpected(reply: &PropertyReply) -> PropertyError {
    PropertyError::failed(format!("unexpected reply {:?}", reply))
}

impl PropertyReply {
    pub fn into_value(self) -> Result<OptionValue, PropertyError> {
        match self {
            PropertyReply::Value(v) => Ok(v),
            PropertyReply::Text(s) => Ok(OptionValue::Str(s)),
            PropertyReply::Node(n) => Ok(OptionValue::Node(n)),
            other => Err(unexpected(&other)),
        }
    }

    pub fn into_node(self) -> Result<Value, PropertyError> {
        match self {
            PropertyReply::Node(n) => Ok(n),
            PropertyReply::Value(v) => Ok(v.to_node()),
            PropertyReply::Text(s) => Ok(Value::String(s)),
            other => Err(unexpected(&other)),
        }
    }

    pub fn into_type(self) -> Result<OptionType, PropertyError> {
        match self {
            PropertyReply::Type(t) => Ok(t),
            other => Err(unexpected(&other)),
        }
    }

    pub fn into_text(self) -> Result<String, PropertyError> {
        match self {
            PropertyReply::Text(s) => Ok(s),
            other => Err(unexpected(&other)),
        }
    }
}

pub type PropertyResult = Result<PropertyReply, PropertyError>;
