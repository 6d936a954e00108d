// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed option values.
//!
//! Every option and every property speaks in terms of an [`OptionType`]
//! (what values are legal) and an [`OptionValue`] (one concrete value). The
//! type knows how to parse text, print for humans, convert to and from
//! structured nodes, and perform the arithmetic behind `add`, `cycle` and
//! `multiply`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::OptionError;
use crate::utils::parse_time;

/// Value category of an option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Flag,
    Int,
    Int64,
    Float,
    Double,
    Time,
    String,
    StringList,
    KeyValueList,
    Choice,
    Node,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Flag => "flag",
            ValueKind::Int => "int",
            ValueKind::Int64 => "int64",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Time => "time",
            ValueKind::String => "string",
            ValueKind::StringList => "string-list",
            ValueKind::KeyValueList => "key-value-list",
            ValueKind::Choice => "choice",
            ValueKind::Node => "node",
        }
    }

    fn is_integer(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Int64)
    }

    fn is_floating(self) -> bool {
        matches!(self, ValueKind::Float | ValueKind::Double)
    }

    /// Types on which `add` applies the scale factor directly instead of
    /// repeating the step once per scale unit.
    pub fn is_scalable(self) -> bool {
        self.is_floating() || self == ValueKind::Time
    }
}

/// One concrete value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Flag(bool),
    Int(i64),
    Double(f64),
    /// `None` is the "no time" sentinel (printed as `no`).
    Time(Option<f64>),
    Str(String),
    StringList(Vec<String>),
    KeyValueList(Vec<(String, String)>),
    Choice(String),
    Node(Value),
}

impl OptionValue {
    pub fn str(s: impl Into<String>) -> Self {
        OptionValue::Str(s.into())
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            OptionValue::Double(d) => Some(d.round() as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Int(i) => Some(*i as f64),
            OptionValue::Double(d) => Some(*d),
            OptionValue::Time(t) => *t,
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) | OptionValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::StringList(l) => Some(l),
            _ => None,
        }
    }

    /// Structured representation used by the node-based client API.
    pub fn to_node(&self) -> Value {
        match self {
            OptionValue::Flag(b) => Value::Bool(*b),
            OptionValue::Int(i) => Value::from(*i),
            OptionValue::Double(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            OptionValue::Time(None) => Value::Null,
            OptionValue::Time(Some(t)) => serde_json::Number::from_f64(*t)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            OptionValue::Str(s) | OptionValue::Choice(s) => Value::String(s.clone()),
            OptionValue::StringList(l) => {
                Value::Array(l.iter().cloned().map(Value::String).collect())
            }
            OptionValue::KeyValueList(kv) => Value::Object(
                kv.iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            OptionValue::Node(v) => v.clone(),
        }
    }
}

/// Legal values of an option or property.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionType {
    pub kind: ValueKind,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Named values for `Choice`. With a range set, integers are legal too.
    pub choices: Vec<String>,
}

impl OptionType {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            min: None,
            max: None,
            choices: Vec::new(),
        }
    }

    pub fn flag() -> Self {
        Self::new(ValueKind::Flag)
    }
    pub fn int() -> Self {
        Self::new(ValueKind::Int)
    }
    pub fn int64() -> Self {
        Self::new(ValueKind::Int64)
    }
    pub fn double() -> Self {
        Self::new(ValueKind::Double)
    }
    pub fn time() -> Self {
        Self::new(ValueKind::Time)
    }
    pub fn string() -> Self {
        Self::new(ValueKind::String)
    }
    pub fn string_list() -> Self {
        Self::new(ValueKind::StringList)
    }
    pub fn key_value_list() -> Self {
        Self::new(ValueKind::KeyValueList)
    }
    pub fn node() -> Self {
        Self::new(ValueKind::Node)
    }

    pub fn choice(choices: &[&str]) -> Self {
        Self {
            choices: choices.iter().map(|c| c.to_string()).collect(),
            ..Self::new(ValueKind::Choice)
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Value used for omitted optional arguments.
    pub fn zero(&self) -> OptionValue {
        match self.kind {
            ValueKind::Flag => OptionValue::Flag(false),
            ValueKind::Int | ValueKind::Int64 => OptionValue::Int(0),
            ValueKind::Float | ValueKind::Double => OptionValue::Double(0.0),
            ValueKind::Time => OptionValue::Time(None),
            ValueKind::String => OptionValue::Str(String::new()),
            ValueKind::StringList => OptionValue::StringList(Vec::new()),
            ValueKind::KeyValueList => OptionValue::KeyValueList(Vec::new()),
            ValueKind::Choice => self
                .choices
                .first()
                .map(|c| OptionValue::Choice(c.clone()))
                .unwrap_or(OptionValue::Int(0)),
            ValueKind::Node => OptionValue::Node(Value::Null),
        }
    }

    fn parse_error(&self, text: &str) -> OptionError {
        OptionError::Parse {
            kind: self.name(),
            value: text.to_string(),
        }
    }

    fn check_range(&self, value: f64) -> Result<(), OptionError> {
        let min = self.min.unwrap_or(f64::NEG_INFINITY);
        let max = self.max.unwrap_or(f64::INFINITY);
        if value < min || value > max {
            return Err(OptionError::OutOfRange { value, min, max });
        }
        Ok(())
    }

    /// Parses user-facing text.
    pub fn parse(&self, text: &str) -> Result<OptionValue, OptionError> {
        let text = text.trim();
        match self.kind {
            ValueKind::Flag => match text {
                "yes" | "true" | "1" | "" => Ok(OptionValue::Flag(true)),
                "no" | "false" | "0" => Ok(OptionValue::Flag(false)),
                _ => Err(self.parse_error(text)),
            },
            ValueKind::Int | ValueKind::Int64 => {
                let v: i64 = text.parse().map_err(|_| self.parse_error(text))?;
                self.check_range(v as f64)?;
                Ok(OptionValue::Int(v))
            }
            ValueKind::Float | ValueKind::Double => {
                let v: f64 = text.parse().map_err(|_| self.parse_error(text))?;
                if v.is_nan() {
                    return Err(self.parse_error(text));
                }
                self.check_range(v)?;
                Ok(OptionValue::Double(v))
            }
            ValueKind::Time => {
                if matches!(text, "no" | "none") {
                    return Ok(OptionValue::Time(None));
                }
                let v = parse_time(text).ok_or_else(|| self.parse_error(text))?;
                self.check_range(v)?;
                Ok(OptionValue::Time(Some(v)))
            }
            ValueKind::String => Ok(OptionValue::Str(text.to_string())),
            ValueKind::StringList => Ok(OptionValue::StringList(split_list(text))),
            ValueKind::KeyValueList => {
                let mut pairs = Vec::new();
                for item in split_list(text) {
                    let (k, v) = item
                        .split_once('=')
                        .ok_or_else(|| self.parse_error(text))?;
                    pairs.push((k.to_string(), v.to_string()));
                }
                Ok(OptionValue::KeyValueList(pairs))
            }
            ValueKind::Choice => {
                if self.choices.iter().any(|c| c == text) {
                    return Ok(OptionValue::Choice(text.to_string()));
                }
                if self.min.is_some() {
                    if let Ok(v) = text.parse::<i64>() {
                        self.check_range(v as f64)?;
                        return Ok(OptionValue::Int(v));
                    }
                }
                Err(OptionError::InvalidChoice {
                    value: text.to_string(),
                    choices: self.choices.join(", "),
                })
            }
            ValueKind::Node => Ok(OptionValue::Node(
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
            )),
        }
    }

    /// Validates `value` against this type, coercing compatible numerics.
    pub fn check(&self, value: OptionValue) -> Result<OptionValue, OptionError> {
        let mismatch = || OptionError::TypeMismatch(self.name());
        match (self.kind, value) {
            (ValueKind::Flag, v @ OptionValue::Flag(_)) => Ok(v),
            (k, OptionValue::Int(i)) if k.is_integer() => {
                self.check_range(i as f64)?;
                Ok(OptionValue::Int(i))
            }
            (k, OptionValue::Double(d)) if k.is_integer() && d.fract() == 0.0 => {
                self.check_range(d)?;
                Ok(OptionValue::Int(d as i64))
            }
            (k, v @ (OptionValue::Int(_) | OptionValue::Double(_))) if k.is_floating() => {
                let d = v.as_f64().ok_or_else(mismatch)?;
                self.check_range(d)?;
                Ok(OptionValue::Double(d))
            }
            (ValueKind::Time, OptionValue::Time(t)) => {
                if let Some(t) = t {
                    self.check_range(t)?;
                }
                Ok(OptionValue::Time(t))
            }
            (ValueKind::Time, v @ (OptionValue::Int(_) | OptionValue::Double(_))) => {
                let d = v.as_f64().ok_or_else(mismatch)?;
                self.check_range(d)?;
                Ok(OptionValue::Time(Some(d)))
            }
            (ValueKind::String, v @ OptionValue::Str(_)) => Ok(v),
            (ValueKind::StringList, v @ OptionValue::StringList(_)) => Ok(v),
            (ValueKind::KeyValueList, v @ OptionValue::KeyValueList(_)) => Ok(v),
            (ValueKind::Choice, OptionValue::Choice(c) | OptionValue::Str(c)) => {
                self.parse(&c)
            }
            (ValueKind::Choice, OptionValue::Int(i)) if self.min.is_some() => {
                self.check_range(i as f64)?;
                Ok(OptionValue::Int(i))
            }
            (ValueKind::Node, v) => Ok(OptionValue::Node(v.to_node())),
            _ => Err(mismatch()),
        }
    }

    /// Human-readable rendering.
    pub fn print(&self, value: &OptionValue) -> String {
        match value {
            OptionValue::Flag(b) => if *b { "yes" } else { "no" }.to_string(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::Double(d) => format!("{:.6}", d),
            OptionValue::Time(None) => "no".to_string(),
            OptionValue::Time(Some(t)) => format!("{:.6}", t),
            OptionValue::Str(s) | OptionValue::Choice(s) => s.clone(),
            OptionValue::StringList(l) => l.join(","),
            OptionValue::KeyValueList(kv) => kv
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(","),
            OptionValue::Node(v) => match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }

    /// Converts a structured node into a value of this type.
    pub fn from_node(&self, node: &Value) -> Result<OptionValue, OptionError> {
        let mismatch = || OptionError::TypeMismatch(self.name());
        match (self.kind, node) {
            (ValueKind::Node, v) => Ok(OptionValue::Node(v.clone())),
            (ValueKind::Flag, Value::Bool(b)) => Ok(OptionValue::Flag(*b)),
            (ValueKind::Time, Value::Null) => Ok(OptionValue::Time(None)),
            (_, Value::String(s)) => self.parse(s),
            (_, Value::Number(n)) => {
                let v = if let Some(i) = n.as_i64() {
                    OptionValue::Int(i)
                } else {
                    OptionValue::Double(n.as_f64().ok_or_else(mismatch)?)
                };
                self.check(v)
            }
            (ValueKind::StringList, Value::Array(items)) => items
                .iter()
                .map(|i| match i {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::StringList),
            (ValueKind::KeyValueList, Value::Object(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.clone(), s.clone())),
                    _ => Err(mismatch()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::KeyValueList),
            _ => Err(mismatch()),
        }
    }

    fn bound(&self, v: f64, wrap: bool) -> f64 {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return v;
        };
        if wrap {
            if v > max {
                min
            } else if v < min {
                max
            } else {
                v
            }
        } else {
            v.clamp(min, max)
        }
    }

    /// Steps `value` by `inc`. With `wrap`, leaving the range jumps to the
    /// opposite end; otherwise the result is clamped.
    pub fn add(&self, value: &OptionValue, inc: f64, wrap: bool) -> Result<OptionValue, OptionError> {
        let mismatch = || OptionError::TypeMismatch(self.name());
        match (self.kind, value) {
            (ValueKind::Flag, OptionValue::Flag(state)) => {
                if inc.abs() < 0.5 {
                    return Ok(OptionValue::Flag(*state));
                }
                Ok(OptionValue::Flag(if wrap { !state } else { inc > 0.0 }))
            }
            (k, OptionValue::Int(i)) if k.is_integer() => {
                let v = self.bound(*i as f64 + inc.round(), wrap);
                Ok(OptionValue::Int(v as i64))
            }
            (k, OptionValue::Double(d)) if k.is_floating() => {
                Ok(OptionValue::Double(self.bound(d + inc, wrap)))
            }
            (ValueKind::Time, OptionValue::Time(Some(t))) => {
                Ok(OptionValue::Time(Some(self.bound(t + inc, wrap))))
            }
            (ValueKind::Choice, current) => self.add_choice(current, inc, wrap),
            _ => Err(mismatch()),
        }
    }

    fn add_choice(&self, current: &OptionValue, inc: f64, wrap: bool) -> Result<OptionValue, OptionError> {
        // Named choices first, followed by the integer range if present.
        let mut steps: Vec<OptionValue> = self
            .choices
            .iter()
            .map(|c| OptionValue::Choice(c.clone()))
            .collect();
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if max - min <= 10_000.0 {
                steps.extend((min as i64..=max as i64).map(OptionValue::Int));
            }
        }
        if steps.is_empty() {
            return Err(OptionError::TypeMismatch(self.name()));
        }
        let pos = steps.iter().position(|s| s == current).unwrap_or(0) as i64;
        let len = steps.len() as i64;
        // Reduce the step before converting so huge increments cannot overflow.
        let idx = if wrap {
            let step = inc.round().rem_euclid(len as f64) as i64;
            (pos + step).rem_euclid(len)
        } else {
            let step = inc.round().clamp(-(len as f64), len as f64) as i64;
            (pos + step).clamp(0, len - 1)
        };
        Ok(steps[idx as usize].clone())
    }

    /// Scales a numeric value by `factor`.
    pub fn multiply(&self, value: &OptionValue, factor: f64) -> Result<OptionValue, OptionError> {
        match (self.kind, value) {
            (k, OptionValue::Int(i)) if k.is_integer() => {
                Ok(OptionValue::Int(self.bound(*i as f64 * factor, false).round() as i64))
            }
            (k, OptionValue::Double(d)) if k.is_floating() => {
                Ok(OptionValue::Double(self.bound(d * factor, false)))
            }
            (ValueKind::Time, OptionValue::Time(Some(t))) => {
                Ok(OptionValue::Time(Some(self.bound(t * factor, false))))
            }
            _ => Err(OptionError::TypeMismatch(self.name())),
        }
    }
}

/// Splits a comma separated list, honouring `\,` escapes.
fn split_list(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}
