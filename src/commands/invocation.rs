// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turning text lines and structured nodes into resolved invocations.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::commands::descriptor::{parse_arg, CommandDescriptor, CommandTable};
use crate::config::OptionValue;
use crate::errors::CommandError;
use crate::properties::unescape;

/// Where the result of a command is reported on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OsdMode {
    #[default]
    Auto,
    None,
    Bar,
    Msg,
    MsgBar,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvocationFlags {
    /// `${...}` references in string arguments are expanded before running.
    pub expand_properties: bool,
    /// Fire and forget: the caller does not wait for completion.
    pub is_async: bool,
    /// Forces a normally async command to be awaited.
    pub sync: bool,
    /// Overrides the descriptor's auto-repeat policy.
    pub repeatable: bool,
    pub osd: OsdMode,
}

#[derive(Clone)]
pub struct Invocation {
    pub name: String,
    pub descriptor: Arc<CommandDescriptor>,
    pub args: Vec<OptionValue>,
    /// Client that issued the command; `None` for synthetic commands.
    pub sender: Option<String>,
    pub flags: InvocationFlags,
    /// Produced by key auto-repeat.
    pub repeated: bool,
    pub is_up_down: bool,
    pub is_up: bool,
    pub key_name: Option<String>,
    pub scale: f64,
    pub scale_units: u32,
    pub original: String,
    /// Sub-commands of a `list` invocation.
    pub sub: Vec<Invocation>,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("sender", &self.sender)
            .field("flags", &self.flags)
            .field("sub", &self.sub)
            .finish()
    }
}

fn find(table: &CommandTable, name: &str) -> Result<Arc<CommandDescriptor>, CommandError> {
    table
        .find(name)
        .ok_or_else(|| CommandError::unknown_command(name))
}

impl Invocation {
    /// Invocation with every argument at its default.
    pub fn new(descriptor: Arc<CommandDescriptor>) -> Result<Self, CommandError> {
        Self::with_args(descriptor, Vec::new())
    }

    /// Invocation from already typed positional arguments; missing
    /// optional ones are filled with their defaults.
    pub fn with_args(descriptor: Arc<CommandDescriptor>, mut args: Vec<OptionValue>) -> Result<Self, CommandError> {
        let count = descriptor.args.len();
        for (index, spec) in descriptor.args.iter().enumerate().skip(args.len()) {
            // An omitted vararg tail stays empty.
            if descriptor.flags.vararg && index + 1 == count && spec.optional {
                break;
            }
            if !spec.optional {
                return Err(CommandError::invalid(format!(
                    "command '{}' requires argument '{}'",
                    descriptor.name, spec.name
                )));
            }
            args.push(spec.default_value()?);
        }
        Ok(Self {
            name: descriptor.name.to_string(),
            original: descriptor.name.to_string(),
            descriptor,
            args,
            sender: None,
            flags: InvocationFlags::default(),
            repeated: false,
            is_up_down: false,
            is_up: false,
            key_name: None,
            scale: 1.0,
            scale_units: 1,
            sub: Vec::new(),
        })
    }

    /// Parses a command line. Several commands separated by `;` become one
    /// `list` invocation. Text commands expand properties unless `raw`.
    pub fn parse(table: &CommandTable, line: &str) -> Result<Self, CommandError> {
        let commands = tokenize(line)?;
        let mut parsed = Vec::with_capacity(commands.len());
        for tokens in commands {
            let mut inv = Self::from_tokens(table, tokens)?;
            inv.original = line.trim().to_string();
            parsed.push(inv);
        }
        match parsed.len() {
            0 => Self::new(find(table, "ignore")?),
            1 => Ok(parsed.remove(0)),
            _ => Self::list(table, parsed, line),
        }
    }

    /// Wraps `sub` into a `list` command that runs them in order.
    pub fn list(table: &CommandTable, sub: Vec<Invocation>, original: &str) -> Result<Self, CommandError> {
        let mut inv = Self::new(find(table, "list")?)?;
        inv.sub = sub;
        inv.original = original.trim().to_string();
        Ok(inv)
    }

    fn from_tokens(table: &CommandTable, tokens: Vec<String>) -> Result<Self, CommandError> {
        let mut flags = InvocationFlags {
            expand_properties: true,
            ..Default::default()
        };
        let mut tokens = tokens.into_iter().peekable();
        while let Some(prefix) = tokens.peek() {
            if !apply_prefix(&mut flags, prefix) {
                break;
            }
            tokens.next();
        }
        let name = tokens
            .next()
            .ok_or_else(|| CommandError::invalid("command name missing after prefixes"))?;
        let descriptor = find(table, &name)?;

        let mut args = Vec::new();
        for (index, text) in tokens.enumerate() {
            let spec = descriptor.arg_spec(index).ok_or_else(|| {
                CommandError::invalid(format!("too many arguments for command '{}'", name))
            })?;
            args.push(parse_arg(spec, &text)?);
        }
        let mut inv = Self::with_args(descriptor, args)?;
        inv.flags = flags;
        Ok(inv)
    }

    /// Builds an invocation from the structured client form: either an array
    /// `[name, arg...]` or an object with `name`, named arguments and an
    /// optional `_flags` array of prefixes. Properties are not expanded
    /// unless asked for.
    pub fn from_node(table: &CommandTable, node: &Value) -> Result<Self, CommandError> {
        match node {
            Value::Array(items) => {
                let name = items
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| CommandError::invalid("command array must start with a name"))?;
                let descriptor = find(table, name)?;
                let mut args = Vec::with_capacity(items.len() - 1);
                for (index, item) in items[1..].iter().enumerate() {
                    let spec = descriptor.arg_spec(index).ok_or_else(|| {
                        CommandError::invalid(format!("too many arguments for command '{}'", name))
                    })?;
                    args.push(node_arg(spec, item)?);
                }
                Self::with_args(descriptor, args)
            }
            Value::Object(map) => {
                let name = map
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| CommandError::invalid("command object needs a 'name'"))?;
                let descriptor = find(table, name)?;
                let mut flags = InvocationFlags::default();
                for prefix in map.get("_flags").and_then(Value::as_array).into_iter().flatten() {
                    let prefix = prefix.as_str().unwrap_or_default();
                    if !apply_prefix(&mut flags, prefix) {
                        return Err(CommandError::invalid(format!("unknown command flag '{}'", prefix)));
                    }
                }
                if let Some(unknown) = map
                    .keys()
                    .find(|k| *k != "name" && *k != "_flags" && !descriptor.args.iter().any(|a| a.name == k.as_str()))
                {
                    return Err(CommandError::invalid(format!(
                        "command '{}' has no argument '{}'",
                        name, unknown
                    )));
                }
                let mut args = Vec::with_capacity(descriptor.args.len());
                let count = descriptor.args.len();
                for (index, spec) in descriptor.args.iter().enumerate() {
                    match map.get(spec.name) {
                        Some(value) => args.push(node_arg(spec, value)?),
                        None if descriptor.flags.vararg && index + 1 == count => {}
                        None if spec.optional => args.push(spec.default_value()?),
                        None => {
                            return Err(CommandError::invalid(format!(
                                "command '{}' requires argument '{}'",
                                name, spec.name
                            )))
                        }
                    }
                }
                let mut inv = Self::with_args(descriptor, args)?;
                inv.flags = flags;
                Ok(inv)
            }
            _ => Err(CommandError::invalid("command must be an array or an object")),
        }
    }

    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = Some(sender.to_string());
        self
    }

    pub fn with_scale(mut self, scale: f64, scale_units: u32) -> Self {
        self.scale = scale;
        self.scale_units = scale_units.max(1);
        self
    }
}

fn node_arg(spec: &crate::commands::ArgSpec, node: &Value) -> Result<OptionValue, CommandError> {
    match node {
        Value::String(s) => parse_arg(spec, s),
        other => spec
            .ty
            .from_node(other)
            .map_err(|e| CommandError::invalid(format!("argument '{}': {}", spec.name, e))),
    }
}

fn apply_prefix(flags: &mut InvocationFlags, prefix: &str) -> bool {
    match prefix {
        "async" => flags.is_async = true,
        "sync" => flags.sync = true,
        "raw" => flags.expand_properties = false,
        "expand-properties" => flags.expand_properties = true,
        "repeatable" => flags.repeatable = true,
        "no-osd" => flags.osd = OsdMode::None,
        "osd-auto" => flags.osd = OsdMode::Auto,
        "osd-bar" => flags.osd = OsdMode::Bar,
        "osd-msg" => flags.osd = OsdMode::Msg,
        "osd-msg-bar" => flags.osd = OsdMode::MsgBar,
        _ => return false,
    }
    true
}

/// Splits a line into commands (at `;`) and those into arguments.
/// `"..."` takes C escapes, `'...'` is literal, `#` starts a comment.
fn tokenize(line: &str) -> Result<Vec<Vec<String>>, CommandError> {
    let mut commands = vec![Vec::new()];
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&c) = chars.peek() else { break };
        let token = match c {
            '#' => break,
            ';' => {
                chars.next();
                commands.push(Vec::new());
                continue;
            }
            '"' => {
                chars.next();
                let mut raw = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => {
                            raw.push('\\');
                            if let Some(next) = chars.next() {
                                raw.push(next);
                            }
                        }
                        Some(other) => raw.push(other),
                        None => return Err(CommandError::invalid("unterminated double quote")),
                    }
                }
                unescape(&raw)?
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(other) => text.push(other),
                        None => return Err(CommandError::invalid("unterminated single quote")),
                    }
                }
                text
            }
            _ => {
                let mut text = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != ';') {
                    text.push(c);
                }
                text
            }
        };
        if let Some(current) = commands.last_mut() {
            current.push(token);
        }
    }
    commands.retain(|c| !c.is_empty());
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> CommandTable {
        CommandTable::builtin()
    }

    #[test]
    fn test_tokenize_quotes_and_comments() {
        let got = tokenize(r#"show-text "a \"b\"\n" 'c d' e # tail"#).unwrap();
        assert_eq!(got, vec![vec!["show-text", "a \"b\"\n", "c d", "e"]]);
        let got = tokenize("a 1; b ;c").unwrap();
        assert_eq!(got.len(), 3);
        assert!(tokenize("a \"open").is_err());
    }

    #[test]
    fn test_parse_typed_arguments_and_defaults() {
        let inv = Invocation::parse(&table(), "seek 5").unwrap();
        assert_eq!(inv.name, "seek");
        assert_eq!(inv.args[0], OptionValue::Time(Some(5.0)));
        assert_eq!(inv.args[1], OptionValue::str("relative"));
        assert!(inv.flags.expand_properties);
    }

    #[test]
    fn test_parse_prefixes() {
        let inv = Invocation::parse(&table(), "raw async no-osd set pause yes").unwrap();
        assert!(!inv.flags.expand_properties);
        assert!(inv.flags.is_async);
        assert_eq!(inv.flags.osd, OsdMode::None);
        assert_eq!(inv.args, vec![OptionValue::str("pause"), OptionValue::str("yes")]);
    }

    #[test]
    fn test_parse_errors() {
        let t = table();
        assert_eq!(
            Invocation::parse(&t, "frobnicate").unwrap_err(),
            CommandError::unknown_command("frobnicate")
        );
        assert!(matches!(Invocation::parse(&t, "set pause"), Err(CommandError::InvalidArgument(_))));
        assert!(matches!(Invocation::parse(&t, "quit 1 2"), Err(CommandError::InvalidArgument(_))));
        assert!(matches!(Invocation::parse(&t, "raw"), Err(CommandError::InvalidArgument(_))));
    }

    #[test]
    fn test_semicolons_build_a_list() {
        let inv = Invocation::parse(&table(), "set volume 10; show-text done").unwrap();
        assert_eq!(inv.name, "list");
        let names: Vec<&str> = inv.sub.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["set", "show-text"]);
    }

    #[test]
    fn test_vararg_collects_rest() {
        let inv = Invocation::parse(&table(), "script-message a b c").unwrap();
        assert_eq!(inv.args.len(), 3);
    }

    #[test]
    fn test_from_node_forms() {
        let t = table();
        let inv = Invocation::from_node(&t, &json!(["seek", 10, "absolute"])).unwrap();
        assert_eq!(inv.args[0], OptionValue::Time(Some(10.0)));
        assert!(!inv.flags.expand_properties);

        let inv = Invocation::from_node(
            &t,
            &json!({"name": "subprocess", "args": ["echo", "hi"], "capture_stdout": true, "_flags": ["async"]}),
        )
        .unwrap();
        assert_eq!(inv.args[0], OptionValue::StringList(vec!["echo".into(), "hi".into()]));
        assert!(inv.flags.is_async);

        assert!(Invocation::from_node(&t, &json!({"name": "seek", "bogus": 1})).is_err());
        assert!(Invocation::from_node(&t, &json!({"name": "seek"})).is_err());
        assert!(Invocation::from_node(&t, &json!(42)).is_err());
    }
}
