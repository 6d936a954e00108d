// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{OptionType, OptionValue, ValueKind};
use crate::errors::CommandError;
use crate::traits::CommandHandler;

/// How a command is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandFlags {
    /// The handler resolves its context later, from some other event.
    pub exec_async: bool,
    /// Runs on the worker pool instead of the caller's thread.
    pub spawn_thread: bool,
    pub can_abort: bool,
    pub abort_on_playback_end: bool,
    pub allow_auto_repeat: bool,
    pub scalable: bool,
    /// Key-down and key-up both invoke the command.
    pub on_updown: bool,
    /// The last argument consumes everything that follows.
    pub vararg: bool,
    pub is_ignore: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub ty: OptionType,
    pub default: Option<&'static str>,
    pub optional: bool,
}

impl ArgSpec {
    /// Value of an omitted optional argument.
    pub fn default_value(&self) -> Result<OptionValue, CommandError> {
        match self.default {
            Some(text) => parse_arg(self, text),
            None => Ok(self.ty.zero()),
        }
    }
}

/// Parses argument text. Plain strings are kept verbatim.
pub fn parse_arg(spec: &ArgSpec, text: &str) -> Result<OptionValue, CommandError> {
    if spec.ty.kind == ValueKind::String {
        return Ok(OptionValue::str(text));
    }
    spec.ty
        .parse(text)
        .map_err(|e| CommandError::invalid(format!("argument '{}': {}", spec.name, e)))
}

pub struct CommandDescriptor {
    pub name: &'static str,
    pub args: Vec<ArgSpec>,
    pub flags: CommandFlags,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new(name: &'static str, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name,
            args: Vec::new(),
            flags: CommandFlags::default(),
            handler: Arc::new(handler),
        }
    }

    pub fn arg(mut self, name: &'static str, ty: OptionType) -> Self {
        self.args.push(ArgSpec {
            name,
            ty,
            default: None,
            optional: false,
        });
        self
    }

    /// Optional argument; `default` is parsed like user input.
    pub fn opt(mut self, name: &'static str, ty: OptionType, default: &'static str) -> Self {
        self.args.push(ArgSpec {
            name,
            ty,
            default: Some(default),
            optional: true,
        });
        self
    }

    /// Optional argument defaulting to the type's zero value.
    pub fn opt_zero(mut self, name: &'static str, ty: OptionType) -> Self {
        self.args.push(ArgSpec {
            name,
            ty,
            default: None,
            optional: true,
        });
        self
    }

    pub fn vararg(mut self) -> Self {
        self.flags.vararg = true;
        self
    }

    pub fn exec_async(mut self) -> Self {
        self.flags.exec_async = true;
        self
    }

    pub fn spawn_thread(mut self) -> Self {
        self.flags.spawn_thread = true;
        self
    }

    pub fn abortable(mut self) -> Self {
        self.flags.can_abort = true;
        self
    }

    pub fn abort_on_playback_end(mut self) -> Self {
        self.flags.can_abort = true;
        self.flags.abort_on_playback_end = true;
        self
    }

    pub fn auto_repeat(mut self) -> Self {
        self.flags.allow_auto_repeat = true;
        self
    }

    pub fn scalable(mut self) -> Self {
        self.flags.scalable = true;
        self
    }

    pub fn on_updown(mut self) -> Self {
        self.flags.on_updown = true;
        self
    }

    pub fn ignore(mut self) -> Self {
        self.flags.is_ignore = true;
        self
    }

    /// Spec used to parse argument `index`, taking varargs into account.
    pub fn arg_spec(&self, index: usize) -> Option<&ArgSpec> {
        match self.args.get(index) {
            Some(spec) => Some(spec),
            None if self.flags.vararg => self.args.last(),
            None => None,
        }
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("flags", &self.flags)
            .finish()
    }
}

/// The set of known commands, looked up by name.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: Vec<Arc<CommandDescriptor>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::new();
        for desc in super::builtin::builtin_commands() {
            table.register(desc);
        }
        table
    }

    /// Adds `desc`. A name that is already taken keeps its first descriptor.
    pub fn register(&mut self, desc: CommandDescriptor) -> bool {
        if self.find(desc.name).is_some() {
            debug!(command = desc.name, "Duplicate command descriptor ignored");
            return false;
        }
        self.commands.push(Arc::new(desc));
        true
    }

    pub fn find(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.commands.iter().find(|c| c.name == name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|c| c.name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
