// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::commands::Invocation;
use crate::config::OptionValue;
use crate::engine::{AbortHandle, CoreGuard};
use crate::errors::CommandError;

/// Identifies one command execution for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u64);

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Created,
    Running,
    /// Handler returned; completion comes from a later event.
    Pending,
    Completed,
}

/// Terminal result handed to the completion callback.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub id: OpId,
    pub name: String,
    pub success: bool,
    pub result: Value,
    pub error: Option<CommandError>,
}

/// Called exactly once per execution, with the core lock held.
pub type CompletionFn = Box<dyn FnOnce(&CommandOutcome, &mut CoreGuard<'_>) + Send>;

/// State of one command execution.
pub struct ExecutionContext {
    pub id: OpId,
    pub invocation: Invocation,
    pub success: bool,
    pub result: Value,
    pub error: Option<CommandError>,
    pub abort: Option<Arc<AbortHandle>>,
    pub(crate) on_completion: Option<CompletionFn>,
    pub(crate) state: OpState,
    resolved: bool,
}

impl ExecutionContext {
    pub(crate) fn new(id: OpId, invocation: Invocation, on_completion: Option<CompletionFn>) -> Self {
        Self {
            id,
            invocation,
            success: true,
            result: Value::Null,
            error: None,
            abort: None,
            on_completion,
            state: OpState::Created,
            resolved: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.invocation.name
    }

    pub fn sender(&self) -> Option<&str> {
        self.invocation.sender.as_deref()
    }

    pub fn state(&self) -> OpState {
        self.state
    }

    /// Marks the execution failed. The first error wins.
    pub fn fail(&mut self, error: CommandError) {
        self.success = false;
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn set_result(&mut self, result: Value) {
        self.result = result;
    }

    /// For async handlers: the work finished before the handler returned,
    /// so the dispatcher may complete right away.
    pub fn resolve(&mut self) {
        self.resolved = true;
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.as_ref().is_some_and(|h| h.is_cancelled())
    }

    pub fn arg(&self, index: usize) -> Option<&OptionValue> {
        self.invocation.args.get(index)
    }

    pub fn str_arg(&self, index: usize) -> &str {
        self.arg(index).and_then(OptionValue::as_str).unwrap_or_default()
    }

    pub fn int_arg(&self, index: usize) -> i64 {
        self.arg(index).and_then(OptionValue::as_int).unwrap_or_default()
    }

    pub fn f64_arg(&self, index: usize) -> f64 {
        self.arg(index).and_then(OptionValue::as_f64).unwrap_or_default()
    }

    pub fn flag_arg(&self, index: usize) -> bool {
        self.arg(index).and_then(OptionValue::as_flag).unwrap_or_default()
    }

    pub fn list_arg(&self, index: usize) -> Vec<String> {
        self.arg(index)
            .and_then(OptionValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// String forms of every argument from `from` on; used by varargs.
    pub fn rest(&self, from: usize) -> Vec<String> {
        self.invocation
            .args
            .iter()
            .skip(from)
            .map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_node().to_string(),
            })
            .collect()
    }

    pub fn outcome(&self) -> CommandOutcome {
        CommandOutcome {
            id: self.id,
            name: self.invocation.name.clone(),
            success: self.success,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("command", &self.invocation.name)
            .field("state", &self.state)
            .field("success", &self.success)
            .field("error", &self.error)
            .finish()
    }
}
