// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Command descriptors, invocation parsing and the dispatcher.

pub mod builtin;
mod context;
mod descriptor;
mod dispatch;
mod invocation;
mod list;

pub use context::{CommandOutcome, CompletionFn, ExecutionContext, OpId, OpState};
pub use descriptor::{parse_arg, ArgSpec, CommandDescriptor, CommandFlags, CommandTable};
pub use dispatch::{abort_queued, complete, complete_pending, run_command};
pub use invocation::{Invocation, InvocationFlags, OsdMode};
