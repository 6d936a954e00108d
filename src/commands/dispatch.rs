// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The single command-run entry point.
//!
//! [`run_command`] produces exactly one completion per invocation, whether
//! the handler runs inline, parks its context for a later event, or is
//! queued to the worker pool. A context is consumed by [`complete`], so a
//! second completion cannot be expressed.

use parking_lot::MutexGuard;
use std::sync::Arc;

use crate::commands::{CompletionFn, ExecutionContext, Invocation, OpId, OpState};
use crate::config::{OptionValue, ValueKind};
use crate::engine::{AbortHandle, CoreGuard, Job};
use crate::errors::{CommandError, PoolError};
use crate::observability::messages::command::{
    CommandCompleted, CommandQueueFailed, CommandQueued, CommandStarted,
};
use crate::observability::messages::StructuredLog;
use crate::properties::expand_string;

/// Runs `inv` and reports its outcome through `on_completion`.
///
/// `abort` is used as the cancellation handle when the command supports
/// aborting; it is ignored otherwise.
pub fn run_command(
    core: &mut CoreGuard<'_>,
    inv: Invocation,
    abort: Option<Arc<AbortHandle>>,
    on_completion: Option<CompletionFn>,
) -> OpId {
    CommandStarted {
        command: &inv.name,
        sender: inv.sender.as_deref(),
        args: inv.args.len(),
    }
    .log();

    let desc = Arc::clone(&inv.descriptor);
    let id = core.next_op_id();
    let mut ctx = ExecutionContext::new(id, inv, on_completion);

    if ctx.invocation.flags.expand_properties {
        if let Err(e) = expand_args(&mut ctx, core) {
            ctx.fail(e);
            complete(ctx, core);
            return id;
        }
    }

    if desc.flags.can_abort {
        let handle = abort.unwrap_or_else(|| Arc::new(AbortHandle::new()));
        let stopping = core.playback_stopping();
        core.aborts
            .add(Arc::clone(&handle), desc.flags.abort_on_playback_end, stopping);
        ctx.abort = Some(handle);
    }

    if desc.flags.spawn_thread {
        queue(ctx, core);
    } else {
        execute(ctx, core);
    }
    id
}

fn expand_args(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) -> Result<(), CommandError> {
    let desc = Arc::clone(&ctx.invocation.descriptor);
    for (index, arg) in ctx.invocation.args.iter_mut().enumerate() {
        let is_string = desc
            .arg_spec(index)
            .is_some_and(|spec| spec.ty.kind == ValueKind::String);
        if let (true, OptionValue::Str(text)) = (is_string, &*arg) {
            let expanded = expand_string(core, text)?;
            *arg = OptionValue::Str(expanded);
        }
    }
    Ok(())
}

fn queue(ctx: ExecutionContext, core: &mut CoreGuard<'_>) {
    let reserved = match core.worker_pool() {
        Some(pool) => pool.reserve(),
        None => Err(PoolError::Closed),
    };
    let ticket = match reserved {
        Ok(ticket) => ticket,
        Err(e) => return reject(ctx, core, e),
    };

    core.outstanding_jobs += 1;
    CommandQueued {
        command: ctx.name(),
        outstanding: core.outstanding_jobs,
    }
    .log();

    // The context waits in the core, not in the job, so a job that never
    // runs cannot take its completion with it.
    let id = ctx.id;
    core.queued.park(ctx);
    let job: Job = Box::new(move |core: &mut CoreGuard<'_>| {
        let Some(ctx) = core.queued.take(id) else {
            return;
        };
        execute(ctx, core);
        finish_job(core);
    });
    let spawned = match core.worker_pool() {
        Some(pool) => pool.spawn(ticket, job),
        None => Err(PoolError::Closed),
    };
    if let Err(e) = spawned {
        if let Some(ctx) = core.queued.take(id) {
            finish_job(core);
            reject(ctx, core, e);
        }
    }
}

fn reject(mut ctx: ExecutionContext, core: &mut CoreGuard<'_>, error: PoolError) {
    CommandQueueFailed {
        command: ctx.name(),
        error: &error,
    }
    .log();
    ctx.fail(CommandError::failed(error.to_string()));
    complete(ctx, core);
}

fn finish_job(core: &mut CoreGuard<'_>) {
    core.outstanding_jobs = core.outstanding_jobs.saturating_sub(1);
    if core.outstanding_jobs == 0 && core.shutting_down {
        core.wake();
    }
}

/// Completes every worker-pool command whose job has not started as
/// aborted. Returns how many there were.
pub fn abort_queued(core: &mut CoreGuard<'_>) -> usize {
    let queued = core.queued.drain();
    let count = queued.len();
    for mut ctx in queued {
        core.outstanding_jobs = core.outstanding_jobs.saturating_sub(1);
        ctx.fail(CommandError::Aborted);
        complete(ctx, core);
    }
    count
}

fn execute(mut ctx: ExecutionContext, core: &mut CoreGuard<'_>) {
    let desc = Arc::clone(&ctx.invocation.descriptor);
    ctx.state = OpState::Running;
    desc.handler.execute(&mut ctx, core);
    // Handlers only borrow the guard, so this holds by construction; it
    // still catches a lock released through unsafe code.
    debug_assert!(
        MutexGuard::mutex(core).is_locked(),
        "command '{}' returned without the core lock",
        desc.name
    );

    if ctx.is_resolved() || !desc.flags.exec_async {
        complete(ctx, core);
    } else {
        ctx.state = OpState::Pending;
        core.pending.park(ctx);
    }
}

/// Finishes `ctx`: releases its abort handle and fires the completion
/// callback with the lock held.
pub fn complete(mut ctx: ExecutionContext, core: &mut CoreGuard<'_>) {
    debug_assert!(ctx.state != OpState::Completed, "command completed twice");
    ctx.state = OpState::Completed;
    if let Some(handle) = ctx.abort.take() {
        core.aborts.remove(&handle);
    }

    let outcome = ctx.outcome();
    CommandCompleted {
        command: &outcome.name,
        success: outcome.success,
        error: outcome.error.as_ref().map(|e| e as &dyn std::error::Error),
    }
    .log();

    if let Some(callback) = ctx.on_completion.take() {
        callback(&outcome, core);
    }
}

/// Completes a parked async command after applying `update` to it. Returns
/// false when `id` is not pending.
pub fn complete_pending<F>(core: &mut CoreGuard<'_>, id: OpId, update: F) -> bool
where
    F: FnOnce(&mut ExecutionContext),
{
    let Some(mut ctx) = core.pending.take(id) else {
        return false;
    };
    update(&mut ctx);
    complete(ctx, core);
    true
}
