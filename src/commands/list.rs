// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Driver for the `list` command.
//!
//! Sub-commands run in order. A sub-command that completes while it is
//! still being dispatched lets the loop continue in place; one that
//! completes later resumes the loop from its completion callback. Either
//! way the stack depth does not grow with the length of the list.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::commands::dispatch::{complete_pending, run_command};
use crate::commands::{CommandOutcome, CompletionFn, ExecutionContext, Invocation, OpId};
use crate::engine::CoreGuard;
use crate::errors::CommandError;

struct ListDriver {
    parent: OpId,
    queue: VecDeque<Invocation>,
    error: Option<CommandError>,
}

/// Shared between the loop and one sub-command's completion callback.
#[derive(Default)]
struct Continuation {
    in_dispatch: AtomicBool,
    completed_inline: AtomicBool,
    error: Mutex<Option<CommandError>>,
    driver: Mutex<Option<ListDriver>>,
}

enum Step {
    Finished(OpId, Option<CommandError>),
    Suspended,
}

pub fn cmd_list(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let driver = ListDriver {
        parent: ctx.id,
        queue: std::mem::take(&mut ctx.invocation.sub).into(),
        error: None,
    };
    match drive(driver, core) {
        Step::Finished(_, error) => {
            if let Some(e) = error {
                ctx.fail(e);
            }
            ctx.resolve();
        }
        // Completion comes from the last deferred sub-command.
        Step::Suspended => {}
    }
}

fn drive(mut driver: ListDriver, core: &mut CoreGuard<'_>) -> Step {
    while let Some(sub) = driver.queue.pop_front() {
        if sub.flags.is_async {
            run_command(core, sub, None, None);
            continue;
        }

        let cont = Arc::new(Continuation::default());
        let callback_cont = Arc::clone(&cont);
        let callback: CompletionFn = Box::new(move |outcome: &CommandOutcome, core: &mut CoreGuard<'_>| {
            resume(callback_cont, outcome, core)
        });

        cont.in_dispatch.store(true, Ordering::SeqCst);
        run_command(core, sub, None, Some(callback));
        cont.in_dispatch.store(false, Ordering::SeqCst);

        if cont.completed_inline.load(Ordering::SeqCst) {
            if let Some(e) = cont.error.lock().take() {
                driver.error.get_or_insert(e);
            }
            continue;
        }
        *cont.driver.lock() = Some(driver);
        return Step::Suspended;
    }
    Step::Finished(driver.parent, driver.error)
}

fn resume(cont: Arc<Continuation>, outcome: &CommandOutcome, core: &mut CoreGuard<'_>) {
    if !outcome.success {
        let error = outcome
            .error
            .clone()
            .unwrap_or_else(|| CommandError::failed(format!("'{}' failed", outcome.name)));
        *cont.error.lock() = Some(error);
    }
    if cont.in_dispatch.load(Ordering::SeqCst) {
        cont.completed_inline.store(true, Ordering::SeqCst);
        return;
    }

    let Some(mut driver) = cont.driver.lock().take() else {
        return;
    };
    if let Some(e) = cont.error.lock().take() {
        driver.error.get_or_insert(e);
    }
    if let Step::Finished(parent, error) = drive(driver, core) {
        complete_pending(core, parent, |ctx| {
            if let Some(e) = error {
                ctx.fail(e);
            }
        });
    }
}
