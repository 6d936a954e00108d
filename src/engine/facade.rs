// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Public entry points of a running engine.
//!
//! [`Engine`] owns the core lock and the client hub. Every method takes the
//! lock for the duration of one operation; completions are delivered over
//! `tokio::sync::oneshot` so callers can await them or block on them.

use parking_lot::MutexGuard;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

use crate::commands::{abort_queued, complete, run_command, CommandOutcome, CompletionFn, Invocation, OpId};
use crate::engine::{AbortHandle, CoreGuard, CoreLock, WakeSignal};
use crate::errors::{CommandError, HookError};
use crate::events::{ClientHandle, ClientHub, EventKind};
use crate::hooks::HookProgress;
use crate::observability::messages::engine::{ShutdownStarted, ShutdownTimedOut};
use crate::observability::messages::StructuredLog;
use crate::properties::{property_do, PropertyAction, PropertyResult};

pub struct Engine {
    core: Arc<CoreLock>,
    hub: Arc<ClientHub>,
    wake: Arc<WakeSignal>,
    shutdown_timeout: Duration,
}

fn rejected(name: &str, error: CommandError) -> CommandOutcome {
    CommandOutcome {
        id: OpId(0),
        name: name.to_string(),
        success: false,
        result: Value::Null,
        error: Some(error),
    }
}

impl Engine {
    pub(crate) fn new(
        core: Arc<CoreLock>,
        hub: Arc<ClientHub>,
        wake: Arc<WakeSignal>,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            core,
            hub,
            wake,
            shutdown_timeout,
        }
    }

    /// Takes the core lock.
    pub fn lock(&self) -> CoreGuard<'_> {
        self.core.lock()
    }

    pub fn core(&self) -> &Arc<CoreLock> {
        &self.core
    }

    /// Signal bumped whenever the core wants its driving loop to re-check.
    pub fn wake_signal(&self) -> &Arc<WakeSignal> {
        &self.wake
    }

    pub fn connect(&self, client: &str) -> ClientHandle {
        self.hub.connect(client)
    }

    /// Disconnects `client` and drops its observations, hooks and work.
    pub fn disconnect(&self, client: &str) {
        self.hub.disconnect(client);
        self.core.lock().client_gone(client);
    }

    /// Runs `inv`. The receiver yields its outcome once the command
    /// completes, which may be long after this returns.
    pub fn submit(&self, inv: Invocation, abort: Option<Arc<AbortHandle>>) -> oneshot::Receiver<CommandOutcome> {
        let (tx, rx) = oneshot::channel();
        let callback: CompletionFn = Box::new(move |outcome: &CommandOutcome, _: &mut CoreGuard<'_>| {
            // The caller may have stopped waiting.
            let _ = tx.send(outcome.clone());
        });
        let mut core = self.core.lock();
        run_command(&mut core, inv, abort, Some(callback));
        rx
    }

    /// Parses `line` and submits it. A line that does not parse resolves
    /// to a failed outcome right away.
    pub fn submit_line(&self, line: &str) -> oneshot::Receiver<CommandOutcome> {
        let parsed = Invocation::parse(&self.core.lock().commands, line);
        match parsed {
            Ok(inv) => self.submit(inv, None),
            Err(e) => {
                let (tx, rx) = oneshot::channel();
                let _ = tx.send(rejected(line, e));
                rx
            }
        }
    }

    /// Parses and runs a command line, resolving once it completes.
    pub async fn command(&self, line: &str) -> CommandOutcome {
        self.submit_line(line)
            .await
            .unwrap_or_else(|_| rejected(line, CommandError::Aborted))
    }

    /// Blocking form of [`Engine::command`]. Must not be called from
    /// inside an async runtime.
    pub fn command_blocking(&self, line: &str) -> CommandOutcome {
        self.submit_line(line)
            .blocking_recv()
            .unwrap_or_else(|_| rejected(line, CommandError::Aborted))
    }

    /// Runs a structured command on behalf of `client`. The work can be
    /// cancelled later with [`Engine::abort_async`] using `work_id`.
    pub fn client_command(&self, client: &str, work_id: u64, node: &Value) -> oneshot::Receiver<CommandOutcome> {
        let parsed = Invocation::from_node(&self.core.lock().commands, node);
        match parsed {
            Ok(inv) => {
                let abort = Arc::new(AbortHandle::for_client(client, work_id));
                self.submit(inv.with_sender(client), Some(abort))
            }
            Err(e) => {
                let (tx, rx) = oneshot::channel();
                let _ = tx.send(rejected(&node.to_string(), e));
                rx
            }
        }
    }

    /// Cancels work owned by `client`: one request or, without `work_id`,
    /// all of them. Returns how many handles fired.
    pub fn abort_async(&self, client: &str, work_id: Option<u64>) -> usize {
        self.core.lock().aborts.cancel_client_work(client, work_id)
    }

    pub fn property(&self, path: &str, action: &PropertyAction) -> PropertyResult {
        property_do(&mut self.core.lock(), path, action)
    }

    pub fn observe(&self, client: &str, reply_id: u64, name: &str) {
        let mut core = self.core.lock();
        let id = core.properties.id_of(name);
        core.router.observe(client, reply_id, name, id);
    }

    pub fn unobserve(&self, client: &str, reply_id: u64) -> usize {
        self.core.lock().router.unobserve(client, reply_id)
    }

    pub fn notify(&self, kind: EventKind, payload: Option<Value>) {
        self.core.lock().notify(kind, payload);
    }

    pub fn hook_add(&self, client: &str, hook: &str, user_id: u64, priority: i32) -> i64 {
        self.core.lock().hook_add(client, hook, user_id, priority, false)
    }

    pub fn hook_start(&self, hook: &str) -> HookProgress {
        self.core.lock().hook_start(hook)
    }

    pub fn hook_ack(&self, client: &str, seq: i64) -> Result<HookProgress, HookError> {
        self.core.lock().hook_ack(client, seq)
    }

    pub fn hook_drained(&self, hook: &str) -> bool {
        self.core.lock().hook_drained(hook)
    }

    /// Stops accepting worker jobs, fires every abort handle and waits for
    /// outstanding jobs up to the shutdown timeout. Commands still queued or
    /// parked afterwards complete as aborted. Returns false if jobs were
    /// left running; those still complete when their handler returns.
    pub fn shutdown(&self) -> bool {
        let mut core = self.core.lock();
        if core.shutting_down {
            return core.outstanding_jobs == 0;
        }
        core.shutting_down = true;
        ShutdownStarted {
            outstanding: core.outstanding_jobs,
            pending: core.pending.len() + core.queued.len(),
        }
        .log();
        if let Some(pool) = core.worker_pool() {
            pool.close();
        }
        core.aborts.abort_all();
        core.notify(EventKind::Shutdown, None);

        let deadline = Instant::now() + self.shutdown_timeout;
        while core.outstanding_jobs > 0 {
            let now = Instant::now();
            if now >= deadline {
                ShutdownTimedOut {
                    outstanding: core.outstanding_jobs,
                }
                .log();
                break;
            }
            // Read under the lock: a job can only wake us after we let go.
            let seen = self.wake.generation();
            let wake = &self.wake;
            MutexGuard::unlocked(&mut core, || wake.wait_past(seen, deadline - now));
        }
        let drained = core.outstanding_jobs == 0;

        // Jobs still waiting for a worker will not get one.
        abort_queued(&mut core);
        for mut ctx in core.pending.drain() {
            ctx.fail(CommandError::Aborted);
            complete(ctx, &mut core);
        }
        let pool = core.pool.take();
        drop(core);
        drop(pool);
        drained
    }
}

impl Drop for Engine {
    /// Dropping an engine shuts it down, so no command loses its completion.
    fn drop(&mut self) {
        self.shutdown();
    }
}
