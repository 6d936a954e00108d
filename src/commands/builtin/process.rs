// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! External process commands. `subprocess` blocks, so it runs on the worker
//! pool and drops the core lock while the child runs.

use parking_lot::MutexGuard;
use std::sync::Arc;
use tracing::{debug, error};

use crate::commands::ExecutionContext;
use crate::engine::CoreGuard;
use crate::errors::CommandError;
use crate::traits::SubprocessRequest;

pub fn cmd_run(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let args = ctx.rest(0);
    if let Err(e) = core.services.subprocess.spawn_detached(&args) {
        ctx.fail(CommandError::failed(format!("could not start '{}': {}", ctx.str_arg(0), e)));
    }
}

pub fn cmd_subprocess(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let args = ctx.list_arg(0);
    if args.is_empty() {
        error!(sender = ctx.sender().unwrap_or("-"), "program name missing");
        return ctx.fail(CommandError::invalid("program name missing"));
    }
    let request = SubprocessRequest {
        args,
        capture_stdout: ctx.flag_arg(3),
        capture_stderr: ctx.flag_arg(4),
        capture_size: ctx.int_arg(2),
        env: Vec::new(),
        stdin_data: None,
    };
    let Some(handle) = ctx.abort.clone() else {
        return ctx.fail(CommandError::failed("subprocess started without an abort handle"));
    };

    let stopping = core.playback_stopping();
    core.aborts.couple(&handle, ctx.flag_arg(1), stopping);

    let runner = Arc::clone(&core.services.subprocess);
    let token = handle.token().clone();
    let outcome = MutexGuard::unlocked(core, || runner.run(&request, &token));

    debug!(
        program = %request.args[0],
        status = outcome.status,
        killed_by_us = outcome.killed_by_us,
        "Subprocess finished"
    );
    ctx.set_result(outcome.to_node(&request));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Invocation, OpId};
    use crate::engine::{testing, AbortHandle};
    use crate::player::StopPlay;
    use crate::traits::SubprocessOutcome;
    use serde_json::json;

    fn context(core: &CoreGuard<'_>, node: serde_json::Value) -> ExecutionContext {
        let inv = Invocation::from_node(&core.commands, &node).unwrap();
        let mut ctx = ExecutionContext::new(OpId(1), inv, None);
        ctx.abort = Some(Arc::new(AbortHandle::new()));
        ctx
    }

    #[test]
    fn test_subprocess_releases_lock_and_reports() {
        let (core, stubs) = testing::core_with_stubs();
        *stubs.runner.outcome.lock() = SubprocessOutcome {
            stdout: b"hi\n".to_vec(),
            stderr: b"ignored".to_vec(),
            ..Default::default()
        };
        let lock = testing::lock(core);
        stubs.runner.probe(&lock);
        let mut core = lock.lock();

        let mut ctx = context(&core, json!({"name": "subprocess", "args": ["echo", "hi"], "capture_stdout": true}));
        cmd_subprocess(&mut ctx, &mut core);

        assert!(ctx.success);
        assert!(stubs.runner.ran_unlocked());
        assert_eq!(ctx.result["status"], json!(0));
        assert_eq!(ctx.result["stdout"], json!("hi\n"));
        assert!(ctx.result.get("stderr").is_none());
        let requests = stubs.runner.requests.lock();
        assert_eq!(requests[0].args, vec!["echo".to_string(), "hi".to_string()]);
        assert_eq!(requests[0].capture_size, 64 * 1024 * 1024);
    }

    #[test]
    fn test_subprocess_coupled_to_stopping_playback_is_killed() {
        let (core, stubs) = testing::core_with_stubs();
        let lock = testing::lock(core);
        let mut core = lock.lock();
        core.player.stop_play = StopPlay::Stop;

        let mut ctx = context(&core, json!(["subprocess", ["sleep", "10"]]));
        cmd_subprocess(&mut ctx, &mut core);
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.result["killed_by_us"], json!(true));

        let mut free = context(&core, json!({"name": "subprocess", "args": ["sleep", "1"], "playback_only": false}));
        cmd_subprocess(&mut free, &mut core);
        assert!(!free.is_cancelled());
        assert_eq!(stubs.runner.requests.lock().len(), 2);
    }

    #[test]
    fn test_subprocess_needs_program() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        let mut ctx = context(&core, json!({"name": "subprocess", "args": []}));
        cmd_subprocess(&mut ctx, &mut core);
        assert_eq!(ctx.error, Some(CommandError::invalid("program name missing")));
    }

    #[test]
    fn test_run_is_detached() {
        let (core, stubs) = testing::core_with_stubs();
        let lock = testing::lock(core);
        let mut core = lock.lock();
        assert!(testing::run(&mut core, "run notify-send 'a b' c").success);
        assert_eq!(
            *stubs.runner.detached.lock(),
            vec![vec!["notify-send".to_string(), "a b".to_string(), "c".to_string()]]
        );
    }
}
