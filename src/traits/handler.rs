// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::commands::ExecutionContext;
use crate::engine::CoreGuard;

/// Body of a command.
///
/// Runs with the core lock held. A handler that blocks releases the lock
/// with `parking_lot::MutexGuard::unlocked`, which re-acquires it before
/// returning. Failures are recorded on the context, never returned.
///
/// ```
/// use parking_lot::MutexGuard;
/// use playcore::commands::ExecutionContext;
/// use playcore::engine::CoreGuard;
///
/// fn waits(_: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
///     MutexGuard::unlocked(core, || std::thread::sleep(std::time::Duration::from_millis(1)));
/// }
/// ```
///
/// The guard is only borrowed, so a handler cannot return with the lock
/// given up:
///
/// ```compile_fail
/// use parking_lot::MutexGuard;
/// use playcore::commands::ExecutionContext;
/// use playcore::engine::CoreGuard;
///
/// fn leaves_unlocked(_: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
///     MutexGuard::unlock_fair(*core);
/// }
/// ```
pub trait CommandHandler: Send + Sync {
    fn execute(&self, cmd: &mut ExecutionContext, core: &mut CoreGuard<'_>);
}

impl<F> CommandHandler for F
where
    F: Fn(&mut ExecutionContext, &mut CoreGuard<'_>) + Send + Sync,
{
    fn execute(&self, cmd: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
        self(cmd, core)
    }
}
