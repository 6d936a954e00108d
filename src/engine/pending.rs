// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::commands::{ExecutionContext, OpId};

/// Execution contexts held by the core between two steps of their life.
///
/// The core keeps two of these. `pending` holds async commands whose
/// handler returned without resolving them; they stay until
/// [`crate::commands::complete_pending`] takes them out. `queued` holds
/// worker-pool commands whose job has not started yet. Shutdown fails
/// whatever is left in either.
#[derive(Default)]
pub struct PendingOps {
    ops: HashMap<OpId, ExecutionContext>,
}

impl PendingOps {
    pub fn park(&mut self, ctx: ExecutionContext) {
        let previous = self.ops.insert(ctx.id, ctx);
        debug_assert!(previous.is_none(), "operation parked twice");
    }

    pub fn take(&mut self, id: OpId) -> Option<ExecutionContext> {
        self.ops.remove(&id)
    }

    pub fn contains(&self, id: OpId) -> bool {
        self.ops.contains_key(&id)
    }

    /// Removes everything, oldest first.
    pub fn drain(&mut self) -> Vec<ExecutionContext> {
        let mut all: Vec<ExecutionContext> = self.ops.drain().map(|(_, ctx)| ctx).collect();
        all.sort_by_key(|ctx| ctx.id);
        all
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
