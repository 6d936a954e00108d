// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Live cancellation tokens of running commands.
//!
//! Cancellation is cooperative: firing a handle only guarantees that later
//! checks of its token observe it. Handlers poll [`AbortHandle::is_cancelled`]
//! or select on [`AbortHandle::token`] around their blocking work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Default)]
pub struct AbortHandle {
    token: CancellationToken,
    client: Option<String>,
    work_id: Option<u64>,
    coupled_to_playback: AtomicBool,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle owned by a client request, cancellable through
    /// `abort_async(client, work_id)`.
    pub fn for_client(client: &str, work_id: u64) -> Self {
        Self {
            client: Some(client.to_string()),
            work_id: Some(work_id),
            ..Self::default()
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    pub fn work_id(&self) -> Option<u64> {
        self.work_id
    }

    pub fn is_coupled_to_playback(&self) -> bool {
        self.coupled_to_playback.load(Ordering::Acquire)
    }
}

/// Handles registered for the lifetime of their execution context.
#[derive(Debug, Default)]
pub struct AbortRegistry {
    handles: Vec<Arc<AbortHandle>>,
    aborting_all: bool,
}

impl AbortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle`. A handle coupled to playback that arrives while
    /// the current file is already stopping fires right away, as does any
    /// handle added during shutdown.
    pub fn add(&mut self, handle: Arc<AbortHandle>, coupled_to_playback: bool, playback_stopping: bool) {
        handle
            .coupled_to_playback
            .store(coupled_to_playback, Ordering::Release);
        self.recheck(&handle, playback_stopping);
        self.handles.push(handle);
    }

    pub fn remove(&mut self, handle: &Arc<AbortHandle>) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| !Arc::ptr_eq(h, handle));
        before != self.handles.len()
    }

    /// Changes whether `handle` follows the playing file, then rechecks it.
    pub fn couple(&self, handle: &AbortHandle, coupled_to_playback: bool, playback_stopping: bool) {
        handle
            .coupled_to_playback
            .store(coupled_to_playback, Ordering::Release);
        self.recheck(handle, playback_stopping);
    }

    pub fn recheck(&self, handle: &AbortHandle, playback_stopping: bool) {
        if self.aborting_all || (playback_stopping && handle.is_coupled_to_playback()) {
            handle.cancel();
        }
    }

    /// Fires every handle coupled to the currently playing file.
    pub fn abort_playback(&self) -> usize {
        let mut fired = 0;
        for handle in self.handles.iter().filter(|h| h.is_coupled_to_playback()) {
            handle.cancel();
            fired += 1;
        }
        if fired > 0 {
            debug!(handles = fired, "Aborted work coupled to playback");
        }
        fired
    }

    /// Fires everything, including handles registered from now on.
    pub fn abort_all(&mut self) -> usize {
        self.aborting_all = true;
        for handle in &self.handles {
            handle.cancel();
        }
        self.handles.len()
    }

    /// Cancels work owned by `client`: one request when `work_id` is given,
    /// all of its requests otherwise.
    pub fn cancel_client_work(&self, client: &str, work_id: Option<u64>) -> usize {
        let mut fired = 0;
        for handle in &self.handles {
            let owned = handle.client() == Some(client);
            if owned && (work_id.is_none() || handle.work_id() == work_id) {
                handle.cancel();
                fired += 1;
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
